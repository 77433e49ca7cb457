use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::types::{Profession, UserRole},
    models::{Address, Provider, User},
};

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: Option<UserRole>,
    pub address: Option<Address>,
    // Provider-only profile fields.
    pub profession: Option<Profession>,
    pub experience: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub service_areas: Vec<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub provider_details: Option<Provider>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: UserRole,
    pub exp: usize,
}
