use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    entity::types::{Availability, Profession},
    models::Address,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProviderProfileRequest {
    pub profession: Option<Profession>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub description: Option<String>,
    pub service_areas: Option<Vec<String>>,
    pub availability: Option<Availability>,
}
