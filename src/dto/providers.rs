use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::types::Profession,
    models::{ProviderWithUser, Review},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuery {
    pub profession: Option<Profession>,
    pub city: Option<String>,
    pub min_rating: Option<f64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderList {
    pub items: Vec<ProviderWithUser>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderDetail {
    #[serde(flatten)]
    pub profile: ProviderWithUser,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    pub total_requests: u64,
    pub pending_requests: u64,
    pub accepted_requests: u64,
    pub completed_requests: u64,
    pub total_earnings: f64,
    pub rating: f64,
    pub completed_jobs: i32,
}
