use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{entity::types::RequestStatus, models::RequestWithParties};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub provider_id: Uuid,
    pub service_type: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub address: String,
    pub estimated_hours: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: RequestStatus,
    pub provider_notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RateServiceRequest {
    pub rating: i32,
    pub review: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestList {
    pub items: Vec<RequestWithParties>,
}
