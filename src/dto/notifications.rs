use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Notification;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct NotificationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    pub items: Vec<Notification>,
    pub unread_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkedCount {
    pub updated: u64,
}
