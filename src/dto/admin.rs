use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Provider, ProviderWithUser, RequestWithParties, User};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveProviderRequest {
    pub is_approved: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_customers: u64,
    pub total_providers: u64,
    pub approved_providers: u64,
    pub pending_providers: u64,
    pub total_requests: u64,
    pub pending_requests: u64,
    pub completed_requests: u64,
    pub total_revenue: f64,
    pub recent_requests: Vec<RequestWithParties>,
    pub recent_registrations: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingProviderList {
    pub items: Vec<ProviderWithUser>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRow {
    pub user: User,
    pub provider_info: Option<Provider>,
    pub bookings: u64,
    pub completed_bookings: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserList {
    pub items: Vec<AdminUserRow>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_bookings: u64,
    pub completed_bookings: u64,
    pub pending_bookings: u64,
    pub total_earnings: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDetail {
    pub user: User,
    pub provider_details: Option<Provider>,
    pub stats: Option<UserStats>,
}
