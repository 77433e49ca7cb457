use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{
            AdminUserDetail, AdminUserList, ApproveProviderRequest, DashboardStats,
            PendingProviderList, UpdateUserStatusRequest, UserListQuery,
        },
        services::{RequestList, RequestListQuery},
    },
    error::AppResult,
    extract::{AppJson, AppQuery},
    middleware::auth::AuthUser,
    models::{ProviderWithUser, User},
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/providers/pending", get(pending_providers))
        .route("/providers/{id}/approve", put(approve_provider))
        .route("/requests", get(list_requests))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/users/{id}/status", put(update_user_status))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard/stats",
    responses(
        (status = 200, description = "Platform totals and recent activity", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = admin_service::dashboard_stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/providers/pending",
    responses(
        (status = 200, description = "Providers awaiting review", body = ApiResponse<PendingProviderList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn pending_providers(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PendingProviderList>>> {
    let resp = admin_service::pending_providers(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/providers/{id}/approve",
    params(("id" = Uuid, Path, description = "Provider profile ID")),
    request_body = ApproveProviderRequest,
    responses(
        (status = 200, description = "Provider approved or rejected", body = ApiResponse<ProviderWithUser>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn approve_provider(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ApproveProviderRequest>,
) -> AppResult<Json<ApiResponse<ProviderWithUser>>> {
    let resp = admin_service::approve_provider(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/requests",
    params(
        ("status" = Option<String>, Query, description = "Status filter or `all`"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All service requests", body = ApiResponse<RequestList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<RequestListQuery>,
) -> AppResult<Json<ApiResponse<RequestList>>> {
    let resp = admin_service::list_requests(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("role" = Option<String>, Query, description = "customer, provider, admin or all"),
        ("status" = Option<String>, Query, description = "active, inactive or all"),
        ("search" = Option<String>, Query, description = "Matches name, e-mail or phone"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Users with booking counts", body = ApiResponse<AdminUserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<UserListQuery>,
) -> AppResult<Json<ApiResponse<AdminUserList>>> {
    let resp = admin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with role-specific stats", body = ApiResponse<AdminUserDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AdminUserDetail>>> {
    let resp = admin_service::get_user_detail(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/status",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Account activated or deactivated", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateUserStatusRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::update_user_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User and owned data removed"),
        (status = 400, description = "Cannot delete admin user"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_user(&state, &user, id).await?;
    Ok(Json(resp))
}
