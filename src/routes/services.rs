use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::services::{
        CreateServiceRequest, RateServiceRequest, RequestList, RequestListQuery,
        UpdateStatusRequest,
    },
    error::AppResult,
    extract::{AppJson, AppQuery},
    middleware::auth::AuthUser,
    models::{RequestWithParties, ServiceRequest},
    response::ApiResponse,
    services::request_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(create_request))
        .route("/customer/requests", get(customer_requests))
        .route("/provider/requests", get(provider_requests))
        .route("/requests/{id}", get(get_request))
        .route("/requests/{id}/status", put(update_status))
        .route("/requests/{id}/complete", put(complete_request))
        .route("/requests/{id}/rate", post(rate_service))
        .route("/requests/{id}/cancel", put(cancel_request))
}

#[utoipa::path(
    post,
    path = "/api/services/request",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Book an approved provider", body = ApiResponse<ServiceRequest>),
        (status = 400, description = "Invalid booking"),
        (status = 403, description = "Caller is not a customer"),
        (status = 404, description = "Provider not found or not approved")
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn create_request(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateServiceRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ServiceRequest>>)> {
    let resp = request_service::create_request(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/services/customer/requests",
    params(
        ("status" = Option<String>, Query, description = "Status filter or `all`"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = ApiResponse<RequestList>),
        (status = 403, description = "Caller is not a customer")
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn customer_requests(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<RequestListQuery>,
) -> AppResult<Json<ApiResponse<RequestList>>> {
    let resp = request_service::list_customer_requests(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/services/provider/requests",
    params(
        ("status" = Option<String>, Query, description = "Status filter or `all`"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Requests addressed to the caller", body = ApiResponse<RequestList>),
        (status = 403, description = "Caller is not a provider")
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn provider_requests(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<RequestListQuery>,
) -> AppResult<Json<ApiResponse<RequestList>>> {
    let resp = request_service::list_provider_requests(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/services/requests/{id}",
    params(("id" = Uuid, Path, description = "Service request ID")),
    responses(
        (status = 200, description = "Request with both parties", body = ApiResponse<RequestWithParties>),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn get_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RequestWithParties>>> {
    let resp = request_service::get_request(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/services/requests/{id}/status",
    params(("id" = Uuid, Path, description = "Service request ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<ServiceRequest>),
        (status = 400, description = "Illegal transition"),
        (status = 403, description = "Caller is not a provider"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<ServiceRequest>>> {
    let resp = request_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/services/requests/{id}/complete",
    params(("id" = Uuid, Path, description = "Service request ID")),
    responses(
        (status = 200, description = "Marked completed", body = ApiResponse<ServiceRequest>),
        (status = 403, description = "Caller is not a provider"),
        (status = 404, description = "Service request not found or not accepted")
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn complete_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ServiceRequest>>> {
    let resp = request_service::complete_request(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/services/requests/{id}/rate",
    params(("id" = Uuid, Path, description = "Service request ID")),
    request_body = RateServiceRequest,
    responses(
        (status = 200, description = "Rating stored", body = ApiResponse<ServiceRequest>),
        (status = 400, description = "Rating out of range or already rated"),
        (status = 404, description = "Service request not found or not completed")
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn rate_service(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RateServiceRequest>,
) -> AppResult<Json<ApiResponse<ServiceRequest>>> {
    let resp = request_service::rate_service(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/services/requests/{id}/cancel",
    params(("id" = Uuid, Path, description = "Service request ID")),
    responses(
        (status = 200, description = "Cancelled by the customer", body = ApiResponse<ServiceRequest>),
        (status = 400, description = "Request can no longer be cancelled"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn cancel_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ServiceRequest>>> {
    let resp = request_service::cancel_request(&state, &user, id).await?;
    Ok(Json(resp))
}
