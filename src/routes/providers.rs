use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::providers::{ProviderDetail, ProviderList, ProviderQuery, ProviderStats},
    error::AppResult,
    extract::AppQuery,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::provider_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/approved", get(list_approved))
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/{id}", get(get_provider))
}

#[utoipa::path(
    get,
    path = "/api/providers/approved",
    params(
        ("profession" = Option<String>, Query, description = "Exact profession"),
        ("city" = Option<String>, Query, description = "Case-insensitive match on city or service areas"),
        ("minRating" = Option<f64>, Query, description = "Minimum rating"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Approved providers, best rated first", body = ApiResponse<ProviderList>)
    ),
    tag = "Providers"
)]
pub async fn list_approved(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProviderQuery>,
) -> AppResult<Json<ApiResponse<ProviderList>>> {
    let resp = provider_service::list_approved(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/providers/{id}",
    params(("id" = Uuid, Path, description = "Provider profile ID")),
    responses(
        (status = 200, description = "Provider with recent reviews", body = ApiResponse<ProviderDetail>),
        (status = 404, description = "Provider not found or not approved")
    ),
    tag = "Providers"
)]
pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProviderDetail>>> {
    let resp = provider_service::get_provider(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/providers/dashboard/stats",
    responses(
        (status = 200, description = "Provider dashboard numbers", body = ApiResponse<ProviderStats>),
        (status = 403, description = "Caller is not a provider")
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProviderStats>>> {
    let resp = provider_service::provider_dashboard(&state, &user).await?;
    Ok(Json(resp))
}
