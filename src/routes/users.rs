use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::users::{UpdateProfileRequest, UpdateProviderProfileRequest},
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    models::{Provider, User},
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", put(update_profile))
        .route("/provider/profile", put(update_provider_profile))
        .route("/{id}", get(get_user))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public user view", body = ApiResponse<User>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::get_user(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Own profile updated", body = ApiResponse<User>),
        (status = 400, description = "Invalid field")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/provider/profile",
    request_body = UpdateProviderProfileRequest,
    responses(
        (status = 200, description = "Provider profile updated", body = ApiResponse<Provider>),
        (status = 403, description = "Caller is not a provider")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_provider_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<UpdateProviderProfileRequest>,
) -> AppResult<Json<ApiResponse<Provider>>> {
    let resp = user_service::update_provider_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}
