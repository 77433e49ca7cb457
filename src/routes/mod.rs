use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod doc;
pub mod health;
pub mod notifications;
pub mod params;
pub mod providers;
pub mod services;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/providers", providers::router())
        .nest("/services", services::router())
        .nest("/notifications", notifications::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
}
