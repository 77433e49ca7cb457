pub mod admin_service;
pub mod auth_service;
pub mod notification_service;
pub mod provider_service;
pub mod request_service;
pub mod user_service;
