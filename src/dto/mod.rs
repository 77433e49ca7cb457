pub mod admin;
pub mod auth;
pub mod notifications;
pub mod providers;
pub mod services;
pub mod users;
