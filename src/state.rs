use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, mailer::Mailer};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: AppConfig, mailer: Mailer) -> Self {
        Self {
            orm,
            config: Arc::new(config),
            mailer,
        }
    }
}
