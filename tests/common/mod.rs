#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use servicehub_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        service_providers::{ActiveModel as ProviderActive, Model as ProviderModel},
        types::{AccountStatus, AdminNotes, Availability, Profession, UserRole},
        users::{ActiveModel as UserActive, Model as UserModel},
    },
    mailer::{EmailMessage, Mailer},
    middleware::auth::AuthUser,
    state::AppState,
};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret";

pub struct TestCtx {
    pub state: AppState,
    pub outbox: UnboundedReceiver<EmailMessage>,
}

pub async fn setup() -> anyhow::Result<TestCtx> {
    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        _ => None,
    })?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let (mailer, outbox) = Mailer::channel();
    Ok(TestCtx {
        state: AppState::new(orm, config, mailer),
        outbox,
    })
}

pub fn auth(user: &UserModel) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: user.role,
    }
}

pub async fn create_user(
    state: &AppState,
    role: UserRole,
    name: &str,
    email: &str,
) -> anyhow::Result<UserModel> {
    let now = Utc::now();
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        phone: Set("5550100".to_string()),
        role: Set(role),
        address_street: Set(None),
        address_city: Set(Some("Pune".to_string())),
        address_state: Set(None),
        address_pincode: Set(None),
        is_active: Set(true),
        status: Set(if role == UserRole::Provider {
            AccountStatus::Pending
        } else {
            AccountStatus::Active
        }),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(user)
}

/// Inserts a provider account with its profile.
pub async fn create_provider(
    state: &AppState,
    email: &str,
    hourly_rate: f64,
    approved: bool,
) -> anyhow::Result<(UserModel, ProviderModel)> {
    let user = create_user(state, UserRole::Provider, "Pat Plumber", email).await?;
    let now = Utc::now();
    let profile = ProviderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        profession: Set(Profession::Plumber),
        skills: Set(vec!["pipes".to_string()].into()),
        experience: Set(4),
        hourly_rate: Set(hourly_rate),
        description: Set("Fixes leaks".to_string()),
        is_approved: Set(approved),
        approved_at: Set(approved.then(|| now.into())),
        admin_notes: Set(AdminNotes::default()),
        rating: Set(0.0),
        total_jobs: Set(0),
        completed_jobs: Set(0),
        availability: Set(Availability::Available),
        service_areas: Set(vec!["Kothrud".to_string()].into()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok((user, profile))
}
