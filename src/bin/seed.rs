use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use servicehub_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Users,
        types::{AccountStatus, UserRole},
        users::{ActiveModel as UserActive, Column as UserCol},
    },
    services::auth_service::hash_password,
};
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@service.com";
const ADMIN_PASSWORD: &str = "admin123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin_id = ensure_admin(&orm, ADMIN_EMAIL, ADMIN_PASSWORD).await?;

    println!("Seed completed. Admin ID: {admin_id} ({ADMIN_EMAIL})");
    Ok(())
}

async fn ensure_admin(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("Admin user already exists");
        return Ok(existing.id);
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;
    let now = Utc::now();

    let admin = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set("System Admin".to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        phone: Set("9999999999".to_string()),
        role: Set(UserRole::Admin),
        address_street: Set(None),
        address_city: Set(None),
        address_state: Set(None),
        address_pincode: Set(None),
        is_active: Set(true),
        status: Set(AccountStatus::Active),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    println!("Admin user created");
    Ok(admin.id)
}
