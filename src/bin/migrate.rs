use sea_orm_migration::MigratorTrait;
use servicehub_api::{config::AppConfig, db::create_orm_conn, migration::Migrator};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    let pending = Migrator::get_pending_migrations(&orm).await?;
    if pending.is_empty() {
        tracing::info!("schema already up to date");
    } else {
        for migration in &pending {
            tracing::info!(name = migration.name(), "applying migration");
        }
        Migrator::up(&orm, None).await?;
        tracing::info!(applied = pending.len(), "migrations applied");
    }

    orm.close().await?;
    Ok(())
}
