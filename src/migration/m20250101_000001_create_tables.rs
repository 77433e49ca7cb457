use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{
    AuditLogs, Notifications, ServiceProviders, ServiceRequests, Users, notifications,
    service_requests,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Tables are derived from the entities so the same migration runs on
        // Postgres and SQLite. Order follows the foreign keys.
        create_table(manager, Users).await?;
        create_table(manager, ServiceProviders).await?;
        create_table(manager, ServiceRequests).await?;
        create_table(manager, Notifications).await?;
        create_table(manager, AuditLogs).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_service_requests_customer_id")
                    .table(ServiceRequests)
                    .col(service_requests::Column::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_service_requests_provider_status")
                    .table(ServiceRequests)
                    .col(service_requests::Column::ProviderId)
                    .col(service_requests::Column::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_user_id")
                    .table(Notifications)
                    .col(notifications::Column::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceRequests).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceProviders).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

async fn create_table<E>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let schema = Schema::new(manager.get_database_backend());
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}
