use sea_orm::entity::prelude::*;

use super::types::RequestStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "service_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    // user id, not the profile id
    pub provider_id: Uuid,
    pub service_provider_id: Uuid,
    pub service_type: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: RequestStatus,
    pub scheduled_date: DateTimeWithTimeZone,
    pub address: String,
    #[sea_orm(column_type = "Double")]
    pub estimated_hours: f64,
    #[sea_orm(column_type = "Double")]
    pub total_price: f64,
    pub customer_rating: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub customer_review: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub provider_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CustomerId",
        to = "super::users::Column::Id",
        fk_name = "fk_service_requests_customer"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ProviderId",
        to = "super::users::Column::Id",
        fk_name = "fk_service_requests_provider"
    )]
    Provider,
    #[sea_orm(
        belongs_to = "super::service_providers::Entity",
        from = "Column::ServiceProviderId",
        to = "super::service_providers::Column::Id",
        fk_name = "fk_service_requests_profile"
    )]
    ServiceProviders,
}

impl Related<super::service_providers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceProviders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
