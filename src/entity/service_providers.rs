use sea_orm::entity::prelude::*;

use super::types::{AdminNotes, Availability, Profession, StringList};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "service_providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub profession: Profession,
    #[sea_orm(column_type = "Json")]
    pub skills: StringList,
    pub experience: i32,
    #[sea_orm(column_type = "Double")]
    pub hourly_rate: f64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub is_approved: bool,
    pub approved_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Json")]
    pub admin_notes: AdminNotes,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub total_jobs: i32,
    pub completed_jobs: i32,
    pub availability: Availability,
    #[sea_orm(column_type = "Json")]
    pub service_areas: StringList,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::service_requests::Entity")]
    ServiceRequests,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::service_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
