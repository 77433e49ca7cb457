use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    notifications, service_providers, service_requests,
    types::{
        AccountStatus, AdminNote, Availability, NotificationKind, Profession, RequestStatus,
        UserRole,
    },
    users,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub address: Address,
    pub is_active: bool,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profession: Profession,
    pub skills: Vec<String>,
    pub experience: i32,
    pub hourly_rate: f64,
    pub description: String,
    pub is_approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub admin_notes: Vec<AdminNote>,
    pub rating: f64,
    pub total_jobs: i32,
    pub completed_jobs: i32,
    pub availability: Availability,
    pub service_areas: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderWithUser {
    pub provider: Provider,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_provider_id: Uuid,
    pub service_type: String,
    pub description: String,
    pub status: RequestStatus,
    pub scheduled_date: DateTime<Utc>,
    pub address: String,
    pub estimated_hours: f64,
    pub total_price: f64,
    pub customer_rating: Option<i32>,
    pub customer_review: Option<String>,
    pub provider_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithParties {
    pub request: ServiceRequest,
    pub customer: Option<Party>,
    pub provider: Option<Party>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub related_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub request_id: Uuid,
    pub rating: i32,
    pub review: Option<String>,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        let address = address_of(&model);
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            role: model.role,
            address,
            is_active: model.is_active,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<users::Model> for Party {
    fn from(model: users::Model) -> Self {
        let address = address_of(&model);
        Party {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            address,
        }
    }
}

impl From<service_providers::Model> for Provider {
    fn from(model: service_providers::Model) -> Self {
        Provider {
            id: model.id,
            user_id: model.user_id,
            profession: model.profession,
            skills: model.skills.0,
            experience: model.experience,
            hourly_rate: model.hourly_rate,
            description: model.description,
            is_approved: model.is_approved,
            approved_at: model.approved_at.map(|dt| dt.with_timezone(&Utc)),
            admin_notes: model.admin_notes.0,
            rating: model.rating,
            total_jobs: model.total_jobs,
            completed_jobs: model.completed_jobs,
            availability: model.availability,
            service_areas: model.service_areas.0,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<service_requests::Model> for ServiceRequest {
    fn from(model: service_requests::Model) -> Self {
        ServiceRequest {
            id: model.id,
            customer_id: model.customer_id,
            provider_id: model.provider_id,
            service_provider_id: model.service_provider_id,
            service_type: model.service_type,
            description: model.description,
            status: model.status,
            scheduled_date: model.scheduled_date.with_timezone(&Utc),
            address: model.address,
            estimated_hours: model.estimated_hours,
            total_price: model.total_price,
            customer_rating: model.customer_rating,
            customer_review: model.customer_review,
            provider_notes: model.provider_notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<notifications::Model> for Notification {
    fn from(model: notifications::Model) -> Self {
        Notification {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            message: model.message,
            kind: model.kind,
            related_id: model.related_id,
            is_read: model.is_read,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

fn address_of(model: &users::Model) -> Address {
    Address {
        street: model.address_street.clone(),
        city: model.address_city.clone(),
        state: model.address_state.clone(),
        pincode: model.address_pincode.clone(),
    }
}
