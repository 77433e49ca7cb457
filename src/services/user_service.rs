use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::users::{UpdateProfileRequest, UpdateProviderProfileRequest},
    entity::{
        ServiceProviders, Users,
        service_providers::{ActiveModel as ProviderActive, Column as ProviderCol},
        types::UserRole,
        users::ActiveModel as UserActive,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Provider, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_user(state: &AppState, id: Uuid) -> AppResult<ApiResponse<User>> {
    let found = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(ApiResponse::success("OK", User::from(found), Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut active: UserActive = existing.into();

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request("name must not be empty"));
        }
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        let phone = phone.trim().to_string();
        if phone.is_empty() {
            return Err(AppError::bad_request("phone must not be empty"));
        }
        active.phone = Set(phone);
    }
    if let Some(address) = payload.address {
        active.address_street = Set(address.street);
        active.address_city = Set(address.city);
        active.address_state = Set(address.state);
        active.address_pincode = Set(address.pincode);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;
    tracing::info!(user_id = %updated.id, "profile updated");

    Ok(ApiResponse::success(
        "Profile updated successfully",
        User::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn update_provider_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProviderProfileRequest,
) -> AppResult<ApiResponse<Provider>> {
    ensure_role(user, UserRole::Provider)?;

    if payload
        .hourly_rate
        .is_some_and(|rate| !rate.is_finite() || rate < 0.0)
    {
        return Err(AppError::bad_request("hourlyRate must not be negative"));
    }
    if payload.experience.is_some_and(|years| years < 0) {
        return Err(AppError::bad_request("experience must not be negative"));
    }

    let existing = ServiceProviders::find()
        .filter(ProviderCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Provider profile not found"))?;

    let mut active: ProviderActive = existing.into();
    if let Some(profession) = payload.profession {
        active.profession = Set(profession);
    }
    if let Some(skills) = payload.skills {
        active.skills = Set(skills.into());
    }
    if let Some(experience) = payload.experience {
        active.experience = Set(experience);
    }
    if let Some(rate) = payload.hourly_rate {
        active.hourly_rate = Set(rate);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(areas) = payload.service_areas {
        active.service_areas = Set(areas.into());
    }
    if let Some(availability) = payload.availability {
        active.availability = Set(availability);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;
    tracing::info!(provider_id = %updated.id, "provider profile updated");

    Ok(ApiResponse::success(
        "Provider profile updated successfully",
        Provider::from(updated),
        Some(Meta::empty()),
    ))
}
