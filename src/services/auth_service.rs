use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    config::AppConfig,
    dto::auth::{AuthResponse, Claims, LoginRequest, MeResponse, RegisterRequest},
    entity::{
        ServiceProviders, Users,
        service_providers::{ActiveModel as ProviderActive, Column as ProviderCol},
        types::{AccountStatus, AdminNotes, Availability, Profession, UserRole},
        users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Provider, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let role = payload.role.unwrap_or(UserRole::Customer);
    if role == UserRole::Admin {
        return Err(AppError::forbidden("Admin accounts cannot be self-registered"));
    }

    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);
    let phone = payload.phone.trim().to_string();
    if name.is_empty() || phone.is_empty() {
        return Err(AppError::bad_request("name and phone are required"));
    }
    if !email.contains('@') {
        return Err(AppError::bad_request("A valid email is required"));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if payload
        .hourly_rate
        .is_some_and(|rate| !rate.is_finite() || rate < 0.0)
    {
        return Err(AppError::bad_request("hourlyRate must not be negative"));
    }

    let password_hash = hash_password(&payload.password)?;
    let address = payload.address.unwrap_or_default();
    let now = Utc::now();

    let txn = state.orm.begin().await?;

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&txn)
        .await?;
    if exist.is_some() {
        return Err(AppError::bad_request("Email already exists"));
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(password_hash),
        phone: Set(phone),
        role: Set(role),
        address_street: Set(address.street),
        address_city: Set(address.city),
        address_state: Set(address.state),
        address_pincode: Set(address.pincode),
        is_active: Set(true),
        status: Set(if role == UserRole::Provider {
            AccountStatus::Pending
        } else {
            AccountStatus::Active
        }),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    if role == UserRole::Provider {
        ProviderActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            profession: Set(payload.profession.unwrap_or(Profession::Other)),
            skills: Set(payload.skills.into()),
            experience: Set(payload.experience.unwrap_or(0).max(0)),
            hourly_rate: Set(payload.hourly_rate.unwrap_or(0.0)),
            description: Set(payload.description.unwrap_or_default()),
            is_approved: Set(false),
            approved_at: Set(None),
            admin_notes: Set(AdminNotes::default()),
            rating: Set(0.0),
            total_jobs: Set(0),
            completed_jobs: Set(0),
            availability: Set(Availability::Available),
            service_areas: Set(payload.service_areas.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    let token = issue_token(&state.config, &user)?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "role": user.role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    tracing::info!(user_id = %user.id, role = ?user.role, "user registered");
    Ok(ApiResponse::success(
        "Registration successful",
        AuthResponse {
            token,
            user: User::from(user),
        },
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let email = normalize_email(&payload.email);
    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::bad_request("Invalid credentials")),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::bad_request("Invalid credentials"));
    }

    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    let token = issue_token(&state.config, &user)?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Login successful",
        AuthResponse {
            token,
            user: User::from(user),
        },
        Some(Meta::empty()),
    ))
}

pub async fn current_user(state: &AppState, auth: &AuthUser) -> AppResult<ApiResponse<MeResponse>> {
    let user = Users::find_by_id(auth.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let provider_details = if user.role == UserRole::Provider {
        ServiceProviders::find()
            .filter(ProviderCol::UserId.eq(user.id))
            .one(&state.orm)
            .await?
            .map(Provider::from)
    } else {
        None
    };

    Ok(ApiResponse::success(
        "Profile",
        MeResponse {
            user: User::from(user),
            provider_details,
        },
        Some(Meta::empty()),
    ))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn issue_token(config: &AppConfig, user: &UserModel) -> AppResult<String> {
    let expiration = Duration::try_hours(config.jwt_ttl_hours)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
