use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::{Users, types::UserRole},
    error::AppError,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

pub fn ensure_role(user: &AuthUser, role: UserRole) -> Result<(), AppError> {
    if user.role != role {
        let who = match role {
            UserRole::Customer => "customers",
            UserRole::Provider => "providers",
            UserRole::Admin => "admins",
        };
        return Err(AppError::Forbidden(format!(
            "Only {who} can perform this action"
        )));
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, UserRole::Admin)
}

// Tokens outlive moderation, so the account is re-read on every request.
pub async fn load_account(
    conn: &DatabaseConnection,
    claims: AuthUser,
) -> Result<AuthUser, AppError> {
    let account = Users::find_by_id(claims.user_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

    if !account.is_active {
        return Err(AppError::Forbidden("Account is deactivated".into()));
    }

    Ok(AuthUser {
        user_id: account.id,
        role: account.role,
    })
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        let state = AppState::from_ref(state);
        let claims = decode_token(token, &state.config.jwt_secret)?;
        load_account(&state.orm, claims).await
    }
}
