use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::notifications::{MarkedCount, NotificationList, NotificationQuery},
    entity::{
        Notifications,
        notifications::{
            ActiveModel as NotificationActive, Column as NotifCol, Model as NotificationModel,
        },
        types::NotificationKind,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Notification,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

// Runs on the caller's connection so it commits with the triggering write.
pub async fn notify<C>(
    conn: &C,
    user_id: Uuid,
    kind: NotificationKind,
    title: impl Into<String>,
    message: impl Into<String>,
    related_id: Option<Uuid>,
) -> AppResult<NotificationModel>
where
    C: ConnectionTrait,
{
    let model = NotificationActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        title: Set(title.into()),
        message: Set(message.into()),
        kind: Set(kind),
        related_id: Set(related_id),
        is_read: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;
    Ok(model)
}

pub async fn list_notifications(
    state: &AppState,
    user: &AuthUser,
    query: NotificationQuery,
) -> AppResult<ApiResponse<NotificationList>> {
    let (page, limit, offset) = Pagination::new(query.page, query.limit).normalize();

    let finder = Notifications::find()
        .filter(NotifCol::UserId.eq(user.user_id))
        .order_by_desc(NotifCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let unread_count = Notifications::find()
        .filter(NotifCol::UserId.eq(user.user_id))
        .filter(NotifCol::IsRead.eq(false))
        .count(&state.orm)
        .await?;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Notification::from)
        .collect();

    Ok(ApiResponse::success(
        "Notifications",
        NotificationList {
            items,
            unread_count,
        },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn mark_read(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Notification>> {
    let existing = Notifications::find_by_id(id)
        .filter(NotifCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Notification not found"))?;

    let mut active: NotificationActive = existing.into();
    active.is_read = Set(true);
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Notification marked as read",
        Notification::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn mark_all_read(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<MarkedCount>> {
    let result = Notifications::update_many()
        .set(NotificationActive {
            is_read: Set(true),
            ..Default::default()
        })
        .filter(NotifCol::UserId.eq(user.user_id))
        .filter(NotifCol::IsRead.eq(false))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "All notifications marked as read",
        MarkedCount {
            updated: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_notification(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Notifications::delete_many()
        .filter(NotifCol::Id.eq(id))
        .filter(NotifCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Notification not found"));
    }

    Ok(ApiResponse::success(
        "Notification deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}
