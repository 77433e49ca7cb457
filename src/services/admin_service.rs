use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::admin::{
        AdminUserDetail, AdminUserList, AdminUserRow, ApproveProviderRequest, DashboardStats,
        PendingProviderList, UpdateUserStatusRequest, UserListQuery, UserStats,
    },
    dto::services::{RequestList, RequestListQuery},
    entity::{
        Notifications, ServiceProviders, ServiceRequests, Users,
        notifications::Column as NotifCol,
        service_providers::{ActiveModel as ProviderActive, Column as ProviderCol},
        service_requests::Column as ReqCol,
        types::{AccountStatus, AdminNote, NotificationKind, RequestStatus, UserRole},
        users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    mailer::provider_approval_email,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Provider, ProviderWithUser, User},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, parse_status_filter},
    services::{
        notification_service::notify,
        request_service::{count_requests, paginate_requests, sum_total_price, with_parties},
    },
    state::AppState,
};

const RECENT_LIMIT: u64 = 10;

pub async fn dashboard_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;
    let db = &state.orm;

    let by_status =
        |status: RequestStatus| Condition::all().add(ReqCol::Status.eq(status));

    let recent = ServiceRequests::find()
        .order_by_desc(ReqCol::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(db)
        .await?;

    let recent_registrations = Users::find()
        .order_by_desc(UserCol::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(db)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    let stats = DashboardStats {
        total_users: Users::find().count(db).await?,
        total_customers: Users::find()
            .filter(UserCol::Role.eq(UserRole::Customer))
            .count(db)
            .await?,
        total_providers: Users::find()
            .filter(UserCol::Role.eq(UserRole::Provider))
            .count(db)
            .await?,
        approved_providers: ServiceProviders::find()
            .filter(ProviderCol::IsApproved.eq(true))
            .count(db)
            .await?,
        pending_providers: ServiceProviders::find()
            .filter(ProviderCol::IsApproved.eq(false))
            .count(db)
            .await?,
        total_requests: ServiceRequests::find().count(db).await?,
        pending_requests: count_requests(db, by_status(RequestStatus::Pending)).await?,
        completed_requests: count_requests(db, by_status(RequestStatus::Completed)).await?,
        total_revenue: sum_total_price(db, by_status(RequestStatus::Completed)).await?,
        recent_requests: with_parties(db, recent).await?,
        recent_registrations,
    };

    Ok(ApiResponse::success("Dashboard stats", stats, Some(Meta::empty())))
}

pub async fn pending_providers(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PendingProviderList>> {
    ensure_admin(user)?;

    let items: Vec<ProviderWithUser> = ServiceProviders::find()
        .filter(ProviderCol::IsApproved.eq(false))
        .find_also_related(Users)
        .order_by_desc(ProviderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(provider, owner)| ProviderWithUser {
            provider: Provider::from(provider),
            user: owner.map(User::from),
        })
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Pending providers",
        PendingProviderList { items },
        Some(Meta::new(1, total.max(1), total)),
    ))
}

pub async fn approve_provider(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ApproveProviderRequest,
) -> AppResult<ApiResponse<ProviderWithUser>> {
    ensure_admin(user)?;
    let approved = payload.is_approved;
    let reason = payload
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    let now = Utc::now();

    let txn = state.orm.begin().await?;

    let (provider, owner) = ServiceProviders::find_by_id(id)
        .find_also_related(Users)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Provider not found"))?;
    let owner = owner.ok_or_else(|| AppError::not_found("Provider account not found"))?;

    let profession = provider.profession.to_value();

    let mut notes = provider.admin_notes.clone();
    notes.0.push(AdminNote {
        note: reason.clone().unwrap_or_else(|| {
            if approved {
                "Provider approved".to_string()
            } else {
                "Provider rejected".to_string()
            }
        }),
        date: now,
    });

    let mut active: ProviderActive = provider.into();
    active.is_approved = Set(approved);
    active.approved_at = Set(approved.then(|| now.into()));
    active.admin_notes = Set(notes);
    active.updated_at = Set(now.into());
    let provider = active.update(&txn).await?;

    let mut owner_active: UserActive = owner.into();
    owner_active.is_active = Set(approved);
    owner_active.status = Set(if approved {
        AccountStatus::Active
    } else {
        AccountStatus::Rejected
    });
    owner_active.updated_at = Set(now.into());
    let owner = owner_active.update(&txn).await?;

    let (title, message) = approval_notice(&profession, approved, reason.as_deref());
    notify(
        &txn,
        owner.id,
        NotificationKind::System,
        title,
        message,
        Some(provider.id),
    )
    .await?;

    txn.commit().await?;

    state.mailer.enqueue(provider_approval_email(
        &owner.email,
        &owner.name,
        &profession,
        approved,
        reason.as_deref(),
        &state.config.frontend_url,
    ));

    audit(
        state,
        user,
        "provider_approval",
        "service_providers",
        serde_json::json!({ "provider_id": provider.id, "is_approved": approved }),
    )
    .await;

    tracing::info!(provider_id = %provider.id, approved, "provider reviewed");

    Ok(ApiResponse::success(
        if approved {
            "Provider approved successfully"
        } else {
            "Provider rejected successfully"
        },
        ProviderWithUser {
            provider: Provider::from(provider),
            user: Some(User::from(owner)),
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_requests(
    state: &AppState,
    user: &AuthUser,
    query: RequestListQuery,
) -> AppResult<ApiResponse<RequestList>> {
    ensure_admin(user)?;

    let mut condition = Condition::all();
    if let Some(status) = parse_status_filter(query.status.as_deref())? {
        condition = condition.add(ReqCol::Status.eq(status));
    }

    let (items, meta) = paginate_requests(
        &state.orm,
        condition,
        Pagination::new(query.page, query.limit),
    )
    .await?;

    Ok(ApiResponse::success("Requests", RequestList { items }, Some(meta)))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<AdminUserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = Pagination::new(query.page, query.limit).normalize();

    let mut condition = Condition::all();
    match query.role.as_deref().map(str::trim) {
        None | Some("") | Some("all") => {}
        Some("customer") => condition = condition.add(UserCol::Role.eq(UserRole::Customer)),
        Some("provider") => condition = condition.add(UserCol::Role.eq(UserRole::Provider)),
        Some("admin") => condition = condition.add(UserCol::Role.eq(UserRole::Admin)),
        Some(other) => {
            return Err(AppError::bad_request(format!("Unknown role filter: {other}")));
        }
    }
    match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => {}
        Some("active") => condition = condition.add(UserCol::IsActive.eq(true)),
        Some("inactive") => condition = condition.add(UserCol::IsActive.eq(false)),
        Some(other) => {
            return Err(AppError::bad_request(format!(
                "Unknown status filter: {other}"
            )));
        }
    }
    if let Some(search) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let pattern = format!("%{}%", search.to_lowercase());
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(UserCol::Name))).like(pattern.as_str()))
                .add(Expr::expr(Func::lower(Expr::col(UserCol::Email))).like(pattern.as_str()))
                .add(Expr::col(UserCol::Phone).like(pattern.as_str())),
        );
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let users = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(users.len());
    for row in users {
        items.push(user_row(state, row).await?);
    }

    Ok(ApiResponse::success(
        "Users",
        AdminUserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_user_detail(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AdminUserDetail>> {
    ensure_admin(user)?;
    let db = &state.orm;

    let found = Users::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let (provider_details, stats) = match found.role {
        UserRole::Customer => {
            let mine = || Condition::all().add(ReqCol::CustomerId.eq(found.id));
            let stats = UserStats {
                total_bookings: count_requests(db, mine()).await?,
                completed_bookings: count_requests(
                    db,
                    mine().add(ReqCol::Status.eq(RequestStatus::Completed)),
                )
                .await?,
                pending_bookings: count_requests(
                    db,
                    mine().add(ReqCol::Status.eq(RequestStatus::Pending)),
                )
                .await?,
                total_earnings: None,
            };
            (None, Some(stats))
        }
        UserRole::Provider => {
            let profile = ServiceProviders::find()
                .filter(ProviderCol::UserId.eq(found.id))
                .one(db)
                .await?
                .map(Provider::from);
            let mine = || Condition::all().add(ReqCol::ProviderId.eq(found.id));
            let completed = || mine().add(ReqCol::Status.eq(RequestStatus::Completed));
            let stats = UserStats {
                total_bookings: count_requests(db, mine()).await?,
                completed_bookings: count_requests(db, completed()).await?,
                pending_bookings: count_requests(
                    db,
                    mine().add(ReqCol::Status.eq(RequestStatus::Pending)),
                )
                .await?,
                total_earnings: Some(sum_total_price(db, completed()).await?),
            };
            (profile, Some(stats))
        }
        UserRole::Admin => (None, None),
    };

    Ok(ApiResponse::success(
        "User",
        AdminUserDetail {
            user: User::from(found),
            provider_details,
            stats,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_user_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserStatusRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let reason = payload
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let txn = state.orm.begin().await?;

    let existing = Users::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut active: UserActive = existing.into();
    active.is_active = Set(payload.is_active);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    let (title, message) = if payload.is_active {
        let note = reason
            .as_deref()
            .map(|r| format!(" Note: {r}"))
            .unwrap_or_default();
        (
            "Account Activated",
            format!("Your account has been activated by admin.{note}"),
        )
    } else {
        let note = reason
            .as_deref()
            .map(|r| format!("Reason: {r}"))
            .unwrap_or_else(|| "Please contact support for more details.".to_string());
        (
            "Account Deactivated",
            format!("Your account has been deactivated by admin. {note}"),
        )
    };
    notify(
        &txn,
        updated.id,
        NotificationKind::System,
        title,
        message,
        Some(updated.id),
    )
    .await?;

    txn.commit().await?;

    audit(
        state,
        user,
        "user_status_update",
        "users",
        serde_json::json!({ "user_id": updated.id, "is_active": updated.is_active }),
    )
    .await;

    Ok(ApiResponse::success(
        if updated.is_active {
            "User activated successfully"
        } else {
            "User deactivated successfully"
        },
        User::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let target = Users::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if target.role == UserRole::Admin {
        return Err(AppError::bad_request("Cannot delete admin user"));
    }

    Notifications::delete_many()
        .filter(NotifCol::UserId.eq(target.id))
        .exec(&txn)
        .await?;

    let requests = match target.role {
        UserRole::Provider => ServiceRequests::delete_many()
            .filter(ReqCol::ProviderId.eq(target.id))
            .exec(&txn)
            .await?
            .rows_affected,
        _ => ServiceRequests::delete_many()
            .filter(ReqCol::CustomerId.eq(target.id))
            .exec(&txn)
            .await?
            .rows_affected,
    };

    ServiceProviders::delete_many()
        .filter(ProviderCol::UserId.eq(target.id))
        .exec(&txn)
        .await?;

    Users::delete_by_id(target.id).exec(&txn).await?;

    txn.commit().await?;

    audit(
        state,
        user,
        "user_delete",
        "users",
        serde_json::json!({ "user_id": target.id, "role": target.role, "requests_removed": requests }),
    )
    .await;

    tracing::info!(user_id = %target.id, requests, "user deleted");

    Ok(ApiResponse::success(
        "User deleted successfully",
        serde_json::json!({ "id": target.id }),
        Some(Meta::empty()),
    ))
}

async fn user_row(state: &AppState, row: UserModel) -> AppResult<AdminUserRow> {
    let db = &state.orm;
    let (provider_info, bookings, completed_bookings) = match row.role {
        UserRole::Provider => {
            let info = ServiceProviders::find()
                .filter(ProviderCol::UserId.eq(row.id))
                .one(db)
                .await?
                .map(Provider::from);
            let mine = || Condition::all().add(ReqCol::ProviderId.eq(row.id));
            let bookings = count_requests(db, mine()).await?;
            let completed = count_requests(
                db,
                mine().add(ReqCol::Status.eq(RequestStatus::Completed)),
            )
            .await?;
            (info, bookings, Some(completed))
        }
        UserRole::Customer => {
            let bookings =
                count_requests(db, Condition::all().add(ReqCol::CustomerId.eq(row.id))).await?;
            (None, bookings, None)
        }
        UserRole::Admin => (None, 0, None),
    };

    Ok(AdminUserRow {
        user: User::from(row),
        provider_info,
        bookings,
        completed_bookings,
    })
}

fn approval_notice(profession: &str, approved: bool, reason: Option<&str>) -> (String, String) {
    if approved {
        let tail = reason
            .map(|r| format!("Note: {r}"))
            .unwrap_or_else(|| "You can now start accepting service requests.".to_string());
        (
            "Provider Account Approved!".to_string(),
            format!(
                "Congratulations! Your provider account for \"{profession}\" has been approved. {tail}"
            ),
        )
    } else {
        let tail = reason
            .map(|r| format!("Reason: {r}"))
            .unwrap_or_else(|| "Please contact support for more details.".to_string());
        (
            "Provider Application Rejected".to_string(),
            format!(
                "Your provider application for \"{profession}\" has been reviewed. {tail}"
            ),
        )
    }
}

async fn audit(
    state: &AppState,
    user: &AuthUser,
    action: &str,
    resource: &str,
    metadata: serde_json::Value,
) {
    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        action,
        Some(resource),
        Some(metadata),
    )
    .await
    {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
