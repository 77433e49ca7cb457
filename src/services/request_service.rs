use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::services::{
        CreateServiceRequest, RateServiceRequest, RequestList, RequestListQuery,
        UpdateStatusRequest,
    },
    entity::{
        ServiceProviders, ServiceRequests, Users,
        service_providers::{ActiveModel as ProviderActive, Column as ProviderCol},
        service_requests::{
            ActiveModel as RequestActive, Column as ReqCol, Model as RequestModel,
        },
        types::{Availability, NotificationKind, RequestStatus, UserRole},
        users::Column as UserCol,
    },
    error::{AppError, AppResult},
    lifecycle::{average_rating, ensure_transition, quote_total_price, validate_rating},
    middleware::auth::{AuthUser, ensure_role},
    models::{Party, RequestWithParties, ServiceRequest},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, parse_status_filter},
    services::notification_service::notify,
    state::AppState,
};

pub async fn create_request(
    state: &AppState,
    user: &AuthUser,
    payload: CreateServiceRequest,
) -> AppResult<ApiResponse<ServiceRequest>> {
    ensure_role(user, UserRole::Customer)?;

    let service_type = payload.service_type.trim().to_string();
    let address = payload.address.trim().to_string();
    if service_type.is_empty() || address.is_empty() || payload.description.trim().is_empty() {
        return Err(AppError::bad_request(
            "serviceType, description and address are required",
        ));
    }

    let provider = ServiceProviders::find()
        .filter(ProviderCol::UserId.eq(payload.provider_id))
        .filter(ProviderCol::IsApproved.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Provider not found or not approved"))?;

    let total_price = quote_total_price(payload.estimated_hours, provider.hourly_rate)?;

    let customer = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let now = Utc::now();
    let txn = state.orm.begin().await?;

    let request = RequestActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        provider_id: Set(provider.user_id),
        service_provider_id: Set(provider.id),
        service_type: Set(service_type),
        description: Set(payload.description),
        status: Set(RequestStatus::Pending),
        scheduled_date: Set(payload.scheduled_date.into()),
        address: Set(address),
        estimated_hours: Set(payload.estimated_hours),
        total_price: Set(total_price),
        customer_rating: Set(None),
        customer_review: Set(None),
        provider_notes: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    notify(
        &txn,
        provider.user_id,
        NotificationKind::Request,
        "New Service Request",
        format!(
            "You have a new {} request from {}",
            request.service_type, customer.name
        ),
        Some(request.id),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        request_id = %request.id,
        provider_id = %request.provider_id,
        total_price,
        "service request created"
    );

    Ok(ApiResponse::success(
        "Service request created successfully",
        ServiceRequest::from(request),
        Some(Meta::empty()),
    ))
}

pub async fn list_customer_requests(
    state: &AppState,
    user: &AuthUser,
    query: RequestListQuery,
) -> AppResult<ApiResponse<RequestList>> {
    ensure_role(user, UserRole::Customer)?;
    let mut condition = Condition::all().add(ReqCol::CustomerId.eq(user.user_id));
    if let Some(status) = parse_status_filter(query.status.as_deref())? {
        condition = condition.add(ReqCol::Status.eq(status));
    }

    let (items, meta) = paginate_requests(
        &state.orm,
        condition,
        Pagination::new(query.page, query.limit),
    )
    .await?;
    Ok(ApiResponse::success("Ok", RequestList { items }, Some(meta)))
}

pub async fn list_provider_requests(
    state: &AppState,
    user: &AuthUser,
    query: RequestListQuery,
) -> AppResult<ApiResponse<RequestList>> {
    ensure_role(user, UserRole::Provider)?;
    let mut condition = Condition::all().add(ReqCol::ProviderId.eq(user.user_id));
    if let Some(status) = parse_status_filter(query.status.as_deref())? {
        condition = condition.add(ReqCol::Status.eq(status));
    }

    let (items, meta) = paginate_requests(
        &state.orm,
        condition,
        Pagination::new(query.page, query.limit),
    )
    .await?;
    Ok(ApiResponse::success("Ok", RequestList { items }, Some(meta)))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<ServiceRequest>> {
    ensure_role(user, UserRole::Provider)?;
    let next = payload.status;
    if !next.is_provider_update() {
        return Err(AppError::bad_request(format!(
            "Status {next} cannot be set here; allowed: accepted, rejected, in-progress, cancelled"
        )));
    }

    let txn = state.orm.begin().await?;

    let request = ServiceRequests::find_by_id(id)
        .filter(ReqCol::ProviderId.eq(user.user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Service request not found"))?;

    let current = request.status;
    ensure_transition(current, next)?;

    let mut update = RequestActive {
        status: Set(next),
        ..Default::default()
    };
    if let Some(notes) = payload
        .provider_notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
    {
        update.provider_notes = Set(Some(notes));
    }
    swap_status(&txn, id, current, update).await?;

    notify(
        &txn,
        request.customer_id,
        NotificationKind::Acceptance,
        format!("Request {next}"),
        format!("Your {} request has been {next}", request.service_type),
        Some(request.id),
    )
    .await?;

    if next == RequestStatus::Accepted {
        set_availability(&txn, user.user_id, Availability::Busy).await?;
    } else if next == RequestStatus::Cancelled && current.occupies_provider() {
        set_availability(&txn, user.user_id, Availability::Available).await?;
    }

    txn.commit().await?;

    tracing::info!(request_id = %id, from = %current, to = %next, "request status updated");

    let updated = load_request(&state.orm, id).await?;
    Ok(ApiResponse::success(
        format!("Request {next} successfully"),
        ServiceRequest::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn complete_request(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ServiceRequest>> {
    ensure_role(user, UserRole::Provider)?;

    let txn = state.orm.begin().await?;

    let request = ServiceRequests::find_by_id(id)
        .filter(ReqCol::ProviderId.eq(user.user_id))
        .filter(ReqCol::Status.is_in(RequestStatus::completable()))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Service request not found or not accepted"))?;

    swap_status(
        &txn,
        id,
        request.status,
        RequestActive {
            status: Set(RequestStatus::Completed),
            ..Default::default()
        },
    )
    .await?;

    ServiceProviders::update_many()
        .col_expr(
            ProviderCol::CompletedJobs,
            Expr::col(ProviderCol::CompletedJobs).add(1),
        )
        .col_expr(ProviderCol::TotalJobs, Expr::col(ProviderCol::TotalJobs).add(1))
        .set(ProviderActive {
            availability: Set(Availability::Available),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .filter(ProviderCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    notify(
        &txn,
        request.customer_id,
        NotificationKind::Completion,
        "Service Completed",
        format!(
            "Your {} service has been marked as completed",
            request.service_type
        ),
        Some(request.id),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(request_id = %id, provider_id = %user.user_id, "service completed");

    let updated = load_request(&state.orm, id).await?;
    Ok(ApiResponse::success(
        "Service marked as completed successfully",
        ServiceRequest::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn rate_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: RateServiceRequest,
) -> AppResult<ApiResponse<ServiceRequest>> {
    ensure_role(user, UserRole::Customer)?;
    validate_rating(payload.rating)?;
    let review = payload
        .review
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let txn = state.orm.begin().await?;

    let request = ServiceRequests::find_by_id(id)
        .filter(ReqCol::CustomerId.eq(user.user_id))
        .filter(ReqCol::Status.eq(RequestStatus::Completed))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Service request not found or not completed"))?;

    if request.customer_rating.is_some() {
        return Err(AppError::bad_request("Service request has already been rated"));
    }

    // Only the first rating lands; a concurrent second one matches no row.
    let result = ServiceRequests::update_many()
        .set(RequestActive {
            customer_rating: Set(Some(payload.rating)),
            customer_review: Set(review),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .filter(ReqCol::Id.eq(id))
        .filter(ReqCol::Status.eq(RequestStatus::Completed))
        .filter(ReqCol::CustomerRating.is_null())
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::bad_request("Service request has already been rated"));
    }

    let average = recompute_provider_rating(&txn, request.provider_id).await?;

    notify(
        &txn,
        request.provider_id,
        NotificationKind::Rating,
        "New Rating Received",
        format!(
            "You received a {} star rating for your service",
            payload.rating
        ),
        Some(request.id),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        request_id = %id,
        provider_id = %request.provider_id,
        rating = payload.rating,
        average,
        "service rated"
    );

    let updated = load_request(&state.orm, id).await?;
    Ok(ApiResponse::success(
        "Rating submitted successfully",
        ServiceRequest::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn cancel_request(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ServiceRequest>> {
    ensure_role(user, UserRole::Customer)?;

    let txn = state.orm.begin().await?;

    let request = ServiceRequests::find_by_id(id)
        .filter(ReqCol::CustomerId.eq(user.user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Service request not found"))?;

    let current = request.status;
    if !matches!(current, RequestStatus::Pending | RequestStatus::Accepted) {
        return Err(AppError::bad_request(format!(
            "Cannot cancel a request that is {current}"
        )));
    }
    ensure_transition(current, RequestStatus::Cancelled)?;

    swap_status(
        &txn,
        id,
        current,
        RequestActive {
            status: Set(RequestStatus::Cancelled),
            ..Default::default()
        },
    )
    .await?;

    if current.occupies_provider() {
        set_availability(&txn, request.provider_id, Availability::Available).await?;
    }

    notify(
        &txn,
        request.provider_id,
        NotificationKind::Request,
        "Request cancelled",
        format!(
            "The {} request has been cancelled by the customer",
            request.service_type
        ),
        Some(request.id),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(request_id = %id, from = %current, "request cancelled by customer");

    let updated = load_request(&state.orm, id).await?;
    Ok(ApiResponse::success(
        "Request cancelled successfully",
        ServiceRequest::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn get_request(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<RequestWithParties>> {
    let request = load_request(&state.orm, id).await?;

    let is_party = request.customer_id == user.user_id || request.provider_id == user.user_id;
    if user.role != UserRole::Admin && !is_party {
        return Err(AppError::forbidden("Access denied"));
    }

    let item = with_parties(&state.orm, vec![request])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Service request not found"))?;

    Ok(ApiResponse::success("OK", item, Some(Meta::empty())))
}

// Compare-and-swap on status.
async fn swap_status<C>(
    conn: &C,
    id: Uuid,
    observed: RequestStatus,
    mut update: RequestActive,
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    update.updated_at = Set(Utc::now().into());
    let result = ServiceRequests::update_many()
        .set(update)
        .filter(ReqCol::Id.eq(id))
        .filter(ReqCol::Status.eq(observed))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::bad_request(
            "Service request status changed concurrently, please retry",
        ));
    }
    Ok(())
}

async fn set_availability<C>(
    conn: &C,
    provider_user_id: Uuid,
    availability: Availability,
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    ServiceProviders::update_many()
        .set(ProviderActive {
            availability: Set(availability),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .filter(ProviderCol::UserId.eq(provider_user_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub(crate) async fn recompute_provider_rating<C>(conn: &C, provider_user_id: Uuid) -> AppResult<f64>
where
    C: ConnectionTrait,
{
    let ratings: Vec<i32> = ServiceRequests::find()
        .select_only()
        .column(ReqCol::CustomerRating)
        .filter(ReqCol::ProviderId.eq(provider_user_id))
        .filter(ReqCol::Status.eq(RequestStatus::Completed))
        .filter(ReqCol::CustomerRating.is_not_null())
        .into_tuple::<Option<i32>>()
        .all(conn)
        .await?
        .into_iter()
        .flatten()
        .collect();

    let average = average_rating(&ratings);

    ServiceProviders::update_many()
        .set(ProviderActive {
            rating: Set(average),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .filter(ProviderCol::UserId.eq(provider_user_id))
        .exec(conn)
        .await?;

    Ok(average)
}

async fn load_request<C>(conn: &C, id: Uuid) -> AppResult<RequestModel>
where
    C: ConnectionTrait,
{
    ServiceRequests::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Service request not found"))
}

pub(crate) async fn with_parties<C>(
    conn: &C,
    requests: Vec<RequestModel>,
) -> AppResult<Vec<RequestWithParties>>
where
    C: ConnectionTrait,
{
    let mut ids: Vec<Uuid> = requests
        .iter()
        .flat_map(|r| [r.customer_id, r.provider_id])
        .collect();
    ids.sort();
    ids.dedup();

    let users: HashMap<Uuid, Party> = if ids.is_empty() {
        HashMap::new()
    } else {
        Users::find()
            .filter(UserCol::Id.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|u| (u.id, Party::from(u)))
            .collect()
    };

    Ok(requests
        .into_iter()
        .map(|request| RequestWithParties {
            customer: users.get(&request.customer_id).cloned(),
            provider: users.get(&request.provider_id).cloned(),
            request: ServiceRequest::from(request),
        })
        .collect())
}

pub(crate) async fn paginate_requests<C>(
    conn: &C,
    condition: Condition,
    pagination: Pagination,
) -> AppResult<(Vec<RequestWithParties>, Meta)>
where
    C: ConnectionTrait,
{
    let (page, limit, offset) = pagination.normalize();
    let finder = ServiceRequests::find()
        .filter(condition)
        .order_by_desc(ReqCol::CreatedAt);

    let total = finder.clone().count(conn).await? as i64;
    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(conn)
        .await?;

    let items = with_parties(conn, rows).await?;
    Ok((items, Meta::new(page, limit, total)))
}

pub(crate) async fn count_requests<C>(conn: &C, condition: Condition) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    Ok(ServiceRequests::find().filter(condition).count(conn).await?)
}

pub(crate) async fn sum_total_price<C>(conn: &C, condition: Condition) -> AppResult<f64>
where
    C: ConnectionTrait,
{
    let total: Option<Option<f64>> = ServiceRequests::find()
        .select_only()
        .column_as(ReqCol::TotalPrice.sum(), "total")
        .filter(condition)
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(0.0))
}
