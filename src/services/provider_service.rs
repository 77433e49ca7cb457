use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    dto::providers::{ProviderDetail, ProviderList, ProviderQuery, ProviderStats},
    entity::{
        ServiceProviders, ServiceRequests, Users,
        service_providers::{Column as ProviderCol, Model as ProviderModel},
        service_requests::Column as ReqCol,
        types::{RequestStatus, UserRole},
        users::{Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Provider, ProviderWithUser, Review, User},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::request_service::{count_requests, sum_total_price},
    state::AppState,
};

const REVIEW_LIMIT: u64 = 10;

pub async fn list_approved(
    state: &AppState,
    query: ProviderQuery,
) -> AppResult<ApiResponse<ProviderList>> {
    let (page, limit, offset) = Pagination::new(query.page, query.limit).normalize();

    let mut condition = Condition::all().add(ProviderCol::IsApproved.eq(true));
    if let Some(profession) = query.profession {
        condition = condition.add(ProviderCol::Profession.eq(profession));
    }
    if let Some(min_rating) = query.min_rating.filter(|r| r.is_finite()) {
        condition = condition.add(ProviderCol::Rating.gte(min_rating));
    }

    let rows = ServiceProviders::find()
        .filter(condition)
        .find_also_related(Users)
        .order_by_desc(ProviderCol::Rating)
        .order_by_desc(ProviderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase);

    // The city may live on the owner's address or in the service areas,
    // so it is matched after the join.
    let matched: Vec<ProviderWithUser> = rows
        .into_iter()
        .filter(|(_, user)| user.as_ref().is_some_and(|u| u.is_active))
        .filter(|(provider, user)| match &city {
            Some(city) => serves_city(provider, user.as_ref(), city),
            None => true,
        })
        .map(|(provider, user)| ProviderWithUser {
            provider: Provider::from(provider),
            user: user.map(User::from),
        })
        .collect();

    let total = matched.len() as i64;
    let items = matched
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    Ok(ApiResponse::success(
        "Providers",
        ProviderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_provider(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProviderDetail>> {
    let (provider, user) = ServiceProviders::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?
        .filter(|(provider, _)| provider.is_approved)
        .ok_or_else(|| AppError::not_found("Provider not found or not approved"))?;

    let rated = ServiceRequests::find()
        .filter(ReqCol::ProviderId.eq(provider.user_id))
        .filter(ReqCol::Status.eq(RequestStatus::Completed))
        .filter(ReqCol::CustomerRating.is_not_null())
        .order_by_desc(ReqCol::CreatedAt)
        .limit(REVIEW_LIMIT)
        .all(&state.orm)
        .await?;

    let customer_ids: Vec<Uuid> = rated.iter().map(|r| r.customer_id).collect();
    let names: HashMap<Uuid, String> = if customer_ids.is_empty() {
        HashMap::new()
    } else {
        Users::find()
            .filter(UserCol::Id.is_in(customer_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };

    let reviews = rated
        .into_iter()
        .filter_map(|request| {
            Some(Review {
                request_id: request.id,
                rating: request.customer_rating?,
                customer_name: names.get(&request.customer_id).cloned(),
                review: request.customer_review,
                created_at: request.created_at.with_timezone(&Utc),
            })
        })
        .collect();

    Ok(ApiResponse::success(
        "Provider",
        ProviderDetail {
            profile: ProviderWithUser {
                provider: Provider::from(provider),
                user: user.map(User::from),
            },
            reviews,
        },
        Some(Meta::empty()),
    ))
}

pub async fn provider_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProviderStats>> {
    ensure_role(user, UserRole::Provider)?;

    let provider = ServiceProviders::find()
        .filter(ProviderCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Provider profile not found"))?;

    let mine = || Condition::all().add(ReqCol::ProviderId.eq(user.user_id));
    let with_status = |status: RequestStatus| mine().add(ReqCol::Status.eq(status));

    let stats = ProviderStats {
        total_requests: count_requests(&state.orm, mine()).await?,
        pending_requests: count_requests(&state.orm, with_status(RequestStatus::Pending)).await?,
        accepted_requests: count_requests(&state.orm, with_status(RequestStatus::Accepted))
            .await?,
        completed_requests: count_requests(&state.orm, with_status(RequestStatus::Completed))
            .await?,
        total_earnings: sum_total_price(&state.orm, with_status(RequestStatus::Completed))
            .await?,
        rating: provider.rating,
        completed_jobs: provider.completed_jobs,
    };

    Ok(ApiResponse::success("Dashboard stats", stats, Some(Meta::empty())))
}

fn serves_city(provider: &ProviderModel, user: Option<&UserModel>, city: &str) -> bool {
    let in_address = user
        .and_then(|u| u.address_city.as_deref())
        .is_some_and(|c| c.to_lowercase().contains(city));
    in_address
        || provider
            .service_areas
            .0
            .iter()
            .any(|area| area.to_lowercase().contains(city))
}
