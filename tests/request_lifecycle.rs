mod common;

use chrono::{Duration, Utc};
use common::{auth, create_provider, create_user, setup};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use servicehub_api::{
    dto::services::{CreateServiceRequest, RateServiceRequest, UpdateStatusRequest},
    entity::{
        Notifications, ServiceProviders, ServiceRequests,
        notifications::Column as NotifCol,
        types::{Availability, NotificationKind, RequestStatus, UserRole},
        users::Model as UserModel,
    },
    error::AppError,
    services::request_service,
    state::AppState,
};
use uuid::Uuid;

fn booking(provider_user_id: Uuid, hours: f64) -> CreateServiceRequest {
    CreateServiceRequest {
        provider_id: provider_user_id,
        service_type: "plumbing".to_string(),
        description: "Kitchen sink leaks".to_string(),
        scheduled_date: Utc::now() + Duration::days(1),
        address: "12 MG Road".to_string(),
        estimated_hours: hours,
    }
}

fn to_status(status: RequestStatus) -> UpdateStatusRequest {
    UpdateStatusRequest {
        status,
        provider_notes: None,
    }
}

async fn book(
    state: &AppState,
    customer: &UserModel,
    provider: &UserModel,
    hours: f64,
) -> anyhow::Result<Uuid> {
    let resp =
        request_service::create_request(state, &auth(customer), booking(provider.id, hours))
            .await?;
    Ok(resp.data.expect("request").id)
}

async fn completed_job(
    state: &AppState,
    customer: &UserModel,
    provider: &UserModel,
) -> anyhow::Result<Uuid> {
    let id = book(state, customer, provider, 1.0).await?;
    request_service::update_status(state, &auth(provider), id, to_status(RequestStatus::Accepted))
        .await?;
    request_service::complete_request(state, &auth(provider), id).await?;
    Ok(id)
}

#[tokio::test]
async fn booking_is_priced_from_the_hourly_rate() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, _) = create_provider(state, "pat@example.com", 200.0, true).await?;

    let resp =
        request_service::create_request(state, &auth(&customer), booking(provider.id, 3.0)).await?;
    let request = resp.data.expect("request");

    assert_eq!(request.total_price, 600.0);
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.provider_id, provider.id);

    let notes = Notifications::find()
        .filter(NotifCol::UserId.eq(provider.id))
        .all(&state.orm)
        .await?;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Request);
    assert_eq!(notes[0].title, "New Service Request");
    assert_eq!(notes[0].related_id, Some(request.id));
    Ok(())
}

#[tokio::test]
async fn unapproved_or_unknown_providers_cannot_be_booked() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (pending, _) = create_provider(state, "new@example.com", 150.0, false).await?;

    let err = request_service::create_request(state, &auth(&customer), booking(pending.id, 2.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err =
        request_service::create_request(state, &auth(&customer), booking(Uuid::new_v4(), 2.0))
            .await
            .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(ServiceRequests::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn only_customers_book_and_hours_must_be_positive() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, _) = create_provider(state, "pat@example.com", 100.0, true).await?;

    let err = request_service::create_request(state, &auth(&provider), booking(provider.id, 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = request_service::create_request(state, &auth(&customer), booking(provider.id, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn completion_requires_acceptance_and_updates_counters() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, profile) = create_provider(state, "pat@example.com", 100.0, true).await?;
    let id = book(state, &customer, &provider, 2.0).await?;

    let err = request_service::complete_request(state, &auth(&provider), id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    request_service::update_status(state, &auth(&provider), id, to_status(RequestStatus::Accepted))
        .await?;
    let busy = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(busy.availability, Availability::Busy);

    let resp = request_service::complete_request(state, &auth(&provider), id).await?;
    assert_eq!(resp.data.expect("request").status, RequestStatus::Completed);

    let after = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(after.completed_jobs, 1);
    assert_eq!(after.total_jobs, 1);
    assert_eq!(after.availability, Availability::Available);

    let customer_notes = Notifications::find()
        .filter(NotifCol::UserId.eq(customer.id))
        .filter(NotifCol::Kind.eq(NotificationKind::Completion))
        .count(&state.orm)
        .await?;
    assert_eq!(customer_notes, 1);
    Ok(())
}

#[tokio::test]
async fn status_moves_follow_the_transition_table() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, _) = create_provider(state, "pat@example.com", 100.0, true).await?;
    let id = completed_job(state, &customer, &provider).await?;

    let err = request_service::update_status(
        state,
        &auth(&provider),
        id,
        to_status(RequestStatus::Accepted),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let fresh = book(state, &customer, &provider, 1.0).await?;
    let err = request_service::update_status(
        state,
        &auth(&provider),
        fresh,
        to_status(RequestStatus::Completed),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = request_service::update_status(
        state,
        &auth(&provider),
        fresh,
        to_status(RequestStatus::InProgress),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let resp = request_service::update_status(
        state,
        &auth(&provider),
        fresh,
        to_status(RequestStatus::Rejected),
    )
    .await?;
    assert_eq!(resp.data.expect("request").status, RequestStatus::Rejected);
    Ok(())
}

#[tokio::test]
async fn providers_cannot_touch_other_providers_requests() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, _) = create_provider(state, "pat@example.com", 100.0, true).await?;
    let (other, _) = create_provider(state, "oli@example.com", 100.0, true).await?;
    let id = book(state, &customer, &provider, 1.0).await?;

    let err = request_service::update_status(
        state,
        &auth(&other),
        id,
        to_status(RequestStatus::Accepted),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let stored = ServiceRequests::find_by_id(id)
        .one(&state.orm)
        .await?
        .expect("request");
    assert_eq!(stored.status, RequestStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn finished_requests_cannot_be_completed_again() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, profile) = create_provider(state, "pat@example.com", 100.0, true).await?;

    let done = completed_job(state, &customer, &provider).await?;
    let rejected = book(state, &customer, &provider, 1.0).await?;
    request_service::update_status(
        state,
        &auth(&provider),
        rejected,
        to_status(RequestStatus::Rejected),
    )
    .await?;

    let before = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(before.completed_jobs, 1);

    let finished = [
        (done, RequestStatus::Completed),
        (rejected, RequestStatus::Rejected),
    ];
    for (id, status) in finished {
        let err = request_service::complete_request(state, &auth(&provider), id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let stored = ServiceRequests::find_by_id(id)
            .one(&state.orm)
            .await?
            .expect("request");
        assert_eq!(stored.status, status);
    }

    let after = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(after.completed_jobs, before.completed_jobs);
    assert_eq!(after.total_jobs, before.total_jobs);
    assert_eq!(after.availability, before.availability);
    Ok(())
}

#[tokio::test]
async fn only_the_assigned_provider_can_complete() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, profile) = create_provider(state, "pat@example.com", 100.0, true).await?;
    let (other, other_profile) = create_provider(state, "oli@example.com", 100.0, true).await?;
    let id = book(state, &customer, &provider, 1.0).await?;
    request_service::update_status(state, &auth(&provider), id, to_status(RequestStatus::Accepted))
        .await?;

    let err = request_service::complete_request(state, &auth(&other), id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let stored = ServiceRequests::find_by_id(id)
        .one(&state.orm)
        .await?
        .expect("request");
    assert_eq!(stored.status, RequestStatus::Accepted);

    let assigned = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(assigned.completed_jobs, 0);
    assert_eq!(assigned.total_jobs, 0);
    assert_eq!(assigned.availability, Availability::Busy);

    let bystander = ServiceProviders::find_by_id(other_profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(bystander.completed_jobs, 0);
    assert_eq!(bystander.total_jobs, 0);
    assert_eq!(bystander.availability, Availability::Available);
    Ok(())
}

#[tokio::test]
async fn rating_averages_and_only_lands_once() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, profile) = create_provider(state, "pat@example.com", 100.0, true).await?;

    for rating in [5, 3, 4] {
        let id = completed_job(state, &customer, &provider).await?;
        request_service::rate_service(
            state,
            &auth(&customer),
            id,
            RateServiceRequest {
                rating,
                review: Some("ok".to_string()),
            },
        )
        .await?;
    }

    let rated = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(rated.rating, 4.0);
    assert_eq!(rated.completed_jobs, 3);
    assert_eq!(rated.total_jobs, 3);

    let id = completed_job(state, &customer, &provider).await?;
    let rate = |rating| RateServiceRequest {
        rating,
        review: None,
    };
    let err = request_service::rate_service(state, &auth(&customer), id, rate(9))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    request_service::rate_service(state, &auth(&customer), id, rate(2)).await?;
    let err = request_service::rate_service(state, &auth(&customer), id, rate(5))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let stored = ServiceRequests::find_by_id(id)
        .one(&state.orm)
        .await?
        .expect("request");
    assert_eq!(stored.customer_rating, Some(2));

    let rated = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(rated.rating, 3.5);
    assert_eq!(rated.total_jobs, 4);
    Ok(())
}

#[tokio::test]
async fn single_booking_round_trip_ends_with_that_rating() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, profile) = create_provider(state, "pat@example.com", 100.0, true).await?;

    let id = book(state, &customer, &provider, 2.0).await?;
    let err = request_service::rate_service(
        state,
        &auth(&customer),
        id,
        RateServiceRequest {
            rating: 5,
            review: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    request_service::update_status(state, &auth(&provider), id, to_status(RequestStatus::Accepted))
        .await?;
    request_service::complete_request(state, &auth(&provider), id).await?;
    request_service::rate_service(
        state,
        &auth(&customer),
        id,
        RateServiceRequest {
            rating: 5,
            review: Some("Great".to_string()),
        },
    )
    .await?;

    let after = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(after.rating, 5.0);
    assert_eq!(after.completed_jobs, 1);
    assert_eq!(after.total_jobs, 1);

    let rating_notes = Notifications::find()
        .filter(NotifCol::UserId.eq(provider.id))
        .filter(NotifCol::Kind.eq(NotificationKind::Rating))
        .count(&state.orm)
        .await?;
    assert_eq!(rating_notes, 1);
    Ok(())
}

#[tokio::test]
async fn request_detail_is_limited_to_parties_and_admins() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let stranger = create_user(state, UserRole::Customer, "Sam", "sam@example.com").await?;
    let admin = create_user(state, UserRole::Admin, "Ada", "ada@example.com").await?;
    let (provider, _) = create_provider(state, "pat@example.com", 100.0, true).await?;
    let id = book(state, &customer, &provider, 1.0).await?;

    let err = request_service::get_request(state, &auth(&stranger), id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    for viewer in [&customer, &provider, &admin] {
        let resp = request_service::get_request(state, &auth(viewer), id).await?;
        let detail = resp.data.expect("detail");
        assert_eq!(detail.request.id, id);
        assert_eq!(detail.customer.expect("customer").name, "Cara");
        assert_eq!(detail.provider.expect("provider").id, provider.id);
    }
    Ok(())
}

#[tokio::test]
async fn customer_cancellation_frees_the_provider() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, profile) = create_provider(state, "pat@example.com", 100.0, true).await?;
    let id = book(state, &customer, &provider, 1.0).await?;

    request_service::update_status(state, &auth(&provider), id, to_status(RequestStatus::Accepted))
        .await?;
    let resp = request_service::cancel_request(state, &auth(&customer), id).await?;
    assert_eq!(resp.data.expect("request").status, RequestStatus::Cancelled);

    let after = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert_eq!(after.availability, Availability::Available);

    let err = request_service::cancel_request(state, &auth(&customer), id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn lists_filter_by_status() -> anyhow::Result<()> {
    use servicehub_api::dto::services::RequestListQuery;

    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, _) = create_provider(state, "pat@example.com", 100.0, true).await?;
    completed_job(state, &customer, &provider).await?;
    book(state, &customer, &provider, 1.0).await?;

    let all = request_service::list_customer_requests(
        state,
        &auth(&customer),
        RequestListQuery::default(),
    )
    .await?;
    assert_eq!(all.data.expect("list").items.len(), 2);
    assert_eq!(all.meta.expect("meta").total, Some(2));

    let pending = request_service::list_provider_requests(
        state,
        &auth(&provider),
        RequestListQuery {
            status: Some("pending".to_string()),
            ..Default::default()
        },
    )
    .await?;
    let items = pending.data.expect("list").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].request.status, RequestStatus::Pending);
    Ok(())
}
