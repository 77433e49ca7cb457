mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use common::{auth, create_provider, create_user, setup};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use servicehub_api::{
    dto::{
        admin::{ApproveProviderRequest, UpdateUserStatusRequest, UserListQuery},
        services::{CreateServiceRequest, UpdateStatusRequest},
    },
    entity::{
        AuditLogs, Notifications, ServiceProviders, ServiceRequests, Users,
        notifications::Column as NotifCol,
        service_requests::Column as ReqCol,
        types::{AccountStatus, NotificationKind, RequestStatus, UserRole},
    },
    app::build_app,
    error::AppError,
    middleware::auth::load_account,
    services::{admin_service, auth_service::issue_token, request_service},
};
use tower::ServiceExt;

#[tokio::test]
async fn rejecting_a_provider_deactivates_and_notifies_once() -> anyhow::Result<()> {
    let mut ctx = setup().await?;
    let state = &ctx.state;
    let admin = create_user(state, UserRole::Admin, "Ada", "ada@example.com").await?;
    let (owner, profile) = create_provider(state, "pat@example.com", 120.0, false).await?;

    let resp = admin_service::approve_provider(
        state,
        &auth(&admin),
        profile.id,
        ApproveProviderRequest {
            is_approved: false,
            reason: Some("Missing licence".to_string()),
        },
    )
    .await?;
    let data = resp.data.expect("provider");
    assert!(!data.provider.is_approved);
    assert_eq!(data.provider.admin_notes.len(), 1);
    assert_eq!(data.provider.admin_notes[0].note, "Missing licence");

    let user = Users::find_by_id(owner.id)
        .one(&state.orm)
        .await?
        .expect("user");
    assert!(!user.is_active);
    assert_eq!(user.status, AccountStatus::Rejected);

    let notes = Notifications::find()
        .filter(NotifCol::UserId.eq(owner.id))
        .all(&state.orm)
        .await?;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::System);
    assert_eq!(notes[0].title, "Provider Application Rejected");
    assert!(notes[0].message.contains("Reason: Missing licence"));

    let email = ctx.outbox.try_recv().expect("approval email queued");
    assert_eq!(email.to, "pat@example.com");
    assert!(email.body.contains("/provider/profile"));
    assert!(ctx.outbox.try_recv().is_err());

    assert_eq!(AuditLogs::find().count(&ctx.state.orm).await?, 1);
    Ok(())
}

#[tokio::test]
async fn approval_makes_the_provider_bookable() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let admin = create_user(state, UserRole::Admin, "Ada", "ada@example.com").await?;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (owner, profile) = create_provider(state, "pat@example.com", 120.0, false).await?;

    let pending = admin_service::pending_providers(state, &auth(&admin)).await?;
    assert_eq!(pending.data.expect("list").items.len(), 1);

    admin_service::approve_provider(
        state,
        &auth(&admin),
        profile.id,
        ApproveProviderRequest {
            is_approved: true,
            reason: None,
        },
    )
    .await?;

    let stored = ServiceProviders::find_by_id(profile.id)
        .one(&state.orm)
        .await?
        .expect("profile");
    assert!(stored.is_approved);
    assert!(stored.approved_at.is_some());

    let user = Users::find_by_id(owner.id)
        .one(&state.orm)
        .await?
        .expect("user");
    assert!(user.is_active);
    assert_eq!(user.status, AccountStatus::Active);

    let resp = request_service::create_request(
        state,
        &auth(&customer),
        CreateServiceRequest {
            provider_id: owner.id,
            service_type: "plumbing".to_string(),
            description: "Leak".to_string(),
            scheduled_date: Utc::now() + Duration::days(2),
            address: "1 Main St".to_string(),
            estimated_hours: 2.0,
        },
    )
    .await?;
    assert_eq!(resp.data.expect("request").total_price, 240.0);
    Ok(())
}

#[tokio::test]
async fn non_admins_are_forbidden() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (_, profile) = create_provider(state, "pat@example.com", 120.0, false).await?;

    let err = admin_service::approve_provider(
        state,
        &auth(&customer),
        profile.id,
        ApproveProviderRequest {
            is_approved: true,
            reason: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = admin_service::dashboard_stats(state, &auth(&customer))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    Ok(())
}

#[tokio::test]
async fn deleting_a_provider_removes_owned_data() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let admin = create_user(state, UserRole::Admin, "Ada", "ada@example.com").await?;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (owner, profile) = create_provider(state, "pat@example.com", 100.0, true).await?;

    request_service::create_request(
        state,
        &auth(&customer),
        CreateServiceRequest {
            provider_id: owner.id,
            service_type: "plumbing".to_string(),
            description: "Leak".to_string(),
            scheduled_date: Utc::now(),
            address: "1 Main St".to_string(),
            estimated_hours: 1.0,
        },
    )
    .await?;

    let err = admin_service::delete_user(state, &auth(&admin), admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    admin_service::delete_user(state, &auth(&admin), owner.id).await?;

    assert!(Users::find_by_id(owner.id).one(&state.orm).await?.is_none());
    assert!(
        ServiceProviders::find_by_id(profile.id)
            .one(&state.orm)
            .await?
            .is_none()
    );
    assert_eq!(
        ServiceRequests::find()
            .filter(ReqCol::ProviderId.eq(owner.id))
            .count(&state.orm)
            .await?,
        0
    );
    assert_eq!(
        Notifications::find()
            .filter(NotifCol::UserId.eq(owner.id))
            .count(&state.orm)
            .await?,
        0
    );
    assert!(Users::find_by_id(customer.id).one(&state.orm).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn deactivation_blocks_the_account_and_notifies() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let admin = create_user(state, UserRole::Admin, "Ada", "ada@example.com").await?;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (provider, _) = create_provider(state, "pat@example.com", 100.0, true).await?;
    let token = issue_token(&state.config, &customer)?;

    let resp = admin_service::update_user_status(
        state,
        &auth(&admin),
        customer.id,
        UpdateUserStatusRequest {
            is_active: false,
            reason: None,
        },
    )
    .await?;
    assert!(!resp.data.expect("user").is_active);

    let notes = Notifications::find()
        .filter(NotifCol::UserId.eq(customer.id))
        .all(&state.orm)
        .await?;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Account Deactivated");

    let inactive = admin_service::list_users(
        state,
        &auth(&admin),
        UserListQuery {
            status: Some("inactive".to_string()),
            ..Default::default()
        },
    )
    .await?;
    let items = inactive.data.expect("users").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].user.id, customer.id);

    let booking = serde_json::json!({
        "providerId": provider.id,
        "serviceType": "plumbing",
        "description": "Leak",
        "scheduledDate": "2030-01-01T10:00:00Z",
        "address": "1 Main St",
        "estimatedHours": 2
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/services/request")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(booking.to_string()))?;
    let response = build_app(state.clone()).oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
    assert_eq!(body["error"], "Account is deactivated");

    let booked = ServiceRequests::find()
        .filter(ReqCol::CustomerId.eq(customer.id))
        .count(&state.orm)
        .await?;
    assert_eq!(booked, 0);
    Ok(())
}

#[tokio::test]
async fn tokens_of_deleted_users_are_refused() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let admin = create_user(state, UserRole::Admin, "Ada", "ada@example.com").await?;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let claims = auth(&customer);

    let still_valid = load_account(&state.orm, claims.clone()).await?;
    assert_eq!(still_valid.user_id, customer.id);
    assert_eq!(still_valid.role, UserRole::Customer);

    admin_service::delete_user(state, &auth(&admin), customer.id).await?;

    let err = load_account(&state.orm, claims).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    Ok(())
}

#[tokio::test]
async fn dashboard_counts_revenue_from_completed_work() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let state = &ctx.state;
    let admin = create_user(state, UserRole::Admin, "Ada", "ada@example.com").await?;
    let customer = create_user(state, UserRole::Customer, "Cara", "cara@example.com").await?;
    let (owner, _) = create_provider(state, "pat@example.com", 50.0, true).await?;

    let booking = |hours| CreateServiceRequest {
        provider_id: owner.id,
        service_type: "plumbing".to_string(),
        description: "Leak".to_string(),
        scheduled_date: Utc::now(),
        address: "1 Main St".to_string(),
        estimated_hours: hours,
    };
    let done = request_service::create_request(state, &auth(&customer), booking(4.0))
        .await?
        .data
        .expect("request")
        .id;
    request_service::create_request(state, &auth(&customer), booking(1.0)).await?;
    request_service::update_status(
        state,
        &auth(&owner),
        done,
        UpdateStatusRequest {
            status: RequestStatus::Accepted,
            provider_notes: Some("On my way".to_string()),
        },
    )
    .await?;
    request_service::complete_request(state, &auth(&owner), done).await?;

    let stats = admin_service::dashboard_stats(state, &auth(&admin))
        .await?
        .data
        .expect("stats");
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.total_customers, 1);
    assert_eq!(stats.total_providers, 1);
    assert_eq!(stats.approved_providers, 1);
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.pending_requests, 1);
    assert_eq!(stats.completed_requests, 1);
    assert_eq!(stats.total_revenue, 200.0);
    assert_eq!(stats.recent_requests.len(), 2);

    let detail = admin_service::get_user_detail(state, &auth(&admin), owner.id)
        .await?
        .data
        .expect("detail");
    let provider_stats = detail.stats.expect("stats");
    assert_eq!(provider_stats.total_bookings, 2);
    assert_eq!(provider_stats.completed_bookings, 1);
    assert_eq!(provider_stats.total_earnings, Some(200.0));
    Ok(())
}
