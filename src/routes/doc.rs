use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{
            AdminUserDetail, AdminUserList, AdminUserRow, ApproveProviderRequest, DashboardStats,
            PendingProviderList, UpdateUserStatusRequest, UserListQuery, UserStats,
        },
        auth::{AuthResponse, LoginRequest, MeResponse, RegisterRequest},
        notifications::{MarkedCount, NotificationList, NotificationQuery},
        providers::{ProviderDetail, ProviderList, ProviderQuery, ProviderStats},
        services::{
            CreateServiceRequest, RateServiceRequest, RequestList, RequestListQuery,
            UpdateStatusRequest,
        },
        users::{UpdateProfileRequest, UpdateProviderProfileRequest},
    },
    entity::types::{
        AccountStatus, AdminNote, Availability, NotificationKind, Profession, RequestStatus,
        UserRole,
    },
    models::{
        Address, Notification, Party, Provider, ProviderWithUser, RequestWithParties, Review,
        ServiceRequest, User,
    },
    response::{ApiResponse, ErrorBody, Meta},
    routes::{admin, auth, health, notifications, params, providers, services, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        providers::list_approved,
        providers::get_provider,
        providers::dashboard_stats,
        services::create_request,
        services::customer_requests,
        services::provider_requests,
        services::get_request,
        services::update_status,
        services::complete_request,
        services::rate_service,
        services::cancel_request,
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::delete_notification,
        users::get_user,
        users::update_profile,
        users::update_provider_profile,
        admin::dashboard_stats,
        admin::pending_providers,
        admin::approve_provider,
        admin::list_requests,
        admin::list_users,
        admin::get_user,
        admin::update_user_status,
        admin::delete_user
    ),
    components(
        schemas(
            UserRole,
            AccountStatus,
            Profession,
            Availability,
            RequestStatus,
            NotificationKind,
            AdminNote,
            Address,
            User,
            Provider,
            ProviderWithUser,
            ServiceRequest,
            Party,
            RequestWithParties,
            Notification,
            Review,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            MeResponse,
            ProviderQuery,
            ProviderList,
            ProviderDetail,
            ProviderStats,
            CreateServiceRequest,
            UpdateStatusRequest,
            RateServiceRequest,
            RequestListQuery,
            NotificationQuery,
            NotificationList,
            MarkedCount,
            UpdateProfileRequest,
            UpdateProviderProfileRequest,
            ApproveProviderRequest,
            UpdateUserStatusRequest,
            UserListQuery,
            DashboardStats,
            PendingProviderList,
            RequestList,
            AdminUserRow,
            AdminUserList,
            UserStats,
            AdminUserDetail,
            params::Pagination,
            Meta,
            ErrorBody,
            ApiResponse<AuthResponse>,
            ApiResponse<ServiceRequest>,
            ApiResponse<RequestWithParties>,
            ApiResponse<ProviderList>,
            ApiResponse<DashboardStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and current user"),
        (name = "Providers", description = "Provider discovery and dashboard"),
        (name = "Services", description = "Service request lifecycle"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Users", description = "Profile endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
