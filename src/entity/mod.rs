pub mod audit_logs;
pub mod notifications;
pub mod service_providers;
pub mod service_requests;
pub mod types;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use notifications::Entity as Notifications;
pub use service_providers::Entity as ServiceProviders;
pub use service_requests::Entity as ServiceRequests;
pub use users::Entity as Users;
