pub mod app;
pub mod auth;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::auth_service::AuthService;
pub use app::employee_service::EmployeeService;
pub use app::error::ServiceError;
pub use app::field_service::FieldService;
pub use domain::schema::{ColumnDescriptor, FieldType, SchemaRegistry};
pub use storage::attachments::AttachmentStore;
