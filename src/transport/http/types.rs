use crate::app::auth_service::AuthService;
use crate::app::employee_service::EmployeeService;
use crate::app::field_service::FieldService;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<EmployeeService>,
    pub fields: Arc<FieldService>,
    pub auth: Arc<AuthService>,
    /// Guards the employee table's structure: record operations take the
    /// read half, schema mutations the write half, so a statement is never
    /// built against a column set mutating mid-operation.
    pub schema_lock: Arc<RwLock<()>>,
    pub jwt_secret: Arc<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response shape of list/search: parallel `columns` and `column_types`
/// sequences plus one name-to-value mapping per record.
#[derive(Serialize, Debug, ToSchema)]
pub struct EmployeeListResponse {
    pub columns: Vec<String>,
    pub column_types: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<JsonValue>,
}

#[derive(Deserialize, Debug)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct AddFieldRequest {
    pub field_name: String,
    pub field_type: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct EditFieldRequest {
    pub old_field_name: String,
    pub new_field_name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RemoveFieldRequest {
    pub field_name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
}
