use crate::transport::http::handlers::common::json_400;
use crate::transport::http::types::{
    AddFieldRequest, ApiResponse, AppState, EditFieldRequest, RemoveFieldRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/employees/add-field/",
    request_body = AddFieldRequest,
    responses(
        (status = 201, description = "Field added", body = ApiResponse),
        (status = 400, description = "Invalid name or field type", body = ApiResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse),
        (status = 500, description = "Alteration failed", body = ApiResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn add_field_handler(
    State(state): State<AppState>,
    request: Result<Json<AddFieldRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e, "{\"field_name\", \"field_type\"}").into_response(),
    };

    let _schema_guard = state.schema_lock.write().await;

    match state
        .fields
        .add_column(&request.field_name, &request.field_type)
        .await
    {
        Ok(field_type) => (
            StatusCode::CREATED,
            Json(ApiResponse {
                success: true,
                data: Some(serde_json::json!({
                    "message": format!("Field '{}' added successfully", request.field_name.trim()),
                    "field_type": field_type.as_str()
                })),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/employees/edit-field/",
    request_body = EditFieldRequest,
    responses(
        (status = 200, description = "Field renamed", body = ApiResponse),
        (status = 400, description = "Invalid or missing names", body = ApiResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse),
        (status = 500, description = "Alteration failed", body = ApiResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn edit_field_handler(
    State(state): State<AppState>,
    request: Result<Json<EditFieldRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e, "{\"old_field_name\", \"new_field_name\"}").into_response(),
    };

    let _schema_guard = state.schema_lock.write().await;

    match state
        .fields
        .rename_column(&request.old_field_name, &request.new_field_name)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(serde_json::json!({
                    "message": format!(
                        "Field '{}' renamed to '{}' successfully",
                        request.old_field_name.trim(),
                        request.new_field_name.trim()
                    )
                })),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/employees/add-field/",
    request_body = RemoveFieldRequest,
    responses(
        (status = 200, description = "Field removed", body = ApiResponse),
        (status = 400, description = "Invalid name", body = ApiResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse),
        (status = 404, description = "No such column", body = ApiResponse),
        (status = 500, description = "Alteration failed", body = ApiResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn remove_field_handler(
    State(state): State<AppState>,
    request: Result<Json<RemoveFieldRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e, "{\"field_name\"}").into_response(),
    };

    let _schema_guard = state.schema_lock.write().await;

    match state.fields.remove_column(&request.field_name).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(serde_json::json!({
                    "message": format!("Field '{}' deleted successfully", request.field_name.trim())
                })),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
