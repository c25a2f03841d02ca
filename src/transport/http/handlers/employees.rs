use crate::transport::http::extract::parse_record_payload;
use crate::transport::http::types::{ApiResponse, AppState, EmployeeListResponse, ListQuery};
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/employees/",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive substring match on name")
    ),
    responses(
        (status = 200, description = "Employee listing", body = EmployeeListResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn list_employees_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let _schema_guard = state.schema_lock.read().await;

    let search = query.search.as_deref().filter(|s| !s.is_empty());
    match state.employees.list(search).await {
        Ok(listing) => (
            StatusCode::OK,
            Json(EmployeeListResponse {
                columns: listing.columns,
                column_types: listing.column_types,
                data: listing.data,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/employees/",
    responses(
        (status = 201, description = "Employee created", body = ApiResponse),
        (status = 400, description = "No valid data provided", body = ApiResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse),
        (status = 500, description = "Insert or file storage failed", body = ApiResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn create_employee_handler(
    State(state): State<AppState>,
    request: Request,
) -> impl IntoResponse {
    let payload = match parse_record_payload(request).await {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };

    let _schema_guard = state.schema_lock.read().await;

    match state.employees.create(payload.fields, payload.files).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(ApiResponse {
                success: true,
                data: Some(serde_json::json!({ "id": id })),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/employees/{id}/",
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "The full record as a mapping"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse),
        (status = 404, description = "Employee not found", body = ApiResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn retrieve_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let _schema_guard = state.schema_lock.read().await;

    match state.employees.retrieve(id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/employees/{id}/",
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee updated", body = ApiResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse),
        (status = 404, description = "Employee not found", body = ApiResponse),
        (status = 500, description = "Update or file storage failed", body = ApiResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn update_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    request: Request,
) -> impl IntoResponse {
    let payload = match parse_record_payload(request).await {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };

    let _schema_guard = state.schema_lock.read().await;

    match state.employees.update(id, payload.fields, payload.files).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(serde_json::json!({ "message": "Employee updated successfully" })),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/employees/{id}/",
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted", body = ApiResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse),
        (status = 404, description = "Employee not found", body = ApiResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let _schema_guard = state.schema_lock.read().await;

    match state.employees.delete(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(serde_json::json!({ "message": "Employee deleted successfully" })),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
