use crate::transport::http::handlers::common::json_400;
use crate::transport::http::types::{
    ApiResponse, AppState, LoginRequest, SignupRequest, TokenResponse,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/signup/",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse),
        (status = 400, description = "Invalid username or password", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    request: Result<Json<SignupRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e, "{\"username\", \"password\"}").into_response(),
    };

    match state.auth.signup(&request.username, &request.password).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(ApiResponse {
                success: true,
                data: Some(serde_json::json!({ "message": "User created successfully" })),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn login_handler(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e, "{\"username\", \"password\"}").into_response(),
    };

    match state.auth.login(&request.username, &request.password).await {
        Ok(access_token) => (StatusCode::OK, Json(TokenResponse { access_token })).into_response(),
        Err(e) => e.into_response(),
    }
}
