//! Bearer-token guard for the employee and field routes.

use crate::app::error::ServiceError;
use crate::auth::jwt;
use crate::transport::http::types::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::Auth("missing bearer token".to_string()))?;

    let token = jwt::bearer_token(header).ok_or_else(|| {
        ServiceError::Auth("invalid authorization header (expected 'Bearer <token>')".to_string())
    })?;

    let claims = jwt::validate(token, &state.jwt_secret)
        .map_err(|e| ServiceError::Auth(format!("invalid token: {}", e)))?;

    // Handlers can pick the caller up from request extensions.
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
