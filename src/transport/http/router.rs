use crate::transport::http::handlers::{auth, employees, fields, health};
use crate::transport::http::middleware::require_auth;
use crate::transport::http::types::{
    AddFieldRequest, ApiResponse, AppState, EditFieldRequest, EmployeeListResponse, LoginRequest,
    RemoveFieldRequest, SignupRequest, TokenResponse,
};
use axum::routing::{get, post, put};
use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        employees::list_employees_handler,
        employees::create_employee_handler,
        employees::retrieve_employee_handler,
        employees::update_employee_handler,
        employees::delete_employee_handler,
        fields::add_field_handler,
        fields::edit_field_handler,
        fields::remove_field_handler,
        auth::signup_handler,
        auth::login_handler
    ),
    components(schemas(
        ApiResponse,
        EmployeeListResponse,
        AddFieldRequest,
        EditFieldRequest,
        RemoveFieldRequest,
        SignupRequest,
        LoginRequest,
        TokenResponse,
        crate::domain::schema::FieldType
    )),
    modifiers(&SecurityAddon)
)]
#[allow(dead_code)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn create_router(app_state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/employees/",
            get(employees::list_employees_handler).post(employees::create_employee_handler),
        )
        .route(
            "/employees/:id/",
            get(employees::retrieve_employee_handler)
                .put(employees::update_employee_handler)
                .delete(employees::delete_employee_handler),
        )
        .route(
            "/employees/add-field/",
            post(fields::add_field_handler).delete(fields::remove_field_handler),
        )
        .route("/employees/edit-field/", put(fields::edit_field_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/signup/", post(auth::signup_handler))
        .route("/login/", post(auth::login_handler))
        .merge(protected)
        .with_state(app_state)
}
