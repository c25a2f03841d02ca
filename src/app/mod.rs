pub mod auth_service;
pub mod employee_service;
pub mod error;
pub mod field_service;
