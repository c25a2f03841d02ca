pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod auth;
    pub mod common;
    pub mod employees;
    pub mod fields;
    pub mod health;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
