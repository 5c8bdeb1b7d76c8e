pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod models;
pub mod parser;
pub mod password;
pub mod resource;
pub mod schema;
pub mod startup;
pub mod utils;

// Re-export commonly used types for easier access
pub use error::{AppError, AppResult};
pub use startup::{build_router, setup_backend, AppState};
