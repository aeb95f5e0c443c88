//! Axum HTTP server for the stillcast converter.
//!
//! This crate provides:
//! - The submission form and the `/convert` upload endpoint
//! - Flash-message plumbing via signed cookies
//! - The request-owned conversion flow with guaranteed workspace cleanup

pub mod config;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
