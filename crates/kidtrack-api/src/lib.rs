//! # kidtrack-api
//!
//! Axum HTTP surface for the sharing core. The wire protocol is a thin
//! mapping over the service layer: DTO validation, token verification, and
//! error-kind → status-code translation live here; all semantics live in
//! `kidtrack-service`.

pub mod auth;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
