//! # kidtrack-core
//!
//! Core crate for KidTrack. Contains configuration schemas, typed
//! identifiers, domain events, the audit and notification ports,
//! pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other KidTrack crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
