//! # kidtrack-database
//!
//! PostgreSQL connection management, the store trait seam, repository
//! implementations, and embedded migrations for KidTrack.
//!
//! Services depend on the traits in [`store`]; the sqlx-backed
//! implementations live in [`repositories`]. The `memory` feature adds an
//! in-memory store for service-level tests.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{ActivityStore, ChildStore, InvitationStore, ShareStore, UserStore};
