//! Scheduled job implementations.

pub mod cleanup;

pub use cleanup::ExpirySweep;
