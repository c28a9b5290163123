//! # kidtrack-worker
//!
//! Cron-driven maintenance for KidTrack. Expiry of shares and invitations
//! is evaluated live at every decision point; these sweeps exist so stored
//! state converges even for rows nobody touches.

pub mod jobs;
pub mod scheduler;

pub use scheduler::MaintenanceScheduler;
