//! Unified calendar projection.

pub mod service;

#[cfg(test)]
mod tests;

pub use service::{CalendarEntry, CalendarService};
