//! The invitation workflow.

pub mod service;
pub mod token;

#[cfg(test)]
mod tests;

pub use service::{CreateInvitationRequest, InvitationAcceptance, InvitationService};
