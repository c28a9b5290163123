//! Share relationships and per-child permission profiles.

pub mod model;
pub mod profile;
pub mod view;

pub use model::{PermissionLevel, ShareConfiguration, ShareRelationship};
pub use profile::{ActivityShareProfile, ChildPermissions, ProfileSpec};
pub use view::{ShareWithProfiles, SharedChildView};
