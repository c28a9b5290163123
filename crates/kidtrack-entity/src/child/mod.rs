//! Child profile entity.

pub mod model;

pub use model::Child;
