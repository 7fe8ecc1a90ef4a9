//! The policy/view event-sourcing engine.

pub mod policies;
pub mod views;

pub use policies::{FixpointOutcome, PolicyEngine};
pub use views::ViewStore;
