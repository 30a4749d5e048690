//! Shared types for the donutfield workspace.

mod types;

pub use types::{NodeId, Transform};
