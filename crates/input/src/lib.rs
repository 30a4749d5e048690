//! Input: raw pointer and key events mapped to high-level actions.
//!
//! # Invariants
//! - The host consumes [`Action`]s, never raw input events.
//! - Nothing here depends on a windowing library; hosts translate their
//!   events into these calls.

pub mod action;
pub mod double_click;
pub mod fullscreen;
pub mod pointer;

pub use action::{Action, Key};
pub use double_click::DoubleClickDetector;
pub use fullscreen::{FullscreenBackend, FullscreenState, FullscreenToggle};
pub use pointer::{PointerButton, PointerTracker};
