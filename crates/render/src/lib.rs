//! Rendering adapter: viewport sizing policy, frame scheduling, and a
//! renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - [`ViewportState::pixel_ratio`] never exceeds the adapter's cap.
//! - A viewport with zero height is rejected, never turned into an
//!   infinite or NaN aspect ratio.
//!
//! The wgpu backend lives in its own crate; [`DebugTextRenderer`] renders the
//! same inputs to text for logs and tests.

mod frame;
mod renderer;
mod viewport;

pub use frame::{FrameLoop, FrameScheduler, FrameTick, ManualScheduler, MAX_FRAME_DELTA};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use viewport::{ViewportAdapter, ViewportError, ViewportState, DEFAULT_PIXEL_RATIO_CAP};
