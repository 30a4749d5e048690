use glam::Vec2;

/// A high-level action produced from raw input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Orbit the camera by a pointer delta in logical pixels.
    Orbit(Vec2),
    /// Pan the camera by a pointer delta in logical pixels.
    Pan(Vec2),
    /// Dolly the camera; positive is towards the target.
    Zoom(f32),
    ToggleFullscreen,
    /// Re-place the donut field with a fresh seed.
    Regenerate,
    /// Show or hide the debug overlay.
    ToggleOverlay,
}

/// Keys the host binds to actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    F1,
    F11,
    R,
}

impl Action {
    pub fn for_key(key: Key) -> Self {
        match key {
            Key::F1 => Self::ToggleOverlay,
            Key::F11 => Self::ToggleFullscreen,
            Key::R => Self::Regenerate,
        }
    }
}
