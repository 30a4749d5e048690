/// Whether the output window covers the monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FullscreenState {
    #[default]
    Windowed,
    Fullscreen,
}

/// Platform capability to enter and leave fullscreen.
pub trait FullscreenBackend {
    fn request_fullscreen(&mut self);
    fn exit_fullscreen(&mut self);
}

/// Two-state fullscreen switch driven by double clicks or a key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullscreenToggle {
    state: FullscreenState,
}

impl FullscreenToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FullscreenState {
        self.state
    }

    pub fn toggle(&mut self, backend: &mut impl FullscreenBackend) -> FullscreenState {
        self.state = match self.state {
            FullscreenState::Windowed => {
                backend.request_fullscreen();
                FullscreenState::Fullscreen
            }
            FullscreenState::Fullscreen => {
                backend.exit_fullscreen();
                FullscreenState::Windowed
            }
        };
        tracing::debug!(state = ?self.state, "fullscreen toggled");
        self.state
    }

    /// Adopt the platform's actual state, for exits the platform performs on
    /// its own.
    pub fn sync(&mut self, actual_fullscreen: bool) {
        let actual = if actual_fullscreen {
            FullscreenState::Fullscreen
        } else {
            FullscreenState::Windowed
        };
        if actual != self.state {
            tracing::debug!(from = ?self.state, to = ?actual, "fullscreen state resynced");
            self.state = actual;
        }
    }
}
