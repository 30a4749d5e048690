use std::cell::Cell;
use std::time::{Duration, Instant};

/// Longest frame delta handed to animation code. Longer gaps (a dragged
/// window, a breakpoint) are clamped so damping does not jump.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Something that can be asked for one more frame.
pub trait FrameScheduler {
    fn request_next_frame(&self);
}

/// Scheduler that only counts requests. Drives the frame loop in tests and
/// headless runs.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    requests: Cell<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.requests.get()
    }

    /// Consume one pending request. Returns `false` when none is pending.
    pub fn take(&self) -> bool {
        let pending = self.requests.get();
        if pending == 0 {
            return false;
        }
        self.requests.set(pending - 1);
        true
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_next_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

/// Timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub index: u64,
    /// Time since the first frame.
    pub elapsed: Duration,
    /// Time since the previous frame, at most [`MAX_FRAME_DELTA`].
    pub delta: Duration,
}

/// Continuous render loop bookkeeping.
///
/// Every `tick` re-arms the scheduler, so the loop keeps running for as long
/// as the host delivers the requested frames.
#[derive(Debug, Default)]
pub struct FrameLoop {
    started: Option<Instant>,
    last: Option<Instant>,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a frame at `now` and request the next one.
    pub fn tick(&mut self, now: Instant, scheduler: &impl FrameScheduler) -> FrameTick {
        let started = *self.started.get_or_insert(now);
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last).min(MAX_FRAME_DELTA))
            .unwrap_or_default();
        self.last = Some(now);

        let tick = FrameTick {
            index: self.frames,
            elapsed: now.saturating_duration_since(started),
            delta,
        };
        self.frames += 1;
        tracing::trace!(index = tick.index, delta_ms = delta.as_secs_f64() * 1000.0, "frame");
        scheduler.request_next_frame();
        tick
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
