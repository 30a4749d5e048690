use glam::Vec2;
use std::time::{Duration, Instant};

/// Detects two primary presses close together in time and space.
#[derive(Debug, Clone)]
pub struct DoubleClickDetector {
    pub window: Duration,
    /// Maximum pointer travel between the presses, in logical pixels.
    pub max_distance: f32,
    last: Option<(Instant, Vec2)>,
}

impl Default for DoubleClickDetector {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 4.0)
    }
}

impl DoubleClickDetector {
    pub fn new(window: Duration, max_distance: f32) -> Self {
        Self {
            window,
            max_distance,
            last: None,
        }
    }

    /// Record a press. Returns `true` when it completes a double click.
    ///
    /// A completed double click is consumed, so a third press starts over.
    pub fn press(&mut self, at: Instant, position: Vec2) -> bool {
        if let Some((prev_at, prev_pos)) = self.last.take() {
            let close_in_time = at.saturating_duration_since(prev_at) <= self.window;
            if close_in_time && prev_pos.distance(position) <= self.max_distance {
                return true;
            }
        }
        self.last = Some((at, position));
        false
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn two_quick_presses_fire() {
        let mut d = DoubleClickDetector::default();
        let t0 = Instant::now();
        assert!(!d.press(t0, Vec2::new(10.0, 10.0)));
        assert!(d.press(t0 + ms(200), Vec2::new(12.0, 11.0)));
    }

    #[test]
    fn slow_presses_do_not_fire() {
        let mut d = DoubleClickDetector::default();
        let t0 = Instant::now();
        assert!(!d.press(t0, Vec2::ZERO));
        assert!(!d.press(t0 + ms(501), Vec2::ZERO));
        // The slow press becomes the new first click.
        assert!(d.press(t0 + ms(700), Vec2::ZERO));
    }

    #[test]
    fn distant_presses_do_not_fire() {
        let mut d = DoubleClickDetector::default();
        let t0 = Instant::now();
        assert!(!d.press(t0, Vec2::ZERO));
        assert!(!d.press(t0 + ms(100), Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn third_press_starts_over() {
        let mut d = DoubleClickDetector::default();
        let t0 = Instant::now();
        d.press(t0, Vec2::ZERO);
        assert!(d.press(t0 + ms(100), Vec2::ZERO));
        assert!(!d.press(t0 + ms(200), Vec2::ZERO));
    }

    #[test]
    fn reset_forgets_first_press() {
        let mut d = DoubleClickDetector::default();
        let t0 = Instant::now();
        d.press(t0, Vec2::ZERO);
        d.reset();
        assert!(!d.press(t0 + ms(100), Vec2::ZERO));
    }
}
