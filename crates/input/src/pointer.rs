use glam::Vec2;
use std::time::Instant;

use crate::action::Action;
use crate::double_click::DoubleClickDetector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns pointer events into camera and fullscreen actions.
///
/// Primary drag orbits, secondary drag pans, the wheel zooms, and a primary
/// double click toggles fullscreen. Positions are logical pixels.
#[derive(Debug, Default)]
pub struct PointerTracker {
    position: Option<Vec2>,
    held: Option<PointerButton>,
    double_click: DoubleClickDetector,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn press(&mut self, button: PointerButton, at: Instant) -> Option<Action> {
        if self.held.is_none() {
            self.held = Some(button);
        }
        let position = self.position?;
        (button == PointerButton::Primary && self.double_click.press(at, position))
            .then_some(Action::ToggleFullscreen)
    }

    pub fn release(&mut self, button: PointerButton) {
        if self.held == Some(button) {
            self.held = None;
        }
    }

    pub fn moved(&mut self, position: Vec2) -> Option<Action> {
        let previous = self.position.replace(position)?;
        let delta = position - previous;
        if delta == Vec2::ZERO {
            return None;
        }
        match self.held? {
            PointerButton::Primary => Some(Action::Orbit(delta)),
            PointerButton::Secondary | PointerButton::Middle => Some(Action::Pan(delta)),
        }
    }

    /// Wheel input in lines; positive scrolls up.
    pub fn scroll(&mut self, lines: f32) -> Option<Action> {
        (lines != 0.0 && lines.is_finite()).then_some(Action::Zoom(lines))
    }

    /// Pointer left the window: drop drag state.
    pub fn left(&mut self) {
        self.position = None;
        self.held = None;
        self.double_click.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn primary_drag_orbits() {
        let mut p = PointerTracker::new();
        assert_eq!(p.moved(Vec2::new(10.0, 10.0)), None);
        p.press(PointerButton::Primary, Instant::now());
        assert_eq!(p.moved(Vec2::new(13.0, 8.0)), Some(Action::Orbit(Vec2::new(3.0, -2.0))));
        p.release(PointerButton::Primary);
        assert_eq!(p.moved(Vec2::new(20.0, 8.0)), None);
    }

    #[test]
    fn secondary_drag_pans() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::ZERO);
        p.press(PointerButton::Secondary, Instant::now());
        assert_eq!(p.moved(Vec2::new(0.0, 5.0)), Some(Action::Pan(Vec2::new(0.0, 5.0))));
    }

    #[test]
    fn second_button_does_not_change_drag_mode() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::ZERO);
        let now = Instant::now();
        p.press(PointerButton::Primary, now);
        p.press(PointerButton::Secondary, now);
        p.release(PointerButton::Secondary);
        assert!(matches!(p.moved(Vec2::ONE), Some(Action::Orbit(_))));
    }

    #[test]
    fn double_click_toggles_fullscreen() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::new(50.0, 50.0));
        let t0 = Instant::now();
        assert_eq!(p.press(PointerButton::Primary, t0), None);
        p.release(PointerButton::Primary);
        assert_eq!(
            p.press(PointerButton::Primary, t0 + Duration::from_millis(150)),
            Some(Action::ToggleFullscreen)
        );
    }

    #[test]
    fn secondary_double_click_is_ignored() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::ZERO);
        let t0 = Instant::now();
        p.press(PointerButton::Secondary, t0);
        p.release(PointerButton::Secondary);
        assert_eq!(p.press(PointerButton::Secondary, t0 + Duration::from_millis(100)), None);
    }

    #[test]
    fn scroll_zooms() {
        let mut p = PointerTracker::new();
        assert_eq!(p.scroll(1.5), Some(Action::Zoom(1.5)));
        assert_eq!(p.scroll(0.0), None);
    }

    #[test]
    fn leaving_clears_drag() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::ZERO);
        p.press(PointerButton::Primary, Instant::now());
        p.left();
        assert_eq!(p.moved(Vec2::ONE), None);
        assert_eq!(p.position(), Some(Vec2::ONE));
    }
}
