// ============================================================================
// input.rs - driftfield
// Latest-value pointer tracking in normalized device coordinates.
// ============================================================================

use glam::Vec2;

use crate::config::Viewport;

/// Single-slot pointer cell. Only the most recent position before a frame
/// matters, so writes overwrite and the frame reads once.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    latest: Vec2,
}

impl PointerState {
    /// Record a cursor position given in physical pixels. Returns `false` and
    /// leaves the state untouched for malformed input.
    pub fn record(&mut self, x: f64, y: f64, viewport: &Viewport) -> bool {
        match normalize(x, y, viewport) {
            Some(p) => {
                self.latest = p;
                true
            }
            None => false,
        }
    }

    pub fn latest(&self) -> Vec2 {
        self.latest
    }
}

/// Map a physical cursor position to [-1, 1] on each axis, y pointing up.
/// Positions outside the viewport map outside that range and are kept.
pub fn normalize(x: f64, y: f64, viewport: &Viewport) -> Option<Vec2> {
    if viewport.is_empty() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    let nx = (x / viewport.width as f64) * 2.0 - 1.0;
    let ny = -(y / viewport.height as f64) * 2.0 + 1.0;
    Some(Vec2::new(nx as f32, ny as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_centre() {
        let vp = Viewport::new(800, 600, 1.0);
        assert_eq!(normalize(0.0, 0.0, &vp), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(normalize(800.0, 600.0, &vp), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(normalize(400.0, 300.0, &vp), Some(Vec2::ZERO));
    }

    #[test]
    fn outside_viewport_is_not_clamped() {
        let vp = Viewport::new(800, 600, 1.0);
        let p = normalize(1200.0, -300.0, &vp).unwrap();
        assert_eq!(p, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn malformed_events_are_ignored() {
        let mut pointer = PointerState::default();
        let vp = Viewport::new(800, 600, 1.0);
        assert!(pointer.record(600.0, 150.0, &vp));
        let kept = pointer.latest();

        assert!(!pointer.record(f64::NAN, 10.0, &vp));
        assert!(!pointer.record(10.0, f64::INFINITY, &vp));
        assert!(!pointer.record(10.0, 10.0, &Viewport::new(0, 600, 1.0)));
        assert_eq!(pointer.latest(), kept);
    }

    #[test]
    fn latest_write_wins() {
        let mut pointer = PointerState::default();
        let vp = Viewport::new(100, 100, 1.0);
        pointer.record(0.0, 0.0, &vp);
        pointer.record(100.0, 100.0, &vp);
        assert_eq!(pointer.latest(), Vec2::new(1.0, -1.0));
    }
}
