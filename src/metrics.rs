// ============================================================================
// metrics.rs - driftfield
// Frame diagnostics: smoothed frame rate, step cost and edge counts.
// ============================================================================

use std::time::Duration;

/// Running statistics over every frame since mount.
#[derive(Clone, Debug, Default)]
pub struct FrameStats {
    frames: u64,
    skipped: u64,
    edges_last: usize,
    edges_max: usize,
    edges_total: u64,
    // Exponential moving averages
    step_ms: f32,
    fps: f32,
    last_frame_at: Option<std::time::Instant>,
}

impl FrameStats {
    /// Record a completed frame with `edges` links that took `step` to simulate and submit.
    pub fn record(&mut self, edges: usize, step: Duration) {
        self.frames += 1;
        self.edges_last = edges;
        self.edges_max = self.edges_max.max(edges);
        self.edges_total += edges as u64;

        let step_ms = step.as_secs_f32() * 1000.0;
        self.step_ms = if self.frames == 1 {
            step_ms
        } else {
            self.step_ms * 0.95 + step_ms * 0.05
        };

        let now = std::time::Instant::now();
        if let Some(prev) = self.last_frame_at {
            let dt = now.duration_since(prev).as_secs_f32().max(0.0001);
            self.fps = self.fps * 0.95 + (1.0 / dt) * 0.05;
        }
        self.last_frame_at = Some(now);
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn edges_last(&self) -> usize {
        self.edges_last
    }

    pub fn edges_max(&self) -> usize {
        self.edges_max
    }

    pub fn mean_edges(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.edges_total as f64 / self.frames as f64
        }
    }

    pub fn step_ms(&self) -> f32 {
        self.step_ms
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn log(&self, frame: u64) {
        log::debug!(
            "[frame {:>7}] fps {:>5.1} | step {:>6.3} ms | edges {:>5} (mean {:.1}, max {}) | skipped {}",
            frame,
            self.fps,
            self.step_ms,
            self.edges_last,
            self.mean_edges(),
            self.edges_max,
            self.skipped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_are_zero() {
        let stats = FrameStats::default();
        assert_eq!(stats.frames(), 0);
        assert_eq!(stats.mean_edges(), 0.0);
    }

    #[test]
    fn edge_counts_accumulate() {
        let mut stats = FrameStats::default();
        for edges in [10, 20, 30] {
            stats.record(edges, Duration::from_millis(1));
        }
        stats.record_skip();
        assert_eq!(stats.frames(), 3);
        assert_eq!(stats.skipped(), 1);
        assert_eq!(stats.edges_last(), 30);
        assert_eq!(stats.edges_max(), 30);
        assert_eq!(stats.mean_edges(), 20.0);
    }

    #[test]
    fn step_time_is_smoothed() {
        let mut stats = FrameStats::default();
        stats.record(0, Duration::from_millis(2));
        assert!((stats.step_ms() - 2.0).abs() < 1e-4);
        stats.record(0, Duration::from_millis(12));
        assert!((stats.step_ms() - 2.5).abs() < 1e-3);
    }
}
