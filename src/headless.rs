// ============================================================================
// headless.rs - driftfield
// Windowless runner: drives the field against a counting target to measure
// the per-frame cost of integration and linking.
// ============================================================================

use std::time::Instant;

use crate::config::{FieldConfig, Viewport};
use crate::driver::{DrawTarget, FrameDriver, Scene};
use crate::error::{FieldError, FrameError};
use crate::metrics::FrameStats;

#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    pub frames: u32,
    pub viewport: Viewport,
    pub progress_interval: u32,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            frames: 3_600,
            viewport: Viewport::default(),
            progress_interval: 600,
        }
    }
}

/// Result of a headless run.
#[derive(Clone, Debug)]
pub struct HeadlessSummary {
    pub frames: u64,
    pub mean_edges: f64,
    pub max_edges: usize,
    pub ms_per_frame: f64,
}

/// Draw target that only counts what it is handed.
#[derive(Default)]
struct CountingTarget {
    draws: u64,
    vertices: u64,
}

impl DrawTarget for CountingTarget {
    fn resize(&mut self, _viewport: &Viewport) {}

    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), FrameError> {
        self.draws += 1;
        self.vertices += (scene.positions.len() + scene.edges.len() * 2) as u64;
        Ok(())
    }

    fn release(&mut self) {}
}

pub fn run_headless(field: &FieldConfig, config: &HeadlessConfig) -> Result<HeadlessSummary, FieldError> {
    field.validate()?;
    if config.viewport.is_empty() {
        return Err(FieldError::config("headless viewport must be non-empty"));
    }

    let mut driver = FrameDriver::start(field, &config.viewport, &mut rand::thread_rng())?;
    let mut target = CountingTarget::default();
    let mut stats = FrameStats::default();
    let progress_interval = u64::from(config.progress_interval.max(1));

    log::info!(
        "Headless run started: {} frames, {} particles, link threshold {}",
        config.frames,
        field.particle_count,
        driver.link_threshold()
    );

    let started = Instant::now();
    for _ in 0..config.frames {
        // Sweep the pointer so the camera path is exercised too.
        let phase = driver.frame() as f32 * 0.01;
        let pointer = glam::Vec2::new(phase.sin(), phase.cos());

        let step_started = Instant::now();
        match driver.step(pointer, &mut target) {
            Ok(report) => stats.record(report.edges, step_started.elapsed()),
            Err(e) => {
                log::warn!("Frame {} skipped: {}", driver.frame(), e);
                stats.record_skip();
            }
        }

        if driver.frame() % progress_interval == 0 {
            log::info!(
                "Headless progress: {}/{} frames, {} edges, mean {:.1}",
                driver.frame(),
                config.frames,
                stats.edges_last(),
                stats.mean_edges()
            );
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    let summary = HeadlessSummary {
        frames: driver.frame(),
        mean_edges: stats.mean_edges(),
        max_edges: stats.edges_max(),
        ms_per_frame: if driver.frame() > 0 {
            elapsed * 1000.0 / driver.frame() as f64
        } else {
            0.0
        },
    };
    log::info!(
        "Headless run complete: {} frames ({} vertices drawn) in {:.2}s, {:.3} ms/frame, mean {:.1} edges, max {}",
        summary.frames,
        target.vertices,
        elapsed,
        summary.ms_per_frame,
        summary.mean_edges,
        summary.max_edges
    );
    debug_assert_eq!(target.draws, summary.frames);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_requested_frames() {
        let field = FieldConfig {
            particle_count: 60,
            ..Default::default()
        };
        let config = HeadlessConfig {
            frames: 120,
            progress_interval: 50,
            ..Default::default()
        };
        let summary = run_headless(&field, &config).unwrap();
        assert_eq!(summary.frames, 120);
        assert!(summary.max_edges as f64 >= summary.mean_edges);
    }

    #[test]
    fn empty_viewport_is_rejected() {
        let config = HeadlessConfig {
            viewport: Viewport::new(0, 0, 1.0),
            ..Default::default()
        };
        assert!(run_headless(&FieldConfig::default(), &config).is_err());
    }
}
