// ============================================================================
// driver.rs - driftfield
// Frame driver: one simulation step and one draw per display refresh.
// ============================================================================

use glam::Vec2;
use rand::Rng;

use crate::camera::{CameraState, CameraUniforms};
use crate::config::{FieldConfig, Viewport};
use crate::edges::{build_edges, Edge};
use crate::error::{FieldError, FrameError};
use crate::particles::{FieldExtent, ParticleField, VelocitySpread};

/// Everything the draw step needs for one frame. Borrowed, never retained.
pub struct Scene<'a> {
    pub positions: &'a [glam::Vec3],
    pub edges: &'a [Edge],
    pub camera: CameraUniforms,
}

/// Opaque render target owned by the lifecycle manager.
pub trait DrawTarget {
    /// Match the output surface to a new viewport.
    fn resize(&mut self, viewport: &Viewport);

    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), FrameError>;

    /// Free GPU-side resources. Called exactly once, during shutdown.
    fn release(&mut self);
}

/// Outcome of one completed step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub frame: u64,
    pub edges: usize,
}

/// Owns the particle state and the camera. Nothing else holds them.
pub struct FrameDriver {
    field: ParticleField,
    camera: CameraState,
    link_threshold: f32,
    frame: u64,
}

impl FrameDriver {
    /// Seed a field for `viewport` from `config`.
    pub fn start<R: Rng + ?Sized>(
        config: &FieldConfig,
        viewport: &Viewport,
        rng: &mut R,
    ) -> Result<Self, FieldError> {
        let layout = config.layout_for(viewport);
        let field = ParticleField::initialize(
            config.particle_count,
            FieldExtent::square(layout.area_size, config.depth_range),
            VelocitySpread {
                planar: config.planar_speed_span,
                depth: config.depth_speed_span,
            },
            rng,
        )?;
        log::debug!(
            "Field seeded: {} particles, area {}, link threshold {}",
            field.len(),
            layout.area_size,
            layout.link_threshold
        );
        Ok(Self::new(
            field,
            CameraState::new(config, viewport),
            layout.link_threshold,
        ))
    }

    pub fn new(field: ParticleField, camera: CameraState, link_threshold: f32) -> Self {
        Self {
            field,
            camera,
            link_threshold,
            frame: 0,
        }
    }

    /// Integrate, link, move the camera, draw; in that order. A failed draw
    /// still counts as a simulated frame.
    pub fn step<T: DrawTarget + ?Sized>(
        &mut self,
        pointer: Vec2,
        target: &mut T,
    ) -> Result<StepReport, FrameError> {
        self.field.tick();
        let edges = build_edges(self.field.positions(), self.link_threshold);
        self.camera.update(pointer);
        self.frame += 1;

        let scene = Scene {
            positions: self.field.positions(),
            edges: &edges,
            camera: self.camera.uniforms(),
        };
        target.draw(&scene)?;

        Ok(StepReport {
            frame: self.frame,
            edges: edges.len(),
        })
    }

    /// Projection follows the viewport; particle state is untouched.
    pub fn resize(&mut self, viewport: &Viewport) {
        self.camera.projection.resize(viewport);
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn link_threshold(&self) -> f32 {
        self.link_threshold
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Keeps a copy of the last scene it was asked to draw.
    #[derive(Default)]
    struct CapturingTarget {
        positions: Vec<Vec3>,
        pairs: Vec<(usize, usize)>,
        draws: usize,
        fail: bool,
    }

    impl DrawTarget for CapturingTarget {
        fn resize(&mut self, _viewport: &Viewport) {}

        fn draw(&mut self, scene: &Scene<'_>) -> Result<(), FrameError> {
            if self.fail {
                return Err(FrameError::Timeout);
            }
            self.positions = scene.positions.to_vec();
            self.pairs = scene.edges.iter().map(|e| (e.a, e.b)).collect();
            self.draws += 1;
            Ok(())
        }

        fn release(&mut self) {}
    }

    fn driver_with(positions: Vec<Vec3>, velocities: Vec<Vec3>, threshold: f32) -> FrameDriver {
        let field =
            ParticleField::from_parts(positions, velocities, FieldExtent::square(25.0, 3.0))
                .unwrap();
        let camera = CameraState::new(&FieldConfig::default(), &Viewport::default());
        FrameDriver::new(field, camera, threshold)
    }

    #[test]
    fn edges_use_post_integration_positions() {
        // 2.02 apart before the tick, 2.0 - 0.02 after.
        let mut driver = driver_with(
            vec![Vec3::new(-1.01, 0.0, 0.0), Vec3::new(1.01, 0.0, 0.0)],
            vec![Vec3::new(0.02, 0.0, 0.0), Vec3::new(-0.02, 0.0, 0.0)],
            2.0,
        );
        let mut target = CapturingTarget::default();
        let report = driver.step(Vec2::ZERO, &mut target).unwrap();

        assert_eq!(report.edges, 1);
        assert_eq!(target.pairs, vec![(0, 1)]);
        assert_eq!(target.positions, driver.field().positions().to_vec());
    }

    #[test]
    fn camera_moves_once_per_step() {
        let mut driver = driver_with(vec![Vec3::ZERO], vec![Vec3::ZERO], 3.2);
        let mut target = CapturingTarget::default();
        driver.step(Vec2::new(1.0, 0.0), &mut target).unwrap();
        let expected = 0.15 * 0.05;
        assert!((driver.camera().offset.x - expected).abs() < 1e-7);
    }

    #[test]
    fn failed_draw_still_advances_simulation() {
        let mut driver = driver_with(
            vec![Vec3::ZERO],
            vec![Vec3::new(0.001, 0.0, 0.0)],
            3.2,
        );
        let mut target = CapturingTarget {
            fail: true,
            ..Default::default()
        };
        assert_eq!(driver.step(Vec2::ZERO, &mut target), Err(FrameError::Timeout));
        assert_eq!(driver.frame(), 1);
        assert!(driver.field().positions()[0].x > 0.0);
        assert_eq!(target.draws, 0);
    }

    #[test]
    fn start_uses_breakpoint_layout() {
        let mut rng = rand::thread_rng();
        let config = FieldConfig::default();
        let wide = FrameDriver::start(&config, &Viewport::new(1920, 1080, 1.0), &mut rng).unwrap();
        assert_eq!(wide.link_threshold(), 4.0);
        assert_eq!(wide.field().len(), 250);

        let narrow = FrameDriver::start(&config, &Viewport::new(1280, 800, 1.0), &mut rng).unwrap();
        assert_eq!(narrow.link_threshold(), 3.2);
    }

    #[test]
    fn resize_keeps_particles() {
        let mut rng = rand::thread_rng();
        let mut driver =
            FrameDriver::start(&FieldConfig::default(), &Viewport::default(), &mut rng).unwrap();
        let before = driver.field().positions().to_vec();
        driver.resize(&Viewport::new(600, 1200, 2.0));
        assert_eq!(driver.field().positions(), before.as_slice());
        assert_eq!(driver.camera().projection.aspect, 0.5);
    }
}
