// ============================================================================
// particles.rs - driftfield
// ParticleField: the position/velocity state buffer and its integrator.
// ============================================================================

use glam::Vec3;
use rand::Rng;

use crate::error::FieldError;

/// Region the field is spread over. Reflection bounds derive from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldExtent {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl FieldExtent {
    /// Square area of side `area_size`, as the background uses it.
    pub fn square(area_size: f32, depth: f32) -> Self {
        Self {
            width: area_size,
            height: area_size,
            depth,
        }
    }

    /// Per-axis magnitude past which a velocity component is reflected.
    pub fn bounds(&self) -> Vec3 {
        Vec3::new(self.width * 0.65, self.height * 0.5, self.depth * 0.5)
    }
}

/// Full widths of the uniform initial velocity ranges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocitySpread {
    pub planar: f32,
    pub depth: f32,
}

impl Default for VelocitySpread {
    fn default() -> Self {
        Self {
            planar: 0.008,
            depth: 0.004,
        }
    }
}

/// Particles are identified by index only; the arrays never change length.
pub struct ParticleField {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    bounds: Vec3,
}

impl ParticleField {
    pub fn initialize<R: Rng + ?Sized>(
        count: usize,
        extent: FieldExtent,
        spread: VelocitySpread,
        rng: &mut R,
    ) -> Result<Self, FieldError> {
        if count == 0 {
            return Err(FieldError::config("particle field needs at least one particle"));
        }

        // (r - 0.5) * span keeps zero-width spans valid, unlike gen_range.
        let mut centered = |span: f32| (rng.gen::<f32>() - 0.5) * span;

        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push(Vec3::new(
                centered(extent.width * 1.3),
                centered(extent.height),
                centered(extent.depth),
            ));
            velocities.push(Vec3::new(
                centered(spread.planar),
                centered(spread.planar),
                centered(spread.depth),
            ));
        }

        Ok(Self {
            positions,
            velocities,
            bounds: extent.bounds(),
        })
    }

    /// Build a field from explicit state.
    pub fn from_parts(
        positions: Vec<Vec3>,
        velocities: Vec<Vec3>,
        extent: FieldExtent,
    ) -> Result<Self, FieldError> {
        if positions.is_empty() {
            return Err(FieldError::config("particle field needs at least one particle"));
        }
        if positions.len() != velocities.len() {
            return Err(FieldError::config(format!(
                "{} positions but {} velocities",
                positions.len(),
                velocities.len()
            )));
        }
        Ok(Self {
            positions,
            velocities,
            bounds: extent.bounds(),
        })
    }

    /// Advance one tick. A component past its bound has its velocity negated;
    /// the position itself is left where it landed.
    pub fn tick(&mut self) {
        let bounds = self.bounds;
        for (p, v) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *p += *v;
            if p.x.abs() > bounds.x {
                v.x = -v.x;
            }
            if p.y.abs() > bounds.y {
                v.y = -v.y;
            }
            if p.z.abs() > bounds.z {
                v.z = -v.z;
            }
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn bounds(&self) -> Vec3 {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
