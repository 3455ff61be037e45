// ============================================================================
// camera.rs - driftfield
// Pointer-parallax camera state & GPU uniform.
// ============================================================================

use glam::{Mat4, Vec2, Vec3};

use crate::config::{FieldConfig, Viewport};

/// GPU-side camera uniforms uploaded every frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

/// Perspective projection parameters; the aspect follows the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn resize(&mut self, viewport: &Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

/// CPU-side camera: a smoothed x/y offset at a fixed depth, always aimed at
/// the origin.
#[derive(Clone, Debug)]
pub struct CameraState {
    pub offset: Vec2,
    pub depth: f32,
    pub gain: f32,
    pub smoothing: f32,
    pub projection: Projection,
}

impl CameraState {
    pub fn new(config: &FieldConfig, viewport: &Viewport) -> Self {
        Self {
            offset: Vec2::ZERO,
            depth: config.camera_depth,
            gain: config.camera_gain,
            smoothing: config.camera_smoothing,
            projection: Projection {
                fov_y_degrees: config.fov_y_degrees,
                aspect: viewport.aspect(),
                near: config.near_plane,
                far: config.far_plane,
            },
        }
    }

    /// Move a fixed fraction of the way toward `pointer * gain`.
    /// Exponential smoothing: no velocity state, no overshoot.
    pub fn update(&mut self, pointer: Vec2) {
        let target = pointer * self.gain;
        self.offset += (target - self.offset) * self.smoothing;
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.offset.x, self.offset.y, self.depth)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    /// Build the GPU uniform from current state.
    pub fn uniforms(&self) -> CameraUniforms {
        CameraUniforms {
            view: self.view_matrix().to_cols_array_2d(),
            proj: self.projection.matrix().to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraState {
        CameraState::new(&FieldConfig::default(), &Viewport::new(1280, 800, 1.0))
    }

    #[test]
    fn converges_without_overshoot() {
        let mut cam = camera();
        let pointer = Vec2::new(0.8, -0.6);
        let target = pointer * cam.gain;

        let mut last = cam.offset.distance(target);
        for _ in 0..500 {
            cam.update(pointer);
            let d = cam.offset.distance(target);
            assert!(d <= last);
            // Still on the starting side of the target on both axes.
            assert!(cam.offset.x <= target.x && cam.offset.y >= target.y);
            last = d;
        }
        assert!(last < 1e-4);
    }

    #[test]
    fn single_update_covers_smoothing_fraction() {
        let mut cam = camera();
        cam.update(Vec2::new(1.0, 1.0));
        assert!((cam.offset.x - 0.15 * 0.05).abs() < 1e-7);
        assert!((cam.offset.y - 0.15 * 0.05).abs() < 1e-7);
    }

    #[test]
    fn centred_pointer_keeps_camera_still() {
        let mut cam = camera();
        for _ in 0..10 {
            cam.update(Vec2::ZERO);
        }
        assert_eq!(cam.offset, Vec2::ZERO);
    }

    #[test]
    fn out_of_range_pointer_is_tolerated() {
        let mut cam = camera();
        for _ in 0..1000 {
            cam.update(Vec2::new(3.0, -3.0));
        }
        assert!((cam.offset.x - 0.45).abs() < 1e-3);
        assert!((cam.offset.y + 0.45).abs() < 1e-3);
    }

    #[test]
    fn always_looks_at_origin() {
        let mut cam = camera();
        for _ in 0..50 {
            cam.update(Vec2::new(1.0, 0.5));
        }
        let origin_in_view = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!(origin_in_view.x.abs() < 1e-5);
        assert!(origin_in_view.y.abs() < 1e-5);
        assert!(origin_in_view.z < 0.0);
    }

    #[test]
    fn resize_updates_aspect_only() {
        let mut cam = camera();
        cam.update(Vec2::new(1.0, 1.0));
        let offset = cam.offset;
        cam.projection.resize(&Viewport::new(1000, 500, 1.0));
        assert_eq!(cam.projection.aspect, 2.0);
        assert_eq!(cam.offset, offset);
    }
}
