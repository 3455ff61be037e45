// ============================================================================
// config.rs - driftfield
// Field parameters, viewport description and breakpoint-resolved layout.
// ============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

// ======================== Viewport ========================

/// Output surface size in device pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Width in logical (CSS-style) pixels, used for the layout breakpoint.
    pub fn logical_width(&self) -> f64 {
        let scale = if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        };
        self.width as f64 / scale
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800, 1.0)
    }
}

// ======================== Field Configuration ========================

/// Every tunable of the background. Fixed once the field is mounted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particle_count: usize,

    /// Logical width above which the wide layout applies.
    pub wide_breakpoint: f64,
    pub area_size: f32,
    pub wide_area_size: f32,
    pub link_threshold: f32,
    pub wide_link_threshold: f32,
    pub depth_range: f32,

    /// Full width of the uniform velocity range on x and y, per tick.
    pub planar_speed_span: f32,
    /// Full width of the uniform velocity range on z, per tick.
    pub depth_speed_span: f32,

    pub camera_gain: f32,
    pub camera_smoothing: f32,
    pub camera_depth: f32,
    pub fov_y_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,

    pub point_size: f32,
    pub point_color: u32,
    pub point_opacity: f32,
    pub line_color: u32,
    pub line_opacity: f32,
    pub clear_color: u32,

    /// Frames between diagnostics log lines.
    pub diag_interval: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 250,
            wide_breakpoint: 1600.0,
            area_size: 25.0,
            wide_area_size: 32.0,
            link_threshold: 3.2,
            wide_link_threshold: 4.0,
            depth_range: 3.0,
            planar_speed_span: 0.008,
            depth_speed_span: 0.004,
            camera_gain: 0.15,
            camera_smoothing: 0.05,
            camera_depth: 15.0,
            fov_y_degrees: 75.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            point_size: 0.1,
            point_color: 0xffffff,
            point_opacity: 0.8,
            line_color: 0x888888,
            line_opacity: 0.2,
            clear_color: 0x05050d,
            diag_interval: 600,
        }
    }
}

/// Area size and link threshold picked for a particular viewport width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldLayout {
    pub area_size: f32,
    pub link_threshold: f32,
}

impl FieldConfig {
    /// Load a JSON configuration file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, FieldError> {
        let content = std::fs::read_to_string(path)?;
        let config: FieldConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!("Loaded field configuration from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.particle_count == 0 {
            return Err(FieldError::config("particle_count must be at least 1"));
        }
        for (name, value) in [
            ("area_size", self.area_size),
            ("wide_area_size", self.wide_area_size),
            ("depth_range", self.depth_range),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FieldError::config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("link_threshold", self.link_threshold),
            ("wide_link_threshold", self.wide_link_threshold),
            ("planar_speed_span", self.planar_speed_span),
            ("depth_speed_span", self.depth_speed_span),
            ("point_size", self.point_size),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FieldError::config(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if !(self.camera_smoothing > 0.0 && self.camera_smoothing <= 1.0) {
            return Err(FieldError::config(format!(
                "camera_smoothing must lie in (0, 1], got {}",
                self.camera_smoothing
            )));
        }
        if !self.camera_gain.is_finite() || !self.camera_depth.is_finite() {
            return Err(FieldError::config("camera gain and depth must be finite"));
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(FieldError::config(format!(
                "fov_y_degrees must lie in (0, 180), got {}",
                self.fov_y_degrees
            )));
        }
        if !(self.near_plane > 0.0 && self.far_plane > self.near_plane) {
            return Err(FieldError::config(format!(
                "clip planes must satisfy 0 < near < far, got {} / {}",
                self.near_plane, self.far_plane
            )));
        }
        Ok(())
    }

    /// Resolve the breakpoint-dependent values for a viewport.
    pub fn layout_for(&self, viewport: &Viewport) -> FieldLayout {
        if viewport.logical_width() > self.wide_breakpoint {
            FieldLayout {
                area_size: self.wide_area_size,
                link_threshold: self.wide_link_threshold,
            }
        } else {
            FieldLayout {
                area_size: self.area_size,
                link_threshold: self.link_threshold,
            }
        }
    }
}

// ======================== Colour Helpers ========================

/// Split `0xRRGGBB` into normalized sRGB channels with the given alpha.
pub fn srgb_rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), alpha]
}

/// Same as [`srgb_rgba`] but converted to linear RGB for sRGB surfaces.
pub fn linear_rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let [r, g, b, a] = srgb_rgba(hex, alpha);
    [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = FieldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_count, 250);
    }

    #[test]
    fn zero_particles_rejected() {
        let config = FieldConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FieldError::Config(_))));
    }

    #[test]
    fn smoothing_out_of_range_rejected() {
        let config = FieldConfig {
            camera_smoothing: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn layout_switches_above_breakpoint() {
        let config = FieldConfig::default();

        let narrow = config.layout_for(&Viewport::new(1600, 900, 1.0));
        assert_eq!(narrow.area_size, 25.0);
        assert_eq!(narrow.link_threshold, 3.2);

        let wide = config.layout_for(&Viewport::new(1601, 900, 1.0));
        assert_eq!(wide.area_size, 32.0);
        assert_eq!(wide.link_threshold, 4.0);
    }

    #[test]
    fn layout_uses_logical_width() {
        let config = FieldConfig::default();
        // 2560 device pixels at 2x is 1280 logical pixels.
        let layout = config.layout_for(&Viewport::new(2560, 1600, 2.0));
        assert_eq!(layout.link_threshold, 3.2);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: FieldConfig =
            serde_json::from_str(r#"{ "particle_count": 80, "line_opacity": 0.5 }"#).unwrap();
        assert_eq!(config.particle_count, 80);
        assert_eq!(config.line_opacity, 0.5);
        assert_eq!(config.camera_gain, 0.15);
    }

    #[test]
    fn linear_rgba_endpoints() {
        let white = linear_rgba(0xffffff, 0.8);
        assert!(white[..3].iter().all(|c| (c - 1.0).abs() < 1e-5));
        assert_eq!(white[3], 0.8);
        assert_eq!(linear_rgba(0x000000, 1.0), [0.0, 0.0, 0.0, 1.0]);
        let grey = linear_rgba(0x888888, 0.2);
        assert!(grey[0] > 0.2 && grey[0] < 0.3);
    }
}
