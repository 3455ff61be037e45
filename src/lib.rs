//! # driftfield
//!
//! An ambient particle-field background. A few hundred particles drift inside
//! a soft box, reflect off its walls, and are joined by faint lines whenever
//! two of them come closer than a link threshold. The camera leans gently
//! toward the pointer.
//!
//! The simulation core ([`particles`], [`edges`], [`camera`], [`driver`]) is
//! plain CPU code. [`lifecycle::Background`] mounts it onto any
//! [`lifecycle::SurfaceHost`]; [`renderer::GpuHost`] is the wgpu/winit host
//! used by the binary.

pub mod app;
pub mod camera;
pub mod config;
pub mod driver;
pub mod edges;
pub mod error;
pub mod headless;
pub mod input;
pub mod lifecycle;
pub mod metrics;
pub mod particles;
pub mod pipeline;
pub mod renderer;

pub use config::{FieldConfig, Viewport};
pub use error::FieldError;
pub use lifecycle::Background;
