// ============================================================================
// error.rs - driftfield
// Error types for configuration, GPU initialization and per-frame drawing.
// ============================================================================

use std::fmt;

// ======================== GPU Initialization ========================

/// Errors raised while acquiring the native drawing resources.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for the host window.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create the GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The adapter cannot present to the host surface.
    IncompatibleSurface,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "failed to create drawing surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "no compatible GPU adapter found (Vulkan, Metal, DX12 or GL is required)"
            ),
            GpuError::DeviceCreation(e) => write!(f, "failed to create GPU device: {}", e),
            GpuError::IncompatibleSurface => {
                write!(f, "adapter reports no usable format for the surface")
            }
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

// ======================== Frame Drawing ========================

/// A draw call that could not be completed. The frame is skipped, never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Surface was lost or outdated and has been reconfigured.
    SurfaceLost,
    /// Acquiring the next surface texture timed out.
    Timeout,
    /// The target has already been detached from its host.
    Detached,
    /// Anything else reported by the backend.
    Other(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::SurfaceLost => write!(f, "surface lost, reconfigured"),
            FrameError::Timeout => write!(f, "timed out acquiring surface texture"),
            FrameError::Detached => write!(f, "drawing target is detached"),
            FrameError::Other(msg) => write!(f, "draw failed: {}", msg),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<wgpu::SurfaceError> for FrameError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => FrameError::SurfaceLost,
            wgpu::SurfaceError::Timeout => FrameError::Timeout,
            other => FrameError::Other(other.to_string()),
        }
    }
}

// ======================== Top Level ========================

/// Errors surfaced by mounting, configuration loading and the event loop.
#[derive(Debug)]
pub enum FieldError {
    /// Configuration value out of range.
    Config(String),
    /// Failed to read a configuration file.
    Io(std::io::Error),
    /// Failed to parse a configuration file.
    Json(serde_json::Error),
    /// Drawing surface could not be created.
    Gpu(GpuError),
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the host window.
    Window(winit::error::OsError),
}

impl FieldError {
    pub fn config(msg: impl Into<String>) -> Self {
        FieldError::Config(msg.into())
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            FieldError::Io(e) => write!(f, "failed to read configuration: {}", e),
            FieldError::Json(e) => write!(f, "failed to parse configuration: {}", e),
            FieldError::Gpu(e) => write!(f, "GPU error: {}", e),
            FieldError::EventLoop(e) => write!(f, "event loop error: {}", e),
            FieldError::Window(e) => write!(f, "failed to create window: {}", e),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::Config(_) => None,
            FieldError::Io(e) => Some(e),
            FieldError::Json(e) => Some(e),
            FieldError::Gpu(e) => Some(e),
            FieldError::EventLoop(e) => Some(e),
            FieldError::Window(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for FieldError {
    fn from(e: std::io::Error) -> Self {
        FieldError::Io(e)
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(e: serde_json::Error) -> Self {
        FieldError::Json(e)
    }
}

impl From<GpuError> for FieldError {
    fn from(e: GpuError) -> Self {
        FieldError::Gpu(e)
    }
}

impl From<winit::error::EventLoopError> for FieldError {
    fn from(e: winit::error::EventLoopError) -> Self {
        FieldError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for FieldError {
    fn from(e: winit::error::OsError) -> Self {
        FieldError::Window(e)
    }
}
