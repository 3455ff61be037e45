// ============================================================================
// renderer.rs - driftfield
// wgpu drawing surface for a winit window: device setup, per-frame uploads
// and the points + lines render pass.
// ============================================================================

use std::sync::Arc;

use bytemuck::cast_slice;
use winit::window::Window;

use crate::config::{linear_rgba, srgb_rgba, FieldConfig, Viewport};
use crate::driver::{DrawTarget, Scene};
use crate::edges::line_vertices;
use crate::error::{FieldError, FrameError, GpuError};
use crate::lifecycle::SurfaceHost;
use crate::pipeline::{create_pipelines, Pipelines, StyleUniforms};

const VERTEX_SIZE: wgpu::BufferAddress = std::mem::size_of::<glam::Vec3>() as wgpu::BufferAddress;
const MIN_LINE_VERTICES: u64 = 1024;

// ======================== Host ========================

/// A winit window acting as the container for the drawing surface.
pub struct GpuHost {
    window: Arc<Window>,
    instance: wgpu::Instance,
    config: FieldConfig,
}

impl GpuHost {
    pub fn new(window: Arc<Window>, config: &FieldConfig) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        Self {
            window,
            instance,
            config: config.clone(),
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl SurfaceHost for GpuHost {
    type Target = GpuTarget;

    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width, size.height, self.window.scale_factor())
    }

    fn create_target(&mut self, viewport: &Viewport) -> Result<GpuTarget, FieldError> {
        let surface = self
            .instance
            .create_surface(self.window.clone())
            .map_err(GpuError::from)?;
        let target = pollster::block_on(GpuTarget::new(
            &self.instance,
            surface,
            viewport,
            &self.config,
        ))?;
        Ok(target)
    }

    fn is_attached(&self, target: &GpuTarget) -> bool {
        target.surface.is_some()
    }

    fn detach(&mut self, target: &mut GpuTarget) {
        // Dropping the surface unhooks it from the window.
        target.surface = None;
    }

    fn request_frame(&self) {
        self.window.request_redraw();
    }
}

// ======================== Target ========================

/// The drawing surface and every GPU resource behind it.
pub struct GpuTarget {
    surface: Option<wgpu::Surface<'static>>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    pipelines: Pipelines,
    point_buffer: Option<wgpu::Buffer>,
    line_buffer: wgpu::Buffer,
    line_capacity: u64,
    clear_color: wgpu::Color,
}

impl GpuTarget {
    async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        viewport: &Viewport,
        config: &FieldConfig,
    ) -> Result<Self, GpuError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::info!("GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("driftfield_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::IncompatibleSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        // One frame per display refresh.
        log::info!("Present mode: AutoVsync, format {:?}", surface_format);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let linear = surface_format.is_srgb();
        let style = StyleUniforms::from_config(config, linear);
        let pipelines = create_pipelines(&device, surface_format, &style);

        let point_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_positions"),
            size: config.particle_count as u64 * VERTEX_SIZE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let line_buffer = create_line_buffer(&device, MIN_LINE_VERTICES);

        let clear = if linear {
            linear_rgba(config.clear_color, 1.0)
        } else {
            srgb_rgba(config.clear_color, 1.0)
        };

        Ok(Self {
            surface: Some(surface),
            device,
            queue,
            surface_config,
            pipelines,
            point_buffer: Some(point_buffer),
            line_buffer,
            line_capacity: MIN_LINE_VERTICES,
            clear_color: wgpu::Color {
                r: clear[0] as f64,
                g: clear[1] as f64,
                b: clear[2] as f64,
                a: 1.0,
            },
        })
    }

    /// Grow the line buffer to the next power of two that fits `vertices`.
    fn reserve_lines(&mut self, vertices: u64) {
        if vertices <= self.line_capacity {
            return;
        }
        let capacity = vertices.next_power_of_two().max(MIN_LINE_VERTICES);
        self.line_buffer.destroy();
        self.line_buffer = create_line_buffer(&self.device, capacity);
        self.line_capacity = capacity;
        log::debug!("Line buffer grown to {} vertices", capacity);
    }
}

impl DrawTarget for GpuTarget {
    fn resize(&mut self, viewport: &Viewport) {
        self.surface_config.width = viewport.width.max(1);
        self.surface_config.height = viewport.height.max(1);
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.surface_config);
        }
    }

    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), FrameError> {
        if self.surface.is_none() || self.point_buffer.is_none() {
            return Err(FrameError::Detached);
        }
        let lines = line_vertices(scene.edges);
        self.reserve_lines(lines.len() as u64);

        let (Some(surface), Some(point_buffer)) = (&self.surface, &self.point_buffer) else {
            return Err(FrameError::Detached);
        };

        // ---- Uploads ----
        self.queue.write_buffer(
            &self.pipelines.camera_buffer,
            0,
            bytemuck::bytes_of(&scene.camera),
        );

        let particle_count = (scene.positions.len() as u64).min(point_buffer.size() / VERTEX_SIZE);
        self.queue.write_buffer(
            point_buffer,
            0,
            cast_slice(&scene.positions[..particle_count as usize]),
        );
        if !lines.is_empty() {
            self.queue
                .write_buffer(&self.line_buffer, 0, cast_slice(&lines));
        }

        // ---- Acquire ----
        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                surface.configure(&self.device, &self.surface_config);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // ---- Render pass ----
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("field_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("field_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.pipelines.bind_group, &[]);

            if !lines.is_empty() {
                pass.set_pipeline(&self.pipelines.line_pipeline);
                pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                pass.draw(0..lines.len() as u32, 0..1);
            }

            pass.set_pipeline(&self.pipelines.point_pipeline);
            pass.set_vertex_buffer(0, point_buffer.slice(..));
            pass.draw(0..6, 0..particle_count as u32);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        self.surface = None;
        if let Some(buffer) = self.point_buffer.take() {
            buffer.destroy();
        }
        self.line_buffer.destroy();
        self.pipelines.camera_buffer.destroy();
        self.pipelines.style_buffer.destroy();
        self.device.destroy();
        log::debug!("GPU resources released");
    }
}

fn create_line_buffer(device: &wgpu::Device, vertices: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("edge_vertices"),
        size: vertices * VERTEX_SIZE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
