// ============================================================================
// pipeline.rs - driftfield
// Render pipeline creation (points & lines) and bind-group-layout helpers.
// ============================================================================

use wgpu::util::DeviceExt;

use crate::camera::CameraUniforms;
use crate::config::{linear_rgba, srgb_rgba, FieldConfig};

// ======================== Style Uniforms ========================

/// Colours and point size, fixed for the lifetime of a surface.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StyleUniforms {
    pub point_color: [f32; 4],
    pub line_color: [f32; 4],
    pub point_size: f32,
    pub _pad: [f32; 3],
}

impl StyleUniforms {
    /// Hex colours in `config` are sRGB; `linear` converts them for sRGB surfaces.
    pub fn from_config(config: &FieldConfig, linear: bool) -> Self {
        let color: fn(u32, f32) -> [f32; 4] = if linear { linear_rgba } else { srgb_rgba };
        Self {
            point_color: color(config.point_color, config.point_opacity),
            line_color: color(config.line_color, config.line_opacity),
            point_size: config.point_size,
            _pad: [0.0; 3],
        }
    }
}

// ======================== Pipelines ========================

/// Both render pipelines and the shared uniform bind group.
pub struct Pipelines {
    pub point_pipeline: wgpu::RenderPipeline,
    pub line_pipeline: wgpu::RenderPipeline,
    pub bind_group: wgpu::BindGroup,
    pub camera_buffer: wgpu::Buffer,
    pub style_buffer: wgpu::Buffer,
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const POSITION_STRIDE: wgpu::BufferAddress = std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;

pub fn create_pipelines(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    style: &StyleUniforms,
) -> Pipelines {
    let shader = load_shader(device, "field", include_str!("shaders/field.wgsl"));

    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("field_bgl"),
        entries: &[bgl_uniform(0), bgl_uniform(1)],
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("field_pipeline_layout"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });

    // ---- Points: instanced quads, one instance per particle ----
    let point_pipeline = create_render_pipeline(
        device,
        "points",
        &layout,
        &shader,
        ("vs_point", "fs_point"),
        wgpu::VertexStepMode::Instance,
        wgpu::PrimitiveTopology::TriangleList,
        surface_format,
    );

    // ---- Lines: two vertices per edge ----
    let line_pipeline = create_render_pipeline(
        device,
        "lines",
        &layout,
        &shader,
        ("vs_line", "fs_line"),
        wgpu::VertexStepMode::Vertex,
        wgpu::PrimitiveTopology::LineList,
        surface_format,
    );

    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("camera_uniforms"),
        contents: bytemuck::bytes_of(&CameraUniforms::default()),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let style_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("style_uniforms"),
        contents: bytemuck::bytes_of(style),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("field_bg"),
        layout: &bgl,
        entries: &[bg_buffer(0, &camera_buffer), bg_buffer(1, &style_buffer)],
    });

    Pipelines {
        point_pipeline,
        line_pipeline,
        bind_group,
        camera_buffer,
        style_buffer,
    }
}

// ======================== Helpers ========================

fn load_shader(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

#[allow(clippy::too_many_arguments)]
fn create_render_pipeline(
    device: &wgpu::Device,
    name: &str,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    (vs_entry, fs_entry): (&str, &str),
    step_mode: wgpu::VertexStepMode,
    topology: wgpu::PrimitiveTopology,
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{name}_pipeline")),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(vs_entry),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: POSITION_STRIDE,
                step_mode,
                attributes: &POSITION_ATTRIBUTES,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn bgl_uniform(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn bg_buffer(binding: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_uniform_matches_wgsl_layout() {
        // vec4 + vec4 + f32, rounded up to 16-byte struct alignment.
        assert_eq!(std::mem::size_of::<StyleUniforms>(), 48);
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 128);
    }

    #[test]
    fn style_from_config_keeps_opacity() {
        let config = FieldConfig::default();
        let style = StyleUniforms::from_config(&config, false);
        assert_eq!(style.point_color, [1.0, 1.0, 1.0, 0.8]);
        assert_eq!(style.line_color[3], 0.2);
        assert_eq!(style.point_size, 0.1);
    }
}
