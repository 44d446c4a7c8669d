use crate::gpu::{Primitive, ProgramId};

use super::texture::Texture;

/// Render state captured with every draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RenderFlags {
    pub depth_test: bool,
    pub cull_back_faces: bool,
    pub alpha_blend: bool,
}

/// Everything a wgpu render pipeline depends on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub program: ProgramId,
    pub primitive: Primitive,
    pub flags: RenderFlags,
    /// `(shader location, components)` of every vertex stream, one buffer each.
    pub vertex_streams: Vec<(u32, u32)>,
}

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    vertex_module: &wgpu::ShaderModule,
    fragment_module: &wgpu::ShaderModule,
    key: &PipelineKey,
) -> wgpu::RenderPipeline {
    let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
        .vertex_streams
        .iter()
        .map(|&(location, components)| {
            [wgpu::VertexAttribute {
                format: vertex_format(components),
                offset: 0,
                shader_location: location,
            }]
        })
        .collect();
    let vertex_layouts: Vec<wgpu::VertexBufferLayout> = key
        .vertex_streams
        .iter()
        .zip(&attributes)
        .map(|(&(_, components), attributes)| wgpu::VertexBufferLayout {
            array_stride: (components as usize * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        })
        .collect();

    let blend = if key.flags.alpha_blend {
        wgpu::BlendState::ALPHA_BLENDING
    } else {
        wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }
    };
    let (topology, strip_index_format) = match key.primitive {
        Primitive::Triangles => (wgpu::PrimitiveTopology::TriangleList, None),
        Primitive::TriangleStrip => (
            wgpu::PrimitiveTopology::TriangleStrip,
            Some(wgpu::IndexFormat::Uint32),
        ),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: Some(super::reflect::VERTEX_ENTRY),
            buffers: &vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            entry_point: Some(super::reflect::FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: key.flags.cull_back_faces.then_some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        // the depth attachment is always present, a disabled test neither compares nor writes
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: Some(key.flags.depth_test),
            depth_compare: Some(if key.flags.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            }),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
