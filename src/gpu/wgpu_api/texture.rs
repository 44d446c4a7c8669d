//! GPU textures for the wgpu backend.
//!
//! [`Texture`] wraps a wgpu texture together with its view. Colour textures
//! are allocated lazily on their first upload since the command model
//! creates texture handles before their size is known.

use crate::gpu::{Filter, Sampling, TextureData, Wrap};

use super::reflect::SampledKind;

#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    /// Every uploaded image is RGBA8 in sRGB space.
    pub const COLOUR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }

    /// Allocate an empty colour texture: one layer for 2D, six for cube maps.
    pub fn allocate(
        device: &wgpu::Device,
        kind: SampledKind,
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let layers = match kind {
            SampledKind::D2 => 1,
            SampledKind::Cube => 6,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOUR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(match kind {
                SampledKind::D2 => wgpu::TextureViewDimension::D2,
                SampledKind::Cube => wgpu::TextureViewDimension::Cube,
            }),
            ..Default::default()
        });
        Self { texture, view }
    }

    /// Single white texel, bound to texture units nothing was bound to.
    pub fn create_blank(device: &wgpu::Device, queue: &wgpu::Queue, kind: SampledKind) -> Self {
        let blank = Self::allocate(device, kind, 1, 1, "blank texture");
        let white = [255u8; 4];
        let layers = match kind {
            SampledKind::D2 => 1,
            SampledKind::Cube => 6,
        };
        for layer in 0..layers {
            blank.write_layer(queue, layer, 1, 1, &white);
        }
        blank
    }

    pub fn write_image(&self, queue: &wgpu::Queue, layer: u32, image: &TextureData) {
        self.write_layer(queue, layer, image.width(), image.height(), image.pixels());
    }

    fn write_layer(&self, queue: &wgpu::Queue, layer: u32, width: u32, height: u32, pixels: &[u8]) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer,
                },
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }
}

pub fn create_sampler(device: &wgpu::Device, sampling: Sampling) -> wgpu::Sampler {
    let address_mode = match sampling.wrap {
        Wrap::Repeat => wgpu::AddressMode::Repeat,
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    };
    let filter = |filter: Filter| match filter {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: filter(sampling.mag_filter),
        min_filter: filter(sampling.min_filter),
        ..Default::default()
    })
}
