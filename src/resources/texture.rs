use std::path::Path;

use anyhow::Context;

use crate::data_structures::terrain::HeightMap;
use crate::gpu::TextureData;

/// Decodes an image file into tightly packed RGBA8 pixels.
pub fn decode_image(path: &Path) -> anyhow::Result<TextureData> {
    let bytes = std::fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    decode_bytes(&bytes).with_context(|| format!("Could not decode {}", path.display()))
}

pub fn decode_bytes(bytes: &[u8]) -> anyhow::Result<TextureData> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    TextureData::new(width, height, rgba.into_raw())
}

/// Reads a grey-scale height map image.
pub fn load_height_map(path: &Path) -> anyhow::Result<HeightMap> {
    let bytes = std::fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    let image = image::load_from_memory(&bytes)
        .with_context(|| format!("Could not decode {}", path.display()))?;
    Ok(HeightMap::from_image(&image))
}
