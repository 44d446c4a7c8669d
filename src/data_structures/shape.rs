//! CPU-side geometry handed to the [`Loader`](crate::resources::Loader).

/// Material referenced by a [`Shape`], as declared by the model file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalMaterial {
    pub name: String,
    /// Diffuse texture file name, relative to the texture directory.
    pub diffuse_texture: Option<String>,
    pub diffuse_colour: Option<[f32; 3]>,
}

/// Geometry of one model group: flat attribute streams plus indices.
///
/// Positions and normals hold three floats per vertex, texture coordinates two.
/// Any stream may be empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    pub positions: Vec<f32>,
    pub texture_coords: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub material: Option<ExternalMaterial>,
    pub group_name: Option<String>,
}

impl Shape {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Corners of the screen quad used by every GUI element, drawn as a triangle strip.
pub const GUI_QUAD: [f32; 8] = [-1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0, -1.0];

/// Half extent of the sky box cube.
pub const SKY_BOX_SIZE: f32 = 500.0;

/// Positions of the sky box cube: 36 vertices, faces wound to be seen from inside.
pub fn sky_box_positions(size: f32) -> Vec<f32> {
    #[rustfmt::skip]
    const UNIT: [f32; 108] = [
        -1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, -1.0, -1.0,
        1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0,

        -1.0, -1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, -1.0,
        -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0,

        1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0,
        1.0, 1.0, 1.0, 1.0, 1.0, -1.0, 1.0, -1.0, -1.0,

        -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        1.0, 1.0, 1.0, 1.0, -1.0, 1.0, -1.0, -1.0, 1.0,

        -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0,
        1.0, 1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0,

        -1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0,
        1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0,
    ];
    UNIT.iter().map(|v| v * size).collect()
}
