//! Height-mapped terrain tiles.

use cgmath::{InnerSpace, Matrix4, Vector2, Vector3};

use crate::data_structures::{model::RawModel, shape::Shape};
use crate::gpu::{RenderApi, TextureId};
use crate::resources::Loader;

/// Side length of one terrain tile in world units.
pub const TERRAIN_SIZE: f32 = 800.0;
/// Heights range over `[-MAX_HEIGHT, MAX_HEIGHT]`.
pub const MAX_HEIGHT: f32 = 40.0;

/// Square grid of heights, `vertex_count` samples per side.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    vertex_count: usize,
    heights: Vec<f32>,
}

impl HeightMap {
    pub fn flat(vertex_count: usize) -> Self {
        Self::from_fn(vertex_count, |_, _| 0.0)
    }

    /// Samples `height(u, v)` with `u, v` in `[0, 1]` across the tile.
    pub fn from_fn(vertex_count: usize, height: impl Fn(f32, f32) -> f32) -> Self {
        let vertex_count = vertex_count.max(2);
        let last = (vertex_count - 1) as f32;
        let heights = (0..vertex_count)
            .flat_map(|z| (0..vertex_count).map(move |x| (x, z)))
            .map(|(x, z)| height(x as f32 / last, z as f32 / last))
            .collect();
        Self {
            vertex_count,
            heights,
        }
    }

    /// Heights from the luminance of an image: black is `-MAX_HEIGHT`, white `MAX_HEIGHT`.
    pub fn from_image(image: &image::DynamicImage) -> Self {
        let luma = image.to_luma8();
        let vertex_count = luma.width().min(luma.height()).max(2) as usize;
        let heights = (0..vertex_count)
            .flat_map(|z| (0..vertex_count).map(move |x| (x, z)))
            .map(|(x, z)| {
                let value = luma
                    .get_pixel_checked(x as u32, z as u32)
                    .map_or(0.5, |p| p.0[0] as f32 / 255.0);
                (value * 2.0 - 1.0) * MAX_HEIGHT
            })
            .collect();
        Self {
            vertex_count,
            heights,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Height at a grid point, clamped to the grid.
    pub fn get(&self, x: isize, z: isize) -> f32 {
        let max = self.vertex_count as isize - 1;
        let (x, z) = (x.clamp(0, max) as usize, z.clamp(0, max) as usize);
        self.heights[z * self.vertex_count + x]
    }

    /// Mesh of the grid spanning `size` world units, texture coordinates across `[0, 1]`.
    pub fn to_shape(&self, size: f32) -> Shape {
        let count = self.vertex_count;
        let last = (count - 1) as f32;
        let mut shape = Shape {
            group_name: Some("terrain".into()),
            ..Default::default()
        };
        for z in 0..count {
            for x in 0..count {
                let (xi, zi) = (x as isize, z as isize);
                shape.positions.extend([
                    x as f32 / last * size,
                    self.get(xi, zi),
                    z as f32 / last * size,
                ]);
                let normal = Vector3::new(
                    self.get(xi - 1, zi) - self.get(xi + 1, zi),
                    2.0,
                    self.get(xi, zi - 1) - self.get(xi, zi + 1),
                )
                .normalize();
                shape.normals.extend([normal.x, normal.y, normal.z]);
                shape.texture_coords.extend([x as f32 / last, z as f32 / last]);
            }
        }
        for z in 0..count - 1 {
            for x in 0..count - 1 {
                let top_left = (z * count + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * count + x) as u32;
                let bottom_right = bottom_left + 1;
                shape.indices.extend([
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }
        shape
    }
}

/// The five textures a terrain blends: a background and three layers selected
/// by the red, green and blue channels of the weight map.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainTexturesPack {
    pub background: Option<TextureId>,
    pub mud: Option<TextureId>,
    pub grass: Option<TextureId>,
    pub path: Option<TextureId>,
    pub weight_map: Option<TextureId>,
}

impl TerrainTexturesPack {
    /// Textures in texture-unit order.
    pub fn units(&self) -> [Option<TextureId>; 5] {
        [
            self.background,
            self.mud,
            self.grass,
            self.path,
            self.weight_map,
        ]
    }
}

#[derive(Clone, Debug)]
pub struct Terrain {
    pub x: f32,
    pub z: f32,
    pub model: RawModel,
    pub textures: TerrainTexturesPack,
    heights: HeightMap,
}

impl Terrain {
    /// Builds the tile at grid cell (`grid_x`, `grid_z`) and uploads its mesh.
    pub fn new(
        api: &mut dyn RenderApi,
        loader: &mut Loader,
        grid_x: i32,
        grid_z: i32,
        textures: TerrainTexturesPack,
        heights: HeightMap,
    ) -> Self {
        let model = loader.load_shape_to_model(api, &heights.to_shape(TERRAIN_SIZE));
        Self {
            x: grid_x as f32 * TERRAIN_SIZE,
            z: grid_z as f32 * TERRAIN_SIZE,
            model,
            textures,
            heights,
        }
    }

    pub fn transformation_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(self.x, 0.0, self.z))
    }

    /// Interpolated height of the surface below a world position, `0.0` outside the tile.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        let terrain_x = world_x - self.x;
        let terrain_z = world_z - self.z;
        let cells = self.heights.vertex_count() - 1;
        let square = TERRAIN_SIZE / cells as f32;
        let grid_x = (terrain_x / square).floor();
        let grid_z = (terrain_z / square).floor();
        if grid_x < 0.0 || grid_z < 0.0 || grid_x >= cells as f32 || grid_z >= cells as f32 {
            return 0.0;
        }
        let (gx, gz) = (grid_x as isize, grid_z as isize);
        let x_coord = (terrain_x - grid_x * square) / square;
        let z_coord = (terrain_z - grid_z * square) / square;
        let h = |dx: isize, dz: isize| self.heights.get(gx + dx, gz + dz);
        let position = Vector2::new(x_coord, z_coord);
        if x_coord <= 1.0 - z_coord {
            barycentric(
                Vector3::new(0.0, h(0, 0), 0.0),
                Vector3::new(1.0, h(1, 0), 0.0),
                Vector3::new(0.0, h(0, 1), 1.0),
                position,
            )
        } else {
            barycentric(
                Vector3::new(1.0, h(1, 0), 0.0),
                Vector3::new(1.0, h(1, 1), 1.0),
                Vector3::new(0.0, h(0, 1), 1.0),
                position,
            )
        }
    }
}

/// Height at `position` (x, z) inside the triangle `p1 p2 p3` whose y holds the height.
fn barycentric(
    p1: Vector3<f32>,
    p2: Vector3<f32>,
    p3: Vector3<f32>,
    position: Vector2<f32>,
) -> f32 {
    let det = (p2.z - p3.z) * (p1.x - p3.x) + (p3.x - p2.x) * (p1.z - p3.z);
    let l1 = ((p2.z - p3.z) * (position.x - p3.x) + (p3.x - p2.x) * (position.y - p3.z)) / det;
    let l2 = ((p3.z - p1.z) * (position.x - p3.x) + (p1.x - p3.x) * (position.y - p3.z)) / det;
    let l3 = 1.0 - l1 - l2;
    l1 * p1.y + l2 * p2.y + l3 * p3.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_covers_the_grid() {
        let shape = HeightMap::flat(3).to_shape(10.0);
        assert_eq!(shape.vertex_count(), 9);
        assert_eq!(shape.texture_coords.len(), 18);
        assert_eq!(shape.indices.len(), 2 * 2 * 6);
        assert_eq!(&shape.positions[24..27], &[10.0, 0.0, 10.0]);
        assert_eq!(&shape.normals[0..3], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn heights_are_clamped_to_the_grid() {
        let map = HeightMap::from_fn(2, |u, v| u + 10.0 * v);
        assert_eq!(map.get(-3, 0), 0.0);
        assert_eq!(map.get(5, 5), 11.0);
    }
}
