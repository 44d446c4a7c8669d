use std::io::{BufReader, Cursor};
use std::path::Path;

use anyhow::Context;

use crate::data_structures::shape::{ExternalMaterial, Shape};

/// Reads an OBJ file into one [`Shape`] per model group.
///
/// Material libraries are looked up next to the OBJ file. A missing or broken
/// library only drops the materials, the geometry is still returned.
pub fn load_shapes(path: &Path) -> anyhow::Result<Vec<Shape>> {
    let obj_text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let directory = path.parent().unwrap_or(Path::new("")).to_path_buf();
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));

    let (models, obj_materials) = tobj::load_obj_buf(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| tobj::load_mtl(directory.join(p)),
    )
    .with_context(|| format!("Could not parse {}", path.display()))?;

    let materials = match obj_materials {
        Ok(materials) => materials,
        Err(e) => {
            log::warn!("Materials of {} could not be loaded: {}", path.display(), e);
            Vec::new()
        }
    };

    Ok(models
        .into_iter()
        .map(|m| {
            let material = m
                .mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(|material| ExternalMaterial {
                    name: material.name.clone(),
                    diffuse_texture: material.diffuse_texture.clone(),
                    diffuse_colour: material.diffuse,
                });
            // OBJ puts v = 0 at the bottom of the image, textures are uploaded top row first
            let texture_coords = m
                .mesh
                .texcoords
                .chunks_exact(2)
                .flat_map(|uv| [uv[0], 1.0 - uv[1]])
                .collect();
            Shape {
                positions: m.mesh.positions,
                texture_coords,
                normals: m.mesh.normals,
                indices: m.mesh.indices,
                material,
                group_name: Some(m.name),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
usemtl grass
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const QUAD_MTL: &str = "\
newmtl grass
Kd 0.1 0.8 0.2
map_Kd grass.png
";

    #[test]
    fn loads_geometry_and_material() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), QUAD_OBJ).unwrap();
        std::fs::write(dir.path().join("quad.mtl"), QUAD_MTL).unwrap();

        let shapes = load_shapes(&dir.path().join("quad.obj")).unwrap();
        assert_eq!(shapes.len(), 1);
        let shape = &shapes[0];
        assert_eq!(shape.vertex_count(), 4);
        assert_eq!(shape.indices.len(), 6);
        assert_eq!(shape.normals.len(), 12);
        // v flipped
        assert_eq!(&shape.texture_coords[..2], &[0.0, 1.0]);
        let material = shape.material.as_ref().unwrap();
        assert_eq!(material.diffuse_texture.as_deref(), Some("grass.png"));
        assert_eq!(material.diffuse_colour, Some([0.1, 0.8, 0.2]));
    }

    #[test]
    fn missing_material_library_keeps_geometry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), QUAD_OBJ).unwrap();

        let shapes = load_shapes(&dir.path().join("quad.obj")).unwrap();
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].material.is_none());
    }

    #[test]
    fn missing_file_keeps_the_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_shapes(&dir.path().join("absent.obj")).unwrap_err();
        assert!(err.to_string().starts_with("Could not read"));
        assert!(err.root_cause().downcast_ref::<std::io::Error>().is_some());
    }
}
