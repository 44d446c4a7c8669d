use std::path::{Path, PathBuf};
use std::rc::Rc;

use cgmath::Vector3;
use terra_ngin::data_structures::entity::Entity;
use terra_ngin::data_structures::model::{GenericEntity, Material, RawModel, TexturedModel};
use terra_ngin::gpu::VertexArrayId;
use terra_ngin::gpu::recording::GpuCall;
use terra_ngin::resources::{Assets, Loader, MODEL_DIR, SHADER_DIR, TEXTURE_DIR};

pub const DOMAINS: [&str; 4] = ["entity", "terrain", "sky_box", "gui"];

/// A throw-away asset root with `shaders/`, `textures/` and `models/`.
pub struct AssetDir {
    dir: tempfile::TempDir,
}

impl AssetDir {
    /// Empty directories only.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create a temp dir");
        for sub in [SHADER_DIR, TEXTURE_DIR, MODEL_DIR] {
            std::fs::create_dir(dir.path().join(sub)).expect("Failed to create an asset dir");
        }
        Self { dir }
    }

    /// Placeholder sources for every shader domain, enough for the recording backend.
    pub fn with_stub_shaders() -> Self {
        let assets = Self::empty();
        for domain in DOMAINS {
            assets.write_shader(domain, "vsh", &format!("// {} vertex", domain));
            assets.write_shader(domain, "fsh", &format!("// {} fragment", domain));
        }
        assets
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn assets(&self) -> Assets {
        Assets::new(self.root())
    }

    pub fn loader(&self) -> Loader {
        Loader::new(self.assets())
    }

    pub fn write_shader(&self, name: &str, extension: &str, source: &str) {
        let path = self.root().join(SHADER_DIR).join(format!("{}.{}", name, extension));
        std::fs::write(path, source).expect("Failed to write a shader");
    }

    pub fn write_png(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.root().join(TEXTURE_DIR).join(format!("{}.png", name));
        image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]))
            .save(&path)
            .expect("Failed to write a png");
        path
    }

    /// A file named like an image that is not one.
    pub fn write_broken_png(&self, name: &str) {
        let path = self.root().join(TEXTURE_DIR).join(format!("{}.png", name));
        std::fs::write(path, b"not a png").expect("Failed to write a file");
    }

    pub fn write_model(&self, name: &str, obj: &str, mtl: Option<&str>) {
        let dir = self.root().join(MODEL_DIR);
        std::fs::write(dir.join(format!("{}.obj", name)), obj).expect("Failed to write an obj");
        if let Some(mtl) = mtl {
            std::fs::write(dir.join(format!("{}.mtl", name)), mtl).expect("Failed to write an mtl");
        }
    }
}

/// A single textured triangle with a material library named like the model.
pub fn triangle_obj(name: &str) -> String {
    format!(
        "mtllib {name}.mtl
o {name}
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
usemtl surface
f 1/1/1 2/2/1 3/3/1
"
    )
}

/// A model definition whose GPU handles are never dereferenced.
pub fn generic_entity(id: &str, vao: u32) -> Rc<GenericEntity> {
    let raw_model = RawModel {
        vao: VertexArrayId(vao),
        vertex_count: 6,
        indexed: true,
    };
    Rc::new(GenericEntity::new(
        id,
        vec![TexturedModel::new(raw_model, Material::default())],
    ))
}

pub fn entity_at(generic: &Rc<GenericEntity>, x: f32) -> Entity {
    Entity::new(generic.clone(), Vector3::new(x, 0.0, 0.0), 0.0, 0.0, 0.0, 1.0)
}

pub fn count(calls: &[GpuCall], predicate: impl Fn(&GpuCall) -> bool) -> usize {
    calls.iter().filter(|call| predicate(call)).count()
}

pub fn position_of(calls: &[GpuCall], predicate: impl Fn(&GpuCall) -> bool) -> Option<usize> {
    calls.iter().position(|call| predicate(call))
}

/// Root of the shaders shipped with the crate.
pub fn shipped_assets() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}
