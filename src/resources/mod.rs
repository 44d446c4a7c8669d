//! Loading of shaders, textures and models from the asset directory.
//!
//! Assets live below one root directory:
//!
//! * `shaders/` with `<domain>.vsh` / `<domain>.fsh` WGSL sources,
//! * `textures/` with PNG images,
//! * `models/` with OBJ files and their MTL libraries.

use std::path::{Path, PathBuf};

use anyhow::Context;

mod loader;
pub mod mesh;
pub mod texture;

pub use loader::{GpuResource, Loader};

pub const SHADER_DIR: &str = "shaders";
pub const TEXTURE_DIR: &str = "textures";
pub const MODEL_DIR: &str = "models";

/// Resolves asset names to files below a root directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Finds `<dir>/<name>.<extension>`, retrying with any extension already on
    /// `name` stripped, so `"fern"` and `"fern.png"` both resolve to `fern.png`.
    pub fn resolve(&self, dir: &str, name: &str, extension: &str) -> Option<PathBuf> {
        let dir = self.root.join(dir);
        let candidate = dir.join(format!("{}.{}", name, extension));
        if candidate.is_file() {
            return Some(candidate);
        }
        let stem = Path::new(name).file_stem()?.to_str()?;
        let parent = Path::new(name).parent().unwrap_or(Path::new(""));
        let candidate = dir.join(parent).join(format!("{}.{}", stem, extension));
        candidate.is_file().then_some(candidate)
    }

    pub fn load_string(&self, path: &Path) -> anyhow::Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
    }

    pub fn load_binary(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("Could not read {}", path.display()))
    }

    /// Source text of a shader stage, e.g. `shader_source("entity", "vsh")`.
    pub fn shader_source(&self, name: &str, extension: &str) -> anyhow::Result<String> {
        let path = self
            .resolve(SHADER_DIR, name, extension)
            .with_context(|| {
                format!(
                    "Shader {}.{} not found in {}",
                    name,
                    extension,
                    self.root.display()
                )
            })?;
        self.load_string(&path)
    }
}
