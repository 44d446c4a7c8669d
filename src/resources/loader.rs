use crate::data_structures::model::{Material, RawModel, TexturedModel};
use crate::data_structures::shape::Shape;
use crate::gpu::{
    AttributeSlot, BufferId, RenderApi, Sampling, TextureData, TextureFace, TextureId,
    TextureTarget, VertexArrayId,
};
use crate::resources::{Assets, MODEL_DIR, TEXTURE_DIR, mesh, texture};

/// A GPU object created through the [`Loader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpuResource {
    VertexArray(VertexArrayId),
    Buffer(BufferId),
    Texture(TextureId),
}

/// Turns CPU-side shapes and images into GPU objects and owns them.
///
/// Every vertex array, buffer and texture the loader creates is kept in a
/// registry until [`Loader::shutdown`] deletes them, newest first. Failures to
/// find or decode an asset are logged and reported as `None`; they never abort
/// the caller.
pub struct Loader {
    assets: Assets,
    registry: Vec<GpuResource>,
}

impl Loader {
    pub fn new(assets: Assets) -> Self {
        Self {
            assets,
            registry: Vec::new(),
        }
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    /// Everything created so far, in creation order.
    pub fn registered(&self) -> &[GpuResource] {
        &self.registry
    }

    /// Creates a vertex array and leaves it bound.
    pub fn create_vertex_array(&mut self, api: &mut dyn RenderApi) -> VertexArrayId {
        let vao = api.create_vertex_array();
        self.registry.push(GpuResource::VertexArray(vao));
        api.bind_vertex_array(Some(vao));
        vao
    }

    /// Uploads one attribute stream of the bound vertex array.
    ///
    /// An empty stream, or one with zero components per vertex, creates
    /// nothing; the slot stays disabled.
    pub fn store_attribute(
        &mut self,
        api: &mut dyn RenderApi,
        slot: AttributeSlot,
        components: u32,
        data: &[f32],
    ) {
        if data.is_empty() {
            return;
        }
        if components == 0 {
            log::warn!("Attribute {:?} has zero components per vertex, skipped", slot);
            return;
        }
        if data.len() % components as usize != 0 {
            log::warn!(
                "Attribute {:?} has {} floats, not a multiple of {}",
                slot,
                data.len(),
                components
            );
        }
        let buffer = api.create_buffer();
        self.registry.push(GpuResource::Buffer(buffer));
        api.upload_attribute(buffer, slot.index(), components, data);
        api.enable_attribute(slot.index());
    }

    pub fn bind_indices(&mut self, api: &mut dyn RenderApi, indices: &[u32]) {
        if indices.is_empty() {
            return;
        }
        let buffer = api.create_buffer();
        self.registry.push(GpuResource::Buffer(buffer));
        api.upload_indices(buffer, indices);
    }

    /// Uploads a shape: indices, then positions (slot 0), texture
    /// coordinates (slot 1) and normals (slot 2).
    ///
    /// A shape without indices becomes an unindexed model over its positions.
    pub fn load_shape_to_model(&mut self, api: &mut dyn RenderApi, shape: &Shape) -> RawModel {
        let vao = self.create_vertex_array(api);
        self.bind_indices(api, &shape.indices);
        self.store_attribute(api, AttributeSlot::Position, 3, &shape.positions);
        self.store_attribute(api, AttributeSlot::TextureCoords, 2, &shape.texture_coords);
        self.store_attribute(api, AttributeSlot::Normal, 3, &shape.normals);
        api.bind_vertex_array(None);

        let indexed = !shape.indices.is_empty();
        let vertex_count = if indexed {
            shape.indices.len()
        } else {
            shape.vertex_count()
        };
        RawModel {
            vao,
            vertex_count: vertex_count as u32,
            indexed,
        }
    }

    /// Uploads a positions-only model with `dimensions` floats per vertex,
    /// like the GUI quad (2) or the sky box (3).
    pub fn load_positions_to_model(
        &mut self,
        api: &mut dyn RenderApi,
        positions: &[f32],
        dimensions: u32,
    ) -> RawModel {
        let vao = self.create_vertex_array(api);
        self.store_attribute(api, AttributeSlot::Position, dimensions, positions);
        api.bind_vertex_array(None);
        RawModel {
            vao,
            vertex_count: positions.len().checked_div(dimensions as usize).unwrap_or(0) as u32,
            indexed: false,
        }
    }

    /// Material of a shape, `None` when the shape declares none.
    ///
    /// A diffuse texture that loads gives a fully textured material. A missing
    /// or broken texture, or none at all, gives the flat diffuse colour.
    pub fn load_material(&mut self, api: &mut dyn RenderApi, shape: &Shape) -> Option<Material> {
        let external = shape.material.as_ref()?;
        if let Some(file_name) = &external.diffuse_texture {
            if let Some(texture) = self.load_texture(api, file_name) {
                return Some(Material::textured(texture));
            }
        }
        let colour = external
            .diffuse_colour
            .map(|[r, g, b]| [r, g, b, 1.0])
            .unwrap_or(Material::DEFAULT_COLOUR);
        Some(Material::coloured(colour))
    }

    fn decode_texture(&self, file_name: &str) -> Option<TextureData> {
        let Some(path) = self.assets.resolve(TEXTURE_DIR, file_name, "png") else {
            log::warn!("Texture {} not found", file_name);
            return None;
        };
        match texture::decode_image(&path) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("Texture {} could not be loaded: {:#}", file_name, e);
                None
            }
        }
    }

    /// Loads `<textures>/<file_name>.png` into a 2D texture.
    ///
    /// The image is decoded before any GPU call, so a missing or broken file
    /// leaves the GPU untouched.
    pub fn load_texture(&mut self, api: &mut dyn RenderApi, file_name: &str) -> Option<TextureId> {
        let data = self.decode_texture(file_name)?;
        let texture = api.create_texture(TextureTarget::Texture2D);
        self.registry.push(GpuResource::Texture(texture));
        api.upload_texture(texture, TextureFace::Flat, &data);
        api.set_sampling(texture, Sampling::LINEAR_CLAMP);
        Some(texture)
    }

    /// Loads six images into a cube map, in the order +X, -X, +Y, -Y, +Z, -Z.
    ///
    /// Faces are uploaded one by one. When a face fails the load stops there
    /// and returns `None`; the faces before it stay uploaded and the texture
    /// stays registered.
    pub fn load_cube_map(
        &mut self,
        api: &mut dyn RenderApi,
        file_names: [&str; 6],
    ) -> Option<TextureId> {
        let texture = api.create_texture(TextureTarget::CubeMap);
        self.registry.push(GpuResource::Texture(texture));
        for (face, file_name) in TextureFace::CUBE.into_iter().zip(file_names) {
            let Some(data) = self.decode_texture(file_name) else {
                log::warn!("Cube map aborted at face {:?}", face);
                return None;
            };
            api.upload_texture(texture, face, &data);
        }
        api.set_sampling(texture, Sampling::LINEAR_CLAMP);
        Some(texture)
    }

    /// Loads `<models>/<model_name>.obj`, one textured model per group.
    ///
    /// `texture_override` replaces whatever texture the model's materials name.
    /// A model that cannot be read yields no models.
    pub fn load_obj_models(
        &mut self,
        api: &mut dyn RenderApi,
        model_name: &str,
        texture_override: Option<&str>,
    ) -> Vec<TexturedModel> {
        let Some(path) = self.assets.resolve(MODEL_DIR, model_name, "obj") else {
            log::warn!("Model {} not found", model_name);
            return Vec::new();
        };
        let shapes = match mesh::load_shapes(&path) {
            Ok(shapes) => shapes,
            Err(e) => {
                log::warn!("Model {} could not be loaded: {:#}", model_name, e);
                return Vec::new();
            }
        };
        let override_material = texture_override
            .and_then(|name| self.load_texture(api, name))
            .map(Material::textured);

        shapes
            .iter()
            .map(|shape| {
                let raw_model = self.load_shape_to_model(api, shape);
                let material = match override_material {
                    Some(material) => material,
                    None => self.load_material(api, shape).unwrap_or_default(),
                };
                TexturedModel::new(raw_model, material)
            })
            .collect()
    }

    /// Deletes every registered object, newest first.
    pub fn shutdown(&mut self, api: &mut dyn RenderApi) {
        log::debug!("Releasing {} GPU objects", self.registry.len());
        while let Some(resource) = self.registry.pop() {
            match resource {
                GpuResource::VertexArray(vao) => api.delete_vertex_array(vao),
                GpuResource::Buffer(buffer) => api.delete_buffer(buffer),
                GpuResource::Texture(texture) => api.delete_texture(texture),
            }
        }
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        if !self.registry.is_empty() {
            log::warn!(
                "Loader dropped with {} GPU objects still alive, call shutdown first",
                self.registry.len()
            );
        }
    }
}
