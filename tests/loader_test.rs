mod common;

use common::test_utils::{AssetDir, triangle_obj};
use terra_ngin::data_structures::model::Material;
use terra_ngin::data_structures::shape::{ExternalMaterial, GUI_QUAD, Shape};
use terra_ngin::gpu::recording::{GpuCall, RecordingApi};
use terra_ngin::gpu::{
    AttributeSlot, BufferId, Sampling, TextureFace, TextureId, TextureTarget, VertexArrayId,
};
use terra_ngin::resources::GpuResource;

fn triangle() -> Shape {
    Shape {
        positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        texture_coords: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        indices: vec![0, 1, 2],
        material: None,
        group_name: None,
    }
}

fn with_material(material: ExternalMaterial) -> Shape {
    Shape {
        material: Some(material),
        ..triangle()
    }
}

#[test]
fn shape_streams_land_in_fixed_slots() {
    let assets = AssetDir::empty();
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let model = loader.load_shape_to_model(&mut api, &triangle());

    assert_eq!(model.vao, VertexArrayId(1));
    assert_eq!(model.vertex_count, 3);
    assert!(model.indexed);
    assert_eq!(
        api.calls(),
        &[
            GpuCall::CreateVertexArray(VertexArrayId(1)),
            GpuCall::BindVertexArray(Some(VertexArrayId(1))),
            GpuCall::CreateBuffer(BufferId(2)),
            GpuCall::UploadIndices { buffer: BufferId(2), count: 3 },
            GpuCall::CreateBuffer(BufferId(3)),
            GpuCall::UploadAttribute { buffer: BufferId(3), slot: 0, components: 3, len: 9 },
            GpuCall::EnableAttribute(0),
            GpuCall::CreateBuffer(BufferId(4)),
            GpuCall::UploadAttribute { buffer: BufferId(4), slot: 1, components: 2, len: 6 },
            GpuCall::EnableAttribute(1),
            GpuCall::CreateBuffer(BufferId(5)),
            GpuCall::UploadAttribute { buffer: BufferId(5), slot: 2, components: 3, len: 9 },
            GpuCall::EnableAttribute(2),
            GpuCall::BindVertexArray(None),
        ]
    );
    assert_eq!(api.current_vertex_array(), None);
}

#[test]
fn empty_streams_are_skipped() {
    let assets = AssetDir::empty();
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let quad = loader.load_positions_to_model(&mut api, &GUI_QUAD, 2);

    assert_eq!(quad.vertex_count, 4);
    assert!(!quad.indexed);
    let uploads: Vec<_> = api
        .calls()
        .iter()
        .filter_map(|call| match call {
            GpuCall::UploadAttribute { slot, components, .. } => Some((*slot, *components)),
            _ => None,
        })
        .collect();
    assert_eq!(uploads, vec![(0, 2)]);
    assert!(!api.calls().iter().any(|c| matches!(c, GpuCall::UploadIndices { .. })));
}

#[test]
fn attribute_without_components_is_skipped() {
    let assets = AssetDir::empty();
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    loader.store_attribute(&mut api, AttributeSlot::Position, 0, &[1.0, 2.0]);

    assert!(api.calls().is_empty());
    assert!(loader.registered().is_empty());
}

#[test]
fn positions_without_dimensions_give_an_empty_model() {
    let assets = AssetDir::empty();
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let model = loader.load_positions_to_model(&mut api, &[1.0, 2.0], 0);

    assert_eq!(model.vertex_count, 0);
    assert_eq!(loader.registered(), &[GpuResource::VertexArray(model.vao)]);
    assert!(!api.calls().iter().any(|c| matches!(c, GpuCall::CreateBuffer(_))));
}

#[test]
fn missing_texture_touches_no_gpu_state() {
    let assets = AssetDir::empty();
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    assert_eq!(loader.load_texture(&mut api, "missing"), None);
    assert!(api.calls().is_empty());
    assert!(loader.registered().is_empty());
}

#[test]
fn broken_texture_touches_no_gpu_state() {
    let assets = AssetDir::empty();
    assets.write_broken_png("broken");
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    assert_eq!(loader.load_texture(&mut api, "broken"), None);
    assert!(api.calls().is_empty());
}

#[test]
fn texture_is_uploaded_with_linear_clamped_sampling() {
    let assets = AssetDir::empty();
    assets.write_png("fern", 4, 2);
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let texture = loader.load_texture(&mut api, "fern.png").unwrap();

    assert_eq!(
        api.calls(),
        &[
            GpuCall::CreateTexture(texture, TextureTarget::Texture2D),
            GpuCall::UploadTexture {
                texture,
                face: TextureFace::Flat,
                width: 4,
                height: 2,
            },
            GpuCall::SetSampling(texture, Sampling::LINEAR_CLAMP),
        ]
    );
    assert_eq!(loader.registered(), &[GpuResource::Texture(texture)]);
}

#[test]
fn cube_map_uploads_faces_in_order() {
    let assets = AssetDir::empty();
    let names = ["right", "left", "top", "bottom", "back", "front"];
    for name in names {
        assets.write_png(name, 2, 2);
    }
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let texture = loader.load_cube_map(&mut api, names).unwrap();

    let faces: Vec<_> = api
        .calls()
        .iter()
        .filter_map(|call| match call {
            GpuCall::UploadTexture { face, .. } => Some(*face),
            _ => None,
        })
        .collect();
    assert_eq!(faces, TextureFace::CUBE.to_vec());
    assert_eq!(api.calls()[0], GpuCall::CreateTexture(texture, TextureTarget::CubeMap));
}

#[test]
fn cube_map_failure_keeps_earlier_faces() {
    let assets = AssetDir::empty();
    assets.write_png("right", 2, 2);
    assets.write_png("left", 2, 2);
    // "top" is missing, the faces after it exist
    for name in ["bottom", "back", "front"] {
        assets.write_png(name, 2, 2);
    }
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let texture = loader.load_cube_map(
        &mut api,
        ["right", "left", "top", "bottom", "back", "front"],
    );

    assert_eq!(texture, None);
    let cube = TextureId(1);
    assert_eq!(
        api.calls(),
        &[
            GpuCall::CreateTexture(cube, TextureTarget::CubeMap),
            GpuCall::UploadTexture {
                texture: cube,
                face: TextureFace::PositiveX,
                width: 2,
                height: 2,
            },
            GpuCall::UploadTexture {
                texture: cube,
                face: TextureFace::NegativeX,
                width: 2,
                height: 2,
            },
        ]
    );
    // still released on shutdown
    assert_eq!(loader.registered(), &[GpuResource::Texture(cube)]);
}

#[test]
fn cube_map_decode_failure_keeps_earlier_faces() {
    let assets = AssetDir::empty();
    let names = ["right", "left", "top", "bottom", "back", "front"];
    for name in names {
        assets.write_png(name, 2, 2);
    }
    assets.write_broken_png("bottom");
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    assert_eq!(loader.load_cube_map(&mut api, names), None);

    let faces: Vec<_> = api
        .calls()
        .iter()
        .filter_map(|call| match call {
            GpuCall::UploadTexture { face, .. } => Some(*face),
            _ => None,
        })
        .collect();
    assert_eq!(faces, TextureFace::CUBE[..3].to_vec());
    assert!(!api.calls().iter().any(|c| matches!(c, GpuCall::SetSampling(..))));
    assert_eq!(loader.registered(), &[GpuResource::Texture(TextureId(1))]);
}

#[test]
fn shape_without_material_has_none() {
    let assets = AssetDir::empty();
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    assert_eq!(loader.load_material(&mut api, &triangle()), None);
    assert!(api.calls().is_empty());
}

#[test]
fn material_texture_gives_full_texture_weight() {
    let assets = AssetDir::empty();
    assets.write_png("bark", 2, 2);
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let shape = with_material(ExternalMaterial {
        name: "bark".into(),
        diffuse_texture: Some("bark.png".into()),
        diffuse_colour: Some([0.3, 0.2, 0.1]),
    });
    let material = loader.load_material(&mut api, &shape).unwrap();

    assert!(material.texture.is_some());
    assert_eq!(material.texture_weight, 1.0);
    assert_eq!(material.diffuse_colour, Material::DEFAULT_COLOUR);
}

#[test]
fn unloadable_material_texture_falls_back_to_colour() {
    let assets = AssetDir::empty();
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let shape = with_material(ExternalMaterial {
        name: "bark".into(),
        diffuse_texture: Some("bark.png".into()),
        diffuse_colour: Some([0.3, 0.2, 0.1]),
    });
    let material = loader.load_material(&mut api, &shape).unwrap();

    assert_eq!(material.texture, None);
    assert_eq!(material.texture_weight, 0.0);
    assert_eq!(material.diffuse_colour, [0.3, 0.2, 0.1, 1.0]);
}

#[test]
fn material_without_texture_or_colour_is_black() {
    let assets = AssetDir::empty();
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let shape = with_material(ExternalMaterial {
        name: "plain".into(),
        ..Default::default()
    });
    let material = loader.load_material(&mut api, &shape).unwrap();

    assert_eq!(material, Material::coloured(Material::DEFAULT_COLOUR));
}

#[test]
fn obj_models_use_the_texture_override() {
    let assets = AssetDir::empty();
    assets.write_model(
        "fern",
        &triangle_obj("fern"),
        Some("newmtl surface\nKd 0.5 0.5 0.5\nmap_Kd other.png\n"),
    );
    assets.write_png("fern", 2, 2);
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    let models = loader.load_obj_models(&mut api, "fern", Some("fern"));

    assert_eq!(models.len(), 1);
    assert_eq!(models[0].raw_model.vertex_count, 3);
    assert_eq!(models[0].material.texture_weight, 1.0);
    let textures = loader
        .registered()
        .iter()
        .filter(|r| matches!(r, GpuResource::Texture(_)))
        .count();
    assert_eq!(textures, 1);
}

#[test]
fn missing_obj_model_yields_nothing() {
    let assets = AssetDir::empty();
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    assert!(loader.load_obj_models(&mut api, "dragon", None).is_empty());
    assert!(api.calls().is_empty());
}

#[test]
fn shutdown_releases_in_reverse_creation_order() {
    let assets = AssetDir::empty();
    assets.write_png("fern", 2, 2);
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();

    loader.load_shape_to_model(&mut api, &triangle());
    let texture = loader.load_texture(&mut api, "fern").unwrap();
    api.clear_calls();

    loader.shutdown(&mut api);

    assert_eq!(
        api.calls(),
        &[
            GpuCall::DeleteTexture(texture),
            GpuCall::DeleteBuffer(BufferId(5)),
            GpuCall::DeleteBuffer(BufferId(4)),
            GpuCall::DeleteBuffer(BufferId(3)),
            GpuCall::DeleteBuffer(BufferId(2)),
            GpuCall::DeleteVertexArray(VertexArrayId(1)),
        ]
    );
    assert!(loader.registered().is_empty());

    api.clear_calls();
    loader.shutdown(&mut api);
    assert!(api.calls().is_empty());
}
