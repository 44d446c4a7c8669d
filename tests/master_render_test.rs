mod common;

use cgmath::{Vector2, Vector3};
use common::test_utils::{AssetDir, DOMAINS, count, entity_at, generic_entity, position_of};
use terra_ngin::config::EngineConfig;
use terra_ngin::data_structures::entity::{Entity, Player};
use terra_ngin::data_structures::model::{GenericEntity, Material, RawModel, TexturedModel};
use terra_ngin::data_structures::scene::{GuiTexture, Light, SkyBox};
use terra_ngin::data_structures::terrain::{HeightMap, Terrain, TerrainTexturesPack};
use terra_ngin::gpu::recording::{GpuCall, RecordingApi};
use terra_ngin::gpu::{Capability, Primitive, ProgramId, TextureId, VertexArrayId};
use terra_ngin::input::{GamePadKey, TouchInput, TouchState};
use terra_ngin::render::MasterRender;
use terra_ngin::resources::Loader;

struct Harness {
    _assets: AssetDir,
    loader: Loader,
    api: RecordingApi,
    master: MasterRender,
}

fn harness_with(assets: AssetDir) -> Harness {
    let mut loader = assets.loader();
    let mut api = RecordingApi::new();
    let config = EngineConfig::default()
        .with_asset_root(assets.root())
        .with_screen_size(200, 100);
    let master = MasterRender::new(&mut api, &mut loader, config);
    api.clear_calls();
    Harness {
        _assets: assets,
        loader,
        api,
        master,
    }
}

fn harness() -> Harness {
    harness_with(AssetDir::with_stub_shaders())
}

fn sun() -> Light {
    Light::new(Vector3::new(10.0, 100.0, 10.0), Vector3::new(1.0, 1.0, 1.0))
}

fn sky_box(texture: Option<TextureId>) -> SkyBox {
    SkyBox {
        model: RawModel {
            vao: VertexArrayId(900),
            vertex_count: 36,
            indexed: false,
        },
        texture,
    }
}

fn x_button() -> GuiTexture {
    GuiTexture::new(None, Vector2::new(0.5, 0.5), Vector2::new(0.1, 0.1))
        .with_game_pad_key(GamePadKey::X)
}

fn bound_vao(vao: u32) -> GpuCall {
    GpuCall::BindVertexArray(Some(VertexArrayId(vao)))
}

fn used_programs(calls: &[GpuCall]) -> Vec<ProgramId> {
    calls
        .iter()
        .filter_map(|call| match call {
            GpuCall::UseProgram(Some(program)) => Some(*program),
            _ => None,
        })
        .collect()
}

#[test]
fn entities_are_batched_by_model() {
    let mut h = harness();
    let fern = generic_entity("fern", 100);
    let tree = generic_entity("tree", 101);
    let entities: Vec<Entity> = vec![
        entity_at(&fern, 1.0),
        entity_at(&tree, 2.0),
        entity_at(&fern, 3.0),
        entity_at(&fern, 4.0),
        entity_at(&tree, 5.0),
    ];

    h.master.process_entities(&entities);

    let batches = h.master.batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches["fern"].len(), 3);
    assert_eq!(batches["tree"].len(), 2);
    assert_eq!(batches.values().map(Vec::len).sum::<usize>(), entities.len());
    let xs: Vec<f32> = batches["fern"].iter().map(|e| e.position.x).collect();
    assert_eq!(xs, vec![1.0, 3.0, 4.0]);
}

#[test]
fn processing_the_same_entities_twice_does_not_duplicate() {
    let mut h = harness();
    let fern = generic_entity("fern", 100);
    let entities = vec![entity_at(&fern, 1.0), entity_at(&fern, 2.0)];

    h.master.process_entities(&entities);
    h.master.process_entities(&entities);

    assert_eq!(h.master.batches()["fern"].len(), 2);

    h.master.process_entities(&[]);
    assert!(h.master.batches().is_empty());
}

#[test]
fn every_entity_is_drawn_once_per_model() {
    let mut h = harness();
    let fern = generic_entity("fern", 100);
    let tree = generic_entity("tree", 101);
    h.master.process_entities(&[
        entity_at(&fern, 1.0),
        entity_at(&fern, 2.0),
        entity_at(&tree, 3.0),
    ]);

    h.master.render(&mut h.api, &sun(), TouchState::default());

    let draws = count(h.api.calls(), |c| {
        matches!(c, GpuCall::DrawElements { primitive: Primitive::Triangles, count: 6 })
    });
    assert_eq!(draws, 3);
    assert_eq!(count(h.api.calls(), |c| *c == bound_vao(100)), 1);
    assert_eq!(count(h.api.calls(), |c| *c == bound_vao(101)), 1);
}

#[test]
fn frame_starts_by_clearing_with_depth_test_on() {
    let mut h = harness();

    h.master.render(&mut h.api, &sun(), TouchState::default());

    assert_eq!(
        &h.api.calls()[..2],
        &[
            GpuCall::SetCapability(Capability::DepthTest, true),
            GpuCall::Clear(EngineConfig::default().clear_colour),
        ]
    );
}

#[test]
fn domains_are_drawn_entities_terrain_sky_box_then_gui() {
    let mut h = harness();
    let fern = generic_entity("fern", 100);
    h.master.process_entities(&[entity_at(&fern, 1.0)]);
    let terrain = Terrain::new(
        &mut h.api,
        &mut h.loader,
        0,
        0,
        TerrainTexturesPack::default(),
        HeightMap::flat(3),
    );
    h.master.process_terrains(vec![terrain]);
    h.master.process_sky_box(sky_box(Some(TextureId(901))));
    h.master.process_guis(vec![x_button()]);
    h.api.clear_calls();

    h.master.render(&mut h.api, &sun(), TouchState::default());

    let entity_program = h.master.entity_renderer().shader().program().unwrap();
    let programs = used_programs(h.api.calls());
    assert_eq!(programs.len(), 4);
    assert_eq!(programs[0], entity_program);
    let mut distinct = programs.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 4);

    let calls = h.api.calls();
    let entity_draw =
        position_of(calls, |c| matches!(c, GpuCall::DrawElements { count: 6, .. })).unwrap();
    let terrain_draw =
        position_of(calls, |c| matches!(c, GpuCall::DrawElements { count: 24, .. })).unwrap();
    let sky_draw =
        position_of(calls, |c| matches!(c, GpuCall::DrawArrays { count: 36, .. })).unwrap();
    let gui_draw = position_of(calls, |c| {
        matches!(c, GpuCall::DrawArrays { primitive: Primitive::TriangleStrip, .. })
    })
    .unwrap();
    assert!(entity_draw < terrain_draw);
    assert!(terrain_draw < sky_draw);
    assert!(sky_draw < gui_draw);
}

#[test]
fn sky_box_without_cube_map_is_skipped() {
    let mut h = harness();
    h.master.process_sky_box(sky_box(None));

    h.master.render(&mut h.api, &sun(), TouchState::default());

    assert_eq!(count(h.api.calls(), |c| matches!(c, GpuCall::DrawArrays { count: 36, .. })), 0);
    assert_eq!(
        count(h.api.calls(), |c| *c == GpuCall::BindVertexArray(Some(VertexArrayId(900)))),
        0
    );
}

#[test]
fn sky_box_is_drawn_without_culling() {
    let mut h = harness();
    h.master.process_sky_box(sky_box(Some(TextureId(901))));

    h.master.render(&mut h.api, &sun(), TouchState::default());

    let calls = h.api.calls();
    let draw = position_of(calls, |c| matches!(c, GpuCall::DrawArrays { count: 36, .. })).unwrap();
    assert_eq!(calls[draw - 1], GpuCall::SetCapability(Capability::CullBackFaces, false));
    assert_eq!(calls[draw + 1], GpuCall::SetCapability(Capability::CullBackFaces, true));
    assert!(calls[..draw].contains(&GpuCall::BindTexture { unit: 0, texture: TextureId(901) }));
}

/// The last call that touched texture unit 0 before `end`.
fn unit_zero_before(calls: &[GpuCall], end: usize) -> Option<&GpuCall> {
    calls[..end].iter().rev().find(|call| {
        matches!(call, GpuCall::BindTexture { unit: 0, .. } | GpuCall::UnbindTexture(0))
    })
}

#[test]
fn untextured_gui_does_not_inherit_the_sky_box_texture() {
    let mut h = harness();
    h.master.process_sky_box(sky_box(Some(TextureId(901))));
    h.master.process_guis(vec![x_button()]);

    h.master.render(&mut h.api, &sun(), TouchState::default());

    let calls = h.api.calls();
    let gui_draw = position_of(calls, |c| {
        matches!(c, GpuCall::DrawArrays { primitive: Primitive::TriangleStrip, .. })
    })
    .unwrap();
    assert_eq!(unit_zero_before(calls, gui_draw), Some(&GpuCall::UnbindTexture(0)));
}

#[test]
fn untextured_entity_does_not_inherit_the_previous_texture() {
    let mut h = harness();
    let model = |vao: u32, material: Material| {
        let raw_model = RawModel {
            vao: VertexArrayId(vao),
            vertex_count: 6,
            indexed: true,
        };
        TexturedModel::new(raw_model, material)
    };
    let tree = std::rc::Rc::new(GenericEntity::new(
        "tree",
        vec![model(100, Material::textured(TextureId(700))), model(101, Material::default())],
    ));
    h.master.process_entities(&[entity_at(&tree, 1.0)]);

    h.master.render(&mut h.api, &sun(), TouchState::default());

    let calls = h.api.calls();
    let bound = position_of(calls, |c| *c == bound_vao(101)).unwrap();
    let draw = bound
        + position_of(&calls[bound..], |c| matches!(c, GpuCall::DrawElements { .. })).unwrap();
    assert_eq!(unit_zero_before(calls, draw), Some(&GpuCall::UnbindTexture(0)));
    assert!(calls[..bound].contains(&GpuCall::BindTexture { unit: 0, texture: TextureId(700) }));
}

#[test]
fn terrain_without_textures_leaves_its_units_empty() {
    let mut h = harness();
    let terrain = Terrain::new(
        &mut h.api,
        &mut h.loader,
        0,
        0,
        TerrainTexturesPack::default(),
        HeightMap::flat(2),
    );
    h.master.process_terrains(vec![terrain]);
    h.api.clear_calls();

    h.master.render(&mut h.api, &sun(), TouchState::default());

    let unbound: Vec<u32> = h
        .api
        .calls()
        .iter()
        .filter_map(|call| match call {
            GpuCall::UnbindTexture(unit) => Some(*unit),
            _ => None,
        })
        .collect();
    assert_eq!(unbound, vec![0, 1, 2, 3, 4]);
}

#[test]
fn gui_pass_restores_depth_and_blending() {
    let mut h = harness();
    h.master.process_guis(vec![x_button(), x_button()]);

    h.master.render(&mut h.api, &sun(), TouchState::default());

    let toggles: Vec<_> = h
        .api
        .calls()
        .iter()
        .filter_map(|call| match call {
            GpuCall::SetCapability(cap @ (Capability::AlphaBlend | Capability::DepthTest), on) => {
                Some((*cap, *on))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        toggles,
        vec![
            (Capability::DepthTest, true),
            (Capability::AlphaBlend, true),
            (Capability::DepthTest, false),
            (Capability::DepthTest, true),
            (Capability::AlphaBlend, false),
        ]
    );
    assert_eq!(
        count(h.api.calls(), |c| matches!(
            c,
            GpuCall::DrawArrays { primitive: Primitive::TriangleStrip, .. }
        )),
        2
    );
}

#[test]
fn transparent_models_are_drawn_without_culling() {
    let mut h = harness();
    let raw_model = RawModel {
        vao: VertexArrayId(100),
        vertex_count: 6,
        indexed: true,
    };
    let fern = std::rc::Rc::new(GenericEntity::new(
        "fern",
        vec![TexturedModel::new(raw_model, Material::default()).with_transparency(true)],
    ));
    h.master.process_entities(&[entity_at(&fern, 1.0)]);

    h.master.render(&mut h.api, &sun(), TouchState::default());

    let calls = h.api.calls();
    let culling = |on: bool| GpuCall::SetCapability(Capability::CullBackFaces, on);
    let off = position_of(calls, |c| *c == culling(false)).unwrap();
    let draw = position_of(calls, |c| matches!(c, GpuCall::DrawElements { .. })).unwrap();
    let on = position_of(calls, |c| *c == culling(true)).unwrap();
    assert!(off < draw);
    assert!(draw < on);
}

#[test]
fn touch_on_a_button_presses_its_key() {
    let mut h = harness();
    h.master.process_guis(vec![x_button()]);

    let pressed = TouchState { pressed: true, x: 0.55, y: 0.45 };
    h.master.render(&mut h.api, &sun(), pressed);
    assert!(h.master.game_pad().is_down(GamePadKey::X));

    let elsewhere = TouchState { pressed: true, x: -0.5, y: 0.5 };
    h.master.render(&mut h.api, &sun(), elsewhere);
    assert!(!h.master.game_pad().is_down(GamePadKey::X));

    let released = TouchState { pressed: false, ..pressed };
    h.master.render(&mut h.api, &sun(), pressed);
    h.master.render(&mut h.api, &sun(), released);
    assert!(!h.master.game_pad().is_down(GamePadKey::X));
}

#[test]
fn touch_during_a_frame_is_seen_by_the_next_one() {
    let mut h = harness();
    h.master.process_guis(vec![x_button()]);
    let mut input = TouchInput::new(200, 100);

    let snapshot = input.snapshot();
    h.master.start_frame_render();
    // lands on the X button while the frame is being rendered
    input.touch_down(150.0, 25.0);
    h.master.render(&mut h.api, &sun(), snapshot);
    h.master.end_frame_render();
    assert!(!h.master.game_pad().is_down(GamePadKey::X));

    h.master.start_frame_render();
    h.master.render(&mut h.api, &sun(), input.snapshot());
    h.master.end_frame_render();
    assert!(h.master.game_pad().is_down(GamePadKey::X));
}

#[test]
fn player_moves_with_the_previous_frame_time_and_camera_follows() {
    let mut h = harness();
    h.master.process_guis(vec![x_button()]);
    let body = generic_entity("player", 300);
    h.master.process_player(Player::new(entity_at(&body, 0.0)));
    h.master.set_time_to_render(0.5);

    let pressed = TouchState { pressed: true, x: 0.5, y: 0.5 };
    h.master.render(&mut h.api, &sun(), pressed);

    let player = h.master.player().unwrap();
    assert!((player.entity.position.z - Player::RUN_SPEED * 0.5).abs() < 1e-4);
    assert_eq!(player.entity.position.x, 0.0);
    assert_eq!(h.master.camera().camera.yaw, 180.0 + player.entity.rot_y);
    // the player is drawn as a batch of its own
    assert_eq!(count(h.api.calls(), |c| *c == bound_vao(300)), 1);
}

#[test]
fn end_frame_records_the_frame_duration() {
    let mut h = harness();
    h.master.set_time_to_render(42.0);

    h.master.start_frame_render();
    h.master.render(&mut h.api, &sun(), TouchState::default());
    h.master.end_frame_render();

    let elapsed = h.master.time_to_render();
    assert!(elapsed >= 0.0 && elapsed < 42.0);

    // without a matching start the duration is kept
    h.master.end_frame_render();
    assert_eq!(h.master.time_to_render(), elapsed);
}

#[test]
fn failed_entity_shader_leaves_other_domains_drawing() {
    let assets = AssetDir::empty();
    for domain in DOMAINS.iter().filter(|d| **d != "entity") {
        assets.write_shader(domain, "vsh", "// vertex");
        assets.write_shader(domain, "fsh", "// fragment");
    }
    let mut h = harness_with(assets);
    let fern = generic_entity("fern", 100);
    h.master.process_entities(&[entity_at(&fern, 1.0)]);
    h.master.process_guis(vec![x_button()]);

    h.master.render(&mut h.api, &sun(), TouchState::default());

    assert!(!h.master.entity_renderer().shader().is_linked());
    assert_eq!(count(h.api.calls(), |c| matches!(c, GpuCall::DrawElements { .. })), 0);
    // terrain and gui still run their programs
    assert_eq!(used_programs(h.api.calls()).len(), 2);
}

#[test]
fn clean_up_releases_programs_and_loader_objects() {
    let mut h = harness();
    let terrain = Terrain::new(
        &mut h.api,
        &mut h.loader,
        0,
        0,
        TerrainTexturesPack::default(),
        HeightMap::flat(2),
    );
    h.master.process_terrains(vec![terrain]);
    assert!(!h.loader.registered().is_empty());
    h.api.clear_calls();

    h.master.clean_up(&mut h.api, &mut h.loader);

    let calls = h.api.calls();
    assert_eq!(count(calls, |c| matches!(c, GpuCall::DeleteProgram(_))), 4);
    assert_eq!(count(calls, |c| matches!(c, GpuCall::DeleteShader(_))), 8);
    // gui quad and terrain mesh
    assert_eq!(count(calls, |c| matches!(c, GpuCall::DeleteVertexArray(_))), 2);
    assert!(h.loader.registered().is_empty());
    let last_program = calls.iter().rposition(|c| matches!(c, GpuCall::DeleteProgram(_))).unwrap();
    let first_loader = position_of(calls, |c| matches!(c, GpuCall::DeleteVertexArray(_))).unwrap();
    assert!(last_program < first_loader);
}
