use std::sync::Arc;

use serde::Deserialize;

use matforge_animation_core::AnimationBase;
use matforge_material_core::{
    decode_library, encode_library, Connection, Library, Material, NodeId, PersistenceError, Rug,
    SchemaContext,
};
use matforge_params_core::SchemaRegistry;
use matforge_test_fixtures::{materials, schemas};

#[derive(Deserialize)]
struct MaterialFixture {
    name: String,
    comment: String,
    frame_range: [i32; 2],
    nodes: Vec<NodeFixture>,
    connections: Vec<EdgeFixture>,
    keys: Vec<KeyFixture>,
}

#[derive(Deserialize)]
struct NodeFixture {
    schema: String,
    position: [i32; 2],
}

#[derive(Deserialize)]
struct EdgeFixture {
    source: usize,
    source_slot: u8,
    destination: usize,
    destination_slot: u8,
}

#[derive(Deserialize)]
struct KeyFixture {
    node: usize,
    parameter: String,
    frame: i32,
    value: Vec<f32>,
}

fn context_from(json: &str) -> SchemaContext {
    SchemaContext::with_registry(Arc::new(SchemaRegistry::from_json_str(json).expect("registry")))
}

/// Registry the checker-blend fixture was authored against.
fn authored_context() -> SchemaContext {
    context_from(&materials::schema_json("checker-blend").expect("fixture json"))
}

fn build(name: &str, ctx: &SchemaContext) -> Material {
    let fixture: MaterialFixture = materials::load(name).expect("material fixture");
    let mut m = Material::new(fixture.name, ctx.clone());
    m.comment = fixture.comment;
    m.frame_range = fixture.frame_range;

    let ids: Vec<NodeId> = fixture
        .nodes
        .iter()
        .map(|n| {
            let id = m.add_node_by_name(&n.schema).expect("schema in fixture registry");
            m.node_mut(id).unwrap().position = n.position;
            id
        })
        .collect();
    for e in &fixture.connections {
        m.connect(Connection {
            source: ids[e.source],
            source_slot: e.source_slot,
            destination: ids[e.destination],
            destination_slot: e.destination_slot,
        })
        .expect("fixture edge");
    }
    for k in &fixture.keys {
        let node = ids[k.node];
        let parameter = m.parameter_index(node, &k.parameter).unwrap() as u32;
        let bytes: Vec<u8> = k.value.iter().flat_map(|v| v.to_le_bytes()).collect();
        m.bind_animation(node, parameter)
            .unwrap()
            .track
            .set_value_from_bytes(k.frame, &bytes)
            .unwrap();
    }
    m
}

fn decorated_library(ctx: &SchemaContext) -> Library {
    let mut m = build("checker-blend", ctx);
    let ids: Vec<NodeId> = m.nodes().ids().collect();
    m.add_rug(Rug {
        position: [-20, -20],
        size: [300, 200],
        color: 0x3040_50ff,
        comment: "inputs".into(),
    });
    m.pin_parameter(ids[1], 0, true).unwrap();
    m.pin_io(ids[2], 1, true).unwrap();
    m.set_multiplex_input(ids[4], 3, Some(ids[0])).unwrap();
    m.set_background(Some(ids[3])).unwrap();
    m.thumbnail = vec![1, 2, 3, 4];
    m.node_mut(ids[2]).unwrap().input_samplers[1].wrap_u = 2;
    m.set_parameter_from_str(ids[2], "Operation", "3").unwrap();

    let mut lib = Library::new();
    lib.add_material(m);
    lib.add_material(Material::new("Empty", ctx.clone()));
    lib
}

/// it should reproduce the exact bytes after a decode and re-encode
#[test]
fn library_round_trip_is_byte_exact() {
    let ctx = authored_context();
    let lib = decorated_library(&ctx);
    let bytes = encode_library(&lib).unwrap();

    let decoded = decode_library(&bytes, &ctx).unwrap();
    assert_eq!(decoded, lib);
    assert_eq!(encode_library(&decoded).unwrap(), bytes);

    let m = decoded.get_by_name("CheckerBlend").unwrap();
    let ids: Vec<NodeId> = m.nodes().ids().collect();
    assert_eq!(m.background(), Some(ids[3]));
    assert!(m.node(ids[1]).unwrap().is_parameter_pinned(0));
    assert_eq!(m.node(ids[4]).unwrap().multiplex.inputs[3], Some(ids[0]));
    assert_eq!(m.animations().len(), 2);
}

/// it should give decoded nodes fresh handles while keeping their order
#[test]
fn decoded_nodes_get_fresh_handles() {
    let ctx = authored_context();
    let lib = decorated_library(&ctx);
    let decoded = decode_library(&encode_library(&lib).unwrap(), &ctx).unwrap();

    let before = lib.get_by_name("CheckerBlend").unwrap();
    let after = decoded.get_by_name("CheckerBlend").unwrap();
    for (a, b) in before.nodes().iter().zip(after.nodes()) {
        assert_ne!(a.id(), b.id());
        assert_eq!(a.type_name(), b.type_name());
    }
    assert_ne!(before.id(), after.id());
}

/// it should sample decoded tracks the same way as the source graph
#[test]
fn decoded_animation_samples_like_the_source() {
    let ctx = authored_context();
    let bytes = encode_library(&decorated_library(&ctx)).unwrap();
    let mut lib = decode_library(&bytes, &ctx).unwrap();
    let m = lib.get_by_name_mut("CheckerBlend").unwrap();
    let circle = m.nodes().at(1).unwrap().id();

    m.apply_animations(24);
    let radius = m.parameter_block(circle).unwrap().read::<f32>(0).unwrap();
    assert!((radius - 0.5).abs() < 1e-6);
}

/// it should reject data that is not a library or is cut short
#[test]
fn malformed_input_is_rejected() {
    let ctx = authored_context();
    let bytes = encode_library(&decorated_library(&ctx)).unwrap();

    let mut bad = bytes.clone();
    bad[0] = b'X';
    assert_eq!(decode_library(&bad, &ctx), Err(PersistenceError::BadMagic));
    for cut in [4, 9, 20, bytes.len() / 2, bytes.len() - 1] {
        assert_eq!(
            decode_library(&bytes[..cut], &ctx),
            Err(PersistenceError::TruncatedData),
            "cut at {cut}"
        );
    }
}

/// it should fail the whole decode when a node type is no longer registered
#[test]
fn missing_schemas_abort_the_decode() {
    let ctx = authored_context();
    let bytes = encode_library(&decorated_library(&ctx)).unwrap();
    let other = context_from(&schemas::json("structured").unwrap());
    assert!(matches!(
        decode_library(&bytes, &other),
        Err(PersistenceError::UnknownSchema { .. })
    ));
}
