//! Binary library codec.
//!
//! Layout (little-endian): magic `MFLB`, file version, material count, then one
//! `MATL` chunk per material. Node references are written as positions in the
//! node list (`-1` for none); runtime identifiers are never written and fresh
//! ones are assigned on decode. With an unchanged schema registry,
//! `encode(decode(encode(x))) == encode(x)`.

pub mod chunk;
pub mod format;

use matforge_animation_core::{AnimTrack, AnimationBase, AnimationError, KeyframeTrack, TrackKind};
use matforge_params_core::{ParameterType, SchemaId, MULTIPLEX_SLOT_COUNT};

use crate::context::SchemaContext;
use crate::error::PersistenceError;
use crate::ids::NodeId;
use crate::library::Library;
use crate::material::Material;
use crate::node::{fit_parameters, Connection, InputSampler, MaterialNode, Rug};

use chunk::{to_u32, ChunkReader, ChunkWriter};
use format::{CHUNK_MATERIAL, FILE_VERSION, MAGIC, MATERIAL_VERSION, NO_NODE};

pub fn encode_library(library: &Library) -> Result<Vec<u8>, PersistenceError> {
    let mut w = ChunkWriter::new();
    w.write_tag(MAGIC);
    w.write_u32(FILE_VERSION);
    w.write_count(library.len())?;
    for material in library.iter() {
        write_material(&mut w, material)?;
    }
    Ok(w.into_bytes())
}

pub fn decode_library(bytes: &[u8], ctx: &SchemaContext) -> Result<Library, PersistenceError> {
    let mut r = ChunkReader::new(bytes);
    if r.read_tag().map_err(|_| PersistenceError::BadMagic)? != MAGIC {
        return Err(PersistenceError::BadMagic);
    }
    let version = r.read_u32()?;
    if version != FILE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(version));
    }
    let count = r.read_count(format::CHUNK_HEADER_SIZE)?;
    let mut library = Library::new();
    for _ in 0..count {
        let header = r.read_header()?;
        let mut body = r.chunk_body(&header)?;
        if header.chunk_type != CHUNK_MATERIAL {
            log::warn!("skipping unknown chunk {:?}", header.chunk_type);
            continue;
        }
        if header.version != MATERIAL_VERSION {
            return Err(PersistenceError::UnsupportedVersion(header.version));
        }
        let material = read_material(&mut body, ctx)?;
        log::debug!(
            "decoded material '{}' ({} nodes, {} bindings)",
            material.name,
            material.nodes().len(),
            material.animations().len()
        );
        library.add_material(material);
    }
    Ok(library)
}

fn position_or_none(material: &Material, node: Option<NodeId>) -> i32 {
    node.and_then(|id| material.position_of(id))
        .and_then(|i| i32::try_from(i).ok())
        .unwrap_or(NO_NODE)
}

fn write_material(w: &mut ChunkWriter, m: &Material) -> Result<(), PersistenceError> {
    w.begin_chunk(CHUNK_MATERIAL, MATERIAL_VERSION);
    w.write_string(&m.name)?;
    w.write_string(&m.comment)?;
    w.write_i32(m.frame_range[0]);
    w.write_i32(m.frame_range[1]);
    w.write_i32(position_or_none(m, m.background()));
    w.write_bytes(&m.thumbnail)?;

    w.write_count(m.nodes().len())?;
    for node in m.nodes() {
        w.write_string(node.type_name())?;
        w.write_u32(node.schema().0);
        w.write_i32(node.position[0]);
        w.write_i32(node.position[1]);
        w.write_count(node.input_samplers.len())?;
        for s in &node.input_samplers {
            w.write_u32(s.wrap_u);
            w.write_u32(s.wrap_v);
            w.write_u32(s.filter_min);
            w.write_u32(s.filter_mag);
        }
        w.write_bytes(node.parameters())?;
        w.write_bytes(&node.image)?;
        w.write_i32(node.frame_range[0]);
        w.write_i32(node.frame_range[1]);
        w.write_u32(node.pinned_parameters);
        w.write_u32(node.pinned_io);
    }

    let connections = m.indexed_connections();
    w.write_count(connections.len())?;
    for c in &connections {
        w.write_u32(c.source);
        w.write_u8(c.source_slot);
        w.write_u32(c.destination);
        w.write_u8(c.destination_slot);
    }

    w.write_count(m.rugs.len())?;
    for rug in &m.rugs {
        w.write_i32(rug.position[0]);
        w.write_i32(rug.position[1]);
        w.write_i32(rug.size[0]);
        w.write_i32(rug.size[1]);
        w.write_u32(rug.color);
        w.write_string(&rug.comment)?;
    }

    for row in m.multiplex_table() {
        for slot in row {
            w.write_i32(slot);
        }
    }

    let bindings = m.indexed_bindings();
    w.write_count(bindings.len())?;
    for (node, parameter, ty, track) in bindings {
        w.write_u32(to_u32(node)?);
        w.write_u32(parameter);
        w.write_u32(ty.tag());
        w.write_i32_slice(track.frames())?;
        w.write_bytes(track.raw_bytes())?;
    }

    w.end_chunk()
}

fn node_at(ids: &[NodeId], index: i32, what: &'static str) -> Result<Option<NodeId>, PersistenceError> {
    if index == NO_NODE {
        return Ok(None);
    }
    usize::try_from(index)
        .ok()
        .and_then(|i| ids.get(i))
        .map(|id| Some(*id))
        .ok_or(PersistenceError::DanglingIndex {
            what,
            index,
            count: ids.len(),
        })
}

fn required_node(ids: &[NodeId], index: u32, what: &'static str) -> Result<NodeId, PersistenceError> {
    let index = i32::try_from(index).unwrap_or(i32::MAX);
    node_at(ids, index, what)?.ok_or(PersistenceError::DanglingIndex {
        what,
        index,
        count: ids.len(),
    })
}

/// Fit a persisted buffer to the schema's current size, keeping the stored
/// prefix and filling any tail from the schema defaults.
fn migrate_parameters(stored: Vec<u8>, defaults: Vec<u8>, type_name: &str) -> Vec<u8> {
    if stored.len() == defaults.len() {
        return stored;
    }
    log::warn!(
        "node '{}': stored parameters are {} bytes, schema expects {}; migrating",
        type_name,
        stored.len(),
        defaults.len()
    );
    fit_parameters(&stored, defaults)
}

fn read_node(r: &mut ChunkReader<'_>, ctx: &SchemaContext) -> Result<MaterialNode, PersistenceError> {
    let type_name = r.read_string()?;
    let stored_id = SchemaId(r.read_u32()?);
    let schema = ctx
        .registry()
        .index_of(&type_name)
        .ok_or_else(|| PersistenceError::UnknownSchema {
            name: type_name.clone(),
            id: stored_id,
        })?;
    if schema != stored_id {
        log::debug!("node '{}' moved from {:?} to {:?}", type_name, stored_id, schema);
    }
    let position = [r.read_i32()?, r.read_i32()?];
    let sampler_count = r.read_count(16)?;
    let mut input_samplers = Vec::with_capacity(sampler_count);
    for _ in 0..sampler_count {
        input_samplers.push(InputSampler {
            wrap_u: r.read_u32()?,
            wrap_v: r.read_u32()?,
            filter_min: r.read_u32()?,
            filter_mag: r.read_u32()?,
        });
    }
    let defaults = ctx.init_defaults(schema).map_err(crate::error::GraphError::from)?;
    let parameters = migrate_parameters(r.read_bytes()?, defaults, &type_name);
    let image = r.read_bytes()?;
    let frame_range = [r.read_i32()?, r.read_i32()?];

    let mut node = MaterialNode::new(schema, type_name, parameters, 0, frame_range);
    node.position = position;
    node.input_samplers = input_samplers;
    node.image = image;
    node.pinned_parameters = r.read_u32()?;
    node.pinned_io = r.read_u32()?;
    Ok(node)
}

fn read_binding(
    r: &mut ChunkReader<'_>,
    ids: &[NodeId],
) -> Result<AnimTrack<NodeId>, PersistenceError> {
    let node = required_node(ids, r.read_u32()?, "animation binding")?;
    let parameter = r.read_u32()?;
    let tag = r.read_u32()?;
    let value_type = ParameterType::from_tag(tag).ok_or(PersistenceError::UnknownValueType(tag))?;
    let kind = TrackKind::for_parameter(value_type).ok_or(AnimationError::NotAnimatable(value_type))?;
    let frames = r.read_i32_vec()?;
    let values = r.read_bytes()?;
    Ok(AnimTrack {
        node,
        parameter,
        value_type,
        track: KeyframeTrack::from_raw_parts(kind, frames, &values)?,
    })
}

fn read_material(r: &mut ChunkReader<'_>, ctx: &SchemaContext) -> Result<Material, PersistenceError> {
    let mut m = Material::new(r.read_string()?, ctx.clone());
    m.comment = r.read_string()?;
    m.frame_range = [r.read_i32()?, r.read_i32()?];
    let background = r.read_i32()?;
    m.thumbnail = r.read_bytes()?;

    let node_count = r.read_count(4)?;
    let mut ids = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        ids.push(m.push_node(read_node(r, ctx)?));
    }
    m.background = node_at(&ids, background, "background node")?;

    let connection_count = r.read_count(10)?;
    for _ in 0..connection_count {
        let source = required_node(&ids, r.read_u32()?, "connection source")?;
        let source_slot = r.read_u8()?;
        let destination = required_node(&ids, r.read_u32()?, "connection destination")?;
        let destination_slot = r.read_u8()?;
        m.connections.push(Connection {
            source,
            source_slot,
            destination,
            destination_slot,
        });
    }

    let rug_count = r.read_count(24)?;
    for _ in 0..rug_count {
        m.rugs.push(Rug {
            position: [r.read_i32()?, r.read_i32()?],
            size: [r.read_i32()?, r.read_i32()?],
            color: r.read_u32()?,
            comment: r.read_string()?,
        });
    }

    for id in &ids {
        let mut inputs = [None; MULTIPLEX_SLOT_COUNT];
        for slot in inputs.iter_mut() {
            *slot = node_at(&ids, r.read_i32()?, "multiplexer input")?;
        }
        if let Some(node) = m.node_mut(*id) {
            node.multiplex.inputs = inputs;
        }
    }

    let binding_count = r.read_count(20)?;
    for _ in 0..binding_count {
        m.animations.insert(read_binding(r, &ids)?);
    }
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use matforge_params_core::{NodeSchema, ParameterDescriptor, SchemaRegistry};

    fn registry(extra: bool) -> SchemaRegistry {
        let mut params = vec![ParameterDescriptor::new("Size", ParameterType::Float).with_default("2")];
        if extra {
            params.push(ParameterDescriptor::new("Tint", ParameterType::Color4).with_default("1 1 1 1"));
        }
        let mut node = NodeSchema::new("Blob").with_output("out", ParameterType::Float4);
        node.params = params;
        SchemaRegistry::new("t", vec![node]).unwrap()
    }

    fn one_node_library(ctx: &SchemaContext) -> Library {
        let mut m = Material::new("M", ctx.clone());
        let n = m.add_node(SchemaId(0)).unwrap();
        m.write_parameter(n, 0, &5.0f32.to_le_bytes()).unwrap();
        let mut lib = Library::new();
        lib.add_material(m);
        lib
    }

    #[test]
    fn rejects_foreign_data() {
        let ctx = SchemaContext::with_registry(Arc::new(registry(false)));
        assert_eq!(decode_library(b"NOPE\x01\0\0\0", &ctx), Err(PersistenceError::BadMagic));
        assert_eq!(decode_library(b"MF", &ctx), Err(PersistenceError::BadMagic));
        assert_eq!(
            decode_library(b"MFLB\x02\0\0\0\0\0\0\0", &ctx),
            Err(PersistenceError::UnsupportedVersion(2))
        );
        let bytes = encode_library(&one_node_library(&ctx)).unwrap();
        assert_eq!(
            decode_library(&bytes[..bytes.len() - 3], &ctx),
            Err(PersistenceError::TruncatedData)
        );
    }

    #[test]
    fn grown_schemas_pad_with_defaults() {
        let old = SchemaContext::with_registry(Arc::new(registry(false)));
        let bytes = encode_library(&one_node_library(&old)).unwrap();

        let new = SchemaContext::with_registry(Arc::new(registry(true)));
        let lib = decode_library(&bytes, &new).unwrap();
        let m = lib.get_by_name("M").unwrap();
        let node = m.nodes().at(0).unwrap();
        let block = m.parameter_block(node.id()).unwrap();
        assert_eq!(block.read::<f32>(0), Ok(5.0));
        assert_eq!(block.read::<[f32; 4]>(1), Ok([1.0; 4]));
    }

    #[test]
    fn unknown_schemas_fail_the_decode() {
        let ctx = SchemaContext::with_registry(Arc::new(registry(false)));
        let bytes = encode_library(&one_node_library(&ctx)).unwrap();
        let empty = SchemaContext::with_registry(Arc::new(SchemaRegistry::new("t", vec![]).unwrap()));
        assert!(matches!(
            decode_library(&bytes, &empty),
            Err(PersistenceError::UnknownSchema { .. })
        ));
    }
}
