//! Graph elements: nodes, their samplers, connections, comment rugs and
//! multiplexer routing.

use serde::{Deserialize, Serialize};

use matforge_params_core::{SchemaId, MULTIPLEX_SLOT_COUNT};

use crate::ids::{Identified, NodeId};

/// Texture sampling state of one node input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSampler {
    pub wrap_u: u32,
    pub wrap_v: u32,
    pub filter_min: u32,
    pub filter_mag: u32,
}

/// A commented rectangle drawn behind a group of nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rug {
    pub position: [i32; 2],
    pub size: [i32; 2],
    pub color: u32,
    pub comment: String,
}

/// Directed edge from an output slot to an input slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub source: NodeId,
    pub source_slot: u8,
    pub destination: NodeId,
    pub destination_slot: u8,
}

/// [`Connection`] expressed with node positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexedConnection {
    pub source: u32,
    pub source_slot: u8,
    pub destination: u32,
    pub destination_slot: u8,
}

/// Alternate sources of a multiplexer node. Unset slots are `None`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MultiplexInput {
    pub inputs: [Option<NodeId>; MULTIPLEX_SLOT_COUNT],
}

impl MultiplexInput {
    /// Clear every slot pointing at `node`; returns how many were cleared.
    pub fn clear_node(&mut self, node: NodeId) -> usize {
        let mut cleared = 0;
        for slot in self.inputs.iter_mut().filter(|s| **s == Some(node)) {
            *slot = None;
            cleared += 1;
        }
        cleared
    }

    /// Positional form, `-1` for unset slots or sources `position` cannot place.
    pub fn to_indices(&self, position: impl Fn(NodeId) -> Option<usize>) -> [i32; MULTIPLEX_SLOT_COUNT] {
        self.inputs.map(|slot| {
            slot.and_then(&position)
                .and_then(|i| i32::try_from(i).ok())
                .unwrap_or(-1)
        })
    }
}

/// One node instance of a material.
///
/// The schema and parameter buffer are only changed through the owning
/// [`crate::Material`], which keeps the buffer at its schema's size and bumps
/// [`MaterialNode::revision`] on every successful write.
#[derive(Clone, Debug)]
pub struct MaterialNode {
    id: NodeId,
    schema: SchemaId,
    type_name: String,
    pub position: [i32; 2],
    pub input_samplers: Vec<InputSampler>,
    parameters: Vec<u8>,
    pub image: Vec<u8>,
    pub frame_range: [i32; 2],
    pub pinned_parameters: u32,
    pub pinned_io: u32,
    pub multiplex: MultiplexInput,
    revision: u64,
}

impl MaterialNode {
    pub(crate) fn new(
        schema: SchemaId,
        type_name: impl Into<String>,
        parameters: Vec<u8>,
        input_count: usize,
        frame_range: [i32; 2],
    ) -> Self {
        MaterialNode {
            id: NodeId::fresh(),
            schema,
            type_name: type_name.into(),
            position: [0, 0],
            input_samplers: vec![InputSampler::default(); input_count],
            parameters,
            image: Vec::new(),
            frame_range,
            pinned_parameters: 0,
            pinned_io: 0,
            multiplex: MultiplexInput::default(),
            revision: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    /// Schema name recorded when the node was created or last retyped.
    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Packed parameter bytes, laid out per the node's schema.
    #[inline]
    pub fn parameters(&self) -> &[u8] {
        &self.parameters
    }

    /// Incremented on every parameter write; consumers re-read the buffer when
    /// it changes.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Does not bump the revision; call [`Self::mark_changed`] once the write
    /// has succeeded.
    pub(crate) fn parameters_mut(&mut self) -> &mut [u8] {
        &mut self.parameters
    }

    pub(crate) fn mark_changed(&mut self) {
        self.revision += 1;
    }

    /// Retype the node. `parameters` must already match the new layout.
    pub(crate) fn replace_schema(&mut self, schema: SchemaId, type_name: String, parameters: Vec<u8>) {
        self.schema = schema;
        self.type_name = type_name;
        self.parameters = parameters;
        self.revision += 1;
    }

    pub fn is_parameter_pinned(&self, index: usize) -> bool {
        index < 32 && self.pinned_parameters & (1 << index) != 0
    }

    pub fn is_io_pinned(&self, index: usize) -> bool {
        index < 32 && self.pinned_io & (1 << index) != 0
    }

    /// True when `frame` lies inside the node's valid range (inclusive).
    pub fn is_active_at(&self, frame: i32) -> bool {
        (self.frame_range[0]..=self.frame_range[1]).contains(&frame)
    }
}

/// Fit a stored buffer to a layout whose defaults are `defaults`: the shared
/// prefix is kept and the remainder comes from the defaults.
pub(crate) fn fit_parameters(stored: &[u8], mut defaults: Vec<u8>) -> Vec<u8> {
    let shared = stored.len().min(defaults.len());
    defaults[..shared].copy_from_slice(&stored[..shared]);
    defaults
}

impl Identified for MaterialNode {
    type Id = NodeId;

    fn runtime_id(&self) -> NodeId {
        self.id
    }
}

/// Persisted content only: runtime id, revision and multiplexer handles are
/// not compared.
impl PartialEq for MaterialNode {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.type_name == other.type_name
            && self.position == other.position
            && self.input_samplers == other.input_samplers
            && self.parameters == other.parameters
            && self.image == other.image
            && self.frame_range == other.frame_range
            && self.pinned_parameters == other.pinned_parameters
            && self.pinned_io == other.pinned_io
    }
}
