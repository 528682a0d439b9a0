//! Material graphs.
//!
//! Nodes live in an identity-ordered collection; connections, animation
//! bindings, multiplexer slots and the background marker all refer to nodes by
//! [`NodeId`]. Deleting a node therefore only drops the references to that
//! node; nothing is renumbered. Positional views are produced on demand for
//! persistence and for consumers that address nodes by index.

use matforge_animation_core::{AnimTrack, AnimatedParameterSet, AnimationBase, KeyframeTrack};
use matforge_params_core::{
    parse_parameter, LayoutError, ParameterBlock, ParameterBlockMut, ParameterType, SchemaId,
    MULTIPLEX_SLOT_COUNT,
};

use crate::context::SchemaContext;
use crate::error::GraphError;
use crate::ids::{Identified, MaterialId, NodeId};
use crate::node::{fit_parameters, Connection, IndexedConnection, InputSampler, MaterialNode, Rug};
use crate::ordered::{AsyncId, Ordered};

/// Binding in positional form: node position, parameter index, value type and track.
pub type IndexedBinding<'a> = (usize, u32, ParameterType, &'a KeyframeTrack);

#[derive(Clone, Debug)]
pub struct Material {
    id: MaterialId,
    ctx: SchemaContext,
    pub name: String,
    pub comment: String,
    pub(crate) nodes: Ordered<MaterialNode>,
    pub(crate) connections: Vec<Connection>,
    pub rugs: Vec<Rug>,
    pub(crate) animations: AnimatedParameterSet<NodeId>,
    pub frame_range: [i32; 2],
    pub(crate) background: Option<NodeId>,
    pub thumbnail: Vec<u8>,
}

impl Identified for Material {
    type Id = MaterialId;

    fn runtime_id(&self) -> MaterialId {
        self.id
    }
}

impl Material {
    pub fn new(name: impl Into<String>, ctx: SchemaContext) -> Self {
        let frame_range = ctx.config().material_frame_range;
        Material {
            id: MaterialId::fresh(),
            ctx,
            name: name.into(),
            comment: String::new(),
            nodes: Ordered::new(),
            connections: Vec::new(),
            rugs: Vec::new(),
            animations: AnimatedParameterSet::new(),
            frame_range,
            background: None,
            thumbnail: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn context(&self) -> &SchemaContext {
        &self.ctx
    }

    // ---- nodes ----

    pub fn nodes(&self) -> &Ordered<MaterialNode> {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&MaterialNode> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's editor state (position, samplers, image).
    /// Parameter bytes stay read-only here; use the parameter methods below.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut MaterialNode> {
        self.nodes.get_mut(id)
    }

    fn require(&self, id: NodeId) -> Result<&MaterialNode, GraphError> {
        self.nodes.get(id).ok_or(GraphError::UnknownNode(id))
    }

    fn require_mut(&mut self, id: NodeId) -> Result<&mut MaterialNode, GraphError> {
        self.nodes.get_mut(id).ok_or(GraphError::UnknownNode(id))
    }

    /// Resolve a captured `(position, id)` pair, tolerating reorders.
    pub fn node_async(&self, key: AsyncId<NodeId>) -> Option<&MaterialNode> {
        self.nodes.get_async(key)
    }

    pub fn node_async_mut(&mut self, key: AsyncId<NodeId>) -> Option<&mut MaterialNode> {
        self.nodes.get_async_mut(key)
    }

    pub fn node_async_id(&self, id: NodeId) -> Option<AsyncId<NodeId>> {
        self.nodes.async_id(id)
    }

    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.position_of(id)
    }

    fn build_node(&self, schema: SchemaId) -> Result<MaterialNode, GraphError> {
        let parameters = self.ctx.init_defaults(schema)?;
        let desc = self.ctx.schema(schema)?;
        Ok(MaterialNode::new(
            schema,
            desc.name.clone(),
            parameters,
            desc.inputs.len(),
            self.ctx.config().node_frame_range,
        ))
    }

    /// Append a node of type `schema` with default parameters.
    pub fn add_node(&mut self, schema: SchemaId) -> Result<NodeId, GraphError> {
        let node = self.build_node(schema)?;
        let id = node.id();
        log::debug!("material '{}': add {} as {:?}", self.name, node.type_name(), id);
        self.nodes.push(node);
        Ok(id)
    }

    pub fn add_node_by_name(&mut self, schema: &str) -> Result<NodeId, GraphError> {
        let id = self
            .ctx
            .registry()
            .index_of(schema)
            .ok_or_else(|| LayoutError::UnknownSchemaName(schema.to_string()))?;
        self.add_node(id)
    }

    /// Insert a node at `index` (clamped to the end). Existing handles stay valid.
    pub fn insert_node(&mut self, index: usize, schema: SchemaId) -> Result<NodeId, GraphError> {
        let node = self.build_node(schema)?;
        let id = node.id();
        let at = self.nodes.insert(index, node);
        log::debug!("material '{}': insert {:?} at {}", self.name, id, at);
        Ok(id)
    }

    /// Retype `node` as `schema`. Parameter bytes shared by both layouts are
    /// kept and the rest take the new defaults. Input samplers follow the new
    /// input count; edges on vanished slots and bindings whose parameter no
    /// longer exists with the same type are dropped.
    pub fn change_node_schema(&mut self, node: NodeId, schema: SchemaId) -> Result<(), GraphError> {
        let defaults = self.ctx.init_defaults(schema)?;
        let desc = self.ctx.schema(schema)?;
        let (type_name, inputs, outputs) = (desc.name.clone(), desc.inputs.len(), desc.outputs.len());
        let target = self.nodes.get_mut(node).ok_or(GraphError::UnknownNode(node))?;
        let parameters = fit_parameters(target.parameters(), defaults);
        let previous = target.schema();
        target.replace_schema(schema, type_name, parameters);
        target.input_samplers.resize(inputs, InputSampler::default());

        let edges = self.connections.len();
        self.connections.retain(|c| {
            !(c.destination == node && usize::from(c.destination_slot) >= inputs)
                && !(c.source == node && usize::from(c.source_slot) >= outputs)
        });
        let bindings = self.animations.len();
        let registry = self.ctx.registry();
        self.animations.retain(|b| {
            b.node != node || registry.parameter_type(schema, b.parameter as usize) == Ok(b.value_type)
        });
        log::debug!(
            "material '{}': {:?} retyped {:?} -> {:?} ({} edges, {} bindings dropped)",
            self.name,
            node,
            previous,
            schema,
            edges - self.connections.len(),
            bindings - self.animations.len()
        );
        Ok(())
    }

    pub(crate) fn push_node(&mut self, node: MaterialNode) -> NodeId {
        let id = node.id();
        self.nodes.push(node);
        id
    }

    /// Delete a node together with every connection and binding that touches
    /// it. Multiplexer slots pointing at it are cleared.
    pub fn delete_node(&mut self, id: NodeId) -> Result<MaterialNode, GraphError> {
        let (index, node) = self.nodes.remove(id).ok_or(GraphError::UnknownNode(id))?;
        let edges = self.connections.len();
        self.connections
            .retain(|c| c.source != id && c.destination != id);
        let bindings = self.animations.remove_node(id);
        let mut slots = 0;
        for other in self.nodes.iter_mut() {
            slots += other.multiplex.clear_node(id);
        }
        if self.background == Some(id) {
            self.background = None;
        }
        log::debug!(
            "material '{}': delete {:?} at {} ({} edges, {} bindings, {} mux slots)",
            self.name,
            id,
            index,
            edges - self.connections.len(),
            bindings,
            slots
        );
        Ok(node)
    }

    pub fn background(&self) -> Option<NodeId> {
        self.background
    }

    pub fn set_background(&mut self, node: Option<NodeId>) -> Result<(), GraphError> {
        if let Some(id) = node {
            self.require(id)?;
        }
        self.background = node;
        Ok(())
    }

    // ---- connections ----

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn check_slot(
        &self,
        node: &MaterialNode,
        slot: u8,
        direction: &'static str,
    ) -> Result<(), GraphError> {
        if !self.ctx.config().validate_slots {
            return Ok(());
        }
        let schema = self.ctx.schema(node.schema())?;
        let count = match direction {
            "input" => schema.inputs.len(),
            _ => schema.outputs.len(),
        };
        if usize::from(slot) >= count {
            return Err(GraphError::SlotOutOfRange {
                schema: schema.name.clone(),
                direction,
                slot,
                count,
            });
        }
        Ok(())
    }

    /// Add `connection`. An input slot accepts a single edge, so an existing
    /// edge into the same destination slot is replaced and returned.
    pub fn connect(&mut self, connection: Connection) -> Result<Option<Connection>, GraphError> {
        if connection.source == connection.destination {
            return Err(GraphError::SelfConnection);
        }
        let source = self.require(connection.source)?;
        let destination = self.require(connection.destination)?;
        self.check_slot(source, connection.source_slot, "output")?;
        self.check_slot(destination, connection.destination_slot, "input")?;

        let replaced = self.disconnect(connection.destination, connection.destination_slot);
        if let Some(old) = &replaced {
            log::debug!("material '{}': replacing edge {:?}", self.name, old);
        }
        self.connections.push(connection);
        Ok(replaced)
    }

    /// Remove the edge feeding `destination`'s input `slot`, if any.
    pub fn disconnect(&mut self, destination: NodeId, slot: u8) -> Option<Connection> {
        let i = self
            .connections
            .iter()
            .position(|c| c.destination == destination && c.destination_slot == slot)?;
        Some(self.connections.remove(i))
    }

    pub fn connections_into(&self, node: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.destination == node)
    }

    pub fn connections_from(&self, node: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.source == node)
    }

    /// Connections with node handles replaced by current positions.
    pub fn indexed_connections(&self) -> Vec<IndexedConnection> {
        self.connections
            .iter()
            .filter_map(|c| {
                Some(IndexedConnection {
                    source: self.nodes.position_of(c.source)? as u32,
                    source_slot: c.source_slot,
                    destination: self.nodes.position_of(c.destination)? as u32,
                    destination_slot: c.destination_slot,
                })
            })
            .collect()
    }

    // ---- parameters ----

    pub fn parameter_index(&self, node: NodeId, name: &str) -> Result<usize, GraphError> {
        let schema = self.ctx.schema(self.require(node)?.schema())?;
        schema.parameter_index(name).ok_or_else(|| {
            GraphError::Layout(LayoutError::UnknownParameter {
                schema: schema.name.clone(),
                name: name.to_string(),
            })
        })
    }

    /// Read-only typed view of a node's parameters.
    pub fn parameter_block(&self, node: NodeId) -> Result<ParameterBlock<'_>, GraphError> {
        let node = self.require(node)?;
        let layout = self.ctx.layout(node.schema())?;
        Ok(ParameterBlock::new(layout, node.parameters())?)
    }

    fn edit_parameters<R>(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut ParameterBlockMut<'_>) -> Result<R, LayoutError>,
    ) -> Result<R, GraphError> {
        let node = self.nodes.get_mut(node).ok_or(GraphError::UnknownNode(node))?;
        let layout = self.ctx.layout(node.schema())?;
        let mut block = ParameterBlockMut::new(layout, node.parameters_mut())?;
        let out = f(&mut block)?;
        node.mark_changed();
        Ok(out)
    }

    /// Overwrite the start of parameter `index` with `bytes`.
    pub fn write_parameter(&mut self, node: NodeId, index: usize, bytes: &[u8]) -> Result<(), GraphError> {
        self.edit_parameters(node, |block| block.write_parameter(index, bytes))
    }

    pub fn set_parameter_component(
        &mut self,
        node: NodeId,
        index: usize,
        component: usize,
        value: f32,
    ) -> Result<(), GraphError> {
        self.edit_parameters(node, |block| {
            block.set_component_from_float(index, component, value)
        })
    }

    /// Parse `text` as the named parameter's type and store it.
    pub fn set_parameter_from_str(&mut self, node: NodeId, name: &str, text: &str) -> Result<(), GraphError> {
        let index = self.parameter_index(node, name)?;
        let ty = self.ctx.registry().parameter_type(self.require(node)?.schema(), index)?;
        let bytes = parse_parameter(text, ty)?;
        self.write_parameter(node, index, &bytes)
    }

    // ---- pins ----

    fn pin_bit(index: usize) -> Result<u32, GraphError> {
        if index >= 32 {
            return Err(GraphError::PinOutOfRange { index });
        }
        Ok(1 << index)
    }

    pub fn pin_parameter(&mut self, node: NodeId, index: usize, pinned: bool) -> Result<(), GraphError> {
        let bit = Self::pin_bit(index)?;
        let node = self.require_mut(node)?;
        if pinned {
            node.pinned_parameters |= bit;
        } else {
            node.pinned_parameters &= !bit;
        }
        Ok(())
    }

    pub fn pin_io(&mut self, node: NodeId, index: usize, pinned: bool) -> Result<(), GraphError> {
        let bit = Self::pin_bit(index)?;
        let node = self.require_mut(node)?;
        if pinned {
            node.pinned_io |= bit;
        } else {
            node.pinned_io &= !bit;
        }
        Ok(())
    }

    // ---- multiplexers ----

    /// Point multiplexer `slot` of `node` at `source`, or clear it with `None`.
    pub fn set_multiplex_input(
        &mut self,
        node: NodeId,
        slot: usize,
        source: Option<NodeId>,
    ) -> Result<(), GraphError> {
        if slot >= MULTIPLEX_SLOT_COUNT {
            return Err(GraphError::MultiplexSlot { slot });
        }
        if let Some(src) = source {
            if src == node {
                return Err(GraphError::SelfConnection);
            }
            self.require(src)?;
        }
        self.require_mut(node)?.multiplex.inputs[slot] = source;
        Ok(())
    }

    /// Per-node multiplexer table in positional form (`-1` = unset).
    pub fn multiplex_table(&self) -> Vec<[i32; MULTIPLEX_SLOT_COUNT]> {
        self.nodes
            .iter()
            .map(|n| n.multiplex.to_indices(|id| self.nodes.position_of(id)))
            .collect()
    }

    // ---- rugs ----

    pub fn add_rug(&mut self, rug: Rug) -> usize {
        self.rugs.push(rug);
        self.rugs.len() - 1
    }

    pub fn remove_rug(&mut self, index: usize) -> Option<Rug> {
        (index < self.rugs.len()).then(|| self.rugs.remove(index))
    }

    // ---- animation ----

    pub fn animations(&self) -> &AnimatedParameterSet<NodeId> {
        &self.animations
    }

    pub fn animation(&self, node: NodeId, parameter: u32) -> Option<&AnimTrack<NodeId>> {
        self.animations.get(node, parameter)
    }

    pub fn animation_mut(&mut self, node: NodeId, parameter: u32) -> Option<&mut AnimTrack<NodeId>> {
        self.animations.get_mut(node, parameter)
    }

    /// Bind parameter `parameter` of `node` to a track of its schema type.
    pub fn bind_animation(
        &mut self,
        node: NodeId,
        parameter: u32,
    ) -> Result<&mut AnimTrack<NodeId>, GraphError> {
        let schema = self.require(node)?.schema();
        let ty = self
            .ctx
            .registry()
            .parameter_type(schema, parameter as usize)?;
        Ok(self.animations.bind(node, parameter, ty)?)
    }

    pub fn unbind_animation(&mut self, node: NodeId, parameter: u32) -> Option<AnimTrack<NodeId>> {
        self.animations.unbind(node, parameter)
    }

    /// Record the parameter's current buffer value as a key at `frame`,
    /// binding the parameter first when needed. Returns the key index.
    pub fn key_current_value(&mut self, node: NodeId, parameter: u32, frame: i32) -> Result<usize, GraphError> {
        let block = self.parameter_block(node)?;
        let current = block.parameter_bytes(parameter as usize)?.to_vec();
        let binding = self.bind_animation(node, parameter)?;
        Ok(binding.track.set_value_from_bytes(frame, &current)?)
    }

    /// Sample every binding at `frame` into its node's buffer. Returns the
    /// nodes whose parameters were written; unkeyed tracks write nothing.
    pub fn apply_animations(&mut self, frame: i32) -> Vec<NodeId> {
        let mut touched: Vec<NodeId> = Vec::new();
        for binding in self.animations.iter() {
            if binding.track.is_empty() {
                continue;
            }
            let Some(node) = self.nodes.get_mut(binding.node) else {
                continue;
            };
            let range = self
                .ctx
                .layout(node.schema())
                .and_then(|l| l.range(binding.parameter as usize));
            let slot = match range {
                Ok(range) => node.parameters_mut().get_mut(range),
                Err(_) => None,
            };
            let Some(slot) = slot else {
                log::warn!(
                    "binding {:?}/{} does not match the node schema",
                    binding.node,
                    binding.parameter
                );
                continue;
            };
            if !binding.track.sample_into(frame, slot) {
                continue;
            }
            node.mark_changed();
            if !touched.contains(&binding.node) {
                touched.push(binding.node);
            }
        }
        touched
    }

    /// Bindings in positional form, in binding order.
    pub fn indexed_bindings(&self) -> Vec<IndexedBinding<'_>> {
        self.animations
            .iter()
            .filter_map(|b| {
                Some((
                    self.nodes.position_of(b.node)?,
                    b.parameter,
                    b.value_type,
                    &b.track,
                ))
            })
            .collect()
    }
}

/// Structural equality over persisted content; node handles are compared by
/// position, so a decoded copy equals its source.
impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.comment == other.comment
            && self.frame_range == other.frame_range
            && self.thumbnail == other.thumbnail
            && self.rugs == other.rugs
            && self.nodes == other.nodes
            && self.indexed_connections() == other.indexed_connections()
            && self.multiplex_table() == other.multiplex_table()
            && self.background.and_then(|b| self.nodes.position_of(b))
                == other.background.and_then(|b| other.nodes.position_of(b))
            && self.indexed_bindings() == other.indexed_bindings()
    }
}
