//! Node schemas and the process-wide schema registry.
//!
//! A [`NodeSchema`] lists its parameters in canonical order; that order defines
//! the binary layout of every buffer built from it, so reordering descriptors
//! is a breaking change for persisted graphs. The [`SchemaRegistry`] is built
//! once (usually from JSON) and shared read-only, typically as
//! `Arc<SchemaRegistry>`.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::layout::{ParameterLayout, StructureSizeResolver};
use crate::param_type::ParameterType;
use crate::parse::parse_parameter;

/// Position of a schema inside its registry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(pub u32);

impl SchemaId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlType {
    #[default]
    NumericEdit,
    Slider,
}

/// Input or output slot of a node.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParameterType,
}

/// One typed parameter of a node schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParameterType,
    #[serde(default)]
    pub control: ControlType,
    /// Mouse-drag mapping range on the x and y axes (`min == max == 0` disables it).
    #[serde(default)]
    pub range_min: [f32; 2],
    #[serde(default)]
    pub range_max: [f32; 2],
    #[serde(default)]
    pub slider_min: f32,
    #[serde(default)]
    pub slider_max: f32,
    #[serde(default)]
    pub relative: bool,
    #[serde(default)]
    pub quad_select: bool,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub enum_list: Vec<String>,
    /// Textual default as authored; parsed into `default_value` when the registry is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip)]
    pub default_value: Vec<u8>,
    #[serde(default)]
    pub description: String,
}

impl ParameterDescriptor {
    /// Minimal descriptor with no UI metadata and a zero default.
    pub fn new(name: impl Into<String>, ty: ParameterType) -> Self {
        ParameterDescriptor {
            name: name.into(),
            ty,
            control: ControlType::NumericEdit,
            range_min: [0.0; 2],
            range_max: [0.0; 2],
            slider_min: 0.0,
            slider_max: 0.0,
            relative: false,
            quad_select: false,
            looping: false,
            hidden: false,
            enum_list: Vec::new(),
            default: None,
            default_value: Vec::new(),
            description: String::new(),
        }
    }

    /// Builder-style textual default, parsed on registry construction.
    pub fn with_default(mut self, text: impl Into<String>) -> Self {
        self.default = Some(text.into());
        self
    }

    pub fn with_enum_list<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_list = entries.into_iter().map(Into::into).collect();
        self
    }

    fn resolve_default(&mut self) -> Result<(), LayoutError> {
        self.default_value = match &self.default {
            Some(text) => parse_parameter(text, self.ty)?,
            None => Vec::new(),
        };
        Ok(())
    }
}

// Descriptions and hidden/loop flags are presentation only and do not take part
// in schema identity.
impl PartialEq for ParameterDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.range_min == other.range_min
            && self.range_max == other.range_max
            && self.relative == other.relative
            && self.quad_select == other.quad_select
            && self.enum_list == other.enum_list
    }
}

/// Ordered parameter and slot description of one node type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeSchema {
    pub name: String,
    #[serde(default)]
    pub header_color: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<SlotDescriptor>,
    #[serde(default)]
    pub outputs: Vec<SlotDescriptor>,
    #[serde(default)]
    pub params: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default)]
    pub has_ui: bool,
    #[serde(default)]
    pub save_texture: bool,
    #[serde(default)]
    pub experimental: bool,
}

impl NodeSchema {
    pub fn new(name: impl Into<String>) -> Self {
        NodeSchema {
            name: name.into(),
            header_color: 0,
            category: String::new(),
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            params: Vec::new(),
            width: 0,
            height: 0,
            has_ui: false,
            save_texture: false,
            experimental: false,
        }
    }

    pub fn with_param(mut self, param: ParameterDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, ty: ParameterType) -> Self {
        self.inputs.push(SlotDescriptor {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, ty: ParameterType) -> Self {
        self.outputs.push(SlotDescriptor {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

impl PartialEq for NodeSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.category == other.category
            && self.header_color == other.header_color
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.params == other.params
            && self.has_ui == other.has_ui
            && self.save_texture == other.save_texture
    }
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    version: String,
    nodes: Vec<NodeSchema>,
}

/// Immutable table of every node schema known to the process.
#[derive(Clone, Debug, Serialize)]
pub struct SchemaRegistry {
    pub version: String,
    nodes: Vec<NodeSchema>,
    #[serde(skip)]
    by_name: HashMap<String, SchemaId>,
}

impl SchemaRegistry {
    /// Build a registry, parsing every textual default. The first schema wins
    /// when two share a name.
    pub fn new(version: impl Into<String>, mut nodes: Vec<NodeSchema>) -> Result<Self, LayoutError> {
        let mut by_name = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter_mut().enumerate() {
            for param in node.params.iter_mut() {
                param.resolve_default()?;
            }
            if by_name.contains_key(&node.name) {
                log::warn!("duplicate node schema '{}' at {}; keeping the first", node.name, i);
                continue;
            }
            by_name.insert(node.name.clone(), SchemaId(i as u32));
        }
        Ok(SchemaRegistry {
            version: version.into(),
            nodes,
            by_name,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, LayoutError> {
        let file: RegistryFile =
            serde_json::from_str(json).map_err(|e| LayoutError::Registry(e.to_string()))?;
        Self::new(file.version, file.nodes)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SchemaId, &NodeSchema)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (SchemaId(i as u32), n))
    }

    pub fn get(&self, id: SchemaId) -> Option<&NodeSchema> {
        self.nodes.get(id.index())
    }

    /// Like [`SchemaRegistry::get`] but reports a miss as an error.
    pub fn schema(&self, id: SchemaId) -> Result<&NodeSchema, LayoutError> {
        self.get(id).ok_or(LayoutError::UnknownSchema(id))
    }

    pub fn index_of(&self, name: &str) -> Option<SchemaId> {
        self.by_name.get(name).copied()
    }

    pub fn parameter_index(&self, id: SchemaId, name: &str) -> Option<usize> {
        self.get(id)?.parameter_index(name)
    }

    pub fn parameter_type(&self, id: SchemaId, index: usize) -> Result<ParameterType, LayoutError> {
        let schema = self.schema(id)?;
        schema
            .params
            .get(index)
            .map(|p| p.ty)
            .ok_or(LayoutError::SchemaBounds {
                index,
                count: schema.params.len(),
            })
    }

    /// Compute the packed layout of schema `id`.
    pub fn layout(
        &self,
        id: SchemaId,
        resolver: &dyn StructureSizeResolver,
    ) -> Result<ParameterLayout, LayoutError> {
        Ok(ParameterLayout::compute(id, self.schema(id)?, resolver))
    }

    /// Byte offset of parameter `index` in schema `id`; `index == count` yields the total size.
    pub fn offset_of(
        &self,
        id: SchemaId,
        index: usize,
        resolver: &dyn StructureSizeResolver,
    ) -> Result<usize, LayoutError> {
        self.layout(id, resolver)?.offset_of(index)
    }

    pub fn total_size(
        &self,
        id: SchemaId,
        resolver: &dyn StructureSizeResolver,
    ) -> Result<usize, LayoutError> {
        Ok(self.layout(id, resolver)?.total_size())
    }

    /// A freshly allocated buffer holding every default of schema `id`.
    pub fn init_defaults(
        &self,
        id: SchemaId,
        resolver: &dyn StructureSizeResolver,
    ) -> Result<Vec<u8>, LayoutError> {
        let schema = self.schema(id)?;
        Ok(ParameterLayout::compute(id, schema, resolver).init_defaults(schema))
    }
}

impl PartialEq for SchemaRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.nodes == other.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NoStructures;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new(
            "test",
            vec![
                NodeSchema::new("Circle")
                    .with_output("", ParameterType::Float4)
                    .with_param(ParameterDescriptor::new("Radius", ParameterType::Float).with_default("0.5"))
                    .with_param(ParameterDescriptor::new("T", ParameterType::Float)),
                NodeSchema::new("Blend")
                    .with_input("A", ParameterType::Float4)
                    .with_input("B", ParameterType::Float4)
                    .with_param(
                        ParameterDescriptor::new("Operation", ParameterType::Enum)
                            .with_enum_list(["Add", "Mul", "Min", "Max"]),
                    ),
                NodeSchema::new("Circle"),
            ],
        )
        .expect("registry builds")
    }

    #[test]
    fn name_lookup_prefers_first_entry() {
        let reg = registry();
        assert_eq!(reg.index_of("Circle"), Some(SchemaId(0)));
        assert_eq!(reg.index_of("Blend"), Some(SchemaId(1)));
        assert_eq!(reg.index_of("Missing"), None);
        assert_eq!(reg.parameter_index(SchemaId(0), "T"), Some(1));
    }

    #[test]
    fn defaults_are_parsed_on_build() {
        let reg = registry();
        let radius = &reg.get(SchemaId(0)).unwrap().params[0];
        assert_eq!(radius.default_value, 0.5f32.to_le_bytes());
        assert!(reg.get(SchemaId(0)).unwrap().params[1].default_value.is_empty());
    }

    #[test]
    fn bad_default_fails_registry_build() {
        let err = SchemaRegistry::new(
            "bad",
            vec![NodeSchema::new("X")
                .with_param(ParameterDescriptor::new("v", ParameterType::Int).with_default("x"))],
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::ParseParameter { .. }));
    }

    #[test]
    fn parameter_type_out_of_range_is_schema_bounds() {
        let reg = registry();
        assert_eq!(reg.parameter_type(SchemaId(1), 0), Ok(ParameterType::Enum));
        assert_eq!(
            reg.parameter_type(SchemaId(1), 3),
            Err(LayoutError::SchemaBounds { index: 3, count: 1 })
        );
        assert_eq!(
            reg.total_size(SchemaId(9), &NoStructures),
            Err(LayoutError::UnknownSchema(SchemaId(9)))
        );
    }

    #[test]
    fn descriptor_equality_ignores_description() {
        let mut a = ParameterDescriptor::new("Radius", ParameterType::Float);
        let b = a.clone();
        a.description = "changed".into();
        assert_eq!(a, b);
        a.relative = true;
        assert_ne!(a, b);
    }
}
