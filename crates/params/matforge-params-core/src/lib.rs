//! matforge-params-core: parameter type table, node schemas and packed layouts.
//!
//! - [`param_type`] is the static type table (sizes, curve metadata, angle units).
//! - [`schema`] holds parameter/slot descriptors and the immutable [`SchemaRegistry`].
//! - [`layout`] computes offsets and default buffers from a schema.
//! - [`buffer`] gives bounds-checked typed access to a packed buffer.
//! - [`parse`] converts textual defaults into byte payloads.

pub mod buffer;
pub mod camera;
pub mod error;
pub mod layout;
pub mod param_type;
pub mod parse;
pub mod schema;

pub use buffer::{ParameterBlock, ParameterBlockMut};
pub use camera::Camera;
pub use error::LayoutError;
pub use layout::{size_of, NoStructures, ParameterLayout, StructureSizeResolver};
pub use param_type::{
    ComponentKind, CurveType, ParameterType, FILENAME_CAPACITY, MULTIPLEX_SLOT_COUNT,
    RAMP4_POINT_COUNT, RAMP_POINT_COUNT,
};
pub use parse::parse_parameter;
pub use schema::{
    ControlType, NodeSchema, ParameterDescriptor, SchemaId, SchemaRegistry, SlotDescriptor,
};
