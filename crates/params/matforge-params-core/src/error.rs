use thiserror::Error;

use crate::param_type::ParameterType;
use crate::schema::SchemaId;

/// Errors raised by layout queries, schema lookups and default parsing.
///
/// Layout errors indicate a schema/version mismatch between caller and
/// registry; they are surfaced and never clamped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("parameter index {index} out of bounds for schema with {count} parameters")]
    SchemaBounds { index: usize, count: usize },
    #[error("unknown node schema {0:?}")]
    UnknownSchema(SchemaId),
    #[error("unknown node schema '{0}'")]
    UnknownSchemaName(String),
    #[error("schema '{schema}' has no parameter named '{name}'")]
    UnknownParameter { schema: String, name: String },
    #[error("write of {len} bytes does not fit parameter {index} ({size} bytes)")]
    WriteOutOfRange { index: usize, len: usize, size: usize },
    #[error("buffer holds {actual} bytes, layout requires {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("parameter {index} is {ty:?}, which has no float components")]
    NotNumeric { index: usize, ty: ParameterType },
    #[error("cannot parse '{text}' as {ty:?}: {reason}")]
    ParseParameter {
        text: String,
        ty: ParameterType,
        reason: String,
    },
    #[error("schema registry json: {0}")]
    Registry(String),
}
