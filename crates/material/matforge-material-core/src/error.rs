use thiserror::Error;

use matforge_animation_core::AnimationError;
use matforge_params_core::{LayoutError, SchemaId};

use crate::ids::NodeId;

/// Errors raised by graph edits.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("node {0:?} is not part of this material")]
    UnknownNode(NodeId),
    #[error("{direction} slot {slot} out of range for '{schema}' ({count} slots)")]
    SlotOutOfRange {
        schema: String,
        direction: &'static str,
        slot: u8,
        count: usize,
    },
    #[error("multiplexer slot {slot} out of range")]
    MultiplexSlot { slot: usize },
    #[error("pin index {index} out of range")]
    PinOutOfRange { index: usize },
    #[error("node cannot connect to itself")]
    SelfConnection,
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Errors raised while encoding or decoding a library.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("unexpected end of data")]
    TruncatedData,
    #[error("not a material library (bad magic)")]
    BadMagic,
    #[error("unsupported library version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
    #[error("{what} refers to node position {index}, material has {count} nodes")]
    DanglingIndex {
        what: &'static str,
        index: i32,
        count: usize,
    },
    #[error("node schema '{name}' (id {id:?}) is not registered")]
    UnknownSchema { name: String, id: SchemaId },
    #[error("unknown parameter type tag {0}")]
    UnknownValueType(u32),
    #[error("{len} does not fit the format's u32 length fields")]
    TooLarge { len: usize },
    #[error(transparent)]
    Animation(#[from] AnimationError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}
