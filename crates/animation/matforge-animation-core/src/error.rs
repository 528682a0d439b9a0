use thiserror::Error;

use matforge_params_core::ParameterType;

use crate::value::TrackKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnimationError {
    #[error("parameters of type {0:?} cannot be animated")]
    NotAnimatable(ParameterType),
    #[error("value of kind {found:?} written to a {expected:?} track")]
    TypeMismatch { expected: TrackKind, found: TrackKind },
    #[error("component {component} out of range for {kind:?} (has {count})")]
    ComponentOutOfRange {
        kind: TrackKind,
        component: usize,
        count: usize,
    },
    #[error("keyframe index {index} out of range (track has {len} keys)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{kind:?} values need {expected} bytes, got {actual}")]
    ByteLength {
        kind: TrackKind,
        expected: usize,
        actual: usize,
    },
    #[error("keyframe frames must be strictly ascending (frame {frame} at index {index})")]
    UnsortedFrames { index: usize, frame: i32 },
    #[error("cannot allocate {count} keys: frames would pass i32::MAX")]
    FrameOverflow { count: usize },
}
