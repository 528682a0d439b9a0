//! matforge-animation-core: sparse keyframe tracks over packed material parameters.
//!
//! - [`track::Animation`] stores frame-sorted keys of one concrete value type.
//! - [`erased::KeyframeTrack`] / [`erased::AnimationBase`] expose the same
//!   operations without naming the value type at the call site.
//! - [`binding::AnimatedParameterSet`] owns the tracks of a graph, keyed by
//!   (node, parameter).

pub mod binding;
pub mod erased;
pub mod error;
pub mod interp;
pub mod keyable;
pub mod track;
pub mod value;

pub use binding::{AnimTrack, AnimatedParameterSet};
pub use erased::{AnimationBase, KeyframeTrack};
pub use error::AnimationError;
pub use keyable::Keyable;
pub use track::{Animation, Bracket};
pub use value::{AnimValue, Ramp, Ramp4, TrackKind};
