//! Interpolation helpers shared by every keyframe value type.
//!
//! All numeric kinds blend linearly and component-wise; integer kinds
//! truncate the blended value toward zero.

pub mod functions;

pub use functions::{lerp_array, lerp_f32, lerp_i32, lerp_u8};
