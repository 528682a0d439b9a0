//! Keyframe value kinds and the tagged value used at type-erased call sites.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use matforge_params_core::{Camera, ParameterType, RAMP4_POINT_COUNT, RAMP_POINT_COUNT};

/// Concrete storage type of a keyframe track.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    /// One byte per key; used for booleans.
    Byte,
    Ramp,
    Ramp4,
    Camera,
}

impl TrackKind {
    /// Storage kind used to animate a parameter of type `ty`, or `None` when the
    /// type has no meaningful interpolation.
    pub fn for_parameter(ty: ParameterType) -> Option<TrackKind> {
        use ParameterType as P;
        let kind = match ty {
            P::Float | P::Angle => TrackKind::Float,
            P::Float2 | P::Angle2 => TrackKind::Float2,
            P::Float3 | P::Angle3 => TrackKind::Float3,
            P::Float4 | P::Angle4 | P::Color4 => TrackKind::Float4,
            P::Int | P::Enum => TrackKind::Int,
            P::Int2 => TrackKind::Int2,
            P::Bool => TrackKind::Byte,
            P::Ramp => TrackKind::Ramp,
            P::Ramp4 => TrackKind::Ramp4,
            P::Camera => TrackKind::Camera,
            P::Structure
            | P::FilenameRead
            | P::FilenameWrite
            | P::ForceEvaluate
            | P::Multiplexer
            | P::Any => return None,
        };
        Some(kind)
    }

    /// Size in bytes of one keyframe value.
    pub fn value_size(self) -> usize {
        match self {
            TrackKind::Float | TrackKind::Int => 4,
            TrackKind::Float2 | TrackKind::Int2 => 8,
            TrackKind::Float3 => 12,
            TrackKind::Float4 => 16,
            TrackKind::Byte => 1,
            TrackKind::Ramp => std::mem::size_of::<Ramp>(),
            TrackKind::Ramp4 => std::mem::size_of::<Ramp4>(),
            TrackKind::Camera => Camera::BYTE_SIZE,
        }
    }
}

/// Eight `[x, y]` control points of a gradient ramp.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Ramp {
    pub points: [[f32; 2]; RAMP_POINT_COUNT],
}

/// Sixteen `[r, g, b, a]` control points of a colour ramp.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Ramp4 {
    pub points: [[f32; 4]; RAMP4_POINT_COUNT],
}

/// A keyframe value of any track kind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum AnimValue {
    Float(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Int(i32),
    Int2([i32; 2]),
    Byte(u8),
    Ramp(Ramp),
    Ramp4(Ramp4),
    Camera(Camera),
}

impl AnimValue {
    #[inline]
    pub fn kind(&self) -> TrackKind {
        match self {
            AnimValue::Float(_) => TrackKind::Float,
            AnimValue::Float2(_) => TrackKind::Float2,
            AnimValue::Float3(_) => TrackKind::Float3,
            AnimValue::Float4(_) => TrackKind::Float4,
            AnimValue::Int(_) => TrackKind::Int,
            AnimValue::Int2(_) => TrackKind::Int2,
            AnimValue::Byte(_) => TrackKind::Byte,
            AnimValue::Ramp(_) => TrackKind::Ramp,
            AnimValue::Ramp4(_) => TrackKind::Ramp4,
            AnimValue::Camera(_) => TrackKind::Camera,
        }
    }

    /// Byte image of the value, as stored in tracks and parameter buffers.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AnimValue::Float(v) => bytemuck::bytes_of(v),
            AnimValue::Float2(v) => bytemuck::bytes_of(v),
            AnimValue::Float3(v) => bytemuck::bytes_of(v),
            AnimValue::Float4(v) => bytemuck::bytes_of(v),
            AnimValue::Int(v) => bytemuck::bytes_of(v),
            AnimValue::Int2(v) => bytemuck::bytes_of(v),
            AnimValue::Byte(v) => bytemuck::bytes_of(v),
            AnimValue::Ramp(v) => bytemuck::bytes_of(v),
            AnimValue::Ramp4(v) => bytemuck::bytes_of(v),
            AnimValue::Camera(v) => bytemuck::bytes_of(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_animatable_type_has_a_matching_size() {
        for ty in ParameterType::ALL {
            if let Some(kind) = TrackKind::for_parameter(ty) {
                let param = ty.fixed_size().unwrap();
                match kind {
                    // Booleans keep a 4-byte slot but animate a single byte.
                    TrackKind::Byte => assert_eq!(kind.value_size(), 1),
                    _ => assert_eq!(kind.value_size(), param, "{ty:?}"),
                }
            }
        }
    }

    #[test]
    fn non_numeric_types_are_not_animatable() {
        assert_eq!(TrackKind::for_parameter(ParameterType::Multiplexer), None);
        assert_eq!(TrackKind::for_parameter(ParameterType::FilenameRead), None);
        assert_eq!(TrackKind::for_parameter(ParameterType::Color4), Some(TrackKind::Float4));
        assert_eq!(TrackKind::for_parameter(ParameterType::Enum), Some(TrackKind::Int));
    }

    #[test]
    fn value_bytes_are_little_endian_images() {
        assert_eq!(AnimValue::Int(258).as_bytes(), &258i32.to_ne_bytes());
        assert_eq!(AnimValue::Float2([1.0, 2.0]).as_bytes().len(), 8);
        assert_eq!(AnimValue::Byte(1).kind(), TrackKind::Byte);
    }
}
