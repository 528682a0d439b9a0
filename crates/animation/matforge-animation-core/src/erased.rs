//! Type-erased keyframe tracks.
//!
//! [`AnimationBase`] is the object-safe surface shared by every `Animation<T>`;
//! [`KeyframeTrack`] is the closed set of concrete tracks a material can own,
//! dispatching each operation to the variant it holds.

use std::fmt::Debug;

use matforge_params_core::{Camera, ParameterType};

use crate::error::AnimationError;
use crate::keyable::Keyable;
use crate::track::{Animation, Bracket};
use crate::value::{AnimValue, Ramp, Ramp4, TrackKind};

pub trait AnimationBase: Debug {
    fn kind(&self) -> TrackKind;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn frames(&self) -> &[i32];
    fn frame_range(&self) -> Option<(i32, i32)>;
    fn locate(&self, frame: i32) -> Option<Bracket>;
    fn allocate(&mut self, count: usize) -> Result<(), AnimationError>;
    fn byte_length(&self) -> usize;
    fn raw_bytes(&self) -> &[u8];

    /// Write the value sampled at `frame` to the front of `dst`. Returns `false`
    /// and leaves `dst` untouched when the track has no keys.
    fn sample_into(&self, frame: i32, dst: &mut [u8]) -> bool;

    /// Key the value encoded at the front of `bytes`. Extra trailing bytes are
    /// ignored, so a whole parameter slot can be passed for byte tracks.
    fn set_value_from_bytes(&mut self, frame: i32, bytes: &[u8]) -> Result<usize, AnimationError>;

    fn component_as_float(&self, index: usize, component: usize) -> Result<f32, AnimationError>;
    fn set_component_from_float(
        &mut self,
        index: usize,
        component: usize,
        value: f32,
    ) -> Result<(), AnimationError>;
    fn remove_key(&mut self, index: usize) -> Result<(), AnimationError>;
}

impl<T: Keyable> AnimationBase for Animation<T> {
    fn kind(&self) -> TrackKind {
        T::KIND
    }

    fn len(&self) -> usize {
        Animation::len(self)
    }

    fn frames(&self) -> &[i32] {
        Animation::frames(self)
    }

    fn frame_range(&self) -> Option<(i32, i32)> {
        Animation::frame_range(self)
    }

    fn locate(&self, frame: i32) -> Option<Bracket> {
        Animation::locate(self, frame)
    }

    fn allocate(&mut self, count: usize) -> Result<(), AnimationError> {
        Animation::allocate(self, count)
    }

    fn byte_length(&self) -> usize {
        Animation::byte_length(self)
    }

    fn raw_bytes(&self) -> &[u8] {
        Animation::raw_bytes(self)
    }

    fn sample_into(&self, frame: i32, dst: &mut [u8]) -> bool {
        let Some(value) = self.value_at(frame) else {
            return false;
        };
        let src = bytemuck::bytes_of(&value);
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
        true
    }

    fn set_value_from_bytes(&mut self, frame: i32, bytes: &[u8]) -> Result<usize, AnimationError> {
        let size = std::mem::size_of::<T>();
        let Some(src) = bytes.get(..size) else {
            return Err(AnimationError::ByteLength {
                kind: T::KIND,
                expected: size,
                actual: bytes.len(),
            });
        };
        Ok(self.set_value_at(frame, bytemuck::pod_read_unaligned(src)))
    }

    fn component_as_float(&self, index: usize, component: usize) -> Result<f32, AnimationError> {
        Animation::component_as_float(self, index, component)
    }

    fn set_component_from_float(
        &mut self,
        index: usize,
        component: usize,
        value: f32,
    ) -> Result<(), AnimationError> {
        Animation::set_component_from_float(self, index, component, value)
    }

    fn remove_key(&mut self, index: usize) -> Result<(), AnimationError> {
        Animation::remove_key(self, index).map(|_| ())
    }
}

macro_rules! keyframe_tracks {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        /// A keyframe track of any supported value type.
        #[derive(Clone, Debug, PartialEq)]
        pub enum KeyframeTrack {
            $($variant(Animation<$ty>),)+
        }

        impl KeyframeTrack {
            /// Empty track of the given kind.
            pub fn new(kind: TrackKind) -> Self {
                match kind {
                    $(TrackKind::$variant => KeyframeTrack::$variant(Animation::new()),)+
                }
            }

            /// Rebuild a persisted track; see [`Animation::from_raw_parts`].
            pub fn from_raw_parts(
                kind: TrackKind,
                frames: Vec<i32>,
                bytes: &[u8],
            ) -> Result<Self, AnimationError> {
                match kind {
                    $(TrackKind::$variant => {
                        Animation::<$ty>::from_raw_parts(frames, bytes).map(KeyframeTrack::$variant)
                    })+
                }
            }

            fn base(&self) -> &dyn AnimationBase {
                match self {
                    $(KeyframeTrack::$variant(t) => t,)+
                }
            }

            fn base_mut(&mut self) -> &mut dyn AnimationBase {
                match self {
                    $(KeyframeTrack::$variant(t) => t,)+
                }
            }

            /// Interpolated value at `frame`; `None` for an empty track.
            pub fn value_at(&self, frame: i32) -> Option<AnimValue> {
                match self {
                    $(KeyframeTrack::$variant(t) => t.value_at(frame).map(Keyable::into_value),)+
                }
            }

            pub fn key_value(&self, index: usize) -> Option<AnimValue> {
                match self {
                    $(KeyframeTrack::$variant(t) => t.values().get(index).map(|v| v.into_value()),)+
                }
            }

            /// Key `value` at `frame`. The value's kind must match the track's.
            pub fn set_value_at(&mut self, frame: i32, value: &AnimValue) -> Result<usize, AnimationError> {
                let expected = self.kind();
                match self {
                    $(KeyframeTrack::$variant(t) => {
                        let v = <$ty as Keyable>::from_value(value).ok_or(AnimationError::TypeMismatch {
                            expected,
                            found: value.kind(),
                        })?;
                        Ok(t.set_value_at(frame, v))
                    })+
                }
            }

            /// Replace this track's keys with `other`'s. Both must be the same kind.
            pub fn copy_from(&mut self, other: &KeyframeTrack) -> Result<(), AnimationError> {
                match (self, other) {
                    $((KeyframeTrack::$variant(dst), KeyframeTrack::$variant(src)) => {
                        dst.copy_from(src);
                        Ok(())
                    })+
                    (dst, src) => Err(AnimationError::TypeMismatch {
                        expected: dst.kind(),
                        found: src.kind(),
                    }),
                }
            }
        }

        $(
            impl From<Animation<$ty>> for KeyframeTrack {
                fn from(track: Animation<$ty>) -> Self {
                    KeyframeTrack::$variant(track)
                }
            }
        )+
    };
}

keyframe_tracks! {
    Float => f32,
    Float2 => [f32; 2],
    Float3 => [f32; 3],
    Float4 => [f32; 4],
    Int => i32,
    Int2 => [i32; 2],
    Byte => u8,
    Ramp => Ramp,
    Ramp4 => Ramp4,
    Camera => Camera,
}

impl KeyframeTrack {
    /// Empty track able to animate a parameter of type `ty`.
    pub fn for_parameter(ty: ParameterType) -> Result<Self, AnimationError> {
        TrackKind::for_parameter(ty)
            .map(KeyframeTrack::new)
            .ok_or(AnimationError::NotAnimatable(ty))
    }

    pub fn as_typed<T: Keyable>(&self) -> Option<&Animation<T>> {
        T::track_ref(self)
    }

    pub fn as_typed_mut<T: Keyable>(&mut self) -> Option<&mut Animation<T>> {
        T::track_mut(self)
    }
}

impl AnimationBase for KeyframeTrack {
    fn kind(&self) -> TrackKind {
        self.base().kind()
    }

    fn len(&self) -> usize {
        self.base().len()
    }

    fn frames(&self) -> &[i32] {
        self.base().frames()
    }

    fn frame_range(&self) -> Option<(i32, i32)> {
        self.base().frame_range()
    }

    fn locate(&self, frame: i32) -> Option<Bracket> {
        self.base().locate(frame)
    }

    fn allocate(&mut self, count: usize) -> Result<(), AnimationError> {
        self.base_mut().allocate(count)
    }

    fn byte_length(&self) -> usize {
        self.base().byte_length()
    }

    fn raw_bytes(&self) -> &[u8] {
        self.base().raw_bytes()
    }

    fn sample_into(&self, frame: i32, dst: &mut [u8]) -> bool {
        self.base().sample_into(frame, dst)
    }

    fn set_value_from_bytes(&mut self, frame: i32, bytes: &[u8]) -> Result<usize, AnimationError> {
        self.base_mut().set_value_from_bytes(frame, bytes)
    }

    fn component_as_float(&self, index: usize, component: usize) -> Result<f32, AnimationError> {
        self.base().component_as_float(index, component)
    }

    fn set_component_from_float(
        &mut self,
        index: usize,
        component: usize,
        value: f32,
    ) -> Result<(), AnimationError> {
        self.base_mut()
            .set_component_from_float(index, component, value)
    }

    fn remove_key(&mut self, index: usize) -> Result<(), AnimationError> {
        self.base_mut().remove_key(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_types_select_the_storage_variant() {
        let t = KeyframeTrack::for_parameter(ParameterType::Angle3).unwrap();
        assert_eq!(t.kind(), TrackKind::Float3);
        assert!(t.is_empty());
        assert_eq!(
            KeyframeTrack::for_parameter(ParameterType::Structure),
            Err(AnimationError::NotAnimatable(ParameterType::Structure))
        );
    }

    #[test]
    fn mismatched_values_are_rejected() {
        let mut t = KeyframeTrack::new(TrackKind::Float2);
        let err = t.set_value_at(0, &AnimValue::Float(1.0)).unwrap_err();
        assert_eq!(
            err,
            AnimationError::TypeMismatch {
                expected: TrackKind::Float2,
                found: TrackKind::Float
            }
        );
        assert!(t.is_empty());
    }

    #[test]
    fn bool_slots_round_trip_through_byte_tracks() {
        let mut t = KeyframeTrack::for_parameter(ParameterType::Bool).unwrap();
        t.set_value_from_bytes(0, &1i32.to_le_bytes()).unwrap();
        t.set_value_from_bytes(10, &0i32.to_le_bytes()).unwrap();
        let mut slot = [0xAAu8; 4];
        assert!(t.sample_into(0, &mut slot));
        assert_eq!(slot, [1, 0xAA, 0xAA, 0xAA]);
        assert!(t.sample_into(10, &mut slot));
        assert_eq!(slot[0], 0);
    }

    #[test]
    fn empty_tracks_do_not_write() {
        let t = KeyframeTrack::new(TrackKind::Float);
        let mut dst = 7.0f32.to_le_bytes();
        assert!(!t.sample_into(3, &mut dst));
        assert_eq!(f32::from_le_bytes(dst), 7.0);
        assert_eq!(t.value_at(3), None);
    }

    #[test]
    fn short_payloads_are_rejected() {
        let mut t = KeyframeTrack::new(TrackKind::Float4);
        assert!(matches!(
            t.set_value_from_bytes(0, &[0u8; 8]),
            Err(AnimationError::ByteLength { expected: 16, actual: 8, .. })
        ));
    }

    #[test]
    fn copy_requires_matching_kinds() {
        let mut a = KeyframeTrack::new(TrackKind::Int);
        let mut b = KeyframeTrack::new(TrackKind::Int);
        b.set_value_at(4, &AnimValue::Int(9)).unwrap();
        a.copy_from(&b).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_typed::<i32>().map(|t| t.frames().to_vec()), Some(vec![4]));
        let c = KeyframeTrack::new(TrackKind::Byte);
        assert!(a.copy_from(&c).is_err());
    }

    #[test]
    fn camera_tracks_expose_seven_curves() {
        let mut t = KeyframeTrack::for_parameter(ParameterType::Camera).unwrap();
        t.set_value_at(0, &AnimValue::Camera(Camera::default())).unwrap();
        t.set_component_from_float(0, 6, 1.2).unwrap();
        assert_eq!(t.component_as_float(0, 6), Ok(1.2));
        assert!(t.component_as_float(0, 7).is_err());
    }
}
