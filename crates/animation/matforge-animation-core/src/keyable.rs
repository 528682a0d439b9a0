//! Per-type behaviour of keyframe values.
//!
//! Every concrete track value implements [`Keyable`]: it is plain old data (so a
//! track's values can be viewed as raw bytes), interpolates linearly and exposes
//! its scalar components as floats for curve editors.

use std::fmt::Debug;

use bytemuck::Pod;
use matforge_params_core::Camera;

use crate::erased::KeyframeTrack;
use crate::interp::functions::{lerp_array, lerp_f32, lerp_i32, lerp_u8};
use crate::track::Animation;
use crate::value::{AnimValue, Ramp, Ramp4, TrackKind};

pub trait Keyable: Pod + PartialEq + Debug {
    const KIND: TrackKind;
    /// Number of scalar components addressable through [`Keyable::component`].
    const COMPONENTS: usize;

    fn lerp(&self, other: &Self, t: f32) -> Self;
    fn component(&self, index: usize) -> Option<f32>;
    /// Returns `false` when `index` is out of range.
    fn set_component(&mut self, index: usize, value: f32) -> bool;

    fn into_value(self) -> AnimValue;
    fn from_value(value: &AnimValue) -> Option<Self>;

    fn track_ref(track: &KeyframeTrack) -> Option<&Animation<Self>>;
    fn track_mut(track: &mut KeyframeTrack) -> Option<&mut Animation<Self>>;
}

fn floats<T: Pod>(value: &T) -> &[f32] {
    bytemuck::cast_slice(std::slice::from_ref(value))
}

fn floats_mut<T: Pod>(value: &mut T) -> &mut [f32] {
    bytemuck::cast_slice_mut(std::slice::from_mut(value))
}

fn lerp_points<T: Pod>(a: &T, b: &T, t: f32) -> T {
    let mut out = *a;
    for (o, target) in floats_mut(&mut out).iter_mut().zip(floats(b)) {
        *o = lerp_f32(*o, *target, t);
    }
    out
}

macro_rules! erased_glue {
    ($variant:ident) => {
        fn into_value(self) -> AnimValue {
            AnimValue::$variant(self)
        }

        fn from_value(value: &AnimValue) -> Option<Self> {
            match value {
                AnimValue::$variant(v) => Some(*v),
                _ => None,
            }
        }

        fn track_ref(track: &KeyframeTrack) -> Option<&Animation<Self>> {
            match track {
                KeyframeTrack::$variant(t) => Some(t),
                _ => None,
            }
        }

        fn track_mut(track: &mut KeyframeTrack) -> Option<&mut Animation<Self>> {
            match track {
                KeyframeTrack::$variant(t) => Some(t),
                _ => None,
            }
        }
    };
}

/// Values made only of `f32`s: every float is one component.
macro_rules! float_keyable {
    ($ty:ty, $variant:ident, $lerp:expr) => {
        impl Keyable for $ty {
            const KIND: TrackKind = TrackKind::$variant;
            const COMPONENTS: usize = std::mem::size_of::<$ty>() / 4;

            #[inline]
            fn lerp(&self, other: &Self, t: f32) -> Self {
                ($lerp)(*self, *other, t)
            }

            fn component(&self, index: usize) -> Option<f32> {
                floats(self).get(index).copied()
            }

            fn set_component(&mut self, index: usize, value: f32) -> bool {
                match floats_mut(self).get_mut(index) {
                    Some(slot) => {
                        *slot = value;
                        true
                    }
                    None => false,
                }
            }

            erased_glue!($variant);
        }
    };
}

float_keyable!(f32, Float, lerp_f32);
float_keyable!([f32; 2], Float2, lerp_array::<2>);
float_keyable!([f32; 3], Float3, lerp_array::<3>);
float_keyable!([f32; 4], Float4, lerp_array::<4>);
float_keyable!(Ramp, Ramp, |a: Ramp, b: Ramp, t| lerp_points(&a, &b, t));
float_keyable!(Ramp4, Ramp4, |a: Ramp4, b: Ramp4, t| lerp_points(&a, &b, t));

impl Keyable for i32 {
    const KIND: TrackKind = TrackKind::Int;
    const COMPONENTS: usize = 1;

    fn lerp(&self, other: &Self, t: f32) -> Self {
        lerp_i32(*self, *other, t)
    }

    fn component(&self, index: usize) -> Option<f32> {
        (index == 0).then_some(*self as f32)
    }

    fn set_component(&mut self, index: usize, value: f32) -> bool {
        if index != 0 {
            return false;
        }
        *self = value as i32;
        true
    }

    erased_glue!(Int);
}

impl Keyable for [i32; 2] {
    const KIND: TrackKind = TrackKind::Int2;
    const COMPONENTS: usize = 2;

    fn lerp(&self, other: &Self, t: f32) -> Self {
        [
            lerp_i32(self[0], other[0], t),
            lerp_i32(self[1], other[1], t),
        ]
    }

    fn component(&self, index: usize) -> Option<f32> {
        self.get(index).map(|v| *v as f32)
    }

    fn set_component(&mut self, index: usize, value: f32) -> bool {
        match self.get_mut(index) {
            Some(slot) => {
                *slot = value as i32;
                true
            }
            None => false,
        }
    }

    erased_glue!(Int2);
}

impl Keyable for u8 {
    const KIND: TrackKind = TrackKind::Byte;
    const COMPONENTS: usize = 1;

    fn lerp(&self, other: &Self, t: f32) -> Self {
        lerp_u8(*self, *other, t)
    }

    fn component(&self, index: usize) -> Option<f32> {
        (index == 0).then_some(*self as f32)
    }

    fn set_component(&mut self, index: usize, value: f32) -> bool {
        if index != 0 {
            return false;
        }
        *self = value as u8;
        true
    }

    erased_glue!(Byte);
}

impl Keyable for Camera {
    const KIND: TrackKind = TrackKind::Camera;
    const COMPONENTS: usize = Camera::COMPONENTS;

    fn lerp(&self, other: &Self, t: f32) -> Self {
        Camera::lerp(self, other, t)
    }

    fn component(&self, index: usize) -> Option<f32> {
        Camera::component(self, index)
    }

    fn set_component(&mut self, index: usize, value: f32) -> bool {
        Camera::set_component(self, index, value)
    }

    erased_glue!(Camera);
}
