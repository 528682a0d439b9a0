//! Camera parameter record.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Fixed-size camera transform stored inline in a parameter buffer.
///
/// Four 4-float records: position, view direction, up vector and lens
/// (`lens[0]` is the vertical field of view in radians).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Camera {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub up: [f32; 4],
    pub lens: [f32; 4],
}

#[inline]
fn lerp4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Normalize the xyz part, leaving w untouched. Zero vectors stay zero.
#[inline]
fn normalize3(mut v: [f32; 4]) -> [f32; 4] {
    let len2 = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
    if len2 > 0.0 {
        let inv = len2.sqrt().recip();
        v[0] *= inv;
        v[1] *= inv;
        v[2] *= inv;
    }
    v
}

impl Camera {
    pub const BYTE_SIZE: usize = std::mem::size_of::<Camera>();
    /// Animatable components: position xyz, direction xyz, field of view.
    pub const COMPONENTS: usize = 7;

    /// Interpolate every record linearly, then re-normalize direction and up.
    pub fn lerp(&self, target: &Camera, t: f32) -> Camera {
        Camera {
            position: lerp4(self.position, target.position, t),
            direction: normalize3(lerp4(self.direction, target.direction, t)),
            up: normalize3(lerp4(self.up, target.up, t)),
            lens: lerp4(self.lens, target.lens, t),
        }
    }

    /// Byte offset of animatable component `index` inside the record. Buffer
    /// component access and camera tracks both go through this table.
    pub fn component_offset(index: usize) -> Option<usize> {
        match index {
            0..=2 => Some(index * 4),
            3..=5 => Some(16 + (index - 3) * 4),
            6 => Some(48),
            _ => None,
        }
    }

    pub fn component(&self, index: usize) -> Option<f32> {
        let floats: &[f32; 16] = bytemuck::cast_ref(self);
        Some(floats[Self::component_offset(index)? / 4])
    }

    pub fn set_component(&mut self, index: usize, value: f32) -> bool {
        let Some(offset) = Self::component_offset(index) else {
            return false;
        };
        let floats: &mut [f32; 16] = bytemuck::cast_mut(self);
        floats[offset / 4] = value;
        true
    }
}
