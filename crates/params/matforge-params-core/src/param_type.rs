//! Static type table: one row per semantic parameter kind.
//!
//! Every query here is a pure function of [`ParameterType`]. The only kinds
//! without a fixed size are [`ParameterType::Structure`] and
//! [`ParameterType::Any`]; their size depends on the owning node schema and is
//! resolved through [`crate::layout::StructureSizeResolver`].

use serde::{Deserialize, Serialize};

/// Number of 2D control points stored by a [`ParameterType::Ramp`].
pub const RAMP_POINT_COUNT: usize = 8;
/// Number of RGBA control points stored by a [`ParameterType::Ramp4`].
pub const RAMP4_POINT_COUNT: usize = 16;
/// Number of alternate sources a multiplexer can route.
pub const MULTIPLEX_SLOT_COUNT: usize = 8;
/// Bytes reserved for a zero-terminated filename.
pub const FILENAME_CAPACITY: usize = 1024;

/// Closed set of semantic parameter kinds.
///
/// The discriminants are persisted (animation bindings store them as a type
/// tag), so variants must never be reordered.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum ParameterType {
    Float = 0,
    Float2 = 1,
    Float3 = 2,
    Float4 = 3,
    Color4 = 4,
    Int = 5,
    Int2 = 6,
    Ramp = 7,
    Angle = 8,
    Angle2 = 9,
    Angle3 = 10,
    Angle4 = 11,
    Enum = 12,
    Structure = 13,
    FilenameRead = 14,
    FilenameWrite = 15,
    ForceEvaluate = 16,
    Bool = 17,
    Ramp4 = 18,
    Camera = 19,
    Multiplexer = 20,
    Any = 21,
}

/// How a parameter behaves in a curve editor.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    None,
    Discrete,
    Linear,
    Smooth,
    Bezier,
}

const SUFFIX_XYZW: [&str; 4] = ["X", "Y", "Z", "W"];
const SUFFIX_RGBA: [&str; 4] = ["R", "G", "B", "A"];
const SUFFIX_CAMERA: [&str; 7] = ["PX", "PY", "PZ", "DX", "DY", "DZ", "FOV"];

// Packed 0xRRGGBBAA.
const COLOR_RED: u32 = 0xFF3030FF;
const COLOR_GREEN: u32 = 0x30FF30FF;
const COLOR_BLUE: u32 = 0x3030FFFF;
const COLOR_WHITE: u32 = 0xE0E0E0FF;
const COMPONENT_COLORS: [u32; 4] = [COLOR_RED, COLOR_GREEN, COLOR_BLUE, COLOR_WHITE];

impl ParameterType {
    pub const ALL: [ParameterType; 22] = [
        ParameterType::Float,
        ParameterType::Float2,
        ParameterType::Float3,
        ParameterType::Float4,
        ParameterType::Color4,
        ParameterType::Int,
        ParameterType::Int2,
        ParameterType::Ramp,
        ParameterType::Angle,
        ParameterType::Angle2,
        ParameterType::Angle3,
        ParameterType::Angle4,
        ParameterType::Enum,
        ParameterType::Structure,
        ParameterType::FilenameRead,
        ParameterType::FilenameWrite,
        ParameterType::ForceEvaluate,
        ParameterType::Bool,
        ParameterType::Ramp4,
        ParameterType::Camera,
        ParameterType::Multiplexer,
        ParameterType::Any,
    ];

    /// Persisted type tag.
    #[inline]
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Inverse of [`ParameterType::tag`].
    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Byte size for every kind whose size does not depend on the schema.
    ///
    /// Returns `None` for `Structure` and `Any`.
    pub fn fixed_size(self) -> Option<usize> {
        use ParameterType::*;
        let size = match self {
            Float | Angle | Int | Enum | Bool => 4,
            Float2 | Angle2 | Int2 => 8,
            Float3 | Angle3 => 12,
            Float4 | Angle4 | Color4 => 16,
            Ramp => RAMP_POINT_COUNT * 2 * 4,
            Ramp4 => RAMP4_POINT_COUNT * 4 * 4,
            Camera => crate::camera::Camera::BYTE_SIZE,
            Multiplexer => MULTIPLEX_SLOT_COUNT * 4,
            FilenameRead | FilenameWrite => FILENAME_CAPACITY,
            ForceEvaluate => 0,
            Structure | Any => return None,
        };
        Some(size)
    }

    pub fn name(self) -> &'static str {
        use ParameterType::*;
        match self {
            Float => "Float",
            Float2 => "Float2",
            Float3 => "Float3",
            Float4 => "Float4",
            Color4 => "Color4",
            Int => "Int",
            Int2 => "Int2",
            Ramp => "Ramp",
            Angle => "Angle",
            Angle2 => "Angle2",
            Angle3 => "Angle3",
            Angle4 => "Angle4",
            Enum => "Enum",
            Structure => "Structure",
            FilenameRead => "FilenameRead",
            FilenameWrite => "FilenameWrite",
            ForceEvaluate => "ForceEvaluate",
            Bool => "Bool",
            Ramp4 => "Ramp4",
            Camera => "Camera",
            Multiplexer => "Multiplexer",
            Any => "Any",
        }
    }

    pub fn curve_type(self) -> CurveType {
        use ParameterType::*;
        match self {
            Float | Float2 | Float3 | Float4 | Color4 | Angle | Angle2 | Angle3 | Angle4
            | Camera => CurveType::Smooth,
            Int | Int2 | Enum | Bool => CurveType::Discrete,
            Ramp | Ramp4 => CurveType::Linear,
            Structure | FilenameRead | FilenameWrite | ForceEvaluate | Multiplexer | Any => {
                CurveType::None
            }
        }
    }

    /// Number of independently editable float curves for this kind.
    pub fn curve_count(self) -> usize {
        use ParameterType::*;
        match self {
            Float | Angle | Int | Enum | Bool => 1,
            Float2 | Angle2 | Int2 => 2,
            Float3 | Angle3 => 3,
            Float4 | Angle4 | Color4 => 4,
            Camera => SUFFIX_CAMERA.len(),
            _ => 0,
        }
    }

    /// Label appended to the parameter name for component `index` in a curve editor.
    pub fn curve_suffix(self, index: usize) -> Option<&'static str> {
        if index >= self.curve_count() {
            return None;
        }
        match self {
            ParameterType::Float
            | ParameterType::Angle
            | ParameterType::Int
            | ParameterType::Enum
            | ParameterType::Bool => Some(""),
            ParameterType::Color4 => Some(SUFFIX_RGBA[index]),
            ParameterType::Camera => Some(SUFFIX_CAMERA[index]),
            _ => Some(SUFFIX_XYZW[index]),
        }
    }

    /// Display colour of curve `index`, packed as `0xRRGGBBAA`.
    pub fn curve_color(self, index: usize) -> u32 {
        match self {
            ParameterType::Float
            | ParameterType::Angle
            | ParameterType::Int
            | ParameterType::Enum
            | ParameterType::Bool => COLOR_WHITE,
            ParameterType::Camera => COMPONENT_COLORS[index % 3],
            _ => COMPONENT_COLORS.get(index).copied().unwrap_or(COLOR_WHITE),
        }
    }

    /// Angles are stored in radians and shown in degrees.
    #[inline]
    pub fn is_angle(self) -> bool {
        matches!(
            self,
            ParameterType::Angle | ParameterType::Angle2 | ParameterType::Angle3 | ParameterType::Angle4
        )
    }

    /// Convert a stored component value to the unit shown to users.
    #[inline]
    pub fn to_display(self, stored: f32) -> f32 {
        if self.is_angle() {
            stored.to_degrees()
        } else {
            stored
        }
    }

    /// Convert a user-entered component value back to its stored unit.
    #[inline]
    pub fn from_display(self, display: f32) -> f32 {
        if self.is_angle() {
            display.to_radians()
        } else {
            display
        }
    }

    /// Component storage class; `None` for kinds that are not a flat run of 4-byte numbers.
    pub fn component_kind(self) -> Option<ComponentKind> {
        use ParameterType::*;
        match self {
            Float | Float2 | Float3 | Float4 | Color4 | Angle | Angle2 | Angle3 | Angle4 | Ramp
            | Ramp4 | Camera => Some(ComponentKind::F32),
            Int | Int2 | Enum | Bool | Multiplexer => Some(ComponentKind::I32),
            _ => None,
        }
    }
}

/// Storage class of the 4-byte components making up a parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComponentKind {
    F32,
    I32,
}
