//! Schema-aware views over a node's packed parameter bytes.

use bytemuck::Pod;

use crate::camera::Camera;
use crate::error::LayoutError;
use crate::layout::ParameterLayout;
use crate::param_type::{ComponentKind, ParameterType};
use crate::schema::NodeSchema;

fn check_len(layout: &ParameterLayout, len: usize) -> Result<(), LayoutError> {
    if layout.total_size() != len {
        return Err(LayoutError::BufferSize {
            expected: layout.total_size(),
            actual: len,
        });
    }
    Ok(())
}

fn component_range(
    layout: &ParameterLayout,
    index: usize,
    component: usize,
) -> Result<(ComponentKind, std::ops::Range<usize>), LayoutError> {
    let ty = layout.parameter_type(index)?;
    let kind = ty
        .component_kind()
        .ok_or(LayoutError::NotNumeric { index, ty })?;
    let range = layout.range(index)?;
    let (offset, count) = match ty {
        ParameterType::Camera => (Camera::component_offset(component), Camera::COMPONENTS),
        _ => {
            let count = range.len() / 4;
            ((component < count).then_some(component * 4), count)
        }
    };
    let offset = offset.ok_or(LayoutError::SchemaBounds {
        index: component,
        count,
    })?;
    let start = range.start + offset;
    Ok((kind, start..start + 4))
}

/// Read-only view of a parameter buffer.
#[derive(Clone, Copy, Debug)]
pub struct ParameterBlock<'a> {
    layout: &'a ParameterLayout,
    bytes: &'a [u8],
}

impl<'a> ParameterBlock<'a> {
    pub fn new(layout: &'a ParameterLayout, bytes: &'a [u8]) -> Result<Self, LayoutError> {
        check_len(layout, bytes.len())?;
        Ok(ParameterBlock { layout, bytes })
    }

    pub fn layout(&self) -> &'a ParameterLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn parameter_bytes(&self, index: usize) -> Result<&'a [u8], LayoutError> {
        Ok(&self.bytes[self.layout.range(index)?])
    }

    /// Decode parameter `index` as `T`; `T` must be exactly the parameter's size.
    pub fn read<T: Pod>(&self, index: usize) -> Result<T, LayoutError> {
        let bytes = self.parameter_bytes(index)?;
        if bytes.len() != std::mem::size_of::<T>() {
            return Err(LayoutError::BufferSize {
                expected: bytes.len(),
                actual: std::mem::size_of::<T>(),
            });
        }
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Component `component` of parameter `index` as a float (integers are converted).
    pub fn component_as_float(&self, index: usize, component: usize) -> Result<f32, LayoutError> {
        let (kind, range) = component_range(self.layout, index, component)?;
        let raw: [u8; 4] = bytemuck::pod_read_unaligned(&self.bytes[range]);
        Ok(match kind {
            ComponentKind::F32 => f32::from_le_bytes(raw),
            ComponentKind::I32 => i32::from_le_bytes(raw) as f32,
        })
    }

    /// Integer parameter looked up by name, or `default` when the schema has no
    /// such 4-byte integer parameter.
    pub fn int_parameter(&self, schema: &NodeSchema, name: &str, default: i32) -> i32 {
        let Some(index) = schema.parameter_index(name) else {
            return default;
        };
        match self.layout.parameter_type(index) {
            Ok(ParameterType::Int | ParameterType::Enum | ParameterType::Bool) => {
                self.read::<i32>(index).unwrap_or(default)
            }
            _ => default,
        }
    }

    /// First camera parameter of the buffer, if the schema declares one.
    pub fn camera(&self) -> Option<Camera> {
        let index = (0..self.layout.count())
            .find(|i| self.layout.parameter_type(*i) == Ok(ParameterType::Camera))?;
        self.read::<Camera>(index).ok()
    }
}

/// Mutable view of a parameter buffer. Writes are confined to the target
/// parameter's byte range.
#[derive(Debug)]
pub struct ParameterBlockMut<'a> {
    layout: &'a ParameterLayout,
    bytes: &'a mut [u8],
}

impl<'a> ParameterBlockMut<'a> {
    pub fn new(layout: &'a ParameterLayout, bytes: &'a mut [u8]) -> Result<Self, LayoutError> {
        check_len(layout, bytes.len())?;
        Ok(ParameterBlockMut { layout, bytes })
    }

    pub fn as_block(&self) -> ParameterBlock<'_> {
        ParameterBlock {
            layout: self.layout,
            bytes: self.bytes,
        }
    }

    pub fn parameter_bytes_mut(&mut self, index: usize) -> Result<&mut [u8], LayoutError> {
        let range = self.layout.range(index)?;
        Ok(&mut self.bytes[range])
    }

    /// Copy `data` to the start of parameter `index`. Shorter payloads leave the
    /// tail of the slot untouched; longer ones are rejected.
    pub fn write_parameter(&mut self, index: usize, data: &[u8]) -> Result<(), LayoutError> {
        let slot = self.parameter_bytes_mut(index)?;
        if data.len() > slot.len() {
            return Err(LayoutError::WriteOutOfRange {
                index,
                len: data.len(),
                size: slot.len(),
            });
        }
        slot[..data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn write<T: Pod>(&mut self, index: usize, value: &T) -> Result<(), LayoutError> {
        self.write_parameter(index, bytemuck::bytes_of(value))
    }

    /// Overwrite one 4-byte component; integer parameters truncate toward zero.
    pub fn set_component_from_float(
        &mut self,
        index: usize,
        component: usize,
        value: f32,
    ) -> Result<(), LayoutError> {
        let (kind, range) = component_range(self.layout, index, component)?;
        let raw = match kind {
            ComponentKind::F32 => value.to_le_bytes(),
            ComponentKind::I32 => (value as i32).to_le_bytes(),
        };
        self.bytes[range].copy_from_slice(&raw);
        Ok(())
    }
}
