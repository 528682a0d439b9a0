//! Packed parameter layouts.
//!
//! Parameters are laid out back to back in schema order with no padding:
//! `offset(i) = sum(size(0..i))` and the buffer size is `offset(count)`.
//! Nothing is sorted or repacked, which keeps persisted buffers byte
//! compatible for as long as the schema is unchanged.

use std::ops::Range;

use crate::error::LayoutError;
use crate::param_type::{ParameterType, MULTIPLEX_SLOT_COUNT};
use crate::schema::{NodeSchema, SchemaId};

/// Supplies the byte size of `Structure`/`Any` parameters, which depends on the
/// node schema rather than on the parameter type alone.
pub trait StructureSizeResolver {
    fn structure_size(&self, schema: SchemaId) -> usize;
}

/// Resolver for registries without structured parameters: every structure is empty.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoStructures;

impl StructureSizeResolver for NoStructures {
    fn structure_size(&self, _schema: SchemaId) -> usize {
        0
    }
}

impl<F> StructureSizeResolver for F
where
    F: Fn(SchemaId) -> usize,
{
    fn structure_size(&self, schema: SchemaId) -> usize {
        self(schema)
    }
}

/// Byte size of a parameter of type `ty` declared by schema `schema`.
pub fn size_of(ty: ParameterType, schema: SchemaId, resolver: &dyn StructureSizeResolver) -> usize {
    ty.fixed_size()
        .unwrap_or_else(|| resolver.structure_size(schema))
}

/// Offsets and sizes of every parameter of one schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterLayout {
    schema: SchemaId,
    types: Vec<ParameterType>,
    /// `count + 1` prefix sums; the last entry is the total size.
    offsets: Vec<usize>,
}

impl ParameterLayout {
    pub fn compute(id: SchemaId, schema: &NodeSchema, resolver: &dyn StructureSizeResolver) -> Self {
        let mut offsets = Vec::with_capacity(schema.params.len() + 1);
        let mut types = Vec::with_capacity(schema.params.len());
        let mut cursor = 0usize;
        offsets.push(cursor);
        for param in &schema.params {
            cursor += size_of(param.ty, id, resolver);
            offsets.push(cursor);
            types.push(param.ty);
        }
        ParameterLayout {
            schema: id,
            types,
            offsets,
        }
    }

    #[inline]
    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.types.len()
    }

    /// Offset of parameter `index`. `index == count` is accepted and equals
    /// [`ParameterLayout::total_size`].
    pub fn offset_of(&self, index: usize) -> Result<usize, LayoutError> {
        self.offsets
            .get(index)
            .copied()
            .ok_or(LayoutError::SchemaBounds {
                index,
                count: self.count(),
            })
    }

    pub fn size_of(&self, index: usize) -> Result<usize, LayoutError> {
        Ok(self.range(index)?.len())
    }

    /// Byte range owned by parameter `index`.
    pub fn range(&self, index: usize) -> Result<Range<usize>, LayoutError> {
        if index >= self.count() {
            return Err(LayoutError::SchemaBounds {
                index,
                count: self.count(),
            });
        }
        Ok(self.offsets[index]..self.offsets[index + 1])
    }

    pub fn parameter_type(&self, index: usize) -> Result<ParameterType, LayoutError> {
        self.types
            .get(index)
            .copied()
            .ok_or(LayoutError::SchemaBounds {
                index,
                count: self.count(),
            })
    }

    #[inline]
    pub fn total_size(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Allocate a buffer and copy each descriptor's default payload at its offset.
    ///
    /// Defaults longer than their slot are truncated; shorter ones leave the
    /// remainder zeroed. Multiplexers without a default start with every slot
    /// unset (-1).
    pub fn init_defaults(&self, schema: &NodeSchema) -> Vec<u8> {
        let mut buffer = vec![0u8; self.total_size()];
        for (i, param) in schema.params.iter().enumerate().take(self.count()) {
            let range = self.offsets[i]..self.offsets[i + 1];
            let slot = &mut buffer[range];
            if !param.default_value.is_empty() {
                let n = param.default_value.len().min(slot.len());
                slot[..n].copy_from_slice(&param.default_value[..n]);
            } else if param.ty == ParameterType::Multiplexer {
                for chunk in slot.chunks_exact_mut(4).take(MULTIPLEX_SLOT_COUNT) {
                    chunk.copy_from_slice(&(-1i32).to_le_bytes());
                }
            }
        }
        buffer
    }
}
