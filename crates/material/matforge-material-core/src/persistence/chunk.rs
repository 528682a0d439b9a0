//! Little-endian chunk reader/writer.

use super::format::CHUNK_HEADER_SIZE;
use crate::error::PersistenceError;

#[derive(Debug, Clone)]
pub struct ChunkHeader {
    pub chunk_type: [u8; 4],
    pub version: u32,
    pub length: u32,
}

pub struct ChunkReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], PersistenceError> {
        let end = self
            .position
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(PersistenceError::TruncatedData)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], PersistenceError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_header(&mut self) -> Result<ChunkHeader, PersistenceError> {
        if self.remaining() < CHUNK_HEADER_SIZE {
            return Err(PersistenceError::TruncatedData);
        }
        Ok(ChunkHeader {
            chunk_type: self.take_array()?,
            version: self.read_u32()?,
            length: self.read_u32()?,
        })
    }

    /// Reader over the body of `header`, advancing this reader past it.
    pub fn chunk_body(&mut self, header: &ChunkHeader) -> Result<ChunkReader<'a>, PersistenceError> {
        Ok(ChunkReader::new(self.take(header.length as usize)?))
    }

    pub fn read_tag(&mut self) -> Result<[u8; 4], PersistenceError> {
        self.take_array()
    }

    pub fn read_u8(&mut self) -> Result<u8, PersistenceError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, PersistenceError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, PersistenceError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    /// Element count prefix. Counts larger than the remaining data are
    /// rejected before anything is allocated.
    pub fn read_count(&mut self, min_element_size: usize) -> Result<usize, PersistenceError> {
        let count = self.read_u32()? as usize;
        if count.saturating_mul(min_element_size.max(1)) > self.remaining() {
            return Err(PersistenceError::TruncatedData);
        }
        Ok(count)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, PersistenceError> {
        let len = self.read_count(1)?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_string(&mut self) -> Result<String, PersistenceError> {
        String::from_utf8(self.read_bytes()?).map_err(|_| PersistenceError::InvalidUtf8)
    }

    pub fn read_i32_vec(&mut self) -> Result<Vec<i32>, PersistenceError> {
        let count = self.read_count(4)?;
        (0..count).map(|_| self.read_i32()).collect()
    }
}

pub struct ChunkWriter {
    buffer: Vec<u8>,
    chunk_stack: Vec<usize>, // start positions of open chunks
}

impl Default for ChunkWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(1024),
            chunk_stack: Vec::with_capacity(4),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn begin_chunk(&mut self, chunk_type: [u8; 4], version: u32) {
        self.chunk_stack.push(self.buffer.len());
        self.buffer.extend_from_slice(&chunk_type);
        self.write_u32(version);
        self.write_u32(0); // length, patched by end_chunk
    }

    pub fn end_chunk(&mut self) -> Result<(), PersistenceError> {
        let Some(start) = self.chunk_stack.pop() else {
            return Ok(());
        };
        let content = self.buffer.len() - start - CHUNK_HEADER_SIZE;
        let length = to_u32(content)?;
        self.buffer[start + 8..start + 12].copy_from_slice(&length.to_le_bytes());
        Ok(())
    }

    pub fn write_tag(&mut self, tag: [u8; 4]) {
        self.buffer.extend_from_slice(&tag);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_count(&mut self, count: usize) -> Result<(), PersistenceError> {
        self.write_u32(to_u32(count)?);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.write_count(bytes.len())?;
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), PersistenceError> {
        self.write_bytes(value.as_bytes())
    }

    pub fn write_i32_slice(&mut self, values: &[i32]) -> Result<(), PersistenceError> {
        self.write_count(values.len())?;
        for v in values {
            self.write_i32(*v);
        }
        Ok(())
    }
}

pub fn to_u32(len: usize) -> Result<u32, PersistenceError> {
    u32::try_from(len).map_err(|_| PersistenceError::TooLarge { len })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_lengths_are_patched() {
        let mut w = ChunkWriter::new();
        w.begin_chunk(*b"TEST", 3);
        w.write_string("hello").unwrap();
        w.write_i32(-7);
        w.end_chunk().unwrap();
        w.write_u8(9);
        let bytes = w.into_bytes();

        let mut r = ChunkReader::new(&bytes);
        let header = r.read_header().unwrap();
        assert_eq!(&header.chunk_type, b"TEST");
        assert_eq!(header.version, 3);
        assert_eq!(header.length, 4 + 5 + 4);
        let mut body = r.chunk_body(&header).unwrap();
        assert_eq!(body.read_string().unwrap(), "hello");
        assert_eq!(body.read_i32().unwrap(), -7);
        assert_eq!(r.read_u8().unwrap(), 9);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn oversized_counts_are_truncation_errors() {
        let mut w = ChunkWriter::new();
        w.write_u32(1_000_000);
        let bytes = w.into_bytes();
        assert_eq!(
            ChunkReader::new(&bytes).read_bytes(),
            Err(PersistenceError::TruncatedData)
        );
        assert_eq!(
            ChunkReader::new(&[0xff, 0xfe, 0, 0]).read_string().map(|_| ()),
            Err(PersistenceError::TruncatedData)
        );
        assert_eq!(
            ChunkReader::new(&[2, 0, 0, 0, 0xff, 0xfe]).read_string(),
            Err(PersistenceError::InvalidUtf8)
        );
    }
}
