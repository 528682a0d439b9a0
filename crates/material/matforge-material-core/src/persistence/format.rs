//! Binary library format constants.

pub const MAGIC: [u8; 4] = *b"MFLB";

pub const FILE_VERSION: u32 = 1;
pub const MATERIAL_VERSION: u32 = 1;

pub const CHUNK_MATERIAL: [u8; 4] = *b"MATL";

pub const CHUNK_HEADER_SIZE: usize = 12; // 4 type + 4 version + 4 length

/// Node position written when a reference has no target.
pub const NO_NODE: i32 = -1;
