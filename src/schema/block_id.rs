// src/schema/block_id.rs
use crate::error::{AtcError, Result};
use std::fmt;

/// 4-byte block identifier, e.g. `fmt ` or `ecg2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId([u8; 4]);

impl BlockId {
    pub const LEN: usize = 4;

    pub const INFO: BlockId = BlockId(*b"info");
    pub const FORMAT: BlockId = BlockId(*b"fmt ");
    pub const PREVIEW: BlockId = BlockId(*b"pre ");
    pub const ANNOTATIONS: BlockId = BlockId(*b"ann ");

    pub const fn new(bytes: [u8; 4]) -> Self {
        BlockId(bytes)
    }

    /// Build an id from its short name, padding with spaces.
    pub fn from_name(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.is_empty() || bytes.len() > Self::LEN || !name.is_ascii() {
            return Err(AtcError::UnknownBlock(name.to_string()));
        }
        let mut id = [b' '; 4];
        id[..bytes.len()].copy_from_slice(bytes);
        Ok(BlockId(id))
    }

    /// Read an id from the first four bytes of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let id: [u8; 4] = bytes.get(..Self::LEN)?.try_into().ok()?;
        Some(BlockId(id))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// The id with trailing padding removed, as used in messages.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.0).trim_end().to_string()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<[u8; 4]> for BlockId {
    fn from(bytes: [u8; 4]) -> Self {
        BlockId(bytes)
    }
}
