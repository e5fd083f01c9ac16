// src/block/checksum.rs
use crate::schema::BlockId;

/// Sum of all byte values, wrapping at 32 bits.
pub fn running_sum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |sum, &b| sum.wrapping_add(u32::from(b)))
}

/// Block checksum accumulator.
///
/// Covers the block id, the length field and the payload, never the
/// checksum field itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Checksum(u32);

impl Checksum {
    pub fn new() -> Self {
        Checksum(0)
    }

    pub fn seeded(id: BlockId) -> Self {
        Checksum(running_sum(id.as_bytes()))
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.0 = self.0.wrapping_add(running_sum(bytes));
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}
