// src/block/mod.rs
//! Block codec
//!
//! Every ATC block is laid out as
//!
//! ```text
//! | id (4) | payload length u32 (4) | payload (length) | checksum u32 (4) |
//! ```
//!
//! where the checksum is the wrapping 32-bit sum of every byte before it.
//! [`decode_block`] walks a block's fields as described by its
//! [`BlockSchema`](crate::schema::BlockSchema); [`encode_block`] is its
//! inverse.

mod checksum;
mod decoder;
mod encoder;
mod header;

pub use checksum::{running_sum, Checksum};
pub use decoder::{decode_block, decode_block_at, BlockFields, DecodedBlock};
pub use encoder::encode_block;
pub use header::FileHeader;
