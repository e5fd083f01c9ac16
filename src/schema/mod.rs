// src/schema/mod.rs
//! Block schema registry
//!
//! Maps each 4-byte [`BlockId`] to the ordered list of fields stored in that
//! block. The table is static and read-only; decoding and encoding are driven
//! entirely by it.
//!
//! ```
//! use atc_rs::schema::{self, BlockId, FieldKind};
//!
//! let fmt = schema::lookup(BlockId::FORMAT).unwrap();
//! assert_eq!(fmt.fixed_payload_size(), Some(8));
//! assert_eq!(fmt.fields.last().unwrap().kind, FieldKind::Checksum);
//!
//! assert_eq!(schema::lead_block_id(2), Some(BlockId::new(*b"ecg2")));
//! ```

mod block_id;
mod registry;

pub use block_id::BlockId;
pub use registry::{
    average_beat_block_id, lead_block_id, lead_block_ids, lookup, schema_for, BlockFamily,
    BlockSchema, FieldDef, FieldKind, BLOCK_CONTAINER_SIZE, BLOCK_SCHEMAS, CHECKSUM_FIELD,
    LENGTH_FIELD,
};
