// src/writer/mod.rs
mod sync_writer;

pub use sync_writer::{encode_document, encode_document_with_config, AtcWriter};
