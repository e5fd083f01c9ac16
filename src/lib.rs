// src/lib.rs
//! # atc-rs
//!
//! A Rust library for reading and writing ATC files, the binary ECG
//! recording format produced by AliveCor heart monitors.
//!
//! ## Features
//!
//! - **Checked**: Every block carries a checksum that is verified on read
//! - **Table Driven**: Block layouts live in one static registry
//! - **Lossless**: Decoded documents re-encode to the identical bytes
//! - **Multi-lead**: Up to six leads plus average beats and annotations
//!
//! ## Quick Start
//!
//! ### Writing ATC Files
//!
//! ```rust,no_run
//! use atc_rs::*;
//!
//! fn main() -> Result<()> {
//!     let mut writer = AtcWriter::create("recording.atc")?;
//!
//!     let info = InfoBlock {
//!         date_recorded: DateRecorded::now(),
//!         recorder_software: "atc-rs".into(),
//!         ..InfoBlock::default()
//!     };
//!     let mut flags = FlagSet::empty();
//!     flags.set_mains_filter(true);
//!     let format = FormatBlock::new(300, flags).with_mains_frequency(MainsFrequency::Hz60);
//!     writer.write_header(&info, &format)?;
//!
//!     // 30 seconds of lead I
//!     let samples: Vec<i16> = (0..9000).map(|i| ((i as f64 * 0.02).sin() * 1000.0) as i16).collect();
//!     writer.write_ecg_samples(&samples, 1)?;
//!
//!     writer.write_annotations(&[Annotation::new(150, 1)])?;
//!     writer.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ### Reading ATC Files
//!
//! ```rust,no_run
//! use atc_rs::*;
//!
//! fn main() -> Result<()> {
//!     let doc = AtcReader::open("recording.atc")?;
//!
//!     println!("{} leads at {} Hz", doc.num_leads(), doc.sample_rate_hz());
//!     if let Some(samples) = doc.ecg_samples(1) {
//!         println!("Lead I: {} samples", samples.len());
//!     }
//!     for annotation in doc.annotations() {
//!         println!("beat {} at tick {}", annotation.beat_type, annotation.offset);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Status Codes
//!
//! ```rust
//! use atc_rs::{AtcReader, ReadStatus};
//!
//! let result = AtcReader::from_bytes(b"NOT AN ATC FILE");
//! assert_eq!(ReadStatus::of(&result), ReadStatus::NoSignature);
//! ```

pub mod block;
pub mod config;
pub mod document;
pub mod error;
pub mod reader;
pub mod schema;
pub mod types;
pub mod writer;

mod utils;

// Re-export commonly used types
pub use error::{AtcError, ReadStatus, Result};

pub use config::CodecConfig;

pub use types::{
    format_date_recorded, parse_date_recorded, Annotation, DateRecorded, FieldValue, FlagSet,
    MainsFrequency, Timestamp,
};

pub use schema::{BlockFamily, BlockId, BlockSchema, FieldKind};

pub use block::{DecodedBlock, FileHeader};

pub use document::{AtcDocument, FormatBlock, InfoBlock, SkippedBlock};

pub use reader::AtcReader;

pub use writer::{encode_document, AtcWriter};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use atc_rs::prelude::*;
    //! ```

    pub use crate::document::{AtcDocument, FormatBlock, InfoBlock};
    pub use crate::error::{AtcError, Result};
    pub use crate::reader::AtcReader;
    pub use crate::types::{Annotation, DateRecorded, FlagSet, MainsFrequency};
    pub use crate::writer::AtcWriter;
}

/// The ATC format version written by this library
pub const ATC_VERSION: u32 = CodecConfig::DEFAULT.version;

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(ATC_VERSION, 3);
        assert!(!LIBRARY_VERSION.is_empty());
    }

    #[test]
    fn test_block_sizes() {
        assert_eq!(FileHeader::SIZE, 12);
        assert_eq!(schema::BLOCK_CONTAINER_SIZE, 12);
        let info = schema::lookup(BlockId::INFO).unwrap();
        assert_eq!(info.fixed_payload_size(), Some(264));
        let format = schema::lookup(BlockId::FORMAT).unwrap();
        assert_eq!(format.fixed_payload_size(), Some(8));
    }

    #[test]
    fn test_format_flags() {
        let mut flags = FlagSet::empty();
        assert_eq!(flags.mains_frequency(), MainsFrequency::Hz50);

        flags.set_mains_frequency(MainsFrequency::Hz60);
        flags.set_baseline_filter(true);
        assert_eq!(flags.bits(), 0b0001_0010);

        flags.set_mains_frequency(MainsFrequency::Hz50);
        assert!(flags.baseline_filter());
        assert_eq!(flags.bits(), 0b0001_0000);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ReadStatus::Success.code(), 0);
        assert_eq!(ReadStatus::of(&AtcReader::from_bytes(&[])), ReadStatus::NoSignature);
        let result = AtcReader::open(test_helpers::missing_path());
        assert_eq!(ReadStatus::of(&result), ReadStatus::NoFile);
        assert_eq!(ReadStatus::of(&result).code(), 1);
    }

    #[test]
    fn test_in_memory_round_trip() {
        let bytes = test_helpers::single_lead_file(test_helpers::sine_samples(600));
        let doc = AtcReader::from_bytes(&bytes).unwrap();
        assert_eq!(doc.num_leads(), 1);
        assert_eq!(doc.ecg_samples(1).map(<[i16]>::len), Some(600));
        assert_eq!(encode_document(&doc).unwrap(), bytes);
    }
}
