// src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtcError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File does not exist or is not readable: {}", path.display())]
    NoFile { path: PathBuf },

    #[error("No ATC signature in file header")]
    NoSignature,

    #[error("Missing data at offset {offset}: {reason}")]
    MissingData { offset: usize, reason: String },

    #[error("Corrupt data in block '{block}': stored checksum {stored:#010x}, computed {computed:#010x}")]
    CorruptData { block: String, stored: u32, computed: u32 },

    #[error("Unknown block id: {0}")]
    UnknownBlock(String),

    #[error("Lead {lead} is not supported for {family} blocks")]
    InvalidLead { family: &'static str, lead: usize },

    #[error("Missing field '{field}' for block '{block}'")]
    MissingField { block: String, field: &'static str },

    #[error("Type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch { field: &'static str, expected: &'static str, found: &'static str },

    #[error("Payload of block '{block}' is too large: {size} bytes")]
    PayloadTooLarge { block: String, size: usize },

    #[error("Header must be written before data blocks")]
    HeaderNotWritten,

    #[error("Header already written")]
    HeaderAlreadyWritten,

    #[error("Block '{0}' cannot be written after the annotation block")]
    BlockOrder(String),
}

impl AtcError {
    pub(crate) fn missing(offset: usize, reason: impl Into<String>) -> Self {
        AtcError::MissingData { offset, reason: reason.into() }
    }

    /// The reader status this error corresponds to.
    pub fn status(&self) -> ReadStatus {
        match self {
            AtcError::NoFile { .. } => ReadStatus::NoFile,
            AtcError::NoSignature => ReadStatus::NoSignature,
            AtcError::CorruptData { .. } => ReadStatus::CorruptData,
            AtcError::Io(e) if e.kind() == io::ErrorKind::NotFound => ReadStatus::NoFile,
            _ => ReadStatus::MissingData,
        }
    }
}

/// Numeric reader status codes, stable across ATC tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReadStatus {
    /// File OK.
    Success = 0,
    /// File does not exist or is not readable.
    NoFile = 1,
    /// File is readable, but has no ATC signature.
    NoSignature = 2,
    /// File is truncated or has no format block.
    MissingData = 3,
    /// Checksum verification failed.
    CorruptData = 4,
}

impl ReadStatus {
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => ReadStatus::Success,
            Err(e) => e.status(),
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

pub type Result<T> = std::result::Result<T, AtcError>;
