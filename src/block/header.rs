// src/block/header.rs
use crate::config::CodecConfig;
use crate::error::{AtcError, Result};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::Write;

/// ATC file header: signature region followed by the format version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: [u8; 8],
    pub version: u32,
}

impl FileHeader {
    pub const SIZE: usize = 12;
    /// Magic bytes plus three reserved bytes
    pub const SIGNATURE_SIZE: usize = 8;
    pub const MAGIC_SIZE: usize = 5;

    /// Header stamped with the configured signature and current version.
    pub fn new(config: &CodecConfig) -> Self {
        let mut signature = [0u8; Self::SIGNATURE_SIZE];
        signature[..Self::MAGIC_SIZE].copy_from_slice(&config.signature);
        FileHeader { signature, version: config.version }
    }

    pub fn parse(data: &[u8], config: &CodecConfig) -> Result<Self> {
        let bytes = data.get(..Self::SIZE).ok_or(AtcError::NoSignature)?;
        if bytes[..Self::MAGIC_SIZE] != config.signature {
            return Err(AtcError::NoSignature);
        }

        let mut signature = [0u8; Self::SIGNATURE_SIZE];
        signature.copy_from_slice(&bytes[..Self::SIGNATURE_SIZE]);
        let version = LittleEndian::read_u32(&bytes[Self::SIGNATURE_SIZE..]);
        Ok(FileHeader { signature, version })
    }

    pub fn magic(&self) -> &[u8] {
        &self.signature[..Self::MAGIC_SIZE]
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.signature)?;
        writer.write_u32::<LittleEndian>(self.version)?;
        Ok(())
    }
}
