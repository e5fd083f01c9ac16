// src/reader/sync_reader.rs
use crate::block::{decode_block_at, DecodedBlock, FileHeader};
use crate::config::CodecConfig;
use crate::document::{AtcDocument, FormatBlock, SkippedBlock};
use crate::error::{AtcError, Result};
use crate::schema::{self, BlockId, BLOCK_CONTAINER_SIZE};
use byteorder::{ByteOrder, LittleEndian};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

/// ATC file reader.
///
/// The whole file is loaded into memory and decoded in one pass; the
/// result is either a complete [`AtcDocument`] or an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtcReader {
    config: CodecConfig,
}

impl AtcReader {
    pub fn new() -> Self {
        Self::with_config(CodecConfig::DEFAULT)
    }

    pub fn with_config(config: CodecConfig) -> Self {
        AtcReader { config }
    }

    /// Read and decode the file at `path` with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<AtcDocument> {
        Self::new().read_file(path)
    }

    /// Decode everything `reader` yields.
    pub fn from_reader<R: Read>(reader: R) -> Result<AtcDocument> {
        Self::new().read(reader)
    }

    pub fn from_bytes(data: &[u8]) -> Result<AtcDocument> {
        Self::new().decode(data)
    }

    /// Read through a memory map instead of copying the file.
    #[cfg(feature = "mmap")]
    pub fn open_mmap(path: impl AsRef<Path>) -> Result<AtcDocument> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| no_file(path, e))?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::new().decode(&mmap)
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<AtcDocument> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AtcError::NoFile { path: path.to_path_buf() });
        }
        let data = fs::read(path).map_err(|e| no_file(path, e))?;
        log::debug!("Read {} bytes from {}", data.len(), path.display());
        self.decode(&data)
    }

    pub fn read<R: Read>(&self, mut reader: R) -> Result<AtcDocument> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.decode(&data)
    }

    /// Decode a complete in-memory file.
    pub fn decode(&self, data: &[u8]) -> Result<AtcDocument> {
        FileDecoder::new(data, &self.config).run()
    }
}

fn no_file(path: &Path, error: io::Error) -> AtcError {
    match error.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            AtcError::NoFile { path: path.to_path_buf() }
        }
        _ => AtcError::Io(error),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Start,
    HeaderValidated(FileHeader),
    BlockLoop { header: FileHeader, offset: usize },
    Done(FileHeader),
}

/// Header check followed by one block per iteration until the data is used up
struct FileDecoder<'a> {
    data: &'a [u8],
    config: &'a CodecConfig,
    blocks: BTreeMap<BlockId, DecodedBlock>,
    skipped: Vec<SkippedBlock>,
}

impl<'a> FileDecoder<'a> {
    fn new(data: &'a [u8], config: &'a CodecConfig) -> Self {
        FileDecoder {
            data,
            config,
            blocks: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    fn run(mut self) -> Result<AtcDocument> {
        let mut state = DecodeState::Start;
        loop {
            state = match state {
                DecodeState::Start => {
                    let header = FileHeader::parse(self.data, self.config)?;
                    log::trace!("ATC header ok, version {}", header.version);
                    DecodeState::HeaderValidated(header)
                }
                DecodeState::HeaderValidated(header) => DecodeState::BlockLoop {
                    header,
                    offset: FileHeader::SIZE,
                },
                DecodeState::BlockLoop { header, offset } if offset == self.data.len() => {
                    DecodeState::Done(header)
                }
                DecodeState::BlockLoop { header, offset } => DecodeState::BlockLoop {
                    header,
                    offset: offset + self.next_block(offset)?,
                },
                DecodeState::Done(header) => {
                    let format = self
                        .blocks
                        .get(&BlockId::FORMAT)
                        .ok_or_else(|| AtcError::missing(self.data.len(), "file has no format block"))
                        .and_then(FormatBlock::from_block)?;
                    return AtcDocument::new(header, format, self.blocks, self.skipped);
                }
            };
        }
    }

    /// Decode or skip the block at `offset`, returning its size.
    fn next_block(&mut self, offset: usize) -> Result<usize> {
        let raw = &self.data[offset..];
        let id = BlockId::from_slice(raw).ok_or_else(|| {
            AtcError::missing(offset, format!("{} trailing bytes, too short for a block id", raw.len()))
        })?;

        let Some(schema) = schema::lookup(id) else {
            return self.skip_unknown(id, offset);
        };

        let (block, consumed) = decode_block_at(schema, raw, offset)?;
        if !block.checksum_ok() {
            return Err(AtcError::CorruptData {
                block: id.name(),
                stored: block.stored_checksum,
                computed: block.computed_checksum,
            });
        }
        log::debug!(
            "Decoded block '{}' at offset {} ({} payload bytes)",
            id,
            offset,
            block.declared_length
        );
        if self.blocks.insert(id, block).is_some() {
            log::warn!("Duplicate ATC block '{}' at offset {}, keeping the later one", id, offset);
        }
        Ok(consumed)
    }

    /// Pass over a block with an unregistered id using its declared length.
    fn skip_unknown(&mut self, id: BlockId, offset: usize) -> Result<usize> {
        let raw = &self.data[offset..];
        let length_bytes = raw.get(BlockId::LEN..BlockId::LEN + 4).ok_or_else(|| {
            AtcError::missing(offset, format!("unknown block '{}' is truncated before its length", id))
        })?;
        let declared_length = LittleEndian::read_u32(length_bytes);
        let size = usize::try_from(declared_length)
            .ok()
            .and_then(|len| len.checked_add(BLOCK_CONTAINER_SIZE))
            .filter(|&size| size <= raw.len());
        let Some(size) = size else {
            return Err(AtcError::missing(
                offset,
                format!(
                    "unknown block '{}' declares {} payload bytes, only {} available",
                    id,
                    declared_length,
                    raw.len().saturating_sub(BLOCK_CONTAINER_SIZE)
                ),
            ));
        };

        log::warn!(
            "Unknown ATC block id '{}' at byte position {}, skipping {} bytes",
            String::from_utf8_lossy(id.as_bytes()).escape_debug(),
            offset,
            size
        );
        self.skipped.push(SkippedBlock { id, offset, declared_length });
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::encode_block;
    use crate::types::FieldValue;

    fn file_with(blocks: &[&[u8]]) -> Vec<u8> {
        let mut data = Vec::new();
        FileHeader::new(&CodecConfig::DEFAULT).write_to(&mut data).unwrap();
        for block in blocks {
            data.extend_from_slice(block);
        }
        data
    }

    fn format_block() -> Vec<u8> {
        let schema = schema::lookup(BlockId::FORMAT).unwrap();
        let fields = [
            ("ecg_format", FieldValue::U8(1)),
            ("sample_rate_hz", FieldValue::U16(300)),
            ("resolution", FieldValue::U16(500)),
            ("flags", FieldValue::Flags(6.into())),
            ("reserved", FieldValue::U16(0)),
        ];
        encode_block(schema, &fields).unwrap().to_vec()
    }

    fn lead_block(samples: Vec<i16>) -> Vec<u8> {
        let schema = schema::lookup(BlockId::new(*b"ecg ")).unwrap();
        encode_block(schema, &[("data", FieldValue::Samples(samples))]).unwrap().to_vec()
    }

    #[test]
    fn test_minimal_file() {
        let data = file_with(&[&format_block()]);
        let doc = AtcReader::from_bytes(&data).unwrap();
        assert_eq!(doc.atc_version(), 3);
        assert_eq!(doc.sample_rate_hz(), 300);
        assert_eq!(doc.num_leads(), 0);
        assert!(doc.info().is_none());
    }

    #[test]
    fn test_header_only_is_missing_data() {
        let data = file_with(&[]);
        assert!(matches!(AtcReader::from_bytes(&data), Err(AtcError::MissingData { .. })));
    }

    #[test]
    fn test_empty_input_has_no_signature() {
        assert!(matches!(AtcReader::from_bytes(&[]), Err(AtcError::NoSignature)));
    }

    #[test]
    fn test_unknown_block_skipped() {
        let mut unknown = b"xyz1".to_vec();
        unknown.extend_from_slice(&3u32.to_le_bytes());
        unknown.extend_from_slice(&[9, 9, 9]);
        unknown.extend_from_slice(&0u32.to_le_bytes());

        let data = file_with(&[&unknown, &format_block(), &lead_block(vec![1, 2, 3])]);
        let doc = AtcReader::from_bytes(&data).unwrap();
        assert_eq!(doc.skipped_blocks().len(), 1);
        let skipped = doc.skipped_blocks()[0];
        assert_eq!(skipped.id, BlockId::new(*b"xyz1"));
        assert_eq!(skipped.offset, FileHeader::SIZE);
        assert_eq!(skipped.declared_length, 3);
        assert_eq!(doc.ecg_samples(1), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn test_unknown_block_overrunning_file() {
        let mut unknown = b"xyz1".to_vec();
        unknown.extend_from_slice(&100u32.to_le_bytes());
        let data = file_with(&[&format_block(), &unknown]);
        assert!(matches!(AtcReader::from_bytes(&data), Err(AtcError::MissingData { .. })));
    }

    #[test]
    fn test_unknown_block_huge_length() {
        let mut unknown = b"xyz1".to_vec();
        unknown.extend_from_slice(&u32::MAX.to_le_bytes());
        unknown.extend_from_slice(&[0; 8]);
        let data = file_with(&[&format_block(), &unknown]);
        let err = AtcReader::from_bytes(&data).unwrap_err();
        assert!(matches!(err, AtcError::MissingData { offset, .. } if offset == FileHeader::SIZE + 20));
    }

    #[test]
    fn test_missing_format_reports_end_offset() {
        let data = file_with(&[&lead_block(vec![1, 2])]);
        let err = AtcReader::from_bytes(&data).unwrap_err();
        assert!(matches!(err, AtcError::MissingData { offset, .. } if offset == data.len()));
    }

    #[test]
    fn test_trailing_partial_id() {
        let mut data = file_with(&[&format_block()]);
        data.extend_from_slice(b"ec");
        assert!(matches!(AtcReader::from_bytes(&data), Err(AtcError::MissingData { .. })));
    }

    #[test]
    fn test_duplicate_block_keeps_later() {
        let data = file_with(&[&format_block(), &lead_block(vec![1]), &lead_block(vec![2, 2])]);
        let doc = AtcReader::from_bytes(&data).unwrap();
        assert_eq!(doc.ecg_samples(1), Some(&[2, 2][..]));
    }

    #[test]
    fn test_corrupt_block() {
        let mut data = file_with(&[&format_block()]);
        data[FileHeader::SIZE + 8] ^= 0x01;
        let err = AtcReader::from_bytes(&data).unwrap_err();
        assert!(matches!(err, AtcError::CorruptData { ref block, .. } if block == "fmt"));
    }

    #[test]
    fn test_read_from_reader() {
        let data = file_with(&[&format_block(), &lead_block(vec![5; 10])]);
        let doc = AtcReader::from_reader(io::Cursor::new(data)).unwrap();
        assert_eq!(doc.ecg_samples(1).map(<[i16]>::len), Some(10));
    }

    #[test]
    fn test_custom_signature() {
        let config = CodecConfig { signature: *b"OTHER", ..CodecConfig::DEFAULT };
        let data = file_with(&[&format_block()]);
        let err = AtcReader::with_config(config).decode(&data).unwrap_err();
        assert!(matches!(err, AtcError::NoSignature));
    }
}
