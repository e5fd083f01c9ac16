// src/writer/sync_writer.rs
use crate::block::{encode_block, FileHeader};
use crate::config::CodecConfig;
use crate::document::{AtcDocument, FormatBlock, InfoBlock};
use crate::error::{AtcError, Result};
use crate::schema::{self, BlockFamily, BlockId, BlockSchema};
use crate::types::{Annotation, FieldValue};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Empty,
    HeaderWritten,
    AnnotationsWritten,
}

/// Sequential ATC file writer.
///
/// Blocks go out in the order the methods are called. `write_header`
/// must come first and `write_annotations`, if used, last:
///
/// ```text
/// write_header -> [write_preview] -> write_ecg_samples* / write_average_beat* -> [write_annotations]
/// ```
pub struct AtcWriter<W: Write> {
    sink: W,
    config: CodecConfig,
    state: WriterState,
    // Tick frequency of the annotation block
    sample_rate_hz: u16,
    bytes_written: u64,
}

impl AtcWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        log::debug!("Creating ATC file {}", path.as_ref().display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> AtcWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, CodecConfig::DEFAULT)
    }

    pub fn with_config(sink: W, config: CodecConfig) -> Self {
        AtcWriter {
            sink,
            config,
            state: WriterState::Empty,
            sample_rate_hz: 0,
            bytes_written: 0,
        }
    }

    /// Write the file header, the info block and the format block.
    pub fn write_header(&mut self, info: &InfoBlock, format: &FormatBlock) -> Result<usize> {
        if self.state != WriterState::Empty {
            return Err(AtcError::HeaderAlreadyWritten);
        }

        let header = FileHeader::new(&self.config);
        header.write_to(&mut self.sink)?;
        log::trace!("Wrote ATC header, version {}", header.version);
        self.bytes_written += FileHeader::SIZE as u64;
        self.state = WriterState::HeaderWritten;

        let info_len = self.write_block(BlockId::INFO, &info.to_fields())?;
        let format_len = self.write_block(BlockId::FORMAT, &format.to_fields())?;
        self.sample_rate_hz = format.sample_rate_hz;

        Ok(FileHeader::SIZE + info_len + format_len)
    }

    /// Write the low resolution preview signal.
    pub fn write_preview(&mut self, samples: &[i16]) -> Result<usize> {
        self.write_block(BlockId::PREVIEW, &[("data", FieldValue::Samples(samples.to_vec()))])
    }

    /// Write the samples of `lead` (1 = lead I, ..., 6 = aVF).
    pub fn write_ecg_samples(&mut self, samples: &[i16], lead: usize) -> Result<usize> {
        let id = schema::lead_block_id(lead).ok_or(AtcError::InvalidLead {
            family: BlockFamily::Lead(0).name(),
            lead,
        })?;
        self.write_block(id, &[("data", FieldValue::Samples(samples.to_vec()))])
    }

    /// Write the average beat of `lead` (1 or 2).
    pub fn write_average_beat(&mut self, samples: &[i16], lead: usize) -> Result<usize> {
        let id = schema::average_beat_block_id(lead).ok_or(AtcError::InvalidLead {
            family: BlockFamily::AverageBeat(0).name(),
            lead,
        })?;
        self.write_block(id, &[("data", FieldValue::Samples(samples.to_vec()))])
    }

    /// Write the annotation block. The tick frequency is the sample rate
    /// given to `write_header`. Nothing may be written afterwards.
    pub fn write_annotations(&mut self, annotations: &[Annotation]) -> Result<usize> {
        let fields = [
            ("tick_frequency", FieldValue::U32(u32::from(self.sample_rate_hz))),
            ("annotations", FieldValue::Annotations(annotations.to_vec())),
        ];
        let written = self.write_block(BlockId::ANNOTATIONS, &fields)?;
        self.state = WriterState::AnnotationsWritten;
        Ok(written)
    }

    /// Total bytes written so far, header included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.sink)
    }

    pub fn close(self) -> Result<()> {
        self.finish().map(drop)
    }

    fn write_block(&mut self, id: BlockId, fields: &[(&str, FieldValue)]) -> Result<usize> {
        match self.state {
            WriterState::Empty => return Err(AtcError::HeaderNotWritten),
            WriterState::AnnotationsWritten => return Err(AtcError::BlockOrder(id.name())),
            WriterState::HeaderWritten => {}
        }

        let schema = registered(id)?;
        let bytes = encode_block(schema, fields)?;
        self.sink.write_all(&bytes)?;
        self.bytes_written += bytes.len() as u64;
        log::debug!("Wrote block '{}' ({} bytes)", id, bytes.len());
        Ok(bytes.len())
    }
}

fn registered(id: BlockId) -> Result<&'static BlockSchema> {
    schema::lookup(id).ok_or_else(|| AtcError::UnknownBlock(id.name()))
}

/// Serialize a decoded document back to ATC bytes.
///
/// The header carries the current format version; blocks follow in
/// canonical order. Blocks skipped as unknown while reading are dropped.
pub fn encode_document(document: &AtcDocument) -> Result<Vec<u8>> {
    encode_document_with_config(document, &CodecConfig::DEFAULT)
}

pub fn encode_document_with_config(document: &AtcDocument, config: &CodecConfig) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(
        FileHeader::SIZE + document.blocks().map(|b| b.encoded_len()).sum::<usize>(),
    );
    FileHeader::new(config).write_to(&mut out)?;
    for block in document.blocks_in_order() {
        let bytes = encode_block(registered(block.id)?, &block.fields)?;
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}
