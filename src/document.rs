// src/document.rs
use crate::block::{DecodedBlock, FileHeader};
use crate::config::CodecConfig;
use crate::error::{AtcError, Result};
use crate::schema::{self, BlockId};
use crate::types::{Annotation, DateRecorded, FieldValue, FlagSet, MainsFrequency};
use std::collections::BTreeMap;

/// Recording metadata from the `info` block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfoBlock {
    pub date_recorded: DateRecorded,
    /// Max 40 bytes
    pub recording_uuid: String,
    /// Max 44 bytes, unused by current recorders
    pub phone_uuid: String,
    /// Model of the mobile device, e.g. "iPhone 4 : iPhone OS4.2". Max 32 bytes
    pub phone_model: String,
    /// e.g. "AliveECG v1.6.7". Max 32 bytes
    pub recorder_software: String,
    /// Max 32 bytes
    pub recorder_hardware: String,
    /// Comma separated key-value pairs, e.g. "SER=AC6L100010,BAT=55". Max 52 bytes
    pub device_data: String,
}

impl InfoBlock {
    pub fn from_block(block: &DecodedBlock) -> Result<Self> {
        Ok(InfoBlock {
            date_recorded: field(block, "date_recorded", FieldValue::as_date)?.clone(),
            recording_uuid: text(block, "recording_uuid")?,
            phone_uuid: text(block, "phone_uuid")?,
            phone_model: text(block, "phone_model")?,
            recorder_software: text(block, "recorder_software")?,
            recorder_hardware: text(block, "recorder_hardware")?,
            device_data: text(block, "device_data")?,
        })
    }

    pub fn to_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("date_recorded", FieldValue::Date(self.date_recorded.clone())),
            ("recording_uuid", FieldValue::Text(self.recording_uuid.clone())),
            ("phone_uuid", FieldValue::Text(self.phone_uuid.clone())),
            ("phone_model", FieldValue::Text(self.phone_model.clone())),
            ("recorder_software", FieldValue::Text(self.recorder_software.clone())),
            ("recorder_hardware", FieldValue::Text(self.recorder_hardware.clone())),
            ("device_data", FieldValue::Text(self.device_data.clone())),
        ]
    }
}

/// Signal format from the `fmt ` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatBlock {
    pub ecg_format: u8,
    pub sample_rate_hz: u16,
    /// Nanovolts per sample unit, typically 500
    pub resolution: u16,
    pub flags: FlagSet,
    pub reserved: u16,
}

impl FormatBlock {
    /// Format block with the default ecg format and resolution.
    pub fn new(sample_rate_hz: u16, flags: FlagSet) -> Self {
        Self::with_config(sample_rate_hz, flags, &CodecConfig::DEFAULT)
    }

    pub fn with_config(sample_rate_hz: u16, flags: FlagSet, config: &CodecConfig) -> Self {
        FormatBlock {
            ecg_format: config.ecg_format,
            sample_rate_hz,
            resolution: config.resolution_nv,
            flags,
            reserved: 0,
        }
    }

    /// Set the mains frequency bit, like recorders do from their locale.
    pub fn with_mains_frequency(mut self, frequency: MainsFrequency) -> Self {
        self.flags.set_mains_frequency(frequency);
        self
    }

    pub fn from_block(block: &DecodedBlock) -> Result<Self> {
        Ok(FormatBlock {
            ecg_format: field(block, "ecg_format", FieldValue::as_u8)?,
            sample_rate_hz: field(block, "sample_rate_hz", FieldValue::as_u16)?,
            resolution: field(block, "resolution", FieldValue::as_u16)?,
            flags: field(block, "flags", FieldValue::as_flags)?,
            reserved: field(block, "reserved", FieldValue::as_u16)?,
        })
    }

    pub fn to_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("ecg_format", FieldValue::U8(self.ecg_format)),
            ("sample_rate_hz", FieldValue::U16(self.sample_rate_hz)),
            ("resolution", FieldValue::U16(self.resolution)),
            ("flags", FieldValue::Flags(self.flags)),
            ("reserved", FieldValue::U16(self.reserved)),
        ]
    }
}

fn field<'a, T>(
    block: &'a DecodedBlock,
    name: &'static str,
    extract: impl Fn(&'a FieldValue) -> Option<T>,
) -> Result<T> {
    let value = block.get(name).ok_or_else(|| AtcError::MissingField {
        block: block.id.name(),
        field: name,
    })?;
    let kind = value.kind_name();
    extract(value).ok_or(AtcError::TypeMismatch { field: name, expected: "registry kind", found: kind })
}

fn text(block: &DecodedBlock, name: &'static str) -> Result<String> {
    field(block, name, FieldValue::as_text).map(str::to_string)
}

/// A block whose id is not in the registry, skipped while reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedBlock {
    pub id: BlockId,
    /// File offset of the block id
    pub offset: usize,
    pub declared_length: u32,
}

/// A fully decoded ATC file.
///
/// Holds one [`DecodedBlock`] per block id seen in the file. A document
/// always has a format block; reading fails without one.
#[derive(Debug, Clone, PartialEq)]
pub struct AtcDocument {
    header: FileHeader,
    format: FormatBlock,
    info: Option<InfoBlock>,
    blocks: BTreeMap<BlockId, DecodedBlock>,
    skipped: Vec<SkippedBlock>,
}

impl AtcDocument {
    pub(crate) fn new(
        header: FileHeader,
        format: FormatBlock,
        blocks: BTreeMap<BlockId, DecodedBlock>,
        skipped: Vec<SkippedBlock>,
    ) -> Result<Self> {
        let info = blocks.get(&BlockId::INFO).map(InfoBlock::from_block).transpose()?;
        Ok(AtcDocument { header, format, info, blocks, skipped })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// The ATC version recorded in the file header.
    pub fn atc_version(&self) -> u32 {
        self.header.version
    }

    pub fn block(&self, id: BlockId) -> Option<&DecodedBlock> {
        self.blocks.get(&id)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &DecodedBlock> {
        self.blocks.values()
    }

    /// Unknown blocks passed over while reading, in file order.
    pub fn skipped_blocks(&self) -> &[SkippedBlock] {
        &self.skipped
    }

    pub fn format(&self) -> &FormatBlock {
        &self.format
    }

    pub fn info(&self) -> Option<&InfoBlock> {
        self.info.as_ref()
    }

    /// Number of ECG leads in the recording.
    pub fn num_leads(&self) -> usize {
        schema::lead_block_ids().filter(|id| self.blocks.contains_key(id)).count()
    }

    /// Samples for `lead` (1 = lead I, 2 = lead II, ...), in ATC units.
    pub fn ecg_samples(&self, lead: usize) -> Option<&[i16]> {
        self.block(schema::lead_block_id(lead)?)?.samples()
    }

    /// Average beat for `lead` (1 = lead I, 2 = lead II).
    pub fn average_beat(&self, lead: usize) -> Option<&[i16]> {
        self.block(schema::average_beat_block_id(lead)?)?.samples()
    }

    pub fn preview(&self) -> Option<&[i16]> {
        self.block(BlockId::PREVIEW)?.samples()
    }

    /// Beat annotations, empty when the file has no annotation block.
    pub fn annotations(&self) -> &[Annotation] {
        self.block(BlockId::ANNOTATIONS)
            .and_then(|b| b.get("annotations"))
            .and_then(FieldValue::as_annotations)
            .unwrap_or(&[])
    }

    /// Annotation offsets and beat types as two parallel lists.
    pub fn annotation_columns(&self) -> (Vec<u32>, Vec<i16>) {
        self.annotations().iter().map(|a| (a.offset, a.beat_type)).unzip()
    }

    pub fn tick_frequency(&self) -> Option<u32> {
        self.block(BlockId::ANNOTATIONS)?.get("tick_frequency")?.as_u32()
    }

    pub fn sample_rate_hz(&self) -> u16 {
        self.format.sample_rate_hz
    }

    /// Resolution of the signal in nV per unit.
    pub fn resolution(&self) -> u16 {
        self.format.resolution
    }

    pub fn ecg_format(&self) -> u8 {
        self.format.ecg_format
    }

    pub fn flags(&self) -> FlagSet {
        self.format.flags
    }

    /// The mains frequency where this file was recorded.
    pub fn mains_frequency_hz(&self) -> u16 {
        self.format.flags.mains_frequency().hz()
    }

    pub fn mains_filtered(&self) -> bool {
        self.format.flags.mains_filter()
    }

    pub fn baseline_filtered(&self) -> bool {
        self.format.flags.baseline_filter()
    }

    pub fn notch_mains_filtered(&self) -> bool {
        self.format.flags.notch_mains_filter()
    }

    pub fn enhanced_filtered(&self) -> bool {
        self.format.flags.enhanced_filter()
    }

    pub fn date_recorded(&self) -> Option<&DateRecorded> {
        self.info.as_ref().map(|i| &i.date_recorded)
    }

    pub fn recording_uuid(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.recording_uuid.as_str())
    }

    pub fn phone_uuid(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.phone_uuid.as_str())
    }

    pub fn phone_model(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.phone_model.as_str())
    }

    pub fn recorder_software(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.recorder_software.as_str())
    }

    pub fn recorder_hardware(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.recorder_hardware.as_str())
    }

    pub fn device_data(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.device_data.as_str())
    }

    /// Blocks in canonical write order: info, format, data blocks, annotations.
    pub(crate) fn blocks_in_order(&self) -> impl Iterator<Item = &DecodedBlock> {
        schema::BLOCK_SCHEMAS
            .iter()
            .filter_map(|s| self.blocks.get(&s.id))
    }
}
