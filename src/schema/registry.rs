// src/schema/registry.rs
use super::BlockId;

/// Bytes around every payload: id, `u32` length and `u32` checksum.
pub const BLOCK_CONTAINER_SIZE: usize = BlockId::LEN + 2 * 4;

/// Wire representation of one block field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `u32` payload length, always the first field
    Length,
    U8,
    U16,
    U32,
    /// NUL-padded string of fixed width
    Text(usize),
    /// One-byte bitfield decoded to a [`FlagSet`](crate::types::FlagSet)
    Flags,
    /// NUL-padded ISO-8601 string of fixed width
    Date(usize),
    /// `i16` samples filling the rest of the payload
    Samples,
    /// `(u32, i16)` pairs filling the rest of the payload
    Annotations,
    /// `u32` running byte sum, always the last field
    Checksum,
}

impl FieldKind {
    /// Size in bytes, or None for fields sized by the declared length
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            FieldKind::U8 | FieldKind::Flags => Some(1),
            FieldKind::U16 => Some(2),
            FieldKind::Length | FieldKind::U32 | FieldKind::Checksum => Some(4),
            FieldKind::Text(width) | FieldKind::Date(width) => Some(*width),
            FieldKind::Samples | FieldKind::Annotations => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Length => "length",
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::Text(_) => "text",
            FieldKind::Flags => "flags",
            FieldKind::Date(_) => "date",
            FieldKind::Samples => "samples",
            FieldKind::Annotations => "annotations",
            FieldKind::Checksum => "checksum",
        }
    }

    /// Element size of a variable-length field
    pub fn element_size(&self) -> Option<usize> {
        match self {
            FieldKind::Samples => Some(2),
            FieldKind::Annotations => Some(6),
            _ => None,
        }
    }

    /// Whether the field lives inside the payload (everything but length and checksum)
    pub fn is_payload(&self) -> bool {
        !matches!(self, FieldKind::Length | FieldKind::Checksum)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, kind }
}

/// What a block holds; lead families are numbered from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFamily {
    Info,
    Format,
    Preview,
    Lead(u8),
    AverageBeat(u8),
    Annotations,
}

impl BlockFamily {
    pub fn name(&self) -> &'static str {
        match self {
            BlockFamily::Info => "info",
            BlockFamily::Format => "format",
            BlockFamily::Preview => "preview",
            BlockFamily::Lead(_) => "lead",
            BlockFamily::AverageBeat(_) => "average beat",
            BlockFamily::Annotations => "annotation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSchema {
    pub id: BlockId,
    pub family: BlockFamily,
    pub fields: &'static [FieldDef],
}

impl BlockSchema {
    pub fn payload_fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|f| f.kind.is_payload())
    }

    /// Payload size when every payload field has a fixed width
    pub fn fixed_payload_size(&self) -> Option<usize> {
        self.payload_fields().map(|f| f.kind.fixed_size()).sum()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub const LENGTH_FIELD: &str = "data_length";
pub const CHECKSUM_FIELD: &str = "checksum";

static INFO_FIELDS: [FieldDef; 9] = [
    field(LENGTH_FIELD, FieldKind::Length),
    field("date_recorded", FieldKind::Date(32)),
    field("recording_uuid", FieldKind::Text(40)),
    field("phone_uuid", FieldKind::Text(44)),
    field("phone_model", FieldKind::Text(32)),
    field("recorder_software", FieldKind::Text(32)),
    field("recorder_hardware", FieldKind::Text(32)),
    field("device_data", FieldKind::Text(52)),
    field(CHECKSUM_FIELD, FieldKind::Checksum),
];

static FORMAT_FIELDS: [FieldDef; 7] = [
    field(LENGTH_FIELD, FieldKind::Length),
    field("ecg_format", FieldKind::U8),
    field("sample_rate_hz", FieldKind::U16),
    field("resolution", FieldKind::U16),
    field("flags", FieldKind::Flags),
    field("reserved", FieldKind::U16),
    field(CHECKSUM_FIELD, FieldKind::Checksum),
];

static SAMPLE_FIELDS: [FieldDef; 3] = [
    field(LENGTH_FIELD, FieldKind::Length),
    field("data", FieldKind::Samples),
    field(CHECKSUM_FIELD, FieldKind::Checksum),
];

static ANNOTATION_FIELDS: [FieldDef; 4] = [
    field(LENGTH_FIELD, FieldKind::Length),
    field("tick_frequency", FieldKind::U32),
    field("annotations", FieldKind::Annotations),
    field(CHECKSUM_FIELD, FieldKind::Checksum),
];

const fn schema(id: &[u8; 4], family: BlockFamily, fields: &'static [FieldDef]) -> BlockSchema {
    BlockSchema { id: BlockId::new(*id), family, fields }
}

/// Every block type the codec understands, in canonical file order.
///
/// New leads are added here; the decoder and encoder find them by family.
pub static BLOCK_SCHEMAS: [BlockSchema; 12] = [
    schema(b"info", BlockFamily::Info, &INFO_FIELDS),
    schema(b"fmt ", BlockFamily::Format, &FORMAT_FIELDS),
    schema(b"pre ", BlockFamily::Preview, &SAMPLE_FIELDS),
    schema(b"ecg ", BlockFamily::Lead(1), &SAMPLE_FIELDS),
    schema(b"ecg2", BlockFamily::Lead(2), &SAMPLE_FIELDS),
    schema(b"ecg3", BlockFamily::Lead(3), &SAMPLE_FIELDS),
    schema(b"ecg4", BlockFamily::Lead(4), &SAMPLE_FIELDS),
    schema(b"ecg5", BlockFamily::Lead(5), &SAMPLE_FIELDS),
    schema(b"ecg6", BlockFamily::Lead(6), &SAMPLE_FIELDS),
    schema(b"avg ", BlockFamily::AverageBeat(1), &SAMPLE_FIELDS),
    schema(b"avg2", BlockFamily::AverageBeat(2), &SAMPLE_FIELDS),
    schema(b"ann ", BlockFamily::Annotations, &ANNOTATION_FIELDS),
];

pub fn lookup(id: BlockId) -> Option<&'static BlockSchema> {
    BLOCK_SCHEMAS.iter().find(|s| s.id == id)
}

pub fn schema_for(family: BlockFamily) -> Option<&'static BlockSchema> {
    BLOCK_SCHEMAS.iter().find(|s| s.family == family)
}

pub fn lead_block_id(lead: usize) -> Option<BlockId> {
    let lead = u8::try_from(lead).ok()?;
    schema_for(BlockFamily::Lead(lead)).map(|s| s.id)
}

pub fn average_beat_block_id(lead: usize) -> Option<BlockId> {
    let lead = u8::try_from(lead).ok()?;
    schema_for(BlockFamily::AverageBeat(lead)).map(|s| s.id)
}

/// Ids of all registered lead sample blocks, lead 1 first
pub fn lead_block_ids() -> impl Iterator<Item = BlockId> {
    BLOCK_SCHEMAS
        .iter()
        .filter(|s| matches!(s.family, BlockFamily::Lead(_)))
        .map(|s| s.id)
}
