// src/types/value.rs
use super::{DateRecorded, FlagSet};

/// A detected heartbeat: sample offset within the lead plus a beat type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Annotation {
    pub offset: u32,
    pub beat_type: i16,
}

impl Annotation {
    /// Encoded size in bytes
    pub const SIZE: usize = 6;

    pub fn new(offset: u32, beat_type: i16) -> Self {
        Annotation { offset, beat_type }
    }
}

impl From<(u32, i16)> for Annotation {
    fn from((offset, beat_type): (u32, i16)) -> Self {
        Annotation { offset, beat_type }
    }
}

/// Decoded value of one block field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U8(u8),
    U16(u16),
    U32(u32),
    Text(String),
    Flags(FlagSet),
    Date(DateRecorded),
    Samples(Vec<i16>),
    Annotations(Vec<Annotation>),
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::U8(_) => "u8",
            FieldValue::U16(_) => "u16",
            FieldValue::U32(_) => "u32",
            FieldValue::Text(_) => "text",
            FieldValue::Flags(_) => "flags",
            FieldValue::Date(_) => "date",
            FieldValue::Samples(_) => "samples",
            FieldValue::Annotations(_) => "annotations",
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            FieldValue::U8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            FieldValue::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            FieldValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<FlagSet> {
        match self {
            FieldValue::Flags(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateRecorded> {
        match self {
            FieldValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_samples(&self) -> Option<&[i16]> {
        match self {
            FieldValue::Samples(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_annotations(&self) -> Option<&[Annotation]> {
        match self {
            FieldValue::Annotations(a) => Some(a),
            _ => None,
        }
    }
}
