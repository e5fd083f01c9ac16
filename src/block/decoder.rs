// src/block/decoder.rs
use crate::block::Checksum;
use crate::error::{AtcError, Result};
use crate::schema::{BlockFamily, BlockId, BlockSchema, FieldKind, BLOCK_CONTAINER_SIZE};
use crate::types::{Annotation, DateRecorded, FieldValue, FlagSet};
use crate::utils::decode_fixed_string_lossy;
use byteorder::{ByteOrder, LittleEndian};
use smallvec::SmallVec;

/// Field values of one block, in schema order
pub type BlockFields = SmallVec<[(&'static str, FieldValue); 8]>;

/// One block decoded against its schema
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBlock {
    pub id: BlockId,
    pub family: BlockFamily,
    pub declared_length: u32,
    pub fields: BlockFields,
    pub stored_checksum: u32,
    pub computed_checksum: u32,
}

impl DecodedBlock {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn checksum_ok(&self) -> bool {
        self.stored_checksum == self.computed_checksum
    }

    /// Size of the block on disk, container included
    pub fn encoded_len(&self) -> usize {
        BLOCK_CONTAINER_SIZE.saturating_add(self.declared_length as usize)
    }

    /// Samples of a preview, lead or average beat block
    pub fn samples(&self) -> Option<&[i16]> {
        self.fields.iter().find_map(|(_, v)| v.as_samples())
    }
}

/// Bounds-checked reader over a byte slice
struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    /// File offset of `data[0]`, for error messages
    base: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8], base: usize) -> Self {
        ByteCursor { data, pos: 0, base }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let available = self.data.len() - self.pos;
        if count > available {
            return Err(AtcError::missing(
                self.offset(),
                format!("need {} bytes, only {} available", count, available),
            ));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// Decode the block at the start of `raw` (which begins with its id).
///
/// Returns the block and the number of bytes it occupies. A checksum
/// mismatch is not an error here; check [`DecodedBlock::checksum_ok`].
/// The exception is a fixed-size block whose declared length disagrees
/// with its layout: that is `CorruptData` when the checksum fails and
/// `MissingData` otherwise.
pub fn decode_block(schema: &BlockSchema, raw: &[u8]) -> Result<(DecodedBlock, usize)> {
    decode_block_at(schema, raw, 0)
}

/// As [`decode_block`], with `offset` the file position of `raw[0]`.
pub fn decode_block_at(
    schema: &BlockSchema,
    raw: &[u8],
    offset: usize,
) -> Result<(DecodedBlock, usize)> {
    let mut cursor = ByteCursor::new(raw, offset);

    let id_bytes = cursor.take(BlockId::LEN)?;
    if id_bytes != schema.id.as_bytes() {
        return Err(AtcError::UnknownBlock(String::from_utf8_lossy(id_bytes).into_owned()));
    }
    let mut checksum = Checksum::seeded(schema.id);

    let length_bytes = cursor.take(4)?;
    checksum.update(length_bytes);
    let declared_length = LittleEndian::read_u32(length_bytes);

    // Fixed-size blocks are framed by their layout, not the declared length
    let fixed_size = schema.fixed_payload_size();
    let payload_len = fixed_size.unwrap_or(declared_length as usize);

    let payload_offset = cursor.offset();
    let payload = cursor.take(payload_len).map_err(|_| {
        AtcError::missing(
            payload_offset,
            format!(
                "block '{}' needs {} payload bytes, only {} available",
                schema.id,
                payload_len,
                raw.len().saturating_sub(BlockId::LEN + 4)
            ),
        )
    })?;

    let mut fields = BlockFields::new();
    let mut payload_cursor = ByteCursor::new(payload, payload_offset);
    for def in schema.payload_fields() {
        let size = match def.kind.fixed_size() {
            Some(size) => size,
            None => {
                let remaining = payload_cursor.remaining();
                let element = def.kind.element_size().unwrap_or(1);
                if remaining % element != 0 {
                    return Err(AtcError::missing(
                        payload_cursor.offset(),
                        format!(
                            "{} bytes left for '{}' in block '{}', not a multiple of {}",
                            remaining, def.name, schema.id, element
                        ),
                    ));
                }
                remaining
            }
        };
        let bytes = payload_cursor.take(size)?;
        checksum.update(bytes);
        fields.push((def.name, decode_field(def.kind, bytes)));
    }

    if payload_cursor.remaining() != 0 {
        return Err(AtcError::missing(
            payload_cursor.offset(),
            format!(
                "block '{}' declares {} payload bytes, fields use {}",
                schema.id,
                declared_length,
                declared_length as usize - payload_cursor.remaining()
            ),
        ));
    }

    let stored_checksum = LittleEndian::read_u32(cursor.take(4)?);

    if let Some(size) = fixed_size.filter(|&size| size != declared_length as usize) {
        if stored_checksum != checksum.value() {
            return Err(AtcError::CorruptData {
                block: schema.id.name(),
                stored: stored_checksum,
                computed: checksum.value(),
            });
        }
        return Err(AtcError::missing(
            payload_offset - 4,
            format!("block '{}' declares {} payload bytes, layout has {}", schema.id, declared_length, size),
        ));
    }

    let block = DecodedBlock {
        id: schema.id,
        family: schema.family,
        declared_length,
        fields,
        stored_checksum,
        computed_checksum: checksum.value(),
    };
    Ok((block, cursor.pos))
}

/// Raw bytes of one field to its value, applying derived decodings.
fn decode_field(kind: FieldKind, bytes: &[u8]) -> FieldValue {
    match kind {
        FieldKind::U8 => FieldValue::U8(bytes[0]),
        FieldKind::U16 => FieldValue::U16(LittleEndian::read_u16(bytes)),
        FieldKind::U32 | FieldKind::Length | FieldKind::Checksum => {
            FieldValue::U32(LittleEndian::read_u32(bytes))
        }
        FieldKind::Text(_) => FieldValue::Text(decode_fixed_string_lossy(bytes)),
        FieldKind::Flags => FieldValue::Flags(FlagSet::from_bits(bytes[0])),
        FieldKind::Date(_) => FieldValue::Date(DateRecorded::from_text(decode_fixed_string_lossy(bytes))),
        FieldKind::Samples => {
            let mut samples = vec![0i16; bytes.len() / 2];
            LittleEndian::read_i16_into(bytes, &mut samples);
            FieldValue::Samples(samples)
        }
        FieldKind::Annotations => FieldValue::Annotations(
            bytes
                .chunks_exact(Annotation::SIZE)
                .map(|c| Annotation::new(LittleEndian::read_u32(&c[..4]), LittleEndian::read_i16(&c[4..])))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::running_sum;
    use crate::schema::lookup;

    fn raw_block(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut raw = id.to_vec();
        raw.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        raw.extend_from_slice(payload);
        let sum = running_sum(&raw);
        raw.extend_from_slice(&sum.to_le_bytes());
        raw
    }

    #[test]
    fn test_decode_format_block() {
        let payload = [1u8, 0x2C, 0x01, 0xF4, 0x01, 0b0000_0110, 0, 0];
        let raw = raw_block(b"fmt ", &payload);
        let schema = lookup(BlockId::FORMAT).unwrap();

        let (block, consumed) = decode_block(schema, &raw).unwrap();
        assert_eq!(consumed, 20);
        assert!(block.checksum_ok());
        assert_eq!(block.get("ecg_format"), Some(&FieldValue::U8(1)));
        assert_eq!(block.get("sample_rate_hz"), Some(&FieldValue::U16(300)));
        assert_eq!(block.get("resolution"), Some(&FieldValue::U16(500)));
        let flags = block.get("flags").and_then(|v| v.as_flags()).unwrap();
        assert!(flags.mains_filter());
        assert_eq!(flags.mains_frequency().hz(), 60);
    }

    #[test]
    fn test_decode_samples() {
        let samples: [i16; 4] = [995, 1055, -11, i16::MIN];
        let payload: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let raw = raw_block(b"ecg ", &payload);
        let schema = lookup(BlockId::new(*b"ecg ")).unwrap();

        let (block, consumed) = decode_block(schema, &raw).unwrap();
        assert_eq!(consumed, 12 + 8);
        assert_eq!(block.samples(), Some(&samples[..]));
        assert_eq!(block.family, BlockFamily::Lead(1));
    }

    #[test]
    fn test_decode_annotations() {
        let mut payload = 300u32.to_le_bytes().to_vec();
        for (offset, kind) in [(10u32, 1i16), (652, -2)] {
            payload.extend_from_slice(&offset.to_le_bytes());
            payload.extend_from_slice(&kind.to_le_bytes());
        }
        let raw = raw_block(b"ann ", &payload);
        let schema = lookup(BlockId::ANNOTATIONS).unwrap();

        let (block, consumed) = decode_block(schema, &raw).unwrap();
        assert_eq!(consumed, 28);
        assert_eq!(block.get("tick_frequency"), Some(&FieldValue::U32(300)));
        let annotations = block.get("annotations").and_then(|v| v.as_annotations()).unwrap();
        assert_eq!(annotations, &[Annotation::new(10, 1), Annotation::new(652, -2)]);
    }

    #[test]
    fn test_empty_sample_block() {
        let raw = raw_block(b"avg2", &[]);
        let schema = lookup(BlockId::new(*b"avg2")).unwrap();
        let (block, consumed) = decode_block(schema, &raw).unwrap();
        assert_eq!(consumed, 12);
        assert_eq!(block.samples(), Some(&[][..]));
    }

    #[test]
    fn test_checksum_mismatch_reported() {
        let mut raw = raw_block(b"ecg ", &[1, 0, 2, 0]);
        raw[9] ^= 0x40;
        let schema = lookup(BlockId::new(*b"ecg ")).unwrap();
        let (block, _) = decode_block(schema, &raw).unwrap();
        assert!(!block.checksum_ok());
    }

    #[test]
    fn test_truncated_payload() {
        let raw = raw_block(b"ecg ", &[1, 0, 2, 0]);
        let schema = lookup(BlockId::new(*b"ecg ")).unwrap();
        let err = decode_block(schema, &raw[..10]).unwrap_err();
        assert!(matches!(err, AtcError::MissingData { .. }));
        let err = decode_block(schema, &raw[..raw.len() - 1]).unwrap_err();
        assert!(matches!(err, AtcError::MissingData { .. }));
    }

    #[test]
    fn test_odd_sample_length() {
        let raw = raw_block(b"ecg ", &[1, 0, 2]);
        let schema = lookup(BlockId::new(*b"ecg ")).unwrap();
        assert!(matches!(decode_block(schema, &raw), Err(AtcError::MissingData { .. })));
    }

    #[test]
    fn test_annotation_length_not_multiple_of_six() {
        let mut payload = 300u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&[1, 2, 3, 4, 5]);
        let raw = raw_block(b"ann ", &payload);
        let schema = lookup(BlockId::ANNOTATIONS).unwrap();
        assert!(matches!(decode_block(schema, &raw), Err(AtcError::MissingData { .. })));
    }

    #[test]
    fn test_fixed_block_length_mismatch() {
        let schema = lookup(BlockId::FORMAT).unwrap();
        let too_long = raw_block(b"fmt ", &[0u8; 9]);
        assert!(matches!(decode_block(schema, &too_long), Err(AtcError::CorruptData { .. })));
        let too_short = raw_block(b"fmt ", &[0u8; 7]);
        assert!(matches!(decode_block(schema, &too_short), Err(AtcError::MissingData { .. })));

        // wrong length, but checksummed as written
        let mut consistent = b"fmt ".to_vec();
        consistent.extend_from_slice(&9u32.to_le_bytes());
        consistent.extend_from_slice(&[0u8; 8]);
        let sum = running_sum(&consistent);
        consistent.extend_from_slice(&sum.to_le_bytes());
        assert!(matches!(decode_block(schema, &consistent), Err(AtcError::MissingData { .. })));
    }

    #[test]
    fn test_fixed_block_damaged_length() {
        let schema = lookup(BlockId::FORMAT).unwrap();
        let clean = raw_block(b"fmt ", &[1, 0x2C, 0x01, 0xF4, 0x01, 6, 0, 0]);
        for position in 4..8 {
            let mut raw = clean.clone();
            raw[position] ^= 0x01;
            match decode_block(schema, &raw) {
                Err(AtcError::CorruptData { stored, computed, .. }) => assert_ne!(stored, computed),
                other => panic!("length byte {} gave {:?}", position, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_info_strings_trimmed() {
        let mut payload = Vec::new();
        for (text, width) in [
            ("2017-03-01T12:34:56.789", 32),
            ("uuid-1", 40),
            ("", 44),
            ("iPhone 4 : iPhone OS4.2", 32),
            ("AliveECG v1.6.7", 32),
            ("AC-1", 32),
            ("SER=AC6L100010,BAT=55", 52),
        ] {
            let mut bytes = text.as_bytes().to_vec();
            bytes.resize(width, 0);
            payload.extend_from_slice(&bytes);
        }
        let raw = raw_block(b"info", &payload);
        let schema = lookup(BlockId::INFO).unwrap();

        let (block, consumed) = decode_block(schema, &raw).unwrap();
        assert_eq!(consumed, 276);
        assert_eq!(block.get("phone_model").and_then(|v| v.as_text()), Some("iPhone 4 : iPhone OS4.2"));
        assert_eq!(block.get("phone_uuid").and_then(|v| v.as_text()), Some(""));
        let date = block.get("date_recorded").and_then(|v| v.as_date()).unwrap();
        assert_eq!(date.text(), "2017-03-01T12:34:56.789");
        assert!(date.timestamp().is_some());
    }

    #[test]
    fn test_wrong_id_rejected() {
        let raw = raw_block(b"ecg2", &[]);
        let schema = lookup(BlockId::new(*b"ecg ")).unwrap();
        assert!(matches!(decode_block(schema, &raw), Err(AtcError::UnknownBlock(_))));
    }
}
