// src/block/encoder.rs
use crate::block::Checksum;
use crate::error::{AtcError, Result};
use crate::schema::{BlockSchema, FieldDef, FieldKind, BLOCK_CONTAINER_SIZE};
use crate::types::FieldValue;
use crate::utils::encode_fixed_string;
use bytes::{BufMut, Bytes, BytesMut};

/// Serialize one block from `(name, value)` pairs.
///
/// Fields are written in schema order. The length field is computed from
/// the payload actually written and the checksum is accumulated exactly as
/// the decoder does; any length or checksum among `fields` is ignored.
///
/// ```
/// use atc_rs::block::encode_block;
/// use atc_rs::schema::{self, BlockId};
/// use atc_rs::types::FieldValue;
///
/// let schema = schema::lookup(BlockId::new(*b"ecg ")).unwrap();
/// let bytes = encode_block(schema, &[("data", FieldValue::Samples(vec![1, -1]))]).unwrap();
/// assert_eq!(bytes.len(), 12 + 4);
/// assert_eq!(&bytes[..4], b"ecg ");
/// ```
pub fn encode_block(schema: &BlockSchema, fields: &[(&str, FieldValue)]) -> Result<Bytes> {
    let mut payload = BytesMut::new();
    for def in schema.payload_fields() {
        let value = fields
            .iter()
            .find(|(name, _)| *name == def.name)
            .map(|(_, value)| value)
            .ok_or_else(|| AtcError::MissingField {
                block: schema.id.name(),
                field: def.name,
            })?;
        write_field(&mut payload, def, value)?;
    }

    let length = u32::try_from(payload.len()).map_err(|_| AtcError::PayloadTooLarge {
        block: schema.id.name(),
        size: payload.len(),
    })?;

    let mut checksum = Checksum::seeded(schema.id);
    let mut block = BytesMut::with_capacity(BLOCK_CONTAINER_SIZE + payload.len());
    block.put_slice(schema.id.as_bytes());
    block.put_u32_le(length);
    checksum.update(&length.to_le_bytes());
    checksum.update(&payload);
    block.put_slice(&payload);
    block.put_u32_le(checksum.value());

    Ok(block.freeze())
}

fn write_field(buffer: &mut BytesMut, def: &FieldDef, value: &FieldValue) -> Result<()> {
    match (def.kind, value) {
        (FieldKind::U8, FieldValue::U8(v)) => buffer.put_u8(*v),
        (FieldKind::U16, FieldValue::U16(v)) => buffer.put_u16_le(*v),
        (FieldKind::U32, FieldValue::U32(v)) => buffer.put_u32_le(*v),
        (FieldKind::Text(width), FieldValue::Text(s)) => {
            buffer.put_slice(&encode_fixed_string(s, width));
        }
        (FieldKind::Flags, FieldValue::Flags(flags)) => buffer.put_u8(flags.bits()),
        (FieldKind::Date(width), FieldValue::Date(date)) => {
            buffer.put_slice(&encode_fixed_string(date.text(), width));
        }
        (FieldKind::Samples, FieldValue::Samples(samples)) => {
            buffer.reserve(samples.len() * 2);
            for &sample in samples {
                buffer.put_i16_le(sample);
            }
        }
        (FieldKind::Annotations, FieldValue::Annotations(annotations)) => {
            buffer.reserve(annotations.len() * 6);
            for annotation in annotations {
                buffer.put_u32_le(annotation.offset);
                buffer.put_i16_le(annotation.beat_type);
            }
        }
        (kind, value) => {
            return Err(AtcError::TypeMismatch {
                field: def.name,
                expected: kind.name(),
                found: value.kind_name(),
            })
        }
    }
    Ok(())
}
