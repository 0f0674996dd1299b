//! Tuple encoding: packing a row of [`Value`]s into a record-sized byte
//! slot, and back.
//!
//! Grounded in `record_mgr.c`'s `insertRecord`/`getRecord` byte-copy logic:
//! a leading tombstone byte (`+` live, `-` deleted) followed by each
//! attribute's fixed-width encoding, in schema order.

use crate::types::{DataType, Value};

use super::schema::Schema;

pub const TOMBSTONE_LIVE: u8 = b'+';
pub const TOMBSTONE_DELETED: u8 = b'-';

/// Encode `values` (which must match `schema` attribute-for-attribute) into
/// a tombstone-prefixed, `schema.record_size()`-byte slot.
///
/// Panics if `values` doesn't match the schema's attribute types or count —
/// a caller bug, not a recoverable storage condition.
pub fn encode_tuple(schema: &Schema, values: &[Value]) -> Vec<u8> {
    assert_eq!(values.len(), schema.attributes.len(), "value count must match schema");
    let mut buf = Vec::with_capacity(schema.record_size());
    buf.push(TOMBSTONE_LIVE);
    for (attr, value) in schema.attributes.iter().zip(values) {
        match (attr.data_type, value) {
            (DataType::Int, Value::Int(v)) => buf.extend_from_slice(&v.to_be_bytes()),
            (DataType::Float, Value::Float(v)) => buf.extend_from_slice(&v.to_be_bytes()),
            (DataType::Bool, Value::Bool(v)) => buf.push(if *v { 1 } else { 0 }),
            (DataType::String, Value::String(s)) => {
                let width = attr.length as usize;
                let bytes = s.as_bytes();
                let copy_len = bytes.len().min(width);
                let mut field = vec![0u8; width];
                field[..copy_len].copy_from_slice(&bytes[..copy_len]);
                buf.extend_from_slice(&field);
            }
            (expected, got) => panic!("attribute type mismatch: expected {expected:?}, got {got:?}"),
        }
    }
    debug_assert_eq!(buf.len(), schema.record_size());
    buf
}

/// Decode a record slot (tombstone byte already checked by the caller)
/// into schema-ordered values.
pub fn decode_tuple(schema: &Schema, slot: &[u8]) -> Vec<Value> {
    let mut offset = 1;
    let mut values = Vec::with_capacity(schema.attributes.len());
    for attr in &schema.attributes {
        let width = attr.encoded_width() as usize;
        let field = &slot[offset..offset + width];
        let value = match attr.data_type {
            DataType::Int => Value::Int(i32::from_be_bytes(field.try_into().unwrap())),
            DataType::Float => Value::Float(f32::from_be_bytes(field.try_into().unwrap())),
            DataType::Bool => Value::Bool(field[0] != 0),
            DataType::String => {
                let nul = field.iter().position(|&b| b == 0).unwrap_or(field.len());
                Value::String(String::from_utf8_lossy(&field[..nul]).into_owned())
            }
        };
        values.push(value);
        offset += width;
    }
    values
}
