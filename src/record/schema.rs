//! Table schema: the page-0 header layout shared with the block device.
//!
//! Grounded in `record_mgr.c`'s `createTable`/`openTable` encode/decode of
//! the schema header, and `attrOffset`/`getRecordSize`'s attribute-width
//! arithmetic. Per §6, the header is a sequence of big-endian 32-bit
//! integers (`numTuples`, `firstFreePage`, `numAttrs`, `keySize`) followed
//! per-attribute by a fixed 15-byte NUL-padded name, a 32-bit datatype tag,
//! and a 32-bit length.

use crate::types::{DataType, PAGE_SIZE};

/// Fixed width of an attribute name field in the page-0 header.
pub const ATTRIBUTE_NAME_SIZE: usize = 15;

/// One column of a table's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub data_type: DataType,
    /// Encoded byte length. Meaningful (and caller-supplied) only for
    /// `DataType::String`; ignored for the fixed-width scalar types.
    pub length: u32,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: DataType, length: u32) -> Self {
        Self {
            name: name.into(),
            data_type,
            length,
        }
    }

    /// Encoded width of this attribute within a record, matching
    /// `getRecordSize`'s per-type switch: 4 bytes for int/float, 1 byte for
    /// bool, `length` bytes for string.
    pub fn encoded_width(&self) -> u32 {
        match self.data_type {
            DataType::Int => 4,
            DataType::Float => 4,
            DataType::Bool => 1,
            DataType::String => self.length,
        }
    }

    fn type_tag(&self) -> u32 {
        match self.data_type {
            DataType::Int => 0,
            DataType::Float => 1,
            DataType::String => 2,
            DataType::Bool => 3,
        }
    }

    /// Panics on an unrecognized tag — a corrupt or foreign-format header,
    /// not a condition this crate's error taxonomy models.
    fn from_tag(tag: u32) -> DataType {
        match tag {
            0 => DataType::Int,
            1 => DataType::Float,
            2 => DataType::String,
            3 => DataType::Bool,
            other => panic!("corrupt schema header: unknown datatype tag {other}"),
        }
    }
}

/// A table's schema: its attribute list plus the `keySize` field the
/// original stores in the header but never otherwise interprets at this
/// layer (no query planner — §1 Non-goals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub attributes: Vec<Attribute>,
    pub key_size: u32,
}

impl Schema {
    pub fn new(attributes: Vec<Attribute>, key_size: u32) -> Self {
        Self { attributes, key_size }
    }

    /// Total encoded bytes per tuple, including the leading tombstone byte
    /// (`getRecordSize`'s `++size` at the end).
    pub fn record_size(&self) -> usize {
        1 + self
            .attributes
            .iter()
            .map(|a| a.encoded_width() as usize)
            .sum::<usize>()
    }

    /// Number of tuple slots that fit in one page.
    pub fn slots_per_page(&self) -> usize {
        PAGE_SIZE / self.record_size()
    }

    /// Serialize the page-0 header: counts, then each attribute's
    /// name/tag/length triple.
    pub(crate) fn encode_header(&self, num_tuples: u32, first_free_page: u32) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PAGE_SIZE);
        buf.extend_from_slice(&num_tuples.to_be_bytes());
        buf.extend_from_slice(&first_free_page.to_be_bytes());
        buf.extend_from_slice(&(self.attributes.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.key_size.to_be_bytes());
        for attr in &self.attributes {
            let mut name_field = [0u8; ATTRIBUTE_NAME_SIZE];
            let name_bytes = attr.name.as_bytes();
            let copy_len = name_bytes.len().min(ATTRIBUTE_NAME_SIZE);
            name_field[..copy_len].copy_from_slice(&name_bytes[..copy_len]);
            buf.extend_from_slice(&name_field);
            buf.extend_from_slice(&attr.type_tag().to_be_bytes());
            buf.extend_from_slice(&attr.length.to_be_bytes());
        }
        buf.resize(PAGE_SIZE, 0);
        buf
    }

    /// Parse the page-0 header back into `(schema, num_tuples,
    /// first_free_page)`.
    pub(crate) fn decode_header(data: &[u8]) -> (Schema, u32, u32) {
        let read_u32 = |off: usize| -> u32 {
            u32::from_be_bytes(data[off..off + 4].try_into().unwrap())
        };
        let num_tuples = read_u32(0);
        let first_free_page = read_u32(4);
        let num_attrs = read_u32(8) as usize;
        let key_size = read_u32(12);

        let mut attributes = Vec::with_capacity(num_attrs);
        let mut offset = 16;
        for _ in 0..num_attrs {
            let name_bytes = &data[offset..offset + ATTRIBUTE_NAME_SIZE];
            let nul_pos = name_bytes.iter().position(|&b| b == 0).unwrap_or(name_bytes.len());
            let name = String::from_utf8_lossy(&name_bytes[..nul_pos]).into_owned();
            offset += ATTRIBUTE_NAME_SIZE;
            let tag = read_u32(offset);
            offset += 4;
            let length = read_u32(offset);
            offset += 4;
            attributes.push(Attribute::new(name, Attribute::from_tag(tag), length));
        }

        (Schema::new(attributes, key_size), num_tuples, first_free_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let schema = Schema::new(
            vec![
                Attribute::new("id", DataType::Int, 0),
                Attribute::new("name", DataType::String, 20),
                Attribute::new("active", DataType::Bool, 0),
            ],
            4,
        );
        let encoded = schema.encode_header(3, 7);
        let (decoded, num_tuples, first_free_page) = Schema::decode_header(&encoded);
        assert_eq!(decoded, schema);
        assert_eq!(num_tuples, 3);
        assert_eq!(first_free_page, 7);
    }

    #[test]
    fn record_size_matches_original_formula() {
        let schema = Schema::new(
            vec![Attribute::new("a", DataType::Int, 0), Attribute::new("b", DataType::String, 10)],
            1,
        );
        assert_eq!(schema.record_size(), 1 + 4 + 10);
    }
}
