//! Retention of fields this crate does not interpret.

use crate::codec::primitives::{WireType, Writer};

/// A field that was present on the wire but is not part of the known schema.
///
/// `raw` holds the complete span, tag included, exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownField {
    pub number: u32,
    pub wire_type: WireType,
    pub raw: Vec<u8>,
}

/// Unknown fields of one message, in the order they were decoded.
///
/// Encoders write them after every known field of the message. Input whose
/// unknown fields already trail the known ones re-encodes byte for byte; an
/// unknown field read between two known fields moves to the end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnknownFields {
    fields: Vec<UnknownField>,
}

impl UnknownFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: UnknownField) {
        self.fields.push(field);
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnknownField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the retained fields with the given number.
    pub fn get(&self, number: u32) -> impl Iterator<Item = &UnknownField> {
        self.fields.iter().filter(move |f| f.number == number)
    }

    /// Re-emits every retained span verbatim.
    pub fn write_to(&self, writer: &mut Writer) {
        for field in &self.fields {
            writer.write_bytes(&field.raw);
        }
    }
}

impl FromIterator<UnknownField> for UnknownFields {
    fn from_iter<I: IntoIterator<Item = UnknownField>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
