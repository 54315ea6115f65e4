//! Field-level helpers shared by the message codecs.
//!
//! Repeated numeric fields are accepted both packed (one length-delimited
//! run) and unpacked (one tag per element); unknown fields are captured as
//! raw spans.

use log::trace;

use crate::codec::primitives::{Depth, Reader, WireType};
use crate::error::MalformedWireError;
use crate::model::{UnknownField, UnknownFields};

/// Fails unless a known field arrived with its declared wire type.
pub(crate) fn expect_wire_type(
    message: &'static str,
    field: u32,
    found: WireType,
    expected: WireType,
) -> Result<(), MalformedWireError> {
    if found != expected {
        return Err(MalformedWireError::WireTypeMismatch {
            message,
            field,
            expected,
            found,
        });
    }
    Ok(())
}

/// Reads one occurrence of a repeated varint field into `out`.
pub(crate) fn read_repeated_varints<T>(
    reader: &mut Reader<'_>,
    message: &'static str,
    field: u32,
    name: &'static str,
    wire_type: WireType,
    out: &mut Vec<T>,
    convert: impl Fn(u64) -> T,
) -> Result<(), MalformedWireError> {
    match wire_type {
        WireType::Varint => {
            out.push(convert(reader.read_varint(name)?));
            Ok(())
        }
        WireType::LengthDelimited => {
            let mut packed = Reader::new(reader.read_length_delimited(name)?);
            while !packed.is_empty() {
                out.push(convert(packed.read_varint(name)?));
            }
            Ok(())
        }
        found => Err(MalformedWireError::WireTypeMismatch {
            message,
            field,
            expected: WireType::LengthDelimited,
            found,
        }),
    }
}

/// Reads one occurrence of a repeated float field into `out`.
pub(crate) fn read_repeated_floats(
    reader: &mut Reader<'_>,
    message: &'static str,
    field: u32,
    name: &'static str,
    wire_type: WireType,
    out: &mut Vec<f32>,
) -> Result<(), MalformedWireError> {
    match wire_type {
        WireType::Fixed32 => {
            out.push(f32::from_bits(reader.read_fixed32(name)?));
            Ok(())
        }
        WireType::LengthDelimited => {
            let bytes = reader.read_length_delimited(name)?;
            if bytes.len() % 4 != 0 {
                return Err(MalformedWireError::PackedLengthMisaligned {
                    field: name,
                    len: bytes.len(),
                    width: 4,
                });
            }
            out.extend(
                bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
            );
            Ok(())
        }
        found => Err(MalformedWireError::WireTypeMismatch {
            message,
            field,
            expected: WireType::LengthDelimited,
            found,
        }),
    }
}

/// Reads a length-delimited field, checking its wire type.
pub(crate) fn read_delimited<'a>(
    reader: &mut Reader<'a>,
    message: &'static str,
    field: u32,
    name: &'static str,
    wire_type: WireType,
) -> Result<&'a [u8], MalformedWireError> {
    expect_wire_type(message, field, wire_type, WireType::LengthDelimited)?;
    reader.read_length_delimited(name)
}

/// Reads a UTF-8 string field, checking its wire type.
pub(crate) fn read_string(
    reader: &mut Reader<'_>,
    message: &'static str,
    field: u32,
    name: &'static str,
    wire_type: WireType,
) -> Result<String, MalformedWireError> {
    expect_wire_type(message, field, wire_type, WireType::LengthDelimited)?;
    reader.read_string(name)
}

/// Reads a singular varint field as a signed 64-bit value.
pub(crate) fn read_int64(
    reader: &mut Reader<'_>,
    message: &'static str,
    field: u32,
    name: &'static str,
    wire_type: WireType,
) -> Result<i64, MalformedWireError> {
    expect_wire_type(message, field, wire_type, WireType::Varint)?;
    Ok(reader.read_varint(name)? as i64)
}

/// Skips a field this crate does not know and retains its raw span.
pub(crate) fn skip_unknown(
    reader: &mut Reader<'_>,
    message: &'static str,
    start: usize,
    number: u32,
    wire_type: WireType,
    depth: Depth,
    unknown: &mut UnknownFields,
) -> Result<(), MalformedWireError> {
    reader.skip_value(number, wire_type, depth)?;
    retain_unknown(reader, message, start, number, wire_type, unknown);
    Ok(())
}

/// Retains the span from `start` to the reader's position as an unknown field.
///
/// Also used for known fields whose value this crate cannot represent,
/// such as enum values added by newer producers.
pub(crate) fn retain_unknown(
    reader: &Reader<'_>,
    message: &'static str,
    start: usize,
    number: u32,
    wire_type: WireType,
    unknown: &mut UnknownFields,
) {
    trace!("retaining unknown field {number} ({wire_type:?}) in {message}");
    unknown.push(UnknownField {
        number,
        wire_type,
        raw: reader.consumed_since(start).to_vec(),
    });
}
