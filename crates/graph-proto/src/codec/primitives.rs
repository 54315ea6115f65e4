//! Primitive encoding/decoding for the tag/length/value wire grammar.
//!
//! Implements varints, fixed-width little-endian scalars, field tags,
//! length-delimited spans, and skipping of fields this crate does not know.

use crate::error::MalformedWireError;
use crate::limits::{MAX_FIELD_NUMBER, MAX_VARINT_BYTES};

/// The low three bits of a field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

impl WireType {
    /// Creates a WireType from its tag bits.
    pub fn from_u8(v: u8) -> Option<WireType> {
        match v {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

/// Remaining nesting budget while descending into submessages and groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    remaining: usize,
    max: usize,
}

impl Depth {
    /// Creates a budget allowing `max` levels of nesting.
    pub fn new(max: usize) -> Self {
        Self { remaining: max, max }
    }

    /// Consumes one level, failing once the budget is exhausted.
    pub fn descend(self) -> Result<Depth, MalformedWireError> {
        if self.remaining == 0 {
            return Err(MalformedWireError::NestingTooDeep { max: self.max });
        }
        Ok(Depth {
            remaining: self.remaining - 1,
            max: self.max,
        })
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading primitives
/// with bounds checking and error handling.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Returns the bytes consumed since `start`.
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        &self.data[start..self.pos]
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, MalformedWireError> {
        if self.pos >= self.data.len() {
            return Err(MalformedWireError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(
        &mut self,
        n: usize,
        context: &'static str,
    ) -> Result<&'a [u8], MalformedWireError> {
        if n > self.remaining_len() {
            return Err(MalformedWireError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads an unsigned varint (LEB128).
    #[inline]
    pub fn read_varint(&mut self, context: &'static str) -> Result<u64, MalformedWireError> {
        let mut result: u64 = 0;
        let mut shift = 0;

        for _ in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte(context)?;
            let value = (byte & 0x7F) as u64;

            if shift == 63 && value > 1 {
                return Err(MalformedWireError::VarintOverflow);
            }

            result |= value << shift;

            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }

        Err(MalformedWireError::VarintTooLong)
    }

    /// Reads a little-endian 32-bit value.
    #[inline]
    pub fn read_fixed32(&mut self, context: &'static str) -> Result<u32, MalformedWireError> {
        let bytes = self.read_bytes(4, context)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a little-endian 64-bit value.
    #[inline]
    pub fn read_fixed64(&mut self, context: &'static str) -> Result<u64, MalformedWireError> {
        let bytes = self.read_bytes(8, context)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a field tag, returning the field number and wire type.
    pub fn read_tag(&mut self) -> Result<(u32, WireType), MalformedWireError> {
        let key = self.read_varint("tag")?;
        let wire_bits = (key & 0x07) as u8;
        let number = key >> 3;
        if number == 0 || number > MAX_FIELD_NUMBER as u64 {
            return Err(MalformedWireError::InvalidFieldNumber { number });
        }
        let wire_type = WireType::from_u8(wire_bits)
            .ok_or(MalformedWireError::InvalidWireType { wire_type: wire_bits })?;
        Ok((number as u32, wire_type))
    }

    /// Reads a length-prefixed span, borrowing it from the input.
    pub fn read_length_delimited(
        &mut self,
        field: &'static str,
    ) -> Result<&'a [u8], MalformedWireError> {
        let len = self.read_varint(field)?;
        let remaining = self.remaining_len();
        if len > remaining as u64 {
            return Err(MalformedWireError::LengthExceedsRemaining {
                field,
                len,
                remaining,
            });
        }
        self.read_bytes(len as usize, field)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self, field: &'static str) -> Result<String, MalformedWireError> {
        let bytes = self.read_length_delimited(field)?;
        std::str::from_utf8(bytes)
            .map(|s| s.to_string())
            .map_err(|_| MalformedWireError::InvalidUtf8 { field })
    }

    /// Skips the value of a field whose tag has already been read.
    ///
    /// Groups are skipped up to their matching end tag, bounded by `depth`.
    pub fn skip_value(
        &mut self,
        number: u32,
        wire_type: WireType,
        depth: Depth,
    ) -> Result<(), MalformedWireError> {
        match wire_type {
            WireType::Varint => {
                self.read_varint("unknown varint")?;
            }
            WireType::Fixed64 => {
                self.read_bytes(8, "unknown fixed64")?;
            }
            WireType::Fixed32 => {
                self.read_bytes(4, "unknown fixed32")?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited("unknown field")?;
            }
            WireType::StartGroup => {
                let inner_depth = depth.descend()?;
                loop {
                    if self.is_empty() {
                        return Err(MalformedWireError::UnbalancedGroup { field: number });
                    }
                    let (inner, inner_type) = self.read_tag()?;
                    if inner_type == WireType::EndGroup {
                        if inner != number {
                            return Err(MalformedWireError::UnbalancedGroup { field: inner });
                        }
                        break;
                    }
                    self.skip_value(inner, inner_type, inner_depth)?;
                }
            }
            WireType::EndGroup => {
                return Err(MalformedWireError::UnbalancedGroup { field: number });
            }
        }
        Ok(())
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes an unsigned varint (LEB128).
    #[inline]
    pub fn write_varint(&mut self, mut value: u64) {
        let mut buf = [0u8; MAX_VARINT_BYTES];
        let mut len = 0;
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            buf[len] = byte;
            len += 1;
            if value == 0 {
                break;
            }
        }
        self.buf.extend_from_slice(&buf[..len]);
    }

    /// Writes a field tag.
    #[inline]
    pub fn write_tag(&mut self, number: u32, wire_type: WireType) {
        self.write_varint(((number as u64) << 3) | wire_type as u64);
    }

    /// Writes a little-endian 32-bit value.
    pub fn write_fixed32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a length-prefixed byte array.
    pub fn write_bytes_prefixed(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a varint-typed field. Signed values are sign-extended to 64 bits.
    pub fn write_varint_field(&mut self, number: u32, value: i64) {
        self.write_tag(number, WireType::Varint);
        self.write_varint(value as u64);
    }

    /// Writes a fixed32 float field.
    pub fn write_float_field(&mut self, number: u32, value: f32) {
        self.write_tag(number, WireType::Fixed32);
        self.write_fixed32(value.to_bits());
    }

    /// Writes a length-delimited field (string, bytes, or encoded message).
    pub fn write_bytes_field(&mut self, number: u32, bytes: &[u8]) {
        self.write_tag(number, WireType::LengthDelimited);
        self.write_bytes_prefixed(bytes);
    }

    /// Writes a packed run of varints. Nothing is written for an empty run.
    pub fn write_packed_varints(&mut self, number: u32, values: impl Iterator<Item = i64>) {
        let mut packed = Writer::new();
        for value in values {
            packed.write_varint(value as u64);
        }
        if !packed.is_empty() {
            self.write_bytes_field(number, packed.as_bytes());
        }
    }

    /// Writes a packed run of fixed32 floats. Nothing is written for an empty run.
    pub fn write_packed_floats(&mut self, number: u32, values: &[f32]) {
        if values.is_empty() {
            return;
        }
        self.write_tag(number, WireType::LengthDelimited);
        self.write_varint((values.len() * 4) as u64);
        for value in values {
            self.write_fixed32(value.to_bits());
        }
    }
}
