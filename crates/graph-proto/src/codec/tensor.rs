//! Tensor encoding/decoding.
//!
//! Field layout:
//! - TensorProto: dims=1, data_type=2, segment=3, float_data=4, int32_data=5,
//!   string_data=6, int64_data=7, name=8, raw_data=9
//! - Segment: begin=1, end=2
//! - SparseTensorProto: dims=1, indices=2, values=3

use crate::codec::DecodeOptions;
use crate::codec::field::{
    expect_wire_type, read_delimited, read_int64, read_repeated_floats, read_repeated_varints,
    read_string, retain_unknown, skip_unknown,
};
use crate::codec::primitives::{Depth, Reader, WireType, Writer};
use crate::error::MalformedWireError;
use crate::model::{DataType, Segment, SparseTensorProto, TensorProto};

const TENSOR: &str = "TensorProto";
const TENSOR_DIMS: u32 = 1;
const TENSOR_DATA_TYPE: u32 = 2;
const TENSOR_SEGMENT: u32 = 3;
const TENSOR_FLOAT_DATA: u32 = 4;
const TENSOR_INT32_DATA: u32 = 5;
const TENSOR_STRING_DATA: u32 = 6;
const TENSOR_INT64_DATA: u32 = 7;
const TENSOR_NAME: u32 = 8;
const TENSOR_RAW_DATA: u32 = 9;

const SEGMENT: &str = "TensorProto.Segment";
const SEGMENT_BEGIN: u32 = 1;
const SEGMENT_END: u32 = 2;

const SPARSE: &str = "SparseTensorProto";
const SPARSE_DIMS: u32 = 1;
const SPARSE_INDICES: u32 = 2;
const SPARSE_VALUES: u32 = 3;

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a standalone TensorProto.
pub fn decode_tensor(input: &[u8]) -> Result<TensorProto, MalformedWireError> {
    decode_tensor_with_options(input, DecodeOptions::default())
}

/// Decodes a standalone TensorProto with the given limits.
pub fn decode_tensor_with_options(
    input: &[u8],
    options: DecodeOptions,
) -> Result<TensorProto, MalformedWireError> {
    options.check_input_len(input)?;
    decode_tensor_message(input, None, options.depth())
}

/// Decodes a standalone SparseTensorProto.
pub fn decode_sparse_tensor(input: &[u8]) -> Result<SparseTensorProto, MalformedWireError> {
    decode_sparse_tensor_with_options(input, DecodeOptions::default())
}

/// Decodes a standalone SparseTensorProto with the given limits.
pub fn decode_sparse_tensor_with_options(
    input: &[u8],
    options: DecodeOptions,
) -> Result<SparseTensorProto, MalformedWireError> {
    options.check_input_len(input)?;
    decode_sparse_message(input, options.depth())
}

/// Decodes a TensorProto, merging into a previous occurrence of the field.
///
/// Singular fields replace, repeated fields and unknown fields extend.
pub(crate) fn decode_tensor_message(
    data: &[u8],
    previous: Option<TensorProto>,
    depth: Depth,
) -> Result<TensorProto, MalformedWireError> {
    let depth = depth.descend()?;
    let mut reader = Reader::new(data);
    let mut tensor = previous.unwrap_or_default();

    while !reader.is_empty() {
        let start = reader.position();
        let (number, wire_type) = reader.read_tag()?;
        match number {
            TENSOR_DIMS => read_repeated_varints(
                &mut reader,
                TENSOR,
                number,
                "dims",
                wire_type,
                &mut tensor.dims,
                |v| v as i64,
            )?,
            TENSOR_DATA_TYPE => {
                expect_wire_type(TENSOR, number, wire_type, WireType::Varint)?;
                let raw = reader.read_varint("data_type")? as i32;
                match DataType::from_i32(raw) {
                    Some(data_type) => tensor.data_type = Some(data_type),
                    None => retain_unknown(
                        &reader,
                        TENSOR,
                        start,
                        number,
                        wire_type,
                        &mut tensor.unknown_fields,
                    ),
                }
            }
            TENSOR_SEGMENT => {
                let bytes = read_delimited(&mut reader, TENSOR, number, "segment", wire_type)?;
                tensor.segment = Some(decode_segment(bytes, tensor.segment.take(), depth)?);
            }
            TENSOR_FLOAT_DATA => read_repeated_floats(
                &mut reader,
                TENSOR,
                number,
                "float_data",
                wire_type,
                &mut tensor.float_data,
            )?,
            TENSOR_INT32_DATA => read_repeated_varints(
                &mut reader,
                TENSOR,
                number,
                "int32_data",
                wire_type,
                &mut tensor.int32_data,
                |v| v as i32,
            )?,
            TENSOR_STRING_DATA => {
                let bytes = read_delimited(&mut reader, TENSOR, number, "string_data", wire_type)?;
                tensor.string_data.push(bytes.to_vec());
            }
            TENSOR_INT64_DATA => read_repeated_varints(
                &mut reader,
                TENSOR,
                number,
                "int64_data",
                wire_type,
                &mut tensor.int64_data,
                |v| v as i64,
            )?,
            TENSOR_NAME => {
                tensor.name = Some(read_string(&mut reader, TENSOR, number, "name", wire_type)?);
            }
            TENSOR_RAW_DATA => {
                let bytes = read_delimited(&mut reader, TENSOR, number, "raw_data", wire_type)?;
                tensor.raw_data = Some(bytes.to_vec());
            }
            _ => skip_unknown(
                &mut reader,
                TENSOR,
                start,
                number,
                wire_type,
                depth,
                &mut tensor.unknown_fields,
            )?,
        }
    }

    Ok(tensor)
}

/// Decodes a Segment, merging into a previous occurrence of the field.
fn decode_segment(
    data: &[u8],
    previous: Option<Segment>,
    depth: Depth,
) -> Result<Segment, MalformedWireError> {
    let depth = depth.descend()?;
    let mut reader = Reader::new(data);
    let mut segment = previous.unwrap_or_default();

    while !reader.is_empty() {
        let start = reader.position();
        let (number, wire_type) = reader.read_tag()?;
        match number {
            SEGMENT_BEGIN => {
                segment.begin = Some(read_int64(&mut reader, SEGMENT, number, "begin", wire_type)?);
            }
            SEGMENT_END => {
                segment.end = Some(read_int64(&mut reader, SEGMENT, number, "end", wire_type)?);
            }
            _ => skip_unknown(
                &mut reader,
                SEGMENT,
                start,
                number,
                wire_type,
                depth,
                &mut segment.unknown_fields,
            )?,
        }
    }

    Ok(segment)
}

pub(crate) fn decode_sparse_message(
    data: &[u8],
    depth: Depth,
) -> Result<SparseTensorProto, MalformedWireError> {
    let depth = depth.descend()?;
    let mut reader = Reader::new(data);
    let mut sparse = SparseTensorProto::default();

    while !reader.is_empty() {
        let start = reader.position();
        let (number, wire_type) = reader.read_tag()?;
        match number {
            SPARSE_DIMS => read_repeated_varints(
                &mut reader,
                SPARSE,
                number,
                "dims",
                wire_type,
                &mut sparse.dims,
                |v| v as i64,
            )?,
            SPARSE_INDICES => {
                let bytes = read_delimited(&mut reader, SPARSE, number, "indices", wire_type)?;
                let previous = sparse.indices.take();
                sparse.indices = Some(decode_tensor_message(bytes, previous, depth)?);
            }
            SPARSE_VALUES => {
                let bytes = read_delimited(&mut reader, SPARSE, number, "values", wire_type)?;
                let previous = sparse.values.take();
                sparse.values = Some(decode_tensor_message(bytes, previous, depth)?);
            }
            _ => skip_unknown(
                &mut reader,
                SPARSE,
                start,
                number,
                wire_type,
                depth,
                &mut sparse.unknown_fields,
            )?,
        }
    }

    Ok(sparse)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a TensorProto. Tensors carry no union, so encoding cannot fail.
pub fn encode_tensor(tensor: &TensorProto) -> Vec<u8> {
    let mut writer = Writer::new();
    write_tensor(&mut writer, tensor);
    writer.into_bytes()
}

/// Encodes a SparseTensorProto.
pub fn encode_sparse_tensor(sparse: &SparseTensorProto) -> Vec<u8> {
    let mut writer = Writer::new();
    writer.write_packed_varints(SPARSE_DIMS, sparse.dims.iter().copied());
    if let Some(indices) = &sparse.indices {
        writer.write_bytes_field(SPARSE_INDICES, &encode_tensor(indices));
    }
    if let Some(values) = &sparse.values {
        writer.write_bytes_field(SPARSE_VALUES, &encode_tensor(values));
    }
    sparse.unknown_fields.write_to(&mut writer);
    writer.into_bytes()
}

pub(crate) fn write_tensor(writer: &mut Writer, tensor: &TensorProto) {
    writer.write_packed_varints(TENSOR_DIMS, tensor.dims.iter().copied());
    if let Some(data_type) = tensor.data_type {
        writer.write_varint_field(TENSOR_DATA_TYPE, data_type as i64);
    }
    if let Some(segment) = &tensor.segment {
        let mut inner = Writer::new();
        if let Some(begin) = segment.begin {
            inner.write_varint_field(SEGMENT_BEGIN, begin);
        }
        if let Some(end) = segment.end {
            inner.write_varint_field(SEGMENT_END, end);
        }
        segment.unknown_fields.write_to(&mut inner);
        writer.write_bytes_field(TENSOR_SEGMENT, inner.as_bytes());
    }
    writer.write_packed_floats(TENSOR_FLOAT_DATA, &tensor.float_data);
    writer.write_packed_varints(
        TENSOR_INT32_DATA,
        tensor.int32_data.iter().map(|&v| v as i64),
    );
    for s in &tensor.string_data {
        writer.write_bytes_field(TENSOR_STRING_DATA, s);
    }
    writer.write_packed_varints(TENSOR_INT64_DATA, tensor.int64_data.iter().copied());
    if let Some(name) = &tensor.name {
        writer.write_bytes_field(TENSOR_NAME, name.as_bytes());
    }
    if let Some(raw) = &tensor.raw_data {
        writer.write_bytes_field(TENSOR_RAW_DATA, raw);
    }
    tensor.unknown_fields.write_to(writer);
}
