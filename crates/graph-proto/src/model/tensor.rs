//! Serialized tensors.
//!
//! A tensor carries its values either in one typed repeated field chosen by
//! its data type, or as a little-endian `raw_data` blob. Large tensors may be
//! split into fragments, each describing its element range with a [`Segment`].

use crate::model::{DataType, TypedStorage, UnknownFields};

/// Element range `[begin, end)` that a tensor fragment represents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    pub begin: Option<i64>,
    pub end: Option<i64>,
    pub unknown_fields: UnknownFields,
}

impl Segment {
    pub fn new(begin: i64, end: i64) -> Self {
        Self {
            begin: Some(begin),
            end: Some(end),
            unknown_fields: UnknownFields::new(),
        }
    }

    /// Begin offset, with absence read as 0.
    pub fn begin_or_default(&self) -> i64 {
        self.begin.unwrap_or(0)
    }

    /// End offset, with absence read as 0.
    pub fn end_or_default(&self) -> i64 {
        self.end.unwrap_or(0)
    }
}

/// A serialized tensor (weights, constants, or attribute payloads).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TensorProto {
    pub dims: Vec<i64>,
    pub data_type: Option<DataType>,
    pub segment: Option<Segment>,
    pub float_data: Vec<f32>,
    /// INT32 values, and also FLOAT16, BOOL, and 8/16-bit integers, one per slot.
    pub int32_data: Vec<i32>,
    pub string_data: Vec<Vec<u8>>,
    pub int64_data: Vec<i64>,
    pub name: Option<String>,
    pub raw_data: Option<Vec<u8>>,
    pub unknown_fields: UnknownFields,
}

impl TensorProto {
    /// Creates an empty tensor of the given type and shape.
    pub fn new(data_type: DataType, dims: impl Into<Vec<i64>>) -> Self {
        Self {
            dims: dims.into(),
            data_type: Some(data_type),
            ..Default::default()
        }
    }

    /// Names of the populated data fields, in field-number order.
    ///
    /// A valid tensor populates at most one of them.
    pub fn populated_data_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if !self.float_data.is_empty() {
            fields.push(TypedStorage::Float.field_name());
        }
        if !self.int32_data.is_empty() {
            fields.push(TypedStorage::Int32.field_name());
        }
        if !self.string_data.is_empty() {
            fields.push(TypedStorage::String.field_name());
        }
        if !self.int64_data.is_empty() {
            fields.push(TypedStorage::Int64.field_name());
        }
        if self.raw_data.is_some() {
            fields.push("raw_data");
        }
        fields
    }

    /// Product of `dims`, or None if a dimension is negative or the product overflows.
    ///
    /// A tensor with no dims is a scalar and holds one element.
    pub fn shape_element_count(&self) -> Option<u64> {
        self.dims.iter().try_fold(1u64, |acc, &d| {
            if d < 0 {
                None
            } else {
                acc.checked_mul(d as u64)
            }
        })
    }

    /// Number of elements this fragment must hold: the segment span when a
    /// segment is present, otherwise the full shape.
    pub fn expected_element_count(&self) -> Option<u64> {
        match &self.segment {
            Some(segment) => {
                let span = segment.end_or_default().checked_sub(segment.begin_or_default())?;
                u64::try_from(span).ok()
            }
            None => self.shape_element_count(),
        }
    }

    /// Number of elements actually present in the populated data field.
    ///
    /// Returns None when the representation is ambiguous: several fields
    /// populated, or `raw_data` with a type that has no fixed width.
    pub fn data_element_count(&self) -> Option<u64> {
        let fields = self.populated_data_fields();
        match fields.as_slice() {
            [] => Some(0),
            [_] => {
                if let Some(raw) = &self.raw_data {
                    let size = self.data_type?.element_size()?;
                    Some((raw.len() / size) as u64)
                } else {
                    Some(
                        (self.float_data.len()
                            + self.int32_data.len()
                            + self.string_data.len()
                            + self.int64_data.len()) as u64,
                    )
                }
            }
            _ => None,
        }
    }

    /// Integer values of an INT32 or INT64 tensor, from typed or raw storage.
    pub fn int64_values(&self) -> Option<Vec<i64>> {
        match self.data_type? {
            DataType::Int64 => match &self.raw_data {
                Some(raw) => Some(
                    raw.chunks_exact(8)
                        .map(|c| {
                            i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
                        })
                        .collect(),
                ),
                None => Some(self.int64_data.clone()),
            },
            DataType::Int32 => match &self.raw_data {
                Some(raw) => Some(
                    raw.chunks_exact(4)
                        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as i64)
                        .collect(),
                ),
                None => Some(self.int32_data.iter().map(|&v| v as i64).collect()),
            },
            _ => None,
        }
    }

    /// Values of a FLOAT tensor, from typed or raw storage.
    pub fn float_values(&self) -> Option<Vec<f32>> {
        if self.data_type? != DataType::Float {
            return None;
        }
        match &self.raw_data {
            Some(raw) => Some(
                raw.chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            None => Some(self.float_data.clone()),
        }
    }
}

/// A sparse tensor in coordinate form.
///
/// `indices` is a 2-D integer tensor of shape `[nnz, rank]`, `values` a 1-D
/// tensor of shape `[nnz]`; `dims` is the dense shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseTensorProto {
    pub dims: Vec<i64>,
    pub indices: Option<TensorProto>,
    pub values: Option<TensorProto>,
    pub unknown_fields: UnknownFields,
}

impl SparseTensorProto {
    pub fn new(dims: impl Into<Vec<i64>>, indices: TensorProto, values: TensorProto) -> Self {
        Self {
            dims: dims.into(),
            indices: Some(indices),
            values: Some(values),
            unknown_fields: UnknownFields::new(),
        }
    }
}
