//! Error types for wire decoding, encoding, and semantic validation.

use thiserror::Error;

use crate::codec::primitives::WireType;
use crate::model::{AttributeKind, DataType};
use crate::registry::Namespace;
use crate::validate::ElementPath;

/// Structural failure while decoding the tag/length/value grammar.
///
/// Always fatal to the decode call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedWireError {
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("{field} declares length {len} but only {remaining} bytes remain")]
    LengthExceedsRemaining {
        field: &'static str,
        len: u64,
        remaining: usize,
    },

    #[error("invalid field number {number}")]
    InvalidFieldNumber { number: u64 },

    #[error("invalid wire type {wire_type}")]
    InvalidWireType { wire_type: u8 },

    #[error("{message} field {field} has wire type {found:?}, expected {expected:?}")]
    WireTypeMismatch {
        message: &'static str,
        field: u32,
        expected: WireType,
        found: WireType,
    },

    #[error("unbalanced group for field {field}")]
    UnbalancedGroup { field: u32 },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("message nesting exceeds maximum depth {max}")]
    NestingTooDeep { max: usize },

    #[error("packed {field} length {len} is not a multiple of {width}")]
    PackedLengthMisaligned {
        field: &'static str,
        len: usize,
        width: usize,
    },

    #[error("attribute populates both `{first}` and `{second}`")]
    ConflictingAttributeSlots {
        first: AttributeKind,
        second: AttributeKind,
    },

    #[error("input length {len} exceeds maximum {max}")]
    InputTooLarge { len: usize, max: usize },

    #[error("zstd decompression failed: {0}")]
    DecompressionFailed(String),
}

/// A message tree that cannot be encoded without producing ambiguous bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("attribute {name:?} has no populated value")]
    EmptyAttribute { name: Option<String> },

    #[error("attribute {name:?} sets both `{first}` and `{second}`")]
    ConflictingAttributeSlots {
        name: Option<String>,
        first: AttributeKind,
        second: AttributeKind,
    },
}

/// Error during binary encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("zstd compression failed: {0}")]
    CompressionFailed(String),
}

/// A name registered twice within one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate name {name:?} in {namespace} namespace")]
pub struct DuplicateNameError {
    pub namespace: Namespace,
    pub name: String,
}

/// The semantic check that a violation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    UnionExclusivity,
    NamespaceUniqueness,
    DefinitionBeforeUse,
    TensorConsistency,
    SparseTensorConsistency,
    InitializerBinding,
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValidationKind::UnionExclusivity => "union exclusivity",
            ValidationKind::NamespaceUniqueness => "namespace uniqueness",
            ValidationKind::DefinitionBeforeUse => "definition before use",
            ValidationKind::TensorConsistency => "tensor consistency",
            ValidationKind::SparseTensorConsistency => "sparse tensor consistency",
            ValidationKind::InitializerBinding => "initializer binding",
        })
    }
}

/// The specific invariant that was broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    // === Union exclusivity ===
    #[error("attribute has {populated} populated value slots, expected exactly 1")]
    AttributeSlotCount { populated: usize },

    // === Namespace uniqueness ===
    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),

    #[error("missing name in {namespace} namespace")]
    MissingName { namespace: Namespace },

    // === Definition before use ===
    #[error("tensor {tensor:?} is never defined")]
    UndefinedTensor { tensor: String },

    #[error("tensor {tensor:?} is consumed before node {producer} produces it")]
    UsedBeforeDefinition { tensor: String, producer: usize },

    #[error("graph output {tensor:?} is never defined")]
    UndefinedGraphOutput { tensor: String },

    // === Tensor consistency ===
    #[error("tensor populates both {first} and {second}")]
    MixedRepresentation {
        first: &'static str,
        second: &'static str,
    },

    #[error("tensor has no data type")]
    MissingDataType,

    #[error("{data_type:?} data cannot be stored in {field}")]
    DataTypeMismatch {
        data_type: DataType,
        field: &'static str,
    },

    #[error("string tensors cannot use raw_data")]
    StringInRawData,

    #[error("raw_data length {len} is not a multiple of element size {element_size}")]
    RawDataMisaligned { len: usize, element_size: usize },

    #[error("dimension {index} is negative ({value})")]
    NegativeDimension { index: usize, value: i64 },

    #[error("shape element count overflows u64")]
    ShapeOverflow,

    #[error("segment [{begin}, {end}) is invalid for {total} elements")]
    InvalidSegment { begin: i64, end: i64, total: u64 },

    #[error("data holds {actual} elements, shape requires {expected}")]
    ElementCountMismatch { expected: u64, actual: u64 },

    #[error("element {index} value {value} is out of range for {data_type:?}")]
    ValueOutOfRange {
        index: usize,
        value: i32,
        data_type: DataType,
    },

    // === Sparse tensor consistency ===
    #[error("sparse tensor is missing {component}")]
    MissingSparseComponent { component: &'static str },

    #[error("sparse indices must be INT32 or INT64, found {data_type:?}")]
    IndicesNotInteger { data_type: Option<DataType> },

    #[error("sparse {component} has rank {rank}, expected {expected}")]
    SparseRank {
        component: &'static str,
        rank: usize,
        expected: usize,
    },

    #[error("sparse indices rows have width {width}, dense rank is {rank}")]
    IndexWidthMismatch { width: i64, rank: usize },

    #[error("sparse indices list {rows} rows but values hold {values} elements")]
    SparseCountMismatch { rows: i64, values: u64 },

    #[error("index row {row} axis {axis} value {index} outside [0, {bound})")]
    IndexOutOfBounds {
        row: usize,
        axis: usize,
        index: i64,
        bound: i64,
    },

    // === Initializer binding ===
    #[error("initializer has no name")]
    UnnamedInitializer,

    #[error("initializer {name:?} does not match any graph input")]
    UnboundInitializer { name: String },

    #[error("initializer {name:?} appears more than once")]
    DuplicateInitializer { name: String },
}

impl Violation {
    /// Returns the check this violation belongs to.
    pub fn kind(&self) -> ValidationKind {
        match self {
            Violation::AttributeSlotCount { .. } => ValidationKind::UnionExclusivity,
            Violation::DuplicateName(_) | Violation::MissingName { .. } => {
                ValidationKind::NamespaceUniqueness
            }
            Violation::UndefinedTensor { .. }
            | Violation::UsedBeforeDefinition { .. }
            | Violation::UndefinedGraphOutput { .. } => ValidationKind::DefinitionBeforeUse,
            Violation::MixedRepresentation { .. }
            | Violation::MissingDataType
            | Violation::DataTypeMismatch { .. }
            | Violation::StringInRawData
            | Violation::RawDataMisaligned { .. }
            | Violation::NegativeDimension { .. }
            | Violation::ShapeOverflow
            | Violation::InvalidSegment { .. }
            | Violation::ElementCountMismatch { .. }
            | Violation::ValueOutOfRange { .. } => ValidationKind::TensorConsistency,
            Violation::MissingSparseComponent { .. }
            | Violation::IndicesNotInteger { .. }
            | Violation::SparseRank { .. }
            | Violation::IndexWidthMismatch { .. }
            | Violation::SparseCountMismatch { .. }
            | Violation::IndexOutOfBounds { .. } => ValidationKind::SparseTensorConsistency,
            Violation::UnnamedInitializer
            | Violation::UnboundInitializer { .. }
            | Violation::DuplicateInitializer { .. } => ValidationKind::InitializerBinding,
        }
    }
}

/// Error during semantic validation: what was violated, and where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} violation at {path}: {violation}", .violation.kind())]
pub struct ValidationError {
    pub path: ElementPath,
    pub violation: Violation,
}

impl ValidationError {
    pub fn new(path: ElementPath, violation: impl Into<Violation>) -> Self {
        Self {
            path,
            violation: violation.into(),
        }
    }

    /// Returns the check this error belongs to.
    pub fn kind(&self) -> ValidationKind {
        self.violation.kind()
    }
}
