//! graph-proto: Interchange format for trained computation graphs.
//!
//! This crate provides encoding, decoding, and semantic validation for graph
//! artifacts: operator nodes, typed attributes, and serialized tensors
//! organized under explicit naming namespaces.
//!
//! # Overview
//!
//! A graph artifact is a tag/length/value encoded message tree:
//! - **GraphProto**: ordered nodes, interface tensors, initializers
//! - **NodeProto**: one operator invocation, wired to tensors by name
//! - **AttributeProto**: a closed union of scalar, tensor, graph, and list values
//! - **TensorProto** / **SparseTensorProto**: dense and coordinate-form data
//!
//! Fields this crate does not know are kept byte-for-byte and written back
//! on re-encode, so older readers never drop data from newer producers.
//!
//! # Quick Start
//!
//! ```rust
//! use graph_proto::codec::{decode_graph, encode_graph};
//! use graph_proto::model::builder::{GraphBuilder, TensorBuilder};
//! use graph_proto::{validate_graph, DataType};
//!
//! let graph = GraphBuilder::new("scale")
//!     .input("x")
//!     .input("k")
//!     .initializer(
//!         TensorBuilder::new(DataType::Float, [1])
//!             .name("k")
//!             .floats([2.0])
//!             .build(),
//!     )
//!     .node("Mul", |n| n.name("mul").input("x").input("k").output("y"))
//!     .output("y")
//!     .build();
//!
//! // Encode to binary
//! let bytes = encode_graph(&graph).unwrap();
//!
//! // Decode back, then check semantics before use
//! let decoded = decode_graph(&bytes).unwrap();
//! validate_graph(&decoded).unwrap();
//! assert_eq!(graph, decoded);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Message types and builders
//! - [`codec`]: Binary encoding/decoding, streams, and compression
//! - [`registry`]: Per-graph namespace bookkeeping
//! - [`validate`]: Semantic validation
//! - [`error`]: Error types
//! - [`limits`]: Limits for decoding untrusted input
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Input size and nesting depth are bounded by [`codec::DecodeOptions`]
//! - Varints are limited to 10 bytes and checked for overflow
//! - Declared lengths are checked against the remaining input before use
//!
//! # Wire Format
//!
//! One artifact is exactly one encoded GraphProto, optionally wrapped in a
//! zstd frame. Several graphs travel as a stream of varint length-prefixed
//! frames. [`codec::decode_artifact`] detects compression automatically.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod registry;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{
    decode_artifact, decode_graph, decode_graph_stream, encode_graph, encode_graph_compressed,
    encode_graph_stream, DecodeOptions,
};
pub use error::{
    ConstructionError, DuplicateNameError, EncodeError, MalformedWireError, ValidationError,
    ValidationKind, Violation,
};
pub use model::{
    AttributeKind, AttributeProto, AttributeValue, DataType, GraphProto, IrVersion, NodeProto,
    Segment, SparseTensorProto, TensorProto, UnknownField, UnknownFields, IR_VERSION,
};
pub use registry::{Namespace, NamespaceRegistry, TensorBinding};
pub use validate::{
    validate_graph, validate_graph_with_options, validate_sparse_tensor, validate_tensor,
    ElementPath, ValidateOptions, ValidationMode,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
