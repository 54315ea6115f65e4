//! Data model types for serialized computation graphs.
//!
//! This module contains the in-memory message tree:
//! - Tensors and sparse tensors
//! - Attributes (a closed union of value kinds)
//! - Nodes and graphs
//! - Unknown-field retention for forward compatibility
//! - Builders (ergonomic construction)
//!
//! Optional scalar fields are `Option<T>`: `None` means the field was absent
//! on the wire, `Some(0)` or `Some("")` means it was present with its default.

pub mod attribute;
pub mod builder;
pub mod data_type;
pub mod graph;
pub mod tensor;
pub mod unknown;
pub mod version;

pub use attribute::{AttributeKind, AttributeProto, AttributeValue};
pub use builder::{AttributeBuilder, GraphBuilder, NodeBuilder, TensorBuilder};
pub use data_type::{DataType, TypedStorage};
pub use graph::{GraphProto, NodeProto};
pub use tensor::{Segment, SparseTensorProto, TensorProto};
pub use unknown::{UnknownField, UnknownFields};
pub use version::{IrVersion, IR_VERSION};
