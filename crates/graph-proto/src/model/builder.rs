//! Builder API for ergonomic graph construction.
//!
//! Trees are immutable once validated; changing one means building a new
//! tree and validating it again.
//!
//! # Example
//!
//! ```rust
//! use graph_proto::model::builder::{GraphBuilder, TensorBuilder};
//! use graph_proto::DataType;
//!
//! let graph = GraphBuilder::new("linear")
//!     .input("x")
//!     .input("w")
//!     .initializer(
//!         TensorBuilder::new(DataType::Float, [2, 2])
//!             .name("w")
//!             .floats([1.0, 0.0, 0.0, 1.0])
//!             .build(),
//!     )
//!     .node("MatMul", |n| n.name("mm").input("x").input("w").output("y"))
//!     .output("y")
//!     .build_validated()
//!     .unwrap();
//!
//! assert_eq!(graph.node.len(), 1);
//! ```

use crate::error::{ConstructionError, ValidationError};
use crate::model::{
    AttributeProto, AttributeValue, DataType, GraphProto, NodeProto, Segment, TensorProto,
    UnknownFields,
};
use crate::model::version::IR_VERSION;

/// Builder for constructing a GraphProto.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    graph: GraphProto,
}

impl GraphBuilder {
    /// Creates a new GraphBuilder for a graph with the given name,
    /// stamped with the current IR version.
    pub fn new(name: impl Into<String>) -> Self {
        let mut graph = GraphProto::new(name);
        graph.ir_version = Some(IR_VERSION);
        Self { graph }
    }

    /// Declares a graph input.
    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.graph.input.push(name.into());
        self
    }

    /// Declares a graph output.
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.graph.output.push(name.into());
        self
    }

    /// Adds an initializer. Its name should match a declared input.
    pub fn initializer(mut self, tensor: TensorProto) -> Self {
        self.graph.initializer.push(tensor);
        self
    }

    /// Appends a node using a builder function.
    pub fn node<F>(mut self, op_type: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(NodeBuilder) -> NodeBuilder,
    {
        let builder = f(NodeBuilder::new(op_type));
        self.graph.node.push(builder.build());
        self
    }

    /// Appends an already built node.
    pub fn push_node(mut self, node: NodeProto) -> Self {
        self.graph.node.push(node);
        self
    }

    pub fn ir_version(mut self, version: i64) -> Self {
        self.graph.ir_version = Some(version);
        self
    }

    pub fn producer(mut self, tag: impl Into<String>, version: i64) -> Self {
        self.graph.producer_tag = Some(tag.into());
        self.graph.producer_version = Some(version);
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.graph.domain = Some(domain.into());
        self
    }

    pub fn doc_string(mut self, doc: impl Into<String>) -> Self {
        self.graph.doc_string = Some(doc.into());
        self
    }

    /// Builds the graph without validating it.
    pub fn build(self) -> GraphProto {
        self.graph
    }

    /// Builds the graph and runs every semantic check on it.
    pub fn build_validated(self) -> Result<GraphProto, ValidationError> {
        crate::validate::validate_graph(&self.graph)?;
        Ok(self.graph)
    }
}

/// Builder for a NodeProto.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: NodeProto,
}

impl NodeBuilder {
    pub fn new(op_type: impl Into<String>) -> Self {
        Self {
            node: NodeProto::new(op_type),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.node.name = Some(name.into());
        self
    }

    pub fn input(mut self, tensor: impl Into<String>) -> Self {
        self.node.input.push(tensor.into());
        self
    }

    pub fn output(mut self, tensor: impl Into<String>) -> Self {
        self.node.output.push(tensor.into());
        self
    }

    pub fn doc_string(mut self, doc: impl Into<String>) -> Self {
        self.node.doc_string = Some(doc.into());
        self
    }

    /// Adds an attribute with the given value.
    pub fn attr(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.node.attribute.push(AttributeProto::new(name, value));
        self
    }

    /// Adds an already built attribute.
    pub fn attribute(mut self, attribute: AttributeProto) -> Self {
        self.node.attribute.push(attribute);
        self
    }

    pub fn attr_float(self, name: impl Into<String>, value: f32) -> Self {
        self.attr(name, AttributeValue::Float(value))
    }

    pub fn attr_int(self, name: impl Into<String>, value: i64) -> Self {
        self.attr(name, AttributeValue::Int(value))
    }

    pub fn attr_ints(self, name: impl Into<String>, values: impl Into<Vec<i64>>) -> Self {
        self.attr(name, AttributeValue::Ints(values.into()))
    }

    pub fn attr_string(self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.attr(name, AttributeValue::String(value.into()))
    }

    pub fn attr_tensor(self, name: impl Into<String>, tensor: TensorProto) -> Self {
        self.attr(name, AttributeValue::Tensor(tensor))
    }

    pub fn attr_graph(self, name: impl Into<String>, graph: GraphProto) -> Self {
        self.attr(name, AttributeValue::Graph(graph))
    }

    pub fn build(self) -> NodeProto {
        self.node
    }
}

/// Builder for an AttributeProto that mirrors the wire's one-setter-per-slot
/// shape and rejects setting more than one slot.
#[derive(Debug, Clone)]
pub struct AttributeBuilder {
    name: Option<String>,
    slots: Vec<AttributeValue>,
}

impl AttributeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            slots: Vec::new(),
        }
    }

    fn set(mut self, value: AttributeValue) -> Self {
        // Setting the same slot twice replaces it.
        self.slots.retain(|v| v.kind() != value.kind());
        self.slots.push(value);
        self
    }

    pub fn f(self, value: f32) -> Self {
        self.set(AttributeValue::Float(value))
    }

    pub fn i(self, value: i64) -> Self {
        self.set(AttributeValue::Int(value))
    }

    pub fn s(self, value: impl Into<Vec<u8>>) -> Self {
        self.set(AttributeValue::String(value.into()))
    }

    pub fn t(self, value: TensorProto) -> Self {
        self.set(AttributeValue::Tensor(value))
    }

    pub fn g(self, value: GraphProto) -> Self {
        self.set(AttributeValue::Graph(value))
    }

    pub fn floats(self, values: impl Into<Vec<f32>>) -> Self {
        self.set(AttributeValue::Floats(values.into()))
    }

    pub fn ints(self, values: impl Into<Vec<i64>>) -> Self {
        self.set(AttributeValue::Ints(values.into()))
    }

    pub fn strings(self, values: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.set(AttributeValue::Strings(values.into_iter().collect()))
    }

    pub fn tensors(self, values: impl Into<Vec<TensorProto>>) -> Self {
        self.set(AttributeValue::Tensors(values.into()))
    }

    pub fn graphs(self, values: impl Into<Vec<GraphProto>>) -> Self {
        self.set(AttributeValue::Graphs(values.into()))
    }

    /// Builds the attribute, requiring exactly one populated slot.
    pub fn build(self) -> Result<AttributeProto, ConstructionError> {
        let mut populated = self.slots.into_iter().filter(AttributeValue::is_populated);
        let value = populated.next().ok_or_else(|| ConstructionError::EmptyAttribute {
            name: self.name.clone(),
        })?;
        if let Some(second) = populated.next() {
            return Err(ConstructionError::ConflictingAttributeSlots {
                name: self.name,
                first: value.kind(),
                second: second.kind(),
            });
        }
        Ok(AttributeProto {
            name: self.name,
            value: Some(value),
            unknown_fields: UnknownFields::new(),
        })
    }
}

/// Builder for a TensorProto.
#[derive(Debug, Clone)]
pub struct TensorBuilder {
    tensor: TensorProto,
}

impl TensorBuilder {
    pub fn new(data_type: DataType, dims: impl Into<Vec<i64>>) -> Self {
        Self {
            tensor: TensorProto::new(data_type, dims),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.tensor.name = Some(name.into());
        self
    }

    pub fn floats(mut self, values: impl IntoIterator<Item = f32>) -> Self {
        self.tensor.float_data = values.into_iter().collect();
        self
    }

    pub fn int32s(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.tensor.int32_data = values.into_iter().collect();
        self
    }

    pub fn int64s(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.tensor.int64_data = values.into_iter().collect();
        self
    }

    pub fn strings(mut self, values: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.tensor.string_data = values.into_iter().collect();
        self
    }

    /// Sets little-endian raw element bytes.
    pub fn raw(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.tensor.raw_data = Some(bytes.into());
        self
    }

    /// Marks this tensor as the fragment holding elements `[begin, end)`.
    pub fn segment(mut self, begin: i64, end: i64) -> Self {
        self.tensor.segment = Some(Segment::new(begin, end));
        self
    }

    pub fn build(self) -> TensorProto {
        self.tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeKind;

    #[test]
    fn test_attribute_builder_single_slot() {
        let attr = AttributeBuilder::new("alpha").f(0.5).build().unwrap();
        assert_eq!(attr.as_float(), Some(0.5));
        assert_eq!(attr.name.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_attribute_builder_rejects_two_slots() {
        let err = AttributeBuilder::new("alpha").f(0.5).i(3).build().unwrap_err();
        assert_eq!(
            err,
            ConstructionError::ConflictingAttributeSlots {
                name: Some("alpha".to_string()),
                first: AttributeKind::Float,
                second: AttributeKind::Int,
            }
        );
    }

    #[test]
    fn test_attribute_builder_same_slot_replaces() {
        let attr = AttributeBuilder::new("k").i(1).i(2).build().unwrap();
        assert_eq!(attr.as_int(), Some(2));
    }

    #[test]
    fn test_attribute_builder_empty() {
        assert!(matches!(
            AttributeBuilder::new("k").build(),
            Err(ConstructionError::EmptyAttribute { .. })
        ));
        assert!(matches!(
            AttributeBuilder::new("k").ints(Vec::<i64>::new()).build(),
            Err(ConstructionError::EmptyAttribute { .. })
        ));
    }

    #[test]
    fn test_graph_builder() {
        let graph = GraphBuilder::new("g")
            .input("x")
            .node("Relu", |n| n.name("relu").input("x").output("y"))
            .output("y")
            .producer("builder-test", 3)
            .build();

        assert_eq!(graph.name.as_deref(), Some("g"));
        assert_eq!(graph.ir_version, Some(IR_VERSION));
        assert_eq!(graph.producer_version, Some(3));
        assert_eq!(graph.node[0].op_type.as_deref(), Some("Relu"));
        assert_eq!(
            graph.node_by_name("relu").map(|n| n.output.clone()),
            Some(vec!["y".to_string()])
        );
    }

    #[test]
    fn test_build_validated_rejects_undefined_input() {
        let result = GraphBuilder::new("g")
            .node("Relu", |n| n.input("missing").output("y"))
            .output("y")
            .build_validated();
        assert!(result.is_err());
    }
}
