//! Nodes and graphs.

use crate::model::{AttributeProto, TensorProto, UnknownFields};

/// An operator invocation.
///
/// Inputs and outputs name tensors; they are bound at graph scope. An empty
/// input name marks an omitted optional input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeProto {
    pub input: Vec<String>,
    pub output: Vec<String>,
    pub name: Option<String>,
    /// Operator name, resolved by an external operator registry.
    pub op_type: Option<String>,
    pub attribute: Vec<AttributeProto>,
    pub doc_string: Option<String>,
    pub unknown_fields: UnknownFields,
}

impl NodeProto {
    pub fn new(op_type: impl Into<String>) -> Self {
        Self {
            op_type: Some(op_type.into()),
            ..Default::default()
        }
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeProto> {
        self.attribute
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
    }
}

/// A computation graph: nodes in execution order plus its interface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphProto {
    pub node: Vec<NodeProto>,
    pub name: Option<String>,
    pub input: Vec<String>,
    pub output: Vec<String>,
    /// Constant values for a subset of `input`, bound by name.
    pub initializer: Vec<TensorProto>,
    pub ir_version: Option<i64>,
    pub producer_version: Option<i64>,
    pub producer_tag: Option<String>,
    /// Reverse-DNS identifier of the producing organization.
    pub domain: Option<String>,
    pub doc_string: Option<String>,
    pub unknown_fields: UnknownFields,
}

impl GraphProto {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Looks up an initializer by tensor name.
    pub fn initializer(&self, name: &str) -> Option<&TensorProto> {
        self.initializer
            .iter()
            .find(|t| t.name.as_deref() == Some(name))
    }

    /// Looks up a node by name.
    pub fn node_by_name(&self, name: &str) -> Option<&NodeProto> {
        self.node.iter().find(|n| n.name.as_deref() == Some(name))
    }

    /// Index of the first node producing `tensor`.
    pub fn producer_of(&self, tensor: &str) -> Option<usize> {
        self.node
            .iter()
            .position(|n| n.output.iter().any(|o| o == tensor))
    }
}
