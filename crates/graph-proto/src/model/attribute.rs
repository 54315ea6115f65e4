//! Node attributes.
//!
//! On the wire an attribute has one optional field per value kind; in memory
//! the value is a single closed enum so two kinds can never coexist.

use crate::model::{GraphProto, TensorProto, UnknownFields};

/// Which value slot of an attribute is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Float,
    Int,
    String,
    Tensor,
    Graph,
    Floats,
    Ints,
    Strings,
    Tensors,
    Graphs,
}

impl AttributeKind {
    /// Wire field number of this slot.
    pub fn field_number(self) -> u32 {
        match self {
            AttributeKind::Float => 2,
            AttributeKind::Int => 3,
            AttributeKind::String => 4,
            AttributeKind::Tensor => 5,
            AttributeKind::Graph => 6,
            AttributeKind::Floats => 7,
            AttributeKind::Ints => 8,
            AttributeKind::Strings => 9,
            AttributeKind::Tensors => 10,
            AttributeKind::Graphs => 11,
        }
    }

    /// Schema field name of this slot.
    pub fn field_name(self) -> &'static str {
        match self {
            AttributeKind::Float => "f",
            AttributeKind::Int => "i",
            AttributeKind::String => "s",
            AttributeKind::Tensor => "t",
            AttributeKind::Graph => "g",
            AttributeKind::Floats => "floats",
            AttributeKind::Ints => "ints",
            AttributeKind::Strings => "strings",
            AttributeKind::Tensors => "tensors",
            AttributeKind::Graphs => "graphs",
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// The value held by an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Float(f32),
    Int(i64),
    String(Vec<u8>),
    Tensor(TensorProto),
    Graph(GraphProto),
    Floats(Vec<f32>),
    Ints(Vec<i64>),
    Strings(Vec<Vec<u8>>),
    Tensors(Vec<TensorProto>),
    Graphs(Vec<GraphProto>),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Float(_) => AttributeKind::Float,
            AttributeValue::Int(_) => AttributeKind::Int,
            AttributeValue::String(_) => AttributeKind::String,
            AttributeValue::Tensor(_) => AttributeKind::Tensor,
            AttributeValue::Graph(_) => AttributeKind::Graph,
            AttributeValue::Floats(_) => AttributeKind::Floats,
            AttributeValue::Ints(_) => AttributeKind::Ints,
            AttributeValue::Strings(_) => AttributeKind::Strings,
            AttributeValue::Tensors(_) => AttributeKind::Tensors,
            AttributeValue::Graphs(_) => AttributeKind::Graphs,
        }
    }

    /// Returns false for list values with no elements, which leave every
    /// slot unpopulated on the wire.
    pub fn is_populated(&self) -> bool {
        match self {
            AttributeValue::Floats(v) => !v.is_empty(),
            AttributeValue::Ints(v) => !v.is_empty(),
            AttributeValue::Strings(v) => !v.is_empty(),
            AttributeValue::Tensors(v) => !v.is_empty(),
            AttributeValue::Graphs(v) => !v.is_empty(),
            _ => true,
        }
    }
}

/// A named attribute of a node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeProto {
    pub name: Option<String>,
    /// None only while an attribute is being assembled; a valid attribute has a value.
    pub value: Option<AttributeValue>,
    pub unknown_fields: UnknownFields,
}

impl AttributeProto {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value),
            unknown_fields: UnknownFields::new(),
        }
    }

    /// The populated slot, if any.
    pub fn kind(&self) -> Option<AttributeKind> {
        self.value
            .as_ref()
            .filter(|v| v.is_populated())
            .map(AttributeValue::kind)
    }

    /// Number of populated value slots (0 or 1).
    pub fn populated_slots(&self) -> usize {
        usize::from(self.kind().is_some())
    }

    /// Try to get float value
    pub fn as_float(&self) -> Option<f32> {
        match self.value {
            Some(AttributeValue::Float(f)) => Some(f),
            _ => None,
        }
    }

    /// Try to get integer value
    pub fn as_int(&self) -> Option<i64> {
        match self.value {
            Some(AttributeValue::Int(i)) => Some(i),
            _ => None,
        }
    }

    /// Try to get byte-string value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Some(AttributeValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Try to get integer array value
    pub fn as_ints(&self) -> Option<&[i64]> {
        match &self.value {
            Some(AttributeValue::Ints(v)) => Some(v),
            _ => None,
        }
    }

    /// Try to get float array value
    pub fn as_floats(&self) -> Option<&[f32]> {
        match &self.value {
            Some(AttributeValue::Floats(v)) => Some(v),
            _ => None,
        }
    }

    /// Try to get tensor value
    pub fn as_tensor(&self) -> Option<&TensorProto> {
        match &self.value {
            Some(AttributeValue::Tensor(t)) => Some(t),
            _ => None,
        }
    }

    /// Try to get graph value
    pub fn as_graph(&self) -> Option<&GraphProto> {
        match &self.value {
            Some(AttributeValue::Graph(g)) => Some(g),
            _ => None,
        }
    }
}
