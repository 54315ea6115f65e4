//! Name bookkeeping for one graph scope.
//!
//! Five namespaces are tracked independently: a name may appear in several
//! of them, but at most once in each. Attribute names are scoped to the
//! enclosing node, so the attribute namespace is reset by [`begin_node`].
//!
//! [`begin_node`]: NamespaceRegistry::begin_node

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::DuplicateNameError;

/// One of the naming namespaces of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Node,
    Graph,
    Attribute,
    Operator,
    Tensor,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Namespace::Node => "node",
            Namespace::Graph => "graph",
            Namespace::Attribute => "attribute",
            Namespace::Operator => "operator",
            Namespace::Tensor => "tensor",
        })
    }
}

/// What defines a tensor name within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TensorBinding {
    /// A declared graph input with no initializer.
    GraphInput,
    /// A declared graph input backed by an initializer.
    Initializer,
    /// An output of the node at this index.
    NodeOutput(usize),
}

impl TensorBinding {
    /// Whether the tensor is defined for the node at `index`.
    pub fn is_visible_at(self, index: usize) -> bool {
        match self {
            TensorBinding::GraphInput | TensorBinding::Initializer => true,
            TensorBinding::NodeOutput(producer) => producer < index,
        }
    }
}

/// Registered names of a single graph scope.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    nodes: FxHashSet<String>,
    graphs: FxHashSet<String>,
    attributes: FxHashSet<String>,
    operators: FxHashSet<String>,
    tensors: FxHashMap<String, TensorBinding>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition of `name` in `namespace`.
    ///
    /// Tensor names registered this way bind as graph inputs; use
    /// [`bind_tensor`](Self::bind_tensor) to record a node output. Operator
    /// names are references and never collide.
    pub fn register(&mut self, namespace: Namespace, name: &str) -> Result<(), DuplicateNameError> {
        let inserted = match namespace {
            Namespace::Node => self.nodes.insert(name.to_string()),
            Namespace::Graph => self.graphs.insert(name.to_string()),
            Namespace::Attribute => self.attributes.insert(name.to_string()),
            Namespace::Operator => {
                self.reference_operator(name);
                true
            }
            Namespace::Tensor => return self.bind_tensor(name, TensorBinding::GraphInput),
        };
        if inserted {
            Ok(())
        } else {
            Err(DuplicateNameError {
                namespace,
                name: name.to_string(),
            })
        }
    }

    /// Binds a tensor name. Each tensor has exactly one definition.
    pub fn bind_tensor(
        &mut self,
        name: &str,
        binding: TensorBinding,
    ) -> Result<(), DuplicateNameError> {
        if self.tensors.contains_key(name) {
            return Err(DuplicateNameError {
                namespace: Namespace::Tensor,
                name: name.to_string(),
            });
        }
        self.tensors.insert(name.to_string(), binding);
        Ok(())
    }

    /// Marks a declared graph input as initializer-backed.
    ///
    /// Returns false if `name` is not a graph input.
    pub fn bind_initializer(&mut self, name: &str) -> bool {
        match self.tensors.get_mut(name) {
            Some(binding)
                if matches!(binding, TensorBinding::GraphInput | TensorBinding::Initializer) =>
            {
                *binding = TensorBinding::Initializer;
                true
            }
            _ => false,
        }
    }

    /// Records a use of an externally defined operator.
    pub fn reference_operator(&mut self, name: &str) {
        if !self.operators.contains(name) {
            self.operators.insert(name.to_string());
        }
    }

    /// Opens the attribute scope of a new node.
    pub fn begin_node(&mut self) {
        self.attributes.clear();
    }

    /// Returns true if `name` is registered in `namespace`.
    pub fn contains(&self, namespace: Namespace, name: &str) -> bool {
        match namespace {
            Namespace::Node => self.nodes.contains(name),
            Namespace::Graph => self.graphs.contains(name),
            Namespace::Attribute => self.attributes.contains(name),
            Namespace::Operator => self.operators.contains(name),
            Namespace::Tensor => self.tensors.contains_key(name),
        }
    }

    /// Resolves a tensor name to its definition.
    pub fn lookup(&self, tensor: &str) -> Option<TensorBinding> {
        self.tensors.get(tensor).copied()
    }

    /// Operator names referenced so far, in no particular order.
    pub fn operators(&self) -> impl Iterator<Item = &str> {
        self.operators.iter().map(String::as_str)
    }
}
