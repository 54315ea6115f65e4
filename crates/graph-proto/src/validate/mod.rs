//! Semantic validation for decoded or constructed graphs.
//!
//! Structural validation happens during decode. The checks here cover what
//! a consumer relies on beyond the wire grammar:
//! - attribute union exclusivity
//! - name uniqueness per namespace
//! - definition before use (node order is execution order)
//! - tensor shape/data consistency, including segments
//! - sparse tensor consistency
//! - initializer binding
//!
//! Graph-valued attributes are validated as scopes of their own that may
//! read tensors visible in the enclosing graph at the owning node.
//!
//! Validation is pure: the same tree always yields the same result.

mod path;

pub use path::{ElementPath, PathSegment};

use log::debug;
use rustc_hash::FxHashSet;

use crate::error::{ValidationError, Violation};
use crate::model::{
    AttributeProto, AttributeValue, DataType, GraphProto, NodeProto, SparseTensorProto,
    TensorProto,
};
use crate::registry::{Namespace, NamespaceRegistry, TensorBinding};

/// When validation stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Stop at the first violation.
    #[default]
    FailFast,
    /// Run every check and collect all violations.
    Accumulate,
}

/// Options for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidateOptions {
    pub mode: ValidationMode,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that collect every violation.
    pub fn accumulate() -> Self {
        Self {
            mode: ValidationMode::Accumulate,
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Validates a graph, returning the first violation.
pub fn validate_graph(graph: &GraphProto) -> Result<(), ValidationError> {
    let mut validator = Validator::new(ValidationMode::FailFast);
    let _ = validator.graph(graph, &ElementPath::root("graph"), None);
    validator.into_first()
}

/// Validates a graph, returning every violation found under `options`.
pub fn validate_graph_with_options(
    graph: &GraphProto,
    options: ValidateOptions,
) -> Result<(), Vec<ValidationError>> {
    let mut validator = Validator::new(options.mode);
    let _ = validator.graph(graph, &ElementPath::root("graph"), None);
    debug!(
        "validated graph {:?}: {} violations",
        graph.name,
        validator.errors.len()
    );
    validator.finish()
}

/// Validates a standalone tensor, returning the first violation.
pub fn validate_tensor(tensor: &TensorProto) -> Result<(), ValidationError> {
    let mut validator = Validator::new(ValidationMode::FailFast);
    let _ = validator.tensor(tensor, &ElementPath::root("tensor"));
    validator.into_first()
}

/// Validates a standalone tensor, returning every violation found under `options`.
pub fn validate_tensor_with_options(
    tensor: &TensorProto,
    options: ValidateOptions,
) -> Result<(), Vec<ValidationError>> {
    let mut validator = Validator::new(options.mode);
    let _ = validator.tensor(tensor, &ElementPath::root("tensor"));
    validator.finish()
}

/// Validates a sparse tensor, returning the first violation.
pub fn validate_sparse_tensor(sparse: &SparseTensorProto) -> Result<(), ValidationError> {
    let mut validator = Validator::new(ValidationMode::FailFast);
    let _ = validator.sparse_tensor(sparse, &ElementPath::root("sparse_tensor"));
    validator.into_first()
}

/// Validates a sparse tensor, returning every violation found under `options`.
pub fn validate_sparse_tensor_with_options(
    sparse: &SparseTensorProto,
    options: ValidateOptions,
) -> Result<(), Vec<ValidationError>> {
    let mut validator = Validator::new(options.mode);
    let _ = validator.sparse_tensor(sparse, &ElementPath::root("sparse_tensor"));
    validator.finish()
}

/// Signals that a fail-fast run has recorded its violation.
struct Stop;

type Flow = Result<(), Stop>;

/// Tensor names visible to a subgraph: the enclosing graph's bindings as
/// seen by the owning node, and the scopes around that.
struct Scope<'a> {
    registry: &'a NamespaceRegistry,
    node: usize,
    parent: Option<&'a Scope<'a>>,
}

impl Scope<'_> {
    fn resolves(&self, tensor: &str) -> bool {
        self.registry
            .lookup(tensor)
            .is_some_and(|binding| binding.is_visible_at(self.node))
            || self.parent.is_some_and(|parent| parent.resolves(tensor))
    }
}

struct Validator {
    mode: ValidationMode,
    errors: Vec<ValidationError>,
}

impl Validator {
    fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            errors: Vec::new(),
        }
    }

    fn report(&mut self, path: ElementPath, violation: impl Into<Violation>) -> Flow {
        let error = ValidationError::new(path, violation);
        match self.mode {
            ValidationMode::FailFast => {
                self.errors.push(error);
                Err(Stop)
            }
            ValidationMode::Accumulate => {
                debug!("{error}");
                self.errors.push(error);
                Ok(())
            }
        }
    }

    fn register(
        &mut self,
        registry: &mut NamespaceRegistry,
        namespace: Namespace,
        name: &str,
        path: ElementPath,
    ) -> Flow {
        match registry.register(namespace, name) {
            Ok(()) => Ok(()),
            Err(duplicate) => self.report(path, duplicate),
        }
    }

    fn into_first(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn finish(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    // =========================================================================
    // GRAPHS
    // =========================================================================

    fn graph(&mut self, graph: &GraphProto, path: &ElementPath, outer: Option<&Scope<'_>>) -> Flow {
        let mut registry = NamespaceRegistry::new();
        if let Some(name) = non_empty(&graph.name) {
            self.register(&mut registry, Namespace::Graph, name, path.field("name"))?;
        }

        self.graph_inputs(graph, path, &mut registry)?;
        self.initializers(graph, path, &mut registry)?;
        for (index, node) in graph.node.iter().enumerate() {
            self.declare_node(node, index, &path.field("node").index(index), &mut registry)?;
        }
        for (index, node) in graph.node.iter().enumerate() {
            self.node(node, index, &path.field("node").index(index), &registry, outer)?;
        }

        for (slot, output) in graph.output.iter().enumerate() {
            let output_path = path.field("output").index(slot);
            if output.is_empty() {
                self.report(
                    output_path,
                    Violation::MissingName {
                        namespace: Namespace::Tensor,
                    },
                )?;
            } else if registry.lookup(output).is_none()
                && !outer.is_some_and(|scope| scope.resolves(output))
            {
                self.report(
                    output_path,
                    Violation::UndefinedGraphOutput {
                        tensor: output.clone(),
                    },
                )?;
            }
        }
        Ok(())
    }

    fn graph_inputs(
        &mut self,
        graph: &GraphProto,
        path: &ElementPath,
        registry: &mut NamespaceRegistry,
    ) -> Flow {
        for (slot, input) in graph.input.iter().enumerate() {
            let input_path = path.field("input").index(slot);
            if input.is_empty() {
                self.report(
                    input_path,
                    Violation::MissingName {
                        namespace: Namespace::Tensor,
                    },
                )?;
                continue;
            }
            self.register(registry, Namespace::Tensor, input, input_path)?;
        }
        Ok(())
    }

    fn initializers(
        &mut self,
        graph: &GraphProto,
        path: &ElementPath,
        registry: &mut NamespaceRegistry,
    ) -> Flow {
        let mut seen = FxHashSet::default();
        for (slot, tensor) in graph.initializer.iter().enumerate() {
            let tensor_path = path.field("initializer").index(slot);
            match non_empty(&tensor.name) {
                None => self.report(tensor_path.field("name"), Violation::UnnamedInitializer)?,
                Some(name) if !seen.insert(name) => self.report(
                    tensor_path.field("name"),
                    Violation::DuplicateInitializer {
                        name: name.to_string(),
                    },
                )?,
                Some(name) if !registry.bind_initializer(name) => self.report(
                    tensor_path.field("name"),
                    Violation::UnboundInitializer {
                        name: name.to_string(),
                    },
                )?,
                Some(_) => {}
            }
            self.tensor(tensor, &tensor_path)?;
        }
        Ok(())
    }

    /// Registers everything a node defines: its name, outputs, attribute
    /// names, and the names of graphs it carries.
    fn declare_node(
        &mut self,
        node: &NodeProto,
        index: usize,
        path: &ElementPath,
        registry: &mut NamespaceRegistry,
    ) -> Flow {
        if let Some(name) = non_empty(&node.name) {
            self.register(registry, Namespace::Node, name, path.field("name"))?;
        }
        match non_empty(&node.op_type) {
            Some(op_type) => registry.reference_operator(op_type),
            None => self.report(
                path.field("op_type"),
                Violation::MissingName {
                    namespace: Namespace::Operator,
                },
            )?,
        }

        for (slot, output) in node.output.iter().enumerate() {
            // Empty names mark omitted optional outputs.
            if output.is_empty() {
                continue;
            }
            if let Err(duplicate) = registry.bind_tensor(output, TensorBinding::NodeOutput(index)) {
                self.report(path.field("output").index(slot), duplicate)?;
            }
        }

        registry.begin_node();
        for (slot, attribute) in node.attribute.iter().enumerate() {
            let attribute_path = attribute_path(path, slot, attribute);
            match non_empty(&attribute.name) {
                Some(name) => self.register(
                    registry,
                    Namespace::Attribute,
                    name,
                    attribute_path.field("name"),
                )?,
                None => self.report(
                    attribute_path.field("name"),
                    Violation::MissingName {
                        namespace: Namespace::Attribute,
                    },
                )?,
            }
            for (graph, graph_path) in subgraphs(attribute, &attribute_path) {
                if let Some(name) = non_empty(&graph.name) {
                    self.register(registry, Namespace::Graph, name, graph_path.field("name"))?;
                }
            }
        }
        Ok(())
    }

    /// Checks what a node uses: its inputs and its attribute values.
    fn node(
        &mut self,
        node: &NodeProto,
        index: usize,
        path: &ElementPath,
        registry: &NamespaceRegistry,
        outer: Option<&Scope<'_>>,
    ) -> Flow {
        for (slot, input) in node.input.iter().enumerate() {
            // Empty names mark omitted optional inputs.
            if input.is_empty() {
                continue;
            }
            let violation = match registry.lookup(input) {
                Some(binding) if binding.is_visible_at(index) => continue,
                Some(TensorBinding::NodeOutput(producer)) => Violation::UsedBeforeDefinition {
                    tensor: input.clone(),
                    producer,
                },
                _ if outer.is_some_and(|scope| scope.resolves(input)) => continue,
                _ => Violation::UndefinedTensor {
                    tensor: input.clone(),
                },
            };
            self.report(path.field("input").index(slot), violation)?;
        }

        let scope = Scope {
            registry,
            node: index,
            parent: outer,
        };
        for (slot, attribute) in node.attribute.iter().enumerate() {
            self.attribute(attribute, &attribute_path(path, slot, attribute), &scope)?;
        }
        Ok(())
    }

    fn attribute(
        &mut self,
        attribute: &AttributeProto,
        path: &ElementPath,
        scope: &Scope<'_>,
    ) -> Flow {
        let populated = attribute.populated_slots();
        if populated != 1 {
            self.report(path.clone(), Violation::AttributeSlotCount { populated })?;
        }

        match &attribute.value {
            Some(AttributeValue::Tensor(tensor)) => self.tensor(tensor, &path.field("t"))?,
            Some(AttributeValue::Tensors(tensors)) => {
                for (i, tensor) in tensors.iter().enumerate() {
                    self.tensor(tensor, &path.field("tensors").index(i))?;
                }
            }
            _ => {}
        }
        for (graph, graph_path) in subgraphs(attribute, path) {
            self.graph(graph, &graph_path, Some(scope))?;
        }
        Ok(())
    }

    // =========================================================================
    // TENSORS
    // =========================================================================

    fn tensor(&mut self, tensor: &TensorProto, path: &ElementPath) -> Flow {
        let mut negative = false;
        for (index, &value) in tensor.dims.iter().enumerate() {
            if value < 0 {
                negative = true;
                self.report(
                    path.field("dims").index(index),
                    Violation::NegativeDimension { index, value },
                )?;
            }
        }

        let fields = tensor.populated_data_fields();
        if let &[first, second, ..] = fields.as_slice() {
            return self.report(path.clone(), Violation::MixedRepresentation { first, second });
        }

        let data_type = match tensor.data_type {
            Some(data_type) if data_type != DataType::Undefined => data_type,
            _ => return self.report(path.field("data_type"), Violation::MissingDataType),
        };

        if let Some(raw) = &tensor.raw_data {
            let Some(element_size) = data_type.element_size() else {
                return self.report(path.field("raw_data"), Violation::StringInRawData);
            };
            if raw.len() % element_size != 0 {
                return self.report(
                    path.field("raw_data"),
                    Violation::RawDataMisaligned {
                        len: raw.len(),
                        element_size,
                    },
                );
            }
        } else if let Some(&field) = fields.first() {
            if data_type.storage().map(|s| s.field_name()) != Some(field) {
                return self.report(
                    path.field(field),
                    Violation::DataTypeMismatch { data_type, field },
                );
            }
            if let Some((min, max)) = data_type.int32_range() {
                let out_of_range = tensor
                    .int32_data
                    .iter()
                    .enumerate()
                    .find(|(_, v)| !(min..=max).contains(*v));
                if let Some((index, &value)) = out_of_range {
                    self.report(
                        path.field("int32_data").index(index),
                        Violation::ValueOutOfRange {
                            index,
                            value,
                            data_type,
                        },
                    )?;
                }
            }
        }

        if negative {
            return Ok(());
        }
        let Some(total) = tensor.shape_element_count() else {
            return self.report(path.field("dims"), Violation::ShapeOverflow);
        };
        if let Some(segment) = &tensor.segment {
            let (begin, end) = (segment.begin_or_default(), segment.end_or_default());
            if begin < 0 || end < begin || end as u64 > total {
                return self.report(
                    path.field("segment"),
                    Violation::InvalidSegment { begin, end, total },
                );
            }
        }

        let expected = tensor.expected_element_count().unwrap_or(total);
        let actual = tensor.data_element_count().unwrap_or(0);
        if expected != actual {
            self.report(
                path.clone(),
                Violation::ElementCountMismatch { expected, actual },
            )?;
        }
        Ok(())
    }

    fn sparse_tensor(&mut self, sparse: &SparseTensorProto, path: &ElementPath) -> Flow {
        let mut negative = false;
        for (index, &value) in sparse.dims.iter().enumerate() {
            if value < 0 {
                negative = true;
                self.report(
                    path.field("dims").index(index),
                    Violation::NegativeDimension { index, value },
                )?;
            }
        }

        let Some(indices) = &sparse.indices else {
            return self.report(
                path.field("indices"),
                Violation::MissingSparseComponent {
                    component: "indices",
                },
            );
        };
        let Some(values) = &sparse.values else {
            return self.report(
                path.field("values"),
                Violation::MissingSparseComponent { component: "values" },
            );
        };

        let before = self.errors.len();
        self.tensor(indices, &path.field("indices"))?;
        self.tensor(values, &path.field("values"))?;
        // Shapes of malformed components say nothing about the sparse layout.
        if negative || self.errors.len() > before {
            return Ok(());
        }

        if !matches!(indices.data_type, Some(DataType::Int32 | DataType::Int64)) {
            return self.report(
                path.field("indices").field("data_type"),
                Violation::IndicesNotInteger {
                    data_type: indices.data_type,
                },
            );
        }
        let &[rows, width] = indices.dims.as_slice() else {
            return self.report(
                path.field("indices").field("dims"),
                Violation::SparseRank {
                    component: "indices",
                    rank: indices.dims.len(),
                    expected: 2,
                },
            );
        };
        if values.dims.len() != 1 {
            return self.report(
                path.field("values").field("dims"),
                Violation::SparseRank {
                    component: "values",
                    rank: values.dims.len(),
                    expected: 1,
                },
            );
        }

        let rank = sparse.dims.len();
        if width != rank as i64 {
            return self.report(
                path.field("indices").field("dims"),
                Violation::IndexWidthMismatch { width, rank },
            );
        }
        let value_count = values.shape_element_count().unwrap_or(0);
        if rows as u64 != value_count {
            return self.report(
                path.clone(),
                Violation::SparseCountMismatch {
                    rows,
                    values: value_count,
                },
            );
        }

        let Some(coordinates) = indices.int64_values() else {
            return Ok(());
        };
        if rank == 0 {
            return Ok(());
        }
        for (row, tuple) in coordinates.chunks_exact(rank).enumerate() {
            for (axis, (&index, &bound)) in tuple.iter().zip(&sparse.dims).enumerate() {
                if index < 0 || index >= bound {
                    return self.report(
                        path.field("indices").index(row),
                        Violation::IndexOutOfBounds {
                            row,
                            axis,
                            index,
                            bound,
                        },
                    );
                }
            }
        }
        Ok(())
    }
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.is_empty())
}

fn attribute_path(node_path: &ElementPath, slot: usize, attribute: &AttributeProto) -> ElementPath {
    let attributes = node_path.field("attribute");
    match non_empty(&attribute.name) {
        Some(name) => attributes.key(name),
        None => attributes.index(slot),
    }
}

/// Graphs carried by an attribute, with their paths.
fn subgraphs<'a>(
    attribute: &'a AttributeProto,
    path: &ElementPath,
) -> Vec<(&'a GraphProto, ElementPath)> {
    match &attribute.value {
        Some(AttributeValue::Graph(graph)) => vec![(graph, path.field("g"))],
        Some(AttributeValue::Graphs(graphs)) => graphs
            .iter()
            .enumerate()
            .map(|(i, graph)| (graph, path.field("graphs").index(i)))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DuplicateNameError, ValidationKind};
    use crate::model::builder::{GraphBuilder, TensorBuilder};
    use crate::model::UnknownFields;

    fn mlp() -> GraphProto {
        GraphBuilder::new("mlp")
            .input("x")
            .input("w")
            .initializer(
                TensorBuilder::new(DataType::Float, [2, 2])
                    .name("w")
                    .floats([1.0, 0.0, 0.0, 1.0])
                    .build(),
            )
            .node("MatMul", |n| n.name("mm").input("x").input("w").output("h"))
            .node("Relu", |n| n.name("act").input("h").output("y"))
            .output("y")
            .build()
    }

    fn violation(result: Result<(), ValidationError>) -> Violation {
        result.unwrap_err().violation
    }

    #[test]
    fn test_valid_graph() {
        assert_eq!(validate_graph(&mlp()), Ok(()));
        assert_eq!(
            validate_graph_with_options(&mlp(), ValidateOptions::accumulate()),
            Ok(())
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut graph = mlp();
        graph.node.swap(0, 1);
        graph.initializer[0].float_data.pop();

        let options = ValidateOptions::accumulate();
        let first = validate_graph_with_options(&graph, options);
        let second = validate_graph_with_options(&graph, options);
        assert!(first.is_err());
        assert_eq!(first, second);
        assert_eq!(validate_graph(&graph), validate_graph(&graph));
    }

    #[test]
    fn test_shape_consistency() {
        let five = TensorBuilder::new(DataType::Float, [2, 3])
            .floats([1.0, 2.0, 3.0, 4.0, 5.0])
            .build();
        let err = validate_tensor(&five).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::TensorConsistency);
        assert_eq!(
            err.violation,
            Violation::ElementCountMismatch {
                expected: 6,
                actual: 5
            }
        );

        let six = TensorBuilder::new(DataType::Float, [2, 3])
            .floats([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .build();
        assert_eq!(validate_tensor(&six), Ok(()));
    }

    #[test]
    fn test_raw_data_counts_by_element_size() {
        let tensor = TensorBuilder::new(DataType::Int64, [3]).raw([0u8; 24]).build();
        assert_eq!(validate_tensor(&tensor), Ok(()));

        let short = TensorBuilder::new(DataType::Int64, [3]).raw([0u8; 16]).build();
        assert_eq!(
            violation(validate_tensor(&short)),
            Violation::ElementCountMismatch {
                expected: 3,
                actual: 2
            }
        );

        let misaligned = TensorBuilder::new(DataType::Float, [1]).raw([0u8; 5]).build();
        assert_eq!(
            violation(validate_tensor(&misaligned)),
            Violation::RawDataMisaligned {
                len: 5,
                element_size: 4
            }
        );
    }

    #[test]
    fn test_tensor_representation_rules() {
        let mixed = TensorBuilder::new(DataType::Float, [1])
            .floats([1.0])
            .raw([0u8; 4])
            .build();
        assert_eq!(
            violation(validate_tensor(&mixed)),
            Violation::MixedRepresentation {
                first: "float_data",
                second: "raw_data"
            }
        );

        let strings = TensorBuilder::new(DataType::String, [1]).raw(b"abcd".to_vec()).build();
        assert_eq!(violation(validate_tensor(&strings)), Violation::StringInRawData);

        let wrong_field = TensorBuilder::new(DataType::Float, [2]).int64s([1, 2]).build();
        assert_eq!(
            violation(validate_tensor(&wrong_field)),
            Violation::DataTypeMismatch {
                data_type: DataType::Float,
                field: "int64_data"
            }
        );

        let untyped = TensorProto {
            dims: vec![1],
            float_data: vec![1.0],
            ..Default::default()
        };
        assert_eq!(violation(validate_tensor(&untyped)), Violation::MissingDataType);
    }

    #[test]
    fn test_narrow_integer_range() {
        let ok = TensorBuilder::new(DataType::Int8, [2]).int32s([-128, 127]).build();
        assert_eq!(validate_tensor(&ok), Ok(()));

        let bad = TensorBuilder::new(DataType::Uint8, [2]).int32s([0, 256]).build();
        assert_eq!(
            violation(validate_tensor(&bad)),
            Violation::ValueOutOfRange {
                index: 1,
                value: 256,
                data_type: DataType::Uint8
            }
        );
    }

    #[test]
    fn test_negative_dimension() {
        let tensor = TensorBuilder::new(DataType::Float, [2, -1]).build();
        let err = validate_tensor(&tensor).unwrap_err();
        assert_eq!(err.path.to_string(), "tensor.dims[1]");
        assert_eq!(
            err.violation,
            Violation::NegativeDimension { index: 1, value: -1 }
        );
    }

    #[test]
    fn test_segment_span() {
        let fragment = TensorBuilder::new(DataType::Float, [2, 3])
            .segment(2, 5)
            .floats([1.0, 2.0, 3.0])
            .build();
        assert_eq!(validate_tensor(&fragment), Ok(()));

        let past_end = TensorBuilder::new(DataType::Float, [2, 3])
            .segment(4, 8)
            .floats([1.0, 2.0, 3.0, 4.0])
            .build();
        assert_eq!(
            violation(validate_tensor(&past_end)),
            Violation::InvalidSegment {
                begin: 4,
                end: 8,
                total: 6
            }
        );

        let reversed = TensorBuilder::new(DataType::Float, [6]).segment(3, 1).build();
        assert!(matches!(
            violation(validate_tensor(&reversed)),
            Violation::InvalidSegment { .. }
        ));
    }

    #[test]
    fn test_node_name_collision() {
        let graph = GraphBuilder::new("g")
            .input("x")
            .node("Relu", |n| n.name("act").input("x").output("h"))
            .node("Relu", |n| n.name("act").input("h").output("y"))
            .output("y")
            .build();
        let err = validate_graph(&graph).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::NamespaceUniqueness);
        assert_eq!(err.path.to_string(), "graph.node[1].name");
        assert_eq!(
            err.violation,
            Violation::DuplicateName(DuplicateNameError {
                namespace: Namespace::Node,
                name: "act".to_string(),
            })
        );
    }

    #[test]
    fn test_node_name_reused_as_tensor_name() {
        let graph = GraphBuilder::new("g")
            .input("x")
            .node("Relu", |n| n.name("y").input("x").output("y"))
            .output("y")
            .build();
        assert_eq!(validate_graph(&graph), Ok(()));
    }

    #[test]
    fn test_tensor_single_assignment() {
        let graph = GraphBuilder::new("g")
            .input("x")
            .node("Relu", |n| n.input("x").output("x"))
            .output("x")
            .build();
        assert!(matches!(
            violation(validate_graph(&graph)),
            Violation::DuplicateName(DuplicateNameError {
                namespace: Namespace::Tensor,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_attribute_names_scoped_per_node() {
        let graph = GraphBuilder::new("g")
            .input("x")
            .node("Clip", |n| {
                n.input("x").output("h").attr_float("min", 0.0).attr_float("max", 6.0)
            })
            .node("Clip", |n| {
                n.input("h").output("y").attr_float("min", 0.0).attr_float("max", 6.0)
            })
            .output("y")
            .build();
        assert_eq!(validate_graph(&graph), Ok(()));

        let mut duplicated = graph.clone();
        duplicated.node[1].attribute[1].name = Some("min".to_string());
        let err = validate_graph(&duplicated).unwrap_err();
        assert_eq!(err.path.to_string(), "graph.node[1].attribute[\"min\"].name");
    }

    #[test]
    fn test_out_of_order_producer() {
        let graph = GraphBuilder::new("g")
            .input("x")
            .node("Relu", |n| n.input("h").output("y"))
            .node("Neg", |n| n.input("x").output("h"))
            .output("y")
            .build();
        let err = validate_graph(&graph).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::DefinitionBeforeUse);
        assert_eq!(
            err.violation,
            Violation::UsedBeforeDefinition {
                tensor: "h".to_string(),
                producer: 1
            }
        );

        let mut reordered = graph;
        reordered.node.swap(0, 1);
        assert_eq!(validate_graph(&reordered), Ok(()));
    }

    #[test]
    fn test_undefined_tensors() {
        let graph = GraphBuilder::new("g")
            .input("x")
            .node("Add", |n| n.input("x").input("").input("z").output("y"))
            .output("y")
            .output("missing")
            .build();
        let errors =
            validate_graph_with_options(&graph, ValidateOptions::accumulate()).unwrap_err();
        assert_eq!(
            errors.iter().map(|e| e.violation.clone()).collect::<Vec<_>>(),
            vec![
                Violation::UndefinedTensor {
                    tensor: "z".to_string()
                },
                Violation::UndefinedGraphOutput {
                    tensor: "missing".to_string()
                },
            ]
        );
        assert_eq!(errors[0].path.to_string(), "graph.node[0].input[2]");
    }

    #[test]
    fn test_missing_op_type() {
        let mut graph = mlp();
        graph.node[1].op_type = None;
        assert_eq!(
            violation(validate_graph(&graph)),
            Violation::MissingName {
                namespace: Namespace::Operator
            }
        );
    }

    #[test]
    fn test_attribute_union_exclusivity() {
        let mut graph = mlp();
        graph.node[1].attribute.push(AttributeProto {
            name: Some("axes".to_string()),
            value: Some(AttributeValue::Ints(Vec::new())),
            unknown_fields: UnknownFields::new(),
        });
        let err = validate_graph(&graph).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::UnionExclusivity);
        assert_eq!(err.violation, Violation::AttributeSlotCount { populated: 0 });
        assert_eq!(err.path.to_string(), "graph.node[1].attribute[\"axes\"]");
    }

    #[test]
    fn test_initializer_binding() {
        let mut unbound = mlp();
        unbound.initializer[0].name = Some("v".to_string());
        assert_eq!(
            violation(validate_graph(&unbound)),
            Violation::UnboundInitializer {
                name: "v".to_string()
            }
        );

        let mut duplicated = mlp();
        let copy = duplicated.initializer[0].clone();
        duplicated.initializer.push(copy);
        assert_eq!(
            violation(validate_graph(&duplicated)),
            Violation::DuplicateInitializer {
                name: "w".to_string()
            }
        );

        let mut unnamed = mlp();
        unnamed.initializer[0].name = None;
        assert_eq!(violation(validate_graph(&unnamed)), Violation::UnnamedInitializer);
    }

    #[test]
    fn test_initializer_tensor_checked() {
        let mut graph = mlp();
        graph.initializer[0].float_data.pop();
        let err = validate_graph(&graph).unwrap_err();
        assert_eq!(err.path.to_string(), "graph.initializer[0]");
        assert_eq!(err.kind(), ValidationKind::TensorConsistency);
    }

    #[test]
    fn test_subgraph_reads_outer_scope() {
        let body = GraphBuilder::new("body")
            .node("Add", |n| n.input("x").input("h").output("o"))
            .output("o")
            .build();
        let graph = GraphBuilder::new("main")
            .input("x")
            .node("Relu", |n| n.input("x").output("h"))
            .node("Loop", |n| n.input("x").output("y").attr_graph("body", body.clone()))
            .output("y")
            .build();
        assert_eq!(validate_graph(&graph), Ok(()));

        let early = GraphBuilder::new("main")
            .input("x")
            .node("Loop", |n| n.input("x").output("y").attr_graph("body", body))
            .node("Relu", |n| n.input("x").output("h"))
            .output("y")
            .build();
        let err = validate_graph(&early).unwrap_err();
        assert_eq!(
            err.path.to_string(),
            "graph.node[0].attribute[\"body\"].g.node[0].input[1]"
        );
        assert_eq!(
            err.violation,
            Violation::UndefinedTensor {
                tensor: "h".to_string()
            }
        );
    }

    #[test]
    fn test_subgraph_names_share_graph_namespace() {
        let branch = |name: &str| {
            GraphBuilder::new(name)
                .input("c")
                .node("Identity", |n| n.input("c").output("r"))
                .output("r")
                .build()
        };
        let graph = GraphBuilder::new("main")
            .input("c")
            .node("If", |n| {
                n.input("c")
                    .output("y")
                    .attr_graph("then_branch", branch("branch"))
                    .attr_graph("else_branch", branch("branch"))
            })
            .output("y")
            .build();
        assert!(matches!(
            violation(validate_graph(&graph)),
            Violation::DuplicateName(DuplicateNameError {
                namespace: Namespace::Graph,
                ..
            })
        ));
    }

    #[test]
    fn test_graph_list_attribute_checked() {
        let branch = |name: &str, input: &str| {
            GraphBuilder::new(name)
                .node("Identity", |n| n.input(input).output("r"))
                .output("r")
                .build()
        };
        let with_branches = |graphs: Vec<GraphProto>| {
            GraphBuilder::new("main")
                .input("c")
                .node("Switch", |n| {
                    n.input("c")
                        .output("y")
                        .attr("branches", AttributeValue::Graphs(graphs))
                })
                .output("y")
                .build()
        };

        let valid = with_branches(vec![branch("a", "c"), branch("b", "c")]);
        assert_eq!(validate_graph(&valid), Ok(()));

        let undefined = with_branches(vec![branch("a", "c"), branch("b", "missing")]);
        let err = validate_graph(&undefined).unwrap_err();
        assert_eq!(
            err.path.to_string(),
            "graph.node[0].attribute[\"branches\"].graphs[1].node[0].input[0]"
        );
        assert_eq!(
            err.violation,
            Violation::UndefinedTensor {
                tensor: "missing".to_string()
            }
        );

        let duplicate = with_branches(vec![branch("a", "c"), branch("a", "c")]);
        let err = validate_graph(&duplicate).unwrap_err();
        assert_eq!(
            err.path.to_string(),
            "graph.node[0].attribute[\"branches\"].graphs[1].name"
        );
        assert!(matches!(
            err.violation,
            Violation::DuplicateName(DuplicateNameError {
                namespace: Namespace::Graph,
                ..
            })
        ));
    }

    #[test]
    fn test_accumulate_collects_all() {
        let mut graph = mlp();
        graph.node[0].name = Some("act".to_string());
        graph.node[1].input[0] = "nope".to_string();
        graph.initializer[0].float_data.pop();

        let fail_fast = validate_graph_with_options(&graph, ValidateOptions::new()).unwrap_err();
        assert_eq!(fail_fast.len(), 1);

        let all = validate_graph_with_options(&graph, ValidateOptions::accumulate()).unwrap_err();
        let kinds: Vec<_> = all.iter().map(ValidationError::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationKind::TensorConsistency,
                ValidationKind::NamespaceUniqueness,
                ValidationKind::DefinitionBeforeUse,
            ]
        );
        assert_eq!(fail_fast[0], all[0]);
    }

    fn sparse(indices: Vec<i64>, rows: i64, values: usize) -> SparseTensorProto {
        SparseTensorProto::new(
            [4, 4],
            TensorBuilder::new(DataType::Int64, [rows, 2]).int64s(indices).build(),
            TensorBuilder::new(DataType::Float, [values as i64])
                .floats(vec![1.0; values])
                .build(),
        )
    }

    #[test]
    fn test_sparse_consistent() {
        let tensor = sparse(vec![0, 0, 1, 2, 3, 3], 3, 3);
        assert_eq!(validate_sparse_tensor(&tensor), Ok(()));
    }

    #[test]
    fn test_sparse_count_mismatch() {
        let tensor = sparse(vec![0, 0, 1, 1, 2, 2, 3, 3], 4, 3);
        let err = validate_sparse_tensor(&tensor).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::SparseTensorConsistency);
        assert_eq!(
            err.violation,
            Violation::SparseCountMismatch { rows: 4, values: 3 }
        );
    }

    #[test]
    fn test_sparse_index_out_of_bounds() {
        let tensor = sparse(vec![0, 0, 1, 4, 3, 3], 3, 3);
        let err = validate_sparse_tensor(&tensor).unwrap_err();
        assert_eq!(err.path.to_string(), "sparse_tensor.indices[1]");
        assert_eq!(
            err.violation,
            Violation::IndexOutOfBounds {
                row: 1,
                axis: 1,
                index: 4,
                bound: 4
            }
        );
    }

    #[test]
    fn test_sparse_structure() {
        let mut float_indices = sparse(vec![0, 0], 1, 1);
        if let Some(indices) = float_indices.indices.as_mut() {
            *indices = TensorBuilder::new(DataType::Float, [1, 2]).floats([0.0, 0.0]).build();
        }
        assert_eq!(
            violation(validate_sparse_tensor(&float_indices)),
            Violation::IndicesNotInteger {
                data_type: Some(DataType::Float)
            }
        );

        let mut missing = sparse(vec![0, 0], 1, 1);
        missing.values = None;
        assert_eq!(
            violation(validate_sparse_tensor(&missing)),
            Violation::MissingSparseComponent { component: "values" }
        );

        let mut wide = sparse(vec![0, 0], 1, 1);
        wide.dims = vec![4, 4, 4];
        assert_eq!(
            violation(validate_sparse_tensor(&wide)),
            Violation::IndexWidthMismatch { width: 2, rank: 3 }
        );
    }

    #[test]
    fn test_tensor_accumulate_collects_all() {
        let tensor = TensorBuilder::new(DataType::Int8, [3]).int32s([300, 0]).build();

        let fail_fast = validate_tensor_with_options(&tensor, ValidateOptions::new()).unwrap_err();
        assert_eq!(fail_fast.len(), 1);

        let all = validate_tensor_with_options(&tensor, ValidateOptions::accumulate()).unwrap_err();
        let violations: Vec<_> = all.iter().map(|e| e.violation.clone()).collect();
        assert_eq!(
            violations,
            vec![
                Violation::ValueOutOfRange {
                    index: 0,
                    value: 300,
                    data_type: DataType::Int8,
                },
                Violation::ElementCountMismatch {
                    expected: 3,
                    actual: 2
                },
            ]
        );
        assert_eq!(fail_fast[0], all[0]);
        assert_eq!(all[0].path.to_string(), "tensor.int32_data[0]");
    }

    #[test]
    fn test_sparse_accumulate_collects_all() {
        let mut tensor = sparse(vec![0, 0], 1, 1);
        tensor.dims = vec![-1, 4];
        if let Some(values) = tensor.values.as_mut() {
            values.float_data.clear();
        }

        let options = ValidateOptions::accumulate();
        let all = validate_sparse_tensor_with_options(&tensor, options).unwrap_err();
        let paths: Vec<_> = all.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["sparse_tensor.dims[0]", "sparse_tensor.values"]);
        assert_eq!(
            all[1].violation,
            Violation::ElementCountMismatch {
                expected: 1,
                actual: 0
            }
        );

        let fail_fast =
            validate_sparse_tensor_with_options(&tensor, ValidateOptions::new()).unwrap_err();
        assert_eq!(fail_fast, vec![all[0].clone()]);
    }
}
