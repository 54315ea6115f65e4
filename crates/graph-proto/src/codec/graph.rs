//! Graph, node, and attribute encoding/decoding.
//!
//! Field layout:
//! - AttributeProto: name=1, f=2, i=3, s=4, t=5, g=6, floats=7, ints=8,
//!   strings=9, tensors=10, graphs=11
//! - NodeProto: input=1, output=2, name=3, op_type=4, attribute=5, doc_string=6
//! - GraphProto: node=1, name=2, input=3, output=4, initializer=5,
//!   ir_version=6, producer_version=7, producer_tag=8, domain=9, doc_string=10
//!
//! Known fields are written in field-number order, followed by retained
//! unknown fields in the order they were read.

use std::mem;

use log::debug;

use crate::codec::DecodeOptions;
use crate::codec::field::{
    expect_wire_type, read_delimited, read_int64, read_repeated_floats, read_repeated_varints,
    read_string, skip_unknown,
};
use crate::codec::primitives::{Depth, Reader, WireType, Writer};
use crate::codec::tensor::{decode_tensor_message, write_tensor};
use crate::error::{ConstructionError, EncodeError, MalformedWireError};
use crate::model::{AttributeProto, AttributeValue, GraphProto, NodeProto};

const ATTRIBUTE: &str = "AttributeProto";
const ATTRIBUTE_NAME: u32 = 1;
const ATTRIBUTE_F: u32 = 2;
const ATTRIBUTE_I: u32 = 3;
const ATTRIBUTE_S: u32 = 4;
const ATTRIBUTE_T: u32 = 5;
const ATTRIBUTE_G: u32 = 6;
const ATTRIBUTE_FLOATS: u32 = 7;
const ATTRIBUTE_INTS: u32 = 8;
const ATTRIBUTE_STRINGS: u32 = 9;
const ATTRIBUTE_TENSORS: u32 = 10;
const ATTRIBUTE_GRAPHS: u32 = 11;

const NODE: &str = "NodeProto";
const NODE_INPUT: u32 = 1;
const NODE_OUTPUT: u32 = 2;
const NODE_NAME: u32 = 3;
const NODE_OP_TYPE: u32 = 4;
const NODE_ATTRIBUTE: u32 = 5;
const NODE_DOC_STRING: u32 = 6;

const GRAPH: &str = "GraphProto";
const GRAPH_NODE: u32 = 1;
const GRAPH_NAME: u32 = 2;
const GRAPH_INPUT: u32 = 3;
const GRAPH_OUTPUT: u32 = 4;
const GRAPH_INITIALIZER: u32 = 5;
const GRAPH_IR_VERSION: u32 = 6;
const GRAPH_PRODUCER_VERSION: u32 = 7;
const GRAPH_PRODUCER_TAG: u32 = 8;
const GRAPH_DOMAIN: u32 = 9;
const GRAPH_DOC_STRING: u32 = 10;

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a GraphProto artifact.
///
/// Only structure is checked here; run [`crate::validate::validate_graph`]
/// before handing the graph to a consumer.
pub fn decode_graph(input: &[u8]) -> Result<GraphProto, MalformedWireError> {
    decode_graph_with_options(input, DecodeOptions::default())
}

/// Decodes a GraphProto artifact with the given limits.
pub fn decode_graph_with_options(
    input: &[u8],
    options: DecodeOptions,
) -> Result<GraphProto, MalformedWireError> {
    options.check_input_len(input)?;
    let graph = decode_graph_message(input, None, options.depth())?;
    debug!(
        "decoded graph {:?}: {} nodes, {} initializers, {} bytes",
        graph.name,
        graph.node.len(),
        graph.initializer.len(),
        input.len()
    );
    Ok(graph)
}

/// Decodes a standalone NodeProto.
pub fn decode_node(input: &[u8]) -> Result<NodeProto, MalformedWireError> {
    let options = DecodeOptions::default();
    options.check_input_len(input)?;
    decode_node_message(input, options.depth())
}

/// Decodes a standalone AttributeProto.
pub fn decode_attribute(input: &[u8]) -> Result<AttributeProto, MalformedWireError> {
    let options = DecodeOptions::default();
    options.check_input_len(input)?;
    decode_attribute_message(input, options.depth())
}

/// Decodes a GraphProto, merging into a previous occurrence of the field.
pub(crate) fn decode_graph_message(
    data: &[u8],
    previous: Option<GraphProto>,
    depth: Depth,
) -> Result<GraphProto, MalformedWireError> {
    let depth = depth.descend()?;
    let mut reader = Reader::new(data);
    let mut graph = previous.unwrap_or_default();

    while !reader.is_empty() {
        let start = reader.position();
        let (number, wire_type) = reader.read_tag()?;
        match number {
            GRAPH_NODE => {
                let bytes = read_delimited(&mut reader, GRAPH, number, "node", wire_type)?;
                graph.node.push(decode_node_message(bytes, depth)?);
            }
            GRAPH_NAME => {
                graph.name = Some(read_string(&mut reader, GRAPH, number, "name", wire_type)?);
            }
            GRAPH_INPUT => {
                graph
                    .input
                    .push(read_string(&mut reader, GRAPH, number, "input", wire_type)?);
            }
            GRAPH_OUTPUT => {
                graph
                    .output
                    .push(read_string(&mut reader, GRAPH, number, "output", wire_type)?);
            }
            GRAPH_INITIALIZER => {
                let bytes = read_delimited(&mut reader, GRAPH, number, "initializer", wire_type)?;
                graph.initializer.push(decode_tensor_message(bytes, None, depth)?);
            }
            GRAPH_IR_VERSION => {
                graph.ir_version =
                    Some(read_int64(&mut reader, GRAPH, number, "ir_version", wire_type)?);
            }
            GRAPH_PRODUCER_VERSION => {
                graph.producer_version = Some(read_int64(
                    &mut reader,
                    GRAPH,
                    number,
                    "producer_version",
                    wire_type,
                )?);
            }
            GRAPH_PRODUCER_TAG => {
                graph.producer_tag = Some(read_string(
                    &mut reader,
                    GRAPH,
                    number,
                    "producer_tag",
                    wire_type,
                )?);
            }
            GRAPH_DOMAIN => {
                graph.domain = Some(read_string(&mut reader, GRAPH, number, "domain", wire_type)?);
            }
            GRAPH_DOC_STRING => {
                graph.doc_string = Some(read_string(
                    &mut reader,
                    GRAPH,
                    number,
                    "doc_string",
                    wire_type,
                )?);
            }
            _ => skip_unknown(
                &mut reader,
                GRAPH,
                start,
                number,
                wire_type,
                depth,
                &mut graph.unknown_fields,
            )?,
        }
    }

    Ok(graph)
}

fn decode_node_message(data: &[u8], depth: Depth) -> Result<NodeProto, MalformedWireError> {
    let depth = depth.descend()?;
    let mut reader = Reader::new(data);
    let mut node = NodeProto::default();

    while !reader.is_empty() {
        let start = reader.position();
        let (number, wire_type) = reader.read_tag()?;
        match number {
            NODE_INPUT => {
                node.input
                    .push(read_string(&mut reader, NODE, number, "input", wire_type)?);
            }
            NODE_OUTPUT => {
                node.output
                    .push(read_string(&mut reader, NODE, number, "output", wire_type)?);
            }
            NODE_NAME => {
                node.name = Some(read_string(&mut reader, NODE, number, "name", wire_type)?);
            }
            NODE_OP_TYPE => {
                node.op_type = Some(read_string(&mut reader, NODE, number, "op_type", wire_type)?);
            }
            NODE_ATTRIBUTE => {
                let bytes = read_delimited(&mut reader, NODE, number, "attribute", wire_type)?;
                node.attribute.push(decode_attribute_message(bytes, depth)?);
            }
            NODE_DOC_STRING => {
                node.doc_string =
                    Some(read_string(&mut reader, NODE, number, "doc_string", wire_type)?);
            }
            _ => skip_unknown(
                &mut reader,
                NODE,
                start,
                number,
                wire_type,
                depth,
                &mut node.unknown_fields,
            )?,
        }
    }

    Ok(node)
}

fn decode_attribute_message(
    data: &[u8],
    depth: Depth,
) -> Result<AttributeProto, MalformedWireError> {
    let depth = depth.descend()?;
    let mut reader = Reader::new(data);
    let mut attribute = AttributeProto::default();

    while !reader.is_empty() {
        let start = reader.position();
        let (number, wire_type) = reader.read_tag()?;
        let incoming = match number {
            ATTRIBUTE_NAME => {
                attribute.name =
                    Some(read_string(&mut reader, ATTRIBUTE, number, "name", wire_type)?);
                continue;
            }
            ATTRIBUTE_F => {
                expect_wire_type(ATTRIBUTE, number, wire_type, WireType::Fixed32)?;
                AttributeValue::Float(f32::from_bits(reader.read_fixed32("f")?))
            }
            ATTRIBUTE_I => {
                AttributeValue::Int(read_int64(&mut reader, ATTRIBUTE, number, "i", wire_type)?)
            }
            ATTRIBUTE_S => {
                let bytes = read_delimited(&mut reader, ATTRIBUTE, number, "s", wire_type)?;
                AttributeValue::String(bytes.to_vec())
            }
            ATTRIBUTE_T => {
                let bytes = read_delimited(&mut reader, ATTRIBUTE, number, "t", wire_type)?;
                let previous = match &mut attribute.value {
                    Some(AttributeValue::Tensor(tensor)) => Some(mem::take(tensor)),
                    _ => None,
                };
                AttributeValue::Tensor(decode_tensor_message(bytes, previous, depth)?)
            }
            ATTRIBUTE_G => {
                let bytes = read_delimited(&mut reader, ATTRIBUTE, number, "g", wire_type)?;
                let previous = match &mut attribute.value {
                    Some(AttributeValue::Graph(graph)) => Some(mem::take(graph)),
                    _ => None,
                };
                AttributeValue::Graph(decode_graph_message(bytes, previous, depth)?)
            }
            ATTRIBUTE_FLOATS => {
                let mut values = Vec::new();
                read_repeated_floats(
                    &mut reader,
                    ATTRIBUTE,
                    number,
                    "floats",
                    wire_type,
                    &mut values,
                )?;
                AttributeValue::Floats(values)
            }
            ATTRIBUTE_INTS => {
                let mut values = Vec::new();
                read_repeated_varints(
                    &mut reader,
                    ATTRIBUTE,
                    number,
                    "ints",
                    wire_type,
                    &mut values,
                    |v| v as i64,
                )?;
                AttributeValue::Ints(values)
            }
            ATTRIBUTE_STRINGS => {
                let bytes = read_delimited(&mut reader, ATTRIBUTE, number, "strings", wire_type)?;
                AttributeValue::Strings(vec![bytes.to_vec()])
            }
            ATTRIBUTE_TENSORS => {
                let bytes = read_delimited(&mut reader, ATTRIBUTE, number, "tensors", wire_type)?;
                AttributeValue::Tensors(vec![decode_tensor_message(bytes, None, depth)?])
            }
            ATTRIBUTE_GRAPHS => {
                let bytes = read_delimited(&mut reader, ATTRIBUTE, number, "graphs", wire_type)?;
                AttributeValue::Graphs(vec![decode_graph_message(bytes, None, depth)?])
            }
            _ => {
                skip_unknown(
                    &mut reader,
                    ATTRIBUTE,
                    start,
                    number,
                    wire_type,
                    depth,
                    &mut attribute.unknown_fields,
                )?;
                continue;
            }
        };
        merge_slot(&mut attribute.value, incoming)?;
    }

    Ok(attribute)
}

/// Folds one wire occurrence of a value slot into the attribute.
///
/// Repeated slots accumulate. A repeated scalar slot keeps the last value;
/// `t` and `g` arrive already merged with their earlier occurrence. A second
/// distinct populated slot is rejected.
fn merge_slot(
    current: &mut Option<AttributeValue>,
    incoming: AttributeValue,
) -> Result<(), MalformedWireError> {
    let Some(existing) = current else {
        *current = Some(incoming);
        return Ok(());
    };
    if existing.kind() != incoming.kind() {
        if !incoming.is_populated() {
            return Ok(());
        }
        if existing.is_populated() {
            return Err(MalformedWireError::ConflictingAttributeSlots {
                first: existing.kind(),
                second: incoming.kind(),
            });
        }
        *existing = incoming;
        return Ok(());
    }
    match (existing, incoming) {
        (AttributeValue::Floats(a), AttributeValue::Floats(b)) => a.extend(b),
        (AttributeValue::Ints(a), AttributeValue::Ints(b)) => a.extend(b),
        (AttributeValue::Strings(a), AttributeValue::Strings(b)) => a.extend(b),
        (AttributeValue::Tensors(a), AttributeValue::Tensors(b)) => a.extend(b),
        (AttributeValue::Graphs(a), AttributeValue::Graphs(b)) => a.extend(b),
        (slot, incoming) => *slot = incoming,
    }
    Ok(())
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a GraphProto artifact.
///
/// Fails if any attribute in the tree, including nested graphs, has no
/// populated value.
pub fn encode_graph(graph: &GraphProto) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::with_capacity(estimate_graph_size(graph));
    write_graph(&mut writer, graph)?;
    debug!(
        "encoded graph {:?}: {} nodes, {} bytes",
        graph.name,
        graph.node.len(),
        writer.len()
    );
    Ok(writer.into_bytes())
}

/// Encodes a standalone NodeProto.
pub fn encode_node(node: &NodeProto) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new();
    write_node(&mut writer, node)?;
    Ok(writer.into_bytes())
}

/// Encodes a standalone AttributeProto.
pub fn encode_attribute(attribute: &AttributeProto) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new();
    write_attribute(&mut writer, attribute)?;
    Ok(writer.into_bytes())
}

fn estimate_graph_size(graph: &GraphProto) -> usize {
    let raw: usize = graph
        .initializer
        .iter()
        .map(|t| {
            t.raw_data.as_ref().map_or(0, Vec::len)
                + t.float_data.len() * 4
                + t.int64_data.len() * 8
                + t.int32_data.len() * 4
        })
        .sum();
    256 + graph.node.len() * 64 + raw
}

fn write_graph(writer: &mut Writer, graph: &GraphProto) -> Result<(), ConstructionError> {
    for node in &graph.node {
        let mut inner = Writer::new();
        write_node(&mut inner, node)?;
        writer.write_bytes_field(GRAPH_NODE, inner.as_bytes());
    }
    if let Some(name) = &graph.name {
        writer.write_bytes_field(GRAPH_NAME, name.as_bytes());
    }
    for input in &graph.input {
        writer.write_bytes_field(GRAPH_INPUT, input.as_bytes());
    }
    for output in &graph.output {
        writer.write_bytes_field(GRAPH_OUTPUT, output.as_bytes());
    }
    for tensor in &graph.initializer {
        let mut inner = Writer::new();
        write_tensor(&mut inner, tensor);
        writer.write_bytes_field(GRAPH_INITIALIZER, inner.as_bytes());
    }
    if let Some(v) = graph.ir_version {
        writer.write_varint_field(GRAPH_IR_VERSION, v);
    }
    if let Some(v) = graph.producer_version {
        writer.write_varint_field(GRAPH_PRODUCER_VERSION, v);
    }
    if let Some(tag) = &graph.producer_tag {
        writer.write_bytes_field(GRAPH_PRODUCER_TAG, tag.as_bytes());
    }
    if let Some(domain) = &graph.domain {
        writer.write_bytes_field(GRAPH_DOMAIN, domain.as_bytes());
    }
    if let Some(doc) = &graph.doc_string {
        writer.write_bytes_field(GRAPH_DOC_STRING, doc.as_bytes());
    }
    graph.unknown_fields.write_to(writer);
    Ok(())
}

fn write_node(writer: &mut Writer, node: &NodeProto) -> Result<(), ConstructionError> {
    for input in &node.input {
        writer.write_bytes_field(NODE_INPUT, input.as_bytes());
    }
    for output in &node.output {
        writer.write_bytes_field(NODE_OUTPUT, output.as_bytes());
    }
    if let Some(name) = &node.name {
        writer.write_bytes_field(NODE_NAME, name.as_bytes());
    }
    if let Some(op_type) = &node.op_type {
        writer.write_bytes_field(NODE_OP_TYPE, op_type.as_bytes());
    }
    for attribute in &node.attribute {
        let mut inner = Writer::new();
        write_attribute(&mut inner, attribute)?;
        writer.write_bytes_field(NODE_ATTRIBUTE, inner.as_bytes());
    }
    if let Some(doc) = &node.doc_string {
        writer.write_bytes_field(NODE_DOC_STRING, doc.as_bytes());
    }
    node.unknown_fields.write_to(writer);
    Ok(())
}

fn write_attribute(
    writer: &mut Writer,
    attribute: &AttributeProto,
) -> Result<(), ConstructionError> {
    let value = attribute
        .value
        .as_ref()
        .filter(|v| v.is_populated())
        .ok_or_else(|| ConstructionError::EmptyAttribute {
            name: attribute.name.clone(),
        })?;

    if let Some(name) = &attribute.name {
        writer.write_bytes_field(ATTRIBUTE_NAME, name.as_bytes());
    }
    let number = value.kind().field_number();
    match value {
        AttributeValue::Float(f) => writer.write_float_field(number, *f),
        AttributeValue::Int(i) => writer.write_varint_field(number, *i),
        AttributeValue::String(s) => writer.write_bytes_field(number, s),
        AttributeValue::Tensor(t) => {
            let mut inner = Writer::new();
            write_tensor(&mut inner, t);
            writer.write_bytes_field(number, inner.as_bytes());
        }
        AttributeValue::Graph(g) => {
            let mut inner = Writer::new();
            write_graph(&mut inner, g)?;
            writer.write_bytes_field(number, inner.as_bytes());
        }
        AttributeValue::Floats(values) => writer.write_packed_floats(number, values),
        AttributeValue::Ints(values) => writer.write_packed_varints(number, values.iter().copied()),
        AttributeValue::Strings(values) => {
            for s in values {
                writer.write_bytes_field(number, s);
            }
        }
        AttributeValue::Tensors(values) => {
            for t in values {
                let mut inner = Writer::new();
                write_tensor(&mut inner, t);
                writer.write_bytes_field(number, inner.as_bytes());
            }
        }
        AttributeValue::Graphs(values) => {
            for g in values {
                let mut inner = Writer::new();
                write_graph(&mut inner, g)?;
                writer.write_bytes_field(number, inner.as_bytes());
            }
        }
    }
    attribute.unknown_fields.write_to(writer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::{GraphBuilder, TensorBuilder};
    use crate::model::{AttributeKind, DataType, TensorProto, UnknownFields};

    fn sample_graph() -> GraphProto {
        GraphBuilder::new("mlp")
            .input("x")
            .input("w")
            .initializer(
                TensorBuilder::new(DataType::Float, [2, 2])
                    .name("w")
                    .floats([1.0, 2.0, 3.0, 4.0])
                    .build(),
            )
            .node("MatMul", |n| n.name("mm").input("x").input("w").output("h"))
            .node("LeakyRelu", |n| {
                n.name("act")
                    .input("h")
                    .output("y")
                    .attr_float("alpha", 0.01)
                    .attr_ints("axes", vec![0, -1])
            })
            .output("y")
            .producer("graph-proto-tests", 1)
            .domain("org.example")
            .doc_string("two layer test graph")
            .build()
    }

    #[test]
    fn test_graph_roundtrip() {
        let graph = sample_graph();
        let encoded = encode_graph(&graph).unwrap();
        let decoded = decode_graph(&encoded).unwrap();
        assert_eq!(graph, decoded);
    }

    #[test]
    fn test_presence_survives_roundtrip() {
        let mut graph = GraphProto::default();
        graph.ir_version = Some(0);
        graph.doc_string = Some(String::new());

        let decoded = decode_graph(&encode_graph(&graph).unwrap()).unwrap();
        assert_eq!(decoded.ir_version, Some(0));
        assert_eq!(decoded.doc_string, Some(String::new()));
        assert_eq!(decoded.producer_version, None);
        assert_eq!(decoded.name, None);
    }

    #[test]
    fn test_nested_graph_attribute_roundtrip() {
        let body = GraphBuilder::new("body")
            .input("i")
            .node("Identity", |n| n.input("i").output("o"))
            .output("o")
            .build();
        let graph = GraphBuilder::new("outer")
            .input("c")
            .node("If", |n| n.input("c").output("r").attr_graph("then_branch", body))
            .output("r")
            .build();

        let decoded = decode_graph(&encode_graph(&graph).unwrap()).unwrap();
        assert_eq!(graph, decoded);
    }

    #[test]
    fn test_unknown_field_preserved_byte_exact() {
        // NodeProto { input: "x", op_type: "Relu", field 15: varint 7 }
        let bytes = vec![
            0x0A, 0x01, b'x', 0x22, 0x04, b'R', b'e', b'l', b'u', 0x78, 0x07,
        ];
        let node = decode_node(&bytes).unwrap();
        assert_eq!(node.unknown_fields.len(), 1);
        assert_eq!(node.unknown_fields.get(15).count(), 1);
        assert_eq!(encode_node(&node).unwrap(), bytes);
    }

    #[test]
    fn test_encode_empty_attribute_fails() {
        let mut graph = sample_graph();
        graph.node[1].attribute.push(AttributeProto {
            name: Some("empty".to_string()),
            value: None,
            unknown_fields: UnknownFields::new(),
        });
        assert_eq!(
            encode_graph(&graph),
            Err(EncodeError::Construction(ConstructionError::EmptyAttribute {
                name: Some("empty".to_string())
            }))
        );
    }

    #[test]
    fn test_decode_conflicting_slots_rejected() {
        let mut writer = Writer::new();
        writer.write_bytes_field(ATTRIBUTE_NAME, b"alpha");
        writer.write_float_field(ATTRIBUTE_F, 1.0);
        writer.write_varint_field(ATTRIBUTE_I, 2);

        assert_eq!(
            decode_attribute(writer.as_bytes()),
            Err(MalformedWireError::ConflictingAttributeSlots {
                first: AttributeKind::Float,
                second: AttributeKind::Int,
            })
        );
    }

    #[test]
    fn test_decode_repeated_list_occurrences_accumulate() {
        let mut writer = Writer::new();
        writer.write_bytes_field(ATTRIBUTE_STRINGS, b"a");
        writer.write_bytes_field(ATTRIBUTE_STRINGS, b"b");

        let attr = decode_attribute(writer.as_bytes()).unwrap();
        assert_eq!(
            attr.value,
            Some(AttributeValue::Strings(vec![b"a".to_vec(), b"b".to_vec()]))
        );
    }

    #[test]
    fn test_decode_singular_slot_last_wins() {
        let mut writer = Writer::new();
        writer.write_varint_field(ATTRIBUTE_I, 1);
        writer.write_varint_field(ATTRIBUTE_I, 5);

        let attr = decode_attribute(writer.as_bytes()).unwrap();
        assert_eq!(attr.as_int(), Some(5));
    }

    #[test]
    fn test_decode_repeated_tensor_slot_merges() {
        let shape_only = TensorProto {
            dims: vec![2],
            ..TensorProto::default()
        };
        let mut shape = Writer::new();
        write_tensor(&mut shape, &shape_only);
        let mut typed = Writer::new();
        write_tensor(&mut typed, &TensorProto::new(DataType::Float, [3]));

        let mut writer = Writer::new();
        writer.write_bytes_field(ATTRIBUTE_NAME, b"w");
        writer.write_bytes_field(ATTRIBUTE_T, shape.as_bytes());
        writer.write_bytes_field(ATTRIBUTE_T, typed.as_bytes());

        let attr = decode_attribute(writer.as_bytes()).unwrap();
        let tensor = attr.as_tensor().unwrap();
        assert_eq!(tensor.dims, vec![2, 3]);
        assert_eq!(tensor.data_type, Some(DataType::Float));
    }

    #[test]
    fn test_decode_repeated_graph_slot_merges() {
        let first = GraphBuilder::new("body").input("x").build();
        let second = GraphBuilder::new("loop_body")
            .input("y")
            .node("Identity", |n| n.input("x").output("z"))
            .build();

        let mut writer = Writer::new();
        writer.write_bytes_field(ATTRIBUTE_G, &encode_graph(&first).unwrap());
        writer.write_bytes_field(ATTRIBUTE_G, &encode_graph(&second).unwrap());

        let attr = decode_attribute(writer.as_bytes()).unwrap();
        let graph = attr.as_graph().unwrap();
        assert_eq!(graph.name.as_deref(), Some("loop_body"));
        assert_eq!(graph.input, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(graph.node.len(), 1);
    }

    #[test]
    fn test_nesting_depth_limit() {
        let mut graph = GraphBuilder::new("g0").build();
        for i in 1..6 {
            graph = GraphBuilder::new(format!("g{i}"))
                .node("Loop", |n| n.attr_graph("body", graph))
                .build();
        }
        let encoded = encode_graph(&graph).unwrap();

        let shallow = DecodeOptions::new().with_max_depth(4);
        assert!(matches!(
            decode_graph_with_options(&encoded, shallow),
            Err(MalformedWireError::NestingTooDeep { max: 4 })
        ));
        assert_eq!(decode_graph(&encoded).unwrap(), graph);
    }

    #[test]
    fn test_input_too_large() {
        let encoded = encode_graph(&sample_graph()).unwrap();
        let tiny = DecodeOptions::new().with_max_input_len(8);
        assert!(matches!(
            decode_graph_with_options(&encoded, tiny),
            Err(MalformedWireError::InputTooLarge { max: 8, .. })
        ));
    }

    #[test]
    fn test_truncated_graph() {
        let encoded = encode_graph(&sample_graph()).unwrap();
        let result = decode_graph(&encoded[..encoded.len() - 3]);
        assert!(result.is_err());
    }
}
