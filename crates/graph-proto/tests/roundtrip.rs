//! Property tests: every encodable tree decodes back to itself.

use graph_proto::codec::{
    decode_artifact, decode_graph, decode_graph_stream, decode_sparse_tensor, decode_tensor,
    encode_graph, encode_graph_compressed, encode_graph_stream, encode_sparse_tensor,
    encode_tensor, WireType, Writer,
};
use graph_proto::{
    AttributeProto, AttributeValue, DataType, GraphProto, NodeProto, Segment, SparseTensorProto,
    TensorProto, UnknownField, UnknownFields,
};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn finite_f32() -> impl Strategy<Value = f32> {
    -1.0e6f32..1.0e6f32
}

/// Unknown fields with numbers no message in this format declares.
fn unknown_fields() -> impl Strategy<Value = UnknownFields> {
    let field = prop_oneof![
        (100u32..1000, any::<i64>()).prop_map(|(number, value)| {
            let mut writer = Writer::new();
            writer.write_varint_field(number, value);
            UnknownField {
                number,
                wire_type: WireType::Varint,
                raw: writer.into_bytes(),
            }
        }),
        (100u32..1000, prop::collection::vec(any::<u8>(), 0..8)).prop_map(|(number, bytes)| {
            let mut writer = Writer::new();
            writer.write_bytes_field(number, &bytes);
            UnknownField {
                number,
                wire_type: WireType::LengthDelimited,
                raw: writer.into_bytes(),
            }
        }),
    ];
    prop::collection::vec(field, 0..3).prop_map(UnknownFields::from_iter)
}

fn segment() -> impl Strategy<Value = Segment> {
    (
        prop::option::of(0i64..1000),
        prop::option::of(0i64..1000),
        unknown_fields(),
    )
        .prop_map(|(begin, end, unknown_fields)| Segment {
            begin,
            end,
            unknown_fields,
        })
}

/// Element type plus float, int32, int64, and string payloads.
type TensorData = (DataType, Vec<f32>, Vec<i32>, Vec<i64>, Vec<Vec<u8>>);

fn tensor() -> impl Strategy<Value = TensorProto> {
    let data = prop_oneof![
        prop::collection::vec(finite_f32(), 0..6).prop_map(|v| -> TensorData {
            (DataType::Float, v, Vec::new(), Vec::new(), Vec::new())
        }),
        prop::collection::vec(any::<i32>(), 0..6).prop_map(|v| -> TensorData {
            (DataType::Int32, Vec::new(), v, Vec::new(), Vec::new())
        }),
        prop::collection::vec(any::<i64>(), 0..6).prop_map(|v| -> TensorData {
            (DataType::Int64, Vec::new(), Vec::new(), v, Vec::new())
        }),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..4).prop_map(
            |v| -> TensorData { (DataType::String, Vec::new(), Vec::new(), Vec::new(), v) }
        ),
    ];
    (
        prop::collection::vec(0i64..5, 0..3),
        data,
        prop::option::of(segment()),
        prop::option::of(name()),
        prop::option::of(prop::collection::vec(any::<u8>(), 0..8)),
        unknown_fields(),
    )
        .prop_map(|(dims, data, segment, name, raw_data, unknown_fields)| {
            let (data_type, float_data, int32_data, int64_data, string_data) = data;
            TensorProto {
                dims,
                data_type: Some(data_type),
                segment,
                float_data,
                int32_data,
                string_data,
                int64_data,
                name,
                raw_data,
                unknown_fields,
            }
        })
}

/// Attribute values without graphs; lists are never empty, since an empty
/// list cannot be encoded.
fn leaf_value() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        finite_f32().prop_map(AttributeValue::Float),
        any::<i64>().prop_map(AttributeValue::Int),
        prop::collection::vec(any::<u8>(), 0..6).prop_map(AttributeValue::String),
        tensor().prop_map(AttributeValue::Tensor),
        prop::collection::vec(finite_f32(), 1..5).prop_map(AttributeValue::Floats),
        prop::collection::vec(any::<i64>(), 1..5).prop_map(AttributeValue::Ints),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 1..4)
            .prop_map(AttributeValue::Strings),
        prop::collection::vec(tensor(), 1..3).prop_map(AttributeValue::Tensors),
    ]
}

fn attribute(
    value: impl Strategy<Value = AttributeValue>,
) -> impl Strategy<Value = AttributeProto> {
    (prop::option::of(name()), value, unknown_fields()).prop_map(
        |(name, value, unknown_fields)| AttributeProto {
            name,
            value: Some(value),
            unknown_fields,
        },
    )
}

fn node(value: impl Strategy<Value = AttributeValue>) -> impl Strategy<Value = NodeProto> {
    (
        prop::collection::vec(name(), 0..3),
        prop::collection::vec(name(), 0..3),
        prop::option::of(name()),
        prop::option::of(name()),
        prop::collection::vec(attribute(value), 0..3),
        prop::option::of(".{0,12}"),
        unknown_fields(),
    )
        .prop_map(
            |(input, output, name, op_type, attribute, doc_string, unknown_fields)| NodeProto {
                input,
                output,
                name,
                op_type,
                attribute,
                doc_string,
                unknown_fields,
            },
        )
}

fn graph_with(
    nodes: impl Strategy<Value = NodeProto>,
) -> impl Strategy<Value = GraphProto> {
    (
        (
            prop::collection::vec(nodes, 0..4),
            prop::option::of(name()),
            prop::collection::vec(name(), 0..3),
            prop::collection::vec(name(), 0..3),
            prop::collection::vec(tensor(), 0..2),
        ),
        (
            prop::option::of(any::<i64>()),
            prop::option::of(any::<i64>()),
            prop::option::of(name()),
            prop::option::of("[a-z]{1,6}(\\.[a-z]{1,6}){0,2}"),
            prop::option::of(".{0,12}"),
            unknown_fields(),
        ),
    )
        .prop_map(
            |(
                (node, name, input, output, initializer),
                (ir_version, producer_version, producer_tag, domain, doc_string, unknown_fields),
            )| GraphProto {
                node,
                name,
                input,
                output,
                initializer,
                ir_version,
                producer_version,
                producer_tag,
                domain,
                doc_string,
                unknown_fields,
            },
        )
}

/// Graphs whose attributes may themselves carry one level of graphs.
fn graph() -> impl Strategy<Value = GraphProto> {
    let inner = graph_with(node(leaf_value())).boxed();
    let value = prop_oneof![
        4 => leaf_value(),
        1 => inner.clone().prop_map(AttributeValue::Graph),
        1 => prop::collection::vec(inner, 1..3).prop_map(AttributeValue::Graphs),
    ];
    graph_with(node(value))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tensor_roundtrip(tensor in tensor()) {
        let decoded = decode_tensor(&encode_tensor(&tensor)).unwrap();
        prop_assert_eq!(decoded, tensor);
    }

    #[test]
    fn prop_sparse_tensor_roundtrip(
        dims in prop::collection::vec(0i64..10, 0..3),
        indices in prop::option::of(tensor()),
        values in prop::option::of(tensor()),
        unknown_fields in unknown_fields(),
    ) {
        let sparse = SparseTensorProto { dims, indices, values, unknown_fields };
        let decoded = decode_sparse_tensor(&encode_sparse_tensor(&sparse)).unwrap();
        prop_assert_eq!(decoded, sparse);
    }

    #[test]
    fn prop_graph_roundtrip(graph in graph()) {
        let bytes = encode_graph(&graph).unwrap();
        let decoded = decode_graph(&bytes).unwrap();
        prop_assert_eq!(&decoded, &graph);

        // Re-encoding a decoded tree reproduces the original bytes.
        prop_assert_eq!(encode_graph(&decoded).unwrap(), bytes);
    }

    #[test]
    fn prop_stream_roundtrip(graphs in prop::collection::vec(graph(), 0..3)) {
        let bytes = encode_graph_stream(&graphs).unwrap();
        prop_assert_eq!(decode_graph_stream(&bytes).unwrap(), graphs);
    }

    #[test]
    fn prop_compressed_roundtrip(graph in graph(), level in 1i32..6) {
        let bytes = encode_graph_compressed(&graph, level).unwrap();
        prop_assert_eq!(decode_artifact(&bytes).unwrap(), graph);
    }

    #[test]
    fn prop_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_graph(&bytes);
        let _ = decode_tensor(&bytes);
        let _ = decode_graph_stream(&bytes);
    }
}
