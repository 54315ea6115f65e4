//! Artifact framing: multi-graph streams and zstd-compressed graphs.
//!
//! A stream is a sequence of `varint(len) || GraphProto bytes` frames with
//! no header. A compressed artifact is a single zstd frame wrapping the
//! uncompressed bytes of one graph. [`decode_artifact`] tells the two plain
//! and compressed forms apart by the zstd magic; a GraphProto can never
//! start with `0x28`, since that tag would be field 5 with varint wire type
//! where the initializer field is length-delimited.

use std::io::Read;

use log::debug;

use crate::codec::DecodeOptions;
use crate::codec::graph::{decode_graph_message, encode_graph};
use crate::codec::primitives::{Reader, Writer};
use crate::error::{EncodeError, MalformedWireError};
use crate::limits::ZSTD_MAGIC;
use crate::model::GraphProto;

// =============================================================================
// STREAMS
// =============================================================================

/// Encodes graphs as a length-prefixed stream.
pub fn encode_graph_stream(graphs: &[GraphProto]) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new();
    for graph in graphs {
        let bytes = encode_graph(graph)?;
        writer.write_bytes_prefixed(&bytes);
    }
    Ok(writer.into_bytes())
}

/// Decodes a length-prefixed stream of graphs.
///
/// An empty input is an empty stream.
pub fn decode_graph_stream(input: &[u8]) -> Result<Vec<GraphProto>, MalformedWireError> {
    decode_graph_stream_with_options(input, DecodeOptions::default())
}

/// Decodes a length-prefixed stream of graphs with the given limits.
///
/// `max_input_len` bounds the whole stream.
pub fn decode_graph_stream_with_options(
    input: &[u8],
    options: DecodeOptions,
) -> Result<Vec<GraphProto>, MalformedWireError> {
    options.check_input_len(input)?;
    let mut reader = Reader::new(input);
    let mut graphs = Vec::new();
    while !reader.is_empty() {
        let frame = reader.read_length_delimited("graph frame")?;
        graphs.push(decode_graph_message(frame, None, options.depth())?);
    }
    debug!("decoded stream of {} graphs from {} bytes", graphs.len(), input.len());
    Ok(graphs)
}

// =============================================================================
// COMPRESSION
// =============================================================================

/// Encodes a graph and compresses it into a single zstd frame.
pub fn encode_graph_compressed(graph: &GraphProto, level: i32) -> Result<Vec<u8>, EncodeError> {
    let uncompressed = encode_graph(graph)?;
    let compressed = zstd::encode_all(uncompressed.as_slice(), level)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;
    debug!(
        "compressed graph from {} to {} bytes (level {level})",
        uncompressed.len(),
        compressed.len()
    );
    Ok(compressed)
}

/// Decompresses a zstd artifact, returning the uncompressed graph bytes.
///
/// Output beyond the default `max_input_len` is rejected without being
/// buffered.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, MalformedWireError> {
    decompress_with_options(input, DecodeOptions::default())
}

/// Decompresses a zstd artifact, bounding the output by `max_input_len`.
pub fn decompress_with_options(
    input: &[u8],
    options: DecodeOptions,
) -> Result<Vec<u8>, MalformedWireError> {
    if !is_compressed(input) {
        return Err(MalformedWireError::DecompressionFailed(
            "missing zstd frame magic".to_string(),
        ));
    }
    let decoder = zstd::Decoder::new(input)
        .map_err(|e| MalformedWireError::DecompressionFailed(e.to_string()))?;

    let limit = options.max_input_len;
    let mut decompressed = Vec::new();
    decoder
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut decompressed)
        .map_err(|e| MalformedWireError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() > limit {
        return Err(MalformedWireError::InputTooLarge {
            len: decompressed.len(),
            max: limit,
        });
    }
    Ok(decompressed)
}

/// Decodes a single graph artifact, plain or zstd-compressed.
pub fn decode_artifact(input: &[u8]) -> Result<GraphProto, MalformedWireError> {
    decode_artifact_with_options(input, DecodeOptions::default())
}

/// Decodes a single graph artifact, plain or zstd-compressed, with the
/// given limits. The limit applies to the decompressed bytes.
pub fn decode_artifact_with_options(
    input: &[u8],
    options: DecodeOptions,
) -> Result<GraphProto, MalformedWireError> {
    if is_compressed(input) {
        let decompressed = decompress_with_options(input, options)?;
        crate::codec::graph::decode_graph_with_options(&decompressed, options)
    } else {
        crate::codec::graph::decode_graph_with_options(input, options)
    }
}

/// Returns true if the input opens with a zstd frame.
pub fn is_compressed(input: &[u8]) -> bool {
    input.starts_with(&ZSTD_MAGIC)
}
