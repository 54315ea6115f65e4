//! Binary encoding/decoding for graph artifacts.
//!
//! Decoding checks only the wire grammar. Semantic rules live in
//! [`crate::validate`].

pub mod artifact;
pub(crate) mod field;
pub mod graph;
pub mod primitives;
pub mod tensor;

pub use artifact::{
    decode_artifact, decode_artifact_with_options, decode_graph_stream,
    decode_graph_stream_with_options, decompress, decompress_with_options,
    encode_graph_compressed, encode_graph_stream, is_compressed,
};
pub use graph::{
    decode_attribute, decode_graph, decode_graph_with_options, decode_node, encode_attribute,
    encode_graph, encode_node,
};
pub use primitives::{Reader, WireType, Writer};
pub use tensor::{
    decode_sparse_tensor, decode_sparse_tensor_with_options, decode_tensor,
    decode_tensor_with_options, encode_sparse_tensor, encode_tensor,
};

use crate::error::MalformedWireError;
use crate::limits::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_LEN};
use primitives::Depth;

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting of messages and groups.
    pub max_depth: usize,
    /// Maximum length of the input, or of the decompressed bytes for
    /// compressed artifacts.
    pub max_input_len: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }

    pub(crate) fn check_input_len(&self, input: &[u8]) -> Result<(), MalformedWireError> {
        if input.len() > self.max_input_len {
            return Err(MalformedWireError::InputTooLarge {
                len: input.len(),
                max: self.max_input_len,
            });
        }
        Ok(())
    }

    pub(crate) fn depth(&self) -> Depth {
        Depth::new(self.max_depth)
    }
}
