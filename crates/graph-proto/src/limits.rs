//! Limits applied while decoding untrusted input.

/// Maximum encoded width of a 64-bit varint.
pub const MAX_VARINT_BYTES: usize = 10;

/// Default maximum nesting depth of messages (graph -> node -> attribute -> graph ...).
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum size of a single encoded artifact (1 GiB).
pub const DEFAULT_MAX_INPUT_LEN: usize = 1 << 30;

/// Largest field number the tag grammar allows (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Magic bytes opening a zstd frame.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
