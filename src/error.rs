//! Error types
//!
//! Resolution and decoding fail in different ways: classification never
//! errors (an unsupported shape is simply "no codec"), while malformed input
//! and cyclic type graphs are fatal and surface to the caller.

use thiserror::Error;

/// Failure while resolving a codec for a type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Cyclic codec resolution for {type_name}")]
    Cycle { type_name: &'static str },

    #[error("Resolver produced a codec of the wrong type for {type_name}")]
    TypeMismatch { type_name: &'static str },
}

/// Failure while encoding or decoding a value.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unexpected token at offset {offset}: expected {expected}, got {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("Unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Invalid number at offset {offset}: {reason}")]
    InvalidNumber { offset: usize, reason: String },

    #[error("Invalid string at offset {offset}: {reason}")]
    InvalidString { offset: usize, reason: String },

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Cannot write non-finite float {0}")]
    NonFinite(f64),

    #[error("Null is not a valid {type_name}")]
    UnexpectedNull { type_name: &'static str },

    #[error("Missing field `{field}` in {type_name}")]
    MissingField {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("Map key of type {type_name} encodes to null")]
    NullMapKey { type_name: &'static str },

    #[error("Deferred handle {type_name} has no value to write")]
    UnsetHandle { type_name: &'static str },

    #[error("No codec registered for {type_name}")]
    NoCodec { type_name: &'static str },

    #[error("Nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("Input of {len} bytes exceeds limit of {limit}")]
    BufferTooLarge { len: usize, limit: usize },

    #[error("Sequence exceeds limit of {limit} elements")]
    SequenceTooLong { limit: usize },

    #[error("Array is not rectangular: dimension {dimension} expected {expected}, got {got}")]
    DimensionMismatch {
        dimension: usize,
        expected: usize,
        got: usize,
    },

    #[error("Trailing bytes after value at offset {offset}")]
    TrailingBytes { offset: usize },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl CodecError {
    pub(crate) fn unexpected(expected: &'static str, found: Option<u8>, offset: usize) -> Self {
        match found {
            Some(byte) => CodecError::UnexpectedToken {
                expected,
                found: char::from(byte).escape_default().to_string(),
                offset,
            },
            None => CodecError::UnexpectedEof { offset },
        }
    }
}
