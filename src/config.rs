//! Decoder limits

/// Bounds applied by [`JsonReader`](crate::JsonReader) while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Largest input accepted by a top-level decode.
    pub max_buffer_size: usize,
    /// Deepest nesting of objects and arrays.
    pub max_depth: usize,
    /// Most elements read into a single sequence, set or map.
    pub max_sequence_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_buffer_size: 16 * 1024 * 1024,
            max_depth: 128,
            max_sequence_len: 1_000_000,
        }
    }
}

impl Limits {
    /// Limits that only guard against runaway recursion.
    pub fn unbounded() -> Self {
        Self {
            max_buffer_size: usize::MAX,
            max_depth: 1024,
            max_sequence_len: usize::MAX,
        }
    }
}
