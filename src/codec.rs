//! The codec contract and its type-erased handle.

use std::any::Any;
use std::sync::Arc;

use crate::{CodecError, JsonReader, JsonWriter, Registry};

/// Encoder/decoder pair for exactly one type.
///
/// Codecs are immutable once built and shared between threads. The registry
/// is passed through so codecs can look up codecs for nested values lazily.
pub trait Codec<T>: Send + Sync {
    fn encode(
        &self,
        value: &T,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError>;

    fn decode(&self, reader: &mut JsonReader<'_>, registry: &Registry) -> Result<T, CodecError>;
}

/// Shared handle to a codec for `T`.
pub type CodecRef<T> = Arc<dyn Codec<T>>;

/// A `CodecRef<T>` with `T` erased, as stored in the registry cache.
pub type ErasedCodec = Arc<dyn Any + Send + Sync>;

pub fn erase<T: 'static>(codec: CodecRef<T>) -> ErasedCodec {
    Arc::new(codec)
}

/// Erases a fresh instance of a stateless codec.
pub fn fixed<T: 'static, C: Codec<T> + Default + 'static>() -> ErasedCodec {
    erase::<T>(Arc::new(C::default()))
}

/// Recovers the typed handle; `None` if `erased` holds a codec for another type.
pub fn downcast<T: 'static>(erased: &ErasedCodec) -> Option<CodecRef<T>> {
    erased.downcast_ref::<CodecRef<T>>().cloned()
}
