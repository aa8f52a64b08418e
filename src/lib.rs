//! Codex: type-directed codec resolution
//!
//! Given a Rust type, codex finds the codec that reads and writes it as JSON,
//! builds that codec (assembling it from the codecs of the type's parts when
//! the type is a container, tuple or wrapper), and caches it so every later
//! request for the same type is a lookup.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Registry                    │
//! │     TypeId -> OnceLock<codec | absent>      │
//! │                                             │
//! │  resolver  - builtin, generated, structural │
//! │  templates - assemble from argument codecs  │
//! │  codecs    - concrete encoders/decoders     │
//! │                                             │
//! ├─────────────────────────────────────────────┤
//! │      json - JsonReader / JsonWriter         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! let mut scores = BTreeMap::new();
//! scores.insert("ann".to_string(), vec![3u32, 5]);
//!
//! let bytes = codex::to_vec(&scores).unwrap();
//! assert_eq!(bytes, br#"{"ann":[3,5]}"#);
//!
//! let back: BTreeMap<String, Vec<u32>> = codex::from_slice(&bytes).unwrap();
//! assert_eq!(back, scores);
//! ```
//!
//! Records opt in with `#[derive(Record)]`; other types implement
//! [`Reflect`] to describe their shape.

pub mod codec;
pub mod codecs;
pub mod config;
pub mod descriptor;
pub mod dynamic;
pub mod error;
pub mod json;
pub mod lifecycle;
pub mod matcher;
mod reflect;
pub mod registry;
pub mod resolver;
pub mod templates;
pub mod types;

pub use codec::{downcast, erase, fixed, Codec, CodecRef, ErasedCodec};
pub use config::Limits;
pub use descriptor::{
    Capabilities, Definition, Factory, Instantiate, Reflect, Shape, Template, TypeDescriptor,
};
pub use dynamic::{Dynamic, TypedValue};
pub use error::{CodecError, ResolveError};
pub use json::{JsonReader, JsonWriter, Token};
pub use lifecycle::HostPhase;
pub use matcher::FieldMatcher;
pub use registry::{Registry, RegistryBuilder};
pub use resolver::Resolver;
pub use types::{Array2, Array3, Array4, KeyValue, NdArray, Segment, Stack};

#[cfg(feature = "derive")]
pub use codex_derive::Record;

/// Codec for `T` from the global registry.
pub fn get_codec<T: Reflect>() -> Result<Option<CodecRef<T>>, ResolveError> {
    Registry::global().get_codec::<T>()
}

/// Encodes `value` with the global registry.
pub fn to_vec<T: Reflect>(value: &T) -> Result<Vec<u8>, CodecError> {
    Registry::global().to_vec(value)
}

/// Decodes one `T` with the global registry.
pub fn from_slice<T: Reflect>(bytes: &[u8]) -> Result<T, CodecError> {
    Registry::global().from_slice(bytes)
}
