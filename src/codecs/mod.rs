//! Concrete codecs.
//!
//! Fixed codecs (scalars, strings, bytes, [`Dynamic`](crate::Dynamic)) are
//! unit structs. Everything else is parameterized by the codecs of its type
//! arguments and is built by a template once those have been resolved.

pub mod array;
pub mod bytes;
#[cfg(feature = "deferred")]
pub mod deferred;
pub mod dynamic;
pub mod keyvalue;
pub mod map;
pub mod nullable;
pub mod primitive;
pub mod segment;
pub mod sequence;
pub mod stack;
pub mod tuple;

pub use array::{ArrayCodec, NdArrayCodec};
pub use bytes::{ByteArrayCodec, ByteSegmentCodec};
#[cfg(feature = "deferred")]
pub use deferred::DeferredCodec;
pub use dynamic::{DynamicCodec, UntypedListCodec, UntypedMapCodec};
pub use keyvalue::KeyValueCodec;
pub use map::{DictionaryCodec, MapCodec};
pub use nullable::NullableCodec;
pub use primitive::{
    BoolCodec, CharCodec, F32Codec, F64Codec, I16Codec, I32Codec, I64Codec, I8Codec, StringCodec,
    U16Codec, U32Codec, U64Codec, U8Codec,
};
pub use segment::SegmentCodec;
pub use sequence::{CollectionCodec, SequenceCodec};
pub use stack::StackCodec;
pub use tuple::{
    Tuple1Codec, Tuple2Codec, Tuple3Codec, Tuple4Codec, Tuple5Codec, Tuple6Codec, Tuple7Codec,
    Tuple8Codec,
};
