//! JSON byte-stream primitives used by every codec.

mod reader;
mod writer;

pub use reader::{JsonReader, Token};
pub use writer::JsonWriter;
