use std::any::type_name;

use super::sequence::{read_items, write_items};
use crate::{Codec, CodecError, CodecRef, JsonReader, JsonWriter, Registry, Stack};

/// Encodes top first, so the first element read back is pushed last.
pub struct StackCodec<T> {
    element: CodecRef<T>,
}

impl<T> StackCodec<T> {
    pub fn new(element: CodecRef<T>) -> Self {
        Self { element }
    }
}

impl<T: 'static> Codec<Stack<T>> for StackCodec<T> {
    fn encode(
        &self,
        value: &Stack<T>,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        write_items(value.iter().rev(), self.element.as_ref(), writer, registry)
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<Stack<T>, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<Stack<T>>(),
            });
        }
        let mut items = Vec::new();
        read_items(reader, self.element.as_ref(), registry, |item| items.push(item))?;
        Ok(items.into_iter().rev().collect())
    }
}
