use crate::{Codec, CodecError, CodecRef, JsonReader, JsonWriter, Registry};

/// Adapts a codec for `T` to `Option<T>`, with `None` as JSON null.
pub struct NullableCodec<T> {
    inner: CodecRef<T>,
}

impl<T> NullableCodec<T> {
    pub fn new(inner: CodecRef<T>) -> Self {
        Self { inner }
    }
}

impl<T: 'static> Codec<Option<T>> for NullableCodec<T> {
    fn encode(
        &self,
        value: &Option<T>,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        match value {
            Some(inner) => self.inner.encode(inner, writer, registry),
            None => {
                writer.write_null();
                Ok(())
            }
        }
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<Option<T>, CodecError> {
        if reader.read_is_null()? {
            return Ok(None);
        }
        self.inner.decode(reader, registry).map(Some)
    }
}
