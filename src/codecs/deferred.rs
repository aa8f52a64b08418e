use std::any::type_name;
use std::sync::OnceLock;

use crate::{Codec, CodecError, CodecRef, JsonReader, JsonWriter, Registry};

/// A deferred handle is written as its value. Only a set handle can be
/// written, and `null` never decodes into one; absence belongs to an
/// enclosing `Option`.
pub struct DeferredCodec<T> {
    inner: CodecRef<T>,
}

impl<T> DeferredCodec<T> {
    pub fn new(inner: CodecRef<T>) -> Self {
        Self { inner }
    }
}

impl<T: 'static> Codec<OnceLock<T>> for DeferredCodec<T> {
    fn encode(
        &self,
        value: &OnceLock<T>,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        let inner = value.get().ok_or(CodecError::UnsetHandle {
            type_name: type_name::<OnceLock<T>>(),
        })?;
        self.inner.encode(inner, writer, registry)
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<OnceLock<T>, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<OnceLock<T>>(),
            });
        }
        self.inner.decode(reader, registry).map(OnceLock::from)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::codecs::primitive::StringCodec;

    #[test]
    fn set_handle_is_its_value() {
        let registry = Registry::builder().build();
        let codec = DeferredCodec::<String>::new(Arc::new(StringCodec));
        let mut writer = JsonWriter::new();
        codec
            .encode(&OnceLock::from("ready".to_string()), &mut writer, &registry)
            .unwrap();
        assert_eq!(writer.as_bytes(), br#""ready""#);

        let handle = codec
            .decode(&mut JsonReader::new(writer.as_bytes()), &registry)
            .unwrap();
        assert_eq!(handle.get().map(String::as_str), Some("ready"));
    }

    #[test]
    fn unset_handle_and_null_are_rejected() {
        let registry = Registry::builder().build();
        let codec = DeferredCodec::<String>::new(Arc::new(StringCodec));
        let mut writer = JsonWriter::new();
        assert!(matches!(
            codec.encode(&OnceLock::new(), &mut writer, &registry),
            Err(CodecError::UnsetHandle { .. })
        ));
        assert!(matches!(
            codec.decode(&mut JsonReader::new(b"null"), &registry),
            Err(CodecError::UnexpectedNull { .. })
        ));
    }
}
