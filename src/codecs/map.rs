//! Map codecs.
//!
//! Maps are JSON objects. Keys go through the key type's own codec: a key
//! that encodes to a JSON string is used as the property name as-is, any
//! other encoding is wrapped in a string. On the way back the property name
//! is first offered to the key codec as a string and then as bare JSON, so
//! `{"7": ..}` reads back into an integer-keyed map. A key that encodes to
//! `null` has no property name and fails the encode.

use std::any::type_name;
use std::marker::PhantomData;

use crate::{Codec, CodecError, CodecRef, JsonReader, JsonWriter, Registry};

fn write_key<K>(
    key: &K,
    codec: &dyn Codec<K>,
    writer: &mut JsonWriter,
    registry: &Registry,
) -> Result<(), CodecError> {
    let mut scratch = JsonWriter::new();
    codec.encode(key, &mut scratch, registry)?;
    let encoded = scratch.as_bytes();
    if encoded == b"null" {
        return Err(CodecError::NullMapKey {
            type_name: type_name::<K>(),
        });
    }
    if encoded.first() == Some(&b'"') {
        writer.write_raw(encoded);
    } else {
        let text = std::str::from_utf8(encoded).map_err(|e| CodecError::InvalidString {
            offset: e.valid_up_to(),
            reason: e.to_string(),
        })?;
        writer.write_string(text);
    }
    writer.write_name_separator();
    Ok(())
}

fn read_key<K>(
    reader: &mut JsonReader<'_>,
    codec: &dyn Codec<K>,
    registry: &Registry,
) -> Result<K, CodecError> {
    let limits = *reader.limits();
    let name = reader.read_property_name()?;
    let decode_all = |bytes: &[u8]| {
        let mut key_reader = JsonReader::with_limits(bytes, limits);
        let key = codec.decode(&mut key_reader, registry)?;
        key_reader.finish()?;
        Ok::<K, CodecError>(key)
    };

    let mut quoted = JsonWriter::with_capacity(name.len() + 2);
    quoted.write_string(&name);
    match decode_all(quoted.as_bytes()) {
        Ok(key) => Ok(key),
        Err(_) => decode_all(name.as_bytes()),
    }
}

fn write_entries<'a, K: 'a, V: 'a>(
    entries: impl IntoIterator<Item = (&'a K, &'a V)>,
    key: &dyn Codec<K>,
    value: &dyn Codec<V>,
    writer: &mut JsonWriter,
    registry: &Registry,
) -> Result<(), CodecError> {
    writer.write_begin_object();
    for (i, (k, v)) in entries.into_iter().enumerate() {
        if i != 0 {
            writer.write_value_separator();
        }
        write_key(k, key, writer, registry)?;
        value.encode(v, writer, registry)?;
    }
    writer.write_end_object();
    Ok(())
}

fn read_entries<K, V>(
    reader: &mut JsonReader<'_>,
    key: &dyn Codec<K>,
    value: &dyn Codec<V>,
    registry: &Registry,
    mut insert: impl FnMut(K, V),
) -> Result<(), CodecError> {
    reader.read_is_begin_object_with_verify()?;
    let mut count = 0;
    while !reader.read_is_end_object_with_skip_value_separator(&mut count)? {
        let k = read_key(reader, key, registry)?;
        let v = value.decode(reader, registry)?;
        insert(k, v);
    }
    Ok(())
}

/// Builds the map from an iterator of entries.
pub struct MapCodec<M, K, V> {
    key: CodecRef<K>,
    value: CodecRef<V>,
    _map: PhantomData<fn() -> M>,
}

impl<M, K, V> MapCodec<M, K, V> {
    pub fn new(key: CodecRef<K>, value: CodecRef<V>) -> Self {
        Self {
            key,
            value,
            _map: PhantomData,
        }
    }
}

impl<M, K, V> Codec<M> for MapCodec<M, K, V>
where
    M: FromIterator<(K, V)> + 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
    K: 'static,
    V: 'static,
{
    fn encode(
        &self,
        map: &M,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        write_entries(map, self.key.as_ref(), self.value.as_ref(), writer, registry)
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<M, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<M>(),
            });
        }
        let mut entries = Vec::new();
        read_entries(reader, self.key.as_ref(), self.value.as_ref(), registry, |k, v| {
            entries.push((k, v))
        })?;
        Ok(entries.into_iter().collect())
    }
}

/// Default-constructs the map and inserts entries one at a time.
pub struct DictionaryCodec<M, K, V> {
    key: CodecRef<K>,
    value: CodecRef<V>,
    _map: PhantomData<fn() -> M>,
}

impl<M, K, V> DictionaryCodec<M, K, V> {
    pub fn new(key: CodecRef<K>, value: CodecRef<V>) -> Self {
        Self {
            key,
            value,
            _map: PhantomData,
        }
    }
}

impl<M, K, V> Codec<M> for DictionaryCodec<M, K, V>
where
    M: Default + Extend<(K, V)> + 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
    K: 'static,
    V: 'static,
{
    fn encode(
        &self,
        map: &M,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        write_entries(map, self.key.as_ref(), self.value.as_ref(), writer, registry)
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<M, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<M>(),
            });
        }
        let mut map = M::default();
        read_entries(reader, self.key.as_ref(), self.value.as_ref(), registry, |k, v| {
            map.extend(std::iter::once((k, v)))
        })?;
        Ok(map)
    }
}
