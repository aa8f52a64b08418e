use std::any::type_name;

use crate::{Codec, CodecError, CodecRef, FieldMatcher, JsonReader, JsonWriter, KeyValue, Registry};

const FIELDS: [&str; 2] = ["Key", "Value"];

/// `{"Key": .., "Value": ..}`. Both members are required; others are skipped.
pub struct KeyValueCodec<K, V> {
    key: CodecRef<K>,
    value: CodecRef<V>,
    matcher: FieldMatcher,
}

impl<K, V> KeyValueCodec<K, V> {
    pub fn new(key: CodecRef<K>, value: CodecRef<V>) -> Self {
        Self {
            key,
            value,
            matcher: FieldMatcher::new(&FIELDS),
        }
    }
}

impl<K: 'static, V: 'static> Codec<KeyValue<K, V>> for KeyValueCodec<K, V> {
    fn encode(
        &self,
        pair: &KeyValue<K, V>,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        writer.write_begin_object();
        writer.write_property_name(FIELDS[0]);
        self.key.encode(&pair.key, writer, registry)?;
        writer.write_value_separator();
        writer.write_property_name(FIELDS[1]);
        self.value.encode(&pair.value, writer, registry)?;
        writer.write_end_object();
        Ok(())
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<KeyValue<K, V>, CodecError> {
        let type_name = type_name::<KeyValue<K, V>>();
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull { type_name });
        }
        let mut key = None;
        let mut value = None;
        reader.read_is_begin_object_with_verify()?;
        let mut count = 0;
        while !reader.read_is_end_object_with_skip_value_separator(&mut count)? {
            let name = reader.read_property_name_raw()?;
            match self.matcher.try_get(&name) {
                Some(0) => key = Some(self.key.decode(reader, registry)?),
                Some(1) => value = Some(self.value.decode(reader, registry)?),
                _ => reader.read_next_block()?,
            }
        }
        let missing = |field| CodecError::MissingField { type_name, field };
        Ok(KeyValue {
            key: key.ok_or_else(|| missing(FIELDS[0]))?,
            value: value.ok_or_else(|| missing(FIELDS[1]))?,
        })
    }
}
