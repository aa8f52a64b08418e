//! Codecs for dynamically typed values and the non-parametric containers
//! that hold them.

use std::any::type_name;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use super::sequence::{read_items, write_items};
use crate::lifecycle::host_phase;
use crate::{Codec, CodecError, Dynamic, JsonReader, JsonWriter, Registry, Token};

#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicCodec;

impl Codec<Dynamic> for DynamicCodec {
    fn encode(
        &self,
        value: &Dynamic,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        match value {
            Dynamic::Null => writer.write_null(),
            Dynamic::Bool(b) => writer.write_bool(*b),
            Dynamic::Number(n) => writer.write_f64(*n)?,
            Dynamic::String(s) => writer.write_string(s),
            Dynamic::Array(items) => write_items(items, self, writer, registry)?,
            Dynamic::Object(members) => {
                writer.write_begin_object();
                for (i, (name, member)) in members.iter().enumerate() {
                    if i != 0 {
                        writer.write_value_separator();
                    }
                    writer.write_property_name(name);
                    self.encode(member, writer, registry)?;
                }
                writer.write_end_object();
            }
            Dynamic::Typed(typed) => {
                if !typed.encode(writer, registry)? {
                    if !host_phase().suppresses_dynamic_errors() {
                        return Err(CodecError::NoCodec {
                            type_name: typed.type_name(),
                        });
                    }
                    tracing::warn!(
                        type_name = typed.type_name(),
                        "no codec for dynamic value, writing null"
                    );
                    writer.write_null();
                }
            }
        }
        Ok(())
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<Dynamic, CodecError> {
        let token = reader.peek_token()?;
        let value = match token {
            Token::Null => {
                reader.read_is_null()?;
                Dynamic::Null
            }
            Token::True | Token::False => Dynamic::Bool(reader.read_bool()?),
            Token::Number => Dynamic::Number(reader.read_f64()?),
            Token::String => Dynamic::String(reader.read_string()?.into_owned()),
            Token::BeginArray => {
                let mut items = Vec::new();
                read_items(reader, self, registry, |item| items.push(item))?;
                Dynamic::Array(items)
            }
            Token::BeginObject => {
                let mut members = BTreeMap::new();
                reader.read_is_begin_object_with_verify()?;
                let mut count = 0;
                while !reader.read_is_end_object_with_skip_value_separator(&mut count)? {
                    let name = reader.read_property_name()?.into_owned();
                    let member = self.decode(reader, registry)?;
                    members.insert(name, member);
                }
                Dynamic::Object(members)
            }
            Token::EndObject | Token::EndArray | Token::ValueSeparator | Token::NameSeparator => {
                return Err(CodecError::UnexpectedToken {
                    expected: "a JSON value",
                    found: format!("{token:?}"),
                    offset: reader.offset(),
                });
            }
        };
        Ok(value)
    }
}

/// A non-parametric sequence of [`Dynamic`] values.
pub struct UntypedListCodec<C> {
    _container: PhantomData<fn() -> C>,
}

impl<C> UntypedListCodec<C> {
    pub fn new() -> Self {
        Self {
            _container: PhantomData,
        }
    }
}

impl<C> Default for UntypedListCodec<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Codec<C> for UntypedListCodec<C>
where
    C: Default + Extend<Dynamic> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a Dynamic>,
{
    fn encode(
        &self,
        value: &C,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        write_items(value, &DynamicCodec, writer, registry)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, registry: &Registry) -> Result<C, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<C>(),
            });
        }
        let mut container = C::default();
        read_items(reader, &DynamicCodec, registry, |item| {
            container.extend(std::iter::once(item))
        })?;
        Ok(container)
    }
}

/// A non-parametric string-keyed map of [`Dynamic`] values.
pub struct UntypedMapCodec<M> {
    _map: PhantomData<fn() -> M>,
}

impl<M> UntypedMapCodec<M> {
    pub fn new() -> Self {
        Self { _map: PhantomData }
    }
}

impl<M> Default for UntypedMapCodec<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Codec<M> for UntypedMapCodec<M>
where
    M: Default + Extend<(String, Dynamic)> + 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a String, &'a Dynamic)>,
{
    fn encode(
        &self,
        value: &M,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        writer.write_begin_object();
        for (i, (name, member)) in value.into_iter().enumerate() {
            if i != 0 {
                writer.write_value_separator();
            }
            writer.write_property_name(name);
            DynamicCodec.encode(member, writer, registry)?;
        }
        writer.write_end_object();
        Ok(())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, registry: &Registry) -> Result<M, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<M>(),
            });
        }
        let mut map = M::default();
        reader.read_is_begin_object_with_verify()?;
        let mut count = 0;
        while !reader.read_is_end_object_with_skip_value_separator(&mut count)? {
            let name = reader.read_property_name()?.into_owned();
            let member = DynamicCodec.decode(reader, registry)?;
            map.extend(std::iter::once((name, member)));
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(json: &str) -> String {
        let registry = Registry::builder().build();
        let value = DynamicCodec
            .decode(&mut JsonReader::new(json.as_bytes()), &registry)
            .unwrap();
        let mut writer = JsonWriter::new();
        DynamicCodec.encode(&value, &mut writer, &registry).unwrap();
        String::from_utf8(writer.into_bytes()).unwrap()
    }

    #[test]
    fn plain_json_survives_a_round_trip() {
        assert_eq!(
            round_trip(r#" {"b": [1, 2.5, null], "a": {"t": true}, "s": "x"} "#),
            r#"{"a":{"t":true},"b":[1,2.5,null],"s":"x"}"#
        );
    }

    #[test]
    fn typed_values_use_the_codec_of_their_runtime_type() {
        let registry = Registry::new();
        let value = Dynamic::Array(vec![Dynamic::typed(3u8), Dynamic::typed("hi".to_string())]);
        let mut writer = JsonWriter::new();
        DynamicCodec.encode(&value, &mut writer, &registry).unwrap();
        assert_eq!(writer.as_bytes(), br#"[3,"hi"]"#);
    }
}
