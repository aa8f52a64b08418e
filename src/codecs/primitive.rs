//! Codecs for scalars and strings.

use std::any::type_name;

use crate::{Codec, CodecError, JsonReader, JsonWriter, Registry};

macro_rules! signed_codec {
    ($name:ident, $ty:ty) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Codec<$ty> for $name {
            fn encode(
                &self,
                value: &$ty,
                writer: &mut JsonWriter,
                _: &Registry,
            ) -> Result<(), CodecError> {
                writer.write_i64(i64::from(*value));
                Ok(())
            }

            fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<$ty, CodecError> {
                let offset = reader.offset();
                let value = reader.read_i64()?;
                <$ty>::try_from(value).map_err(|_| out_of_range::<$ty>(value, offset))
            }
        }
    };
}

macro_rules! unsigned_codec {
    ($name:ident, $ty:ty) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Codec<$ty> for $name {
            fn encode(
                &self,
                value: &$ty,
                writer: &mut JsonWriter,
                _: &Registry,
            ) -> Result<(), CodecError> {
                writer.write_u64(u64::from(*value));
                Ok(())
            }

            fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<$ty, CodecError> {
                let offset = reader.offset();
                let value = reader.read_u64()?;
                <$ty>::try_from(value).map_err(|_| out_of_range::<$ty>(value, offset))
            }
        }
    };
}

signed_codec!(I8Codec, i8);
signed_codec!(I16Codec, i16);
signed_codec!(I32Codec, i32);
signed_codec!(I64Codec, i64);
unsigned_codec!(U8Codec, u8);
unsigned_codec!(U16Codec, u16);
unsigned_codec!(U32Codec, u32);
unsigned_codec!(U64Codec, u64);

fn out_of_range<T>(value: impl std::fmt::Display, offset: usize) -> CodecError {
    CodecError::InvalidNumber {
        offset,
        reason: format!("{value} is out of range for {}", type_name::<T>()),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn encode(
        &self,
        value: &bool,
        writer: &mut JsonWriter,
        _: &Registry,
    ) -> Result<(), CodecError> {
        writer.write_bool(*value);
        Ok(())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<bool, CodecError> {
        reader.read_bool()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct F64Codec;

impl Codec<f64> for F64Codec {
    fn encode(&self, value: &f64, writer: &mut JsonWriter, _: &Registry) -> Result<(), CodecError> {
        writer.write_f64(*value)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<f64, CodecError> {
        reader.read_f64()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct F32Codec;

impl Codec<f32> for F32Codec {
    fn encode(&self, value: &f32, writer: &mut JsonWriter, _: &Registry) -> Result<(), CodecError> {
        writer.write_f32(*value)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<f32, CodecError> {
        // Narrowing is intended: f32 values are written in their shortest form.
        reader.read_f64().map(|v| v as f32)
    }
}

/// A `char` is a one-character string.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharCodec;

impl Codec<char> for CharCodec {
    fn encode(
        &self,
        value: &char,
        writer: &mut JsonWriter,
        _: &Registry,
    ) -> Result<(), CodecError> {
        let mut buf = [0u8; 4];
        writer.write_string(value.encode_utf8(&mut buf));
        Ok(())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<char, CodecError> {
        let offset = reader.offset();
        let text = reader.read_string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(CodecError::InvalidString {
                offset,
                reason: format!("expected a single character, got {:?}", text),
            }),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn encode(
        &self,
        value: &String,
        writer: &mut JsonWriter,
        _: &Registry,
    ) -> Result<(), CodecError> {
        writer.write_string(value);
        Ok(())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<String, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: "String",
            });
        }
        reader.read_string().map(|s| s.into_owned())
    }
}
