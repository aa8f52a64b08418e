//! Raw byte codecs: byte arrays and byte segments are base64 strings rather
//! than arrays of numbers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{Codec, CodecError, JsonReader, JsonWriter, Registry, Segment};

fn read_base64(reader: &mut JsonReader<'_>) -> Result<Vec<u8>, CodecError> {
    let text = reader.read_string_raw()?;
    Ok(STANDARD.decode(text.as_ref())?)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ByteArrayCodec;

impl Codec<Box<[u8]>> for ByteArrayCodec {
    fn encode(
        &self,
        value: &Box<[u8]>,
        writer: &mut JsonWriter,
        _: &Registry,
    ) -> Result<(), CodecError> {
        writer.write_string(&STANDARD.encode(value));
        Ok(())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<Box<[u8]>, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull { type_name: "[u8]" });
        }
        read_base64(reader).map(Vec::into_boxed_slice)
    }
}

/// Null reads back as an empty segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteSegmentCodec;

impl Codec<Segment<u8>> for ByteSegmentCodec {
    fn encode(
        &self,
        value: &Segment<u8>,
        writer: &mut JsonWriter,
        _: &Registry,
    ) -> Result<(), CodecError> {
        writer.write_string(&STANDARD.encode(value.as_slice()));
        Ok(())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<Segment<u8>, CodecError> {
        if reader.read_is_null()? {
            return Ok(Segment::default());
        }
        read_base64(reader).map(Segment::from_vec)
    }
}
