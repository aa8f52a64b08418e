use super::sequence::{read_items, write_items};
use crate::{Codec, CodecError, CodecRef, JsonReader, JsonWriter, Registry, Segment};

/// Writes only the visible range; null reads back as an empty segment.
pub struct SegmentCodec<T> {
    element: CodecRef<T>,
}

impl<T> SegmentCodec<T> {
    pub fn new(element: CodecRef<T>) -> Self {
        Self { element }
    }
}

impl<T: 'static> Codec<Segment<T>> for SegmentCodec<T> {
    fn encode(
        &self,
        value: &Segment<T>,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        write_items(value.as_slice(), self.element.as_ref(), writer, registry)
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<Segment<T>, CodecError> {
        if reader.read_is_null()? {
            return Ok(Segment::default());
        }
        let mut items = Vec::new();
        read_items(reader, self.element.as_ref(), registry, |item| items.push(item))?;
        Ok(Segment::from_vec(items))
    }
}
