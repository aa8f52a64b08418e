//! Sequence codecs.
//!
//! [`SequenceCodec`] builds the container in one go from an iterator and
//! backs the list, set, queue and linked-list templates. [`CollectionCodec`]
//! is the fallback for any container that can only be default-constructed
//! and then extended one element at a time.

use std::any::type_name;
use std::marker::PhantomData;

use crate::{Codec, CodecError, CodecRef, JsonReader, JsonWriter, Registry};

pub(crate) fn write_items<'a, E: 'a>(
    items: impl IntoIterator<Item = &'a E>,
    element: &dyn Codec<E>,
    writer: &mut JsonWriter,
    registry: &Registry,
) -> Result<(), CodecError> {
    writer.write_begin_array();
    for (i, item) in items.into_iter().enumerate() {
        if i != 0 {
            writer.write_value_separator();
        }
        element.encode(item, writer, registry)?;
    }
    writer.write_end_array();
    Ok(())
}

/// Reads a JSON array, handing each decoded element to `push`.
pub(crate) fn read_items<E>(
    reader: &mut JsonReader<'_>,
    element: &dyn Codec<E>,
    registry: &Registry,
    mut push: impl FnMut(E),
) -> Result<(), CodecError> {
    reader.read_is_begin_array_with_verify()?;
    let mut count = 0;
    while !reader.read_is_end_array_with_skip_value_separator(&mut count)? {
        push(element.decode(reader, registry)?);
    }
    Ok(())
}

pub struct SequenceCodec<C, E> {
    element: CodecRef<E>,
    _container: PhantomData<fn() -> C>,
}

impl<C, E> SequenceCodec<C, E> {
    pub fn new(element: CodecRef<E>) -> Self {
        Self {
            element,
            _container: PhantomData,
        }
    }
}

impl<C, E> Codec<C> for SequenceCodec<C, E>
where
    C: FromIterator<E> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a E>,
    E: 'static,
{
    fn encode(
        &self,
        value: &C,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        write_items(value, self.element.as_ref(), writer, registry)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, registry: &Registry) -> Result<C, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<C>(),
            });
        }
        let mut items = Vec::new();
        read_items(reader, self.element.as_ref(), registry, |item| items.push(item))?;
        Ok(items.into_iter().collect())
    }
}

pub struct CollectionCodec<C, E> {
    element: CodecRef<E>,
    _container: PhantomData<fn() -> C>,
}

impl<C, E> CollectionCodec<C, E> {
    pub fn new(element: CodecRef<E>) -> Self {
        Self {
            element,
            _container: PhantomData,
        }
    }
}

impl<C, E> Codec<C> for CollectionCodec<C, E>
where
    C: Default + Extend<E> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a E>,
    E: 'static,
{
    fn encode(
        &self,
        value: &C,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        write_items(value, self.element.as_ref(), writer, registry)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, registry: &Registry) -> Result<C, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<C>(),
            });
        }
        let mut container = C::default();
        read_items(reader, self.element.as_ref(), registry, |item| {
            container.extend(std::iter::once(item))
        })?;
        Ok(container)
    }
}
