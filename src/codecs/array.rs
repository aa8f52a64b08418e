//! Array codecs: rank-1 slices and fixed-rank [`NdArray`]s written as nested
//! JSON arrays.

use std::any::type_name;

use super::sequence::{read_items, write_items};
use crate::{Codec, CodecError, CodecRef, JsonReader, JsonWriter, NdArray, Registry};

pub struct ArrayCodec<T> {
    element: CodecRef<T>,
}

impl<T> ArrayCodec<T> {
    pub fn new(element: CodecRef<T>) -> Self {
        Self { element }
    }
}

impl<T: 'static> Codec<Box<[T]>> for ArrayCodec<T> {
    fn encode(
        &self,
        value: &Box<[T]>,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        write_items(value.iter(), self.element.as_ref(), writer, registry)
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<Box<[T]>, CodecError> {
        if reader.read_is_null()? {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<Box<[T]>>(),
            });
        }
        let mut items = Vec::new();
        read_items(reader, self.element.as_ref(), registry, |item| items.push(item))?;
        Ok(items.into_boxed_slice())
    }
}

pub struct NdArrayCodec<T, const RANK: usize> {
    element: CodecRef<T>,
}

impl<T, const RANK: usize> NdArrayCodec<T, RANK> {
    pub fn new(element: CodecRef<T>) -> Self {
        Self { element }
    }

    fn write_level(
        &self,
        data: &[T],
        dims: &[usize],
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        match dims {
            [] | [_] => write_items(data, self.element.as_ref(), writer, registry),
            [len, rest @ ..] => {
                writer.write_begin_array();
                let stride: usize = rest.iter().product();
                for i in 0..*len {
                    if i != 0 {
                        writer.write_value_separator();
                    }
                    let chunk = data.get(i * stride..(i + 1) * stride).unwrap_or(&[]);
                    self.write_level(chunk, rest, writer, registry)?;
                }
                writer.write_end_array();
                Ok(())
            }
        }
    }

    fn read_level(
        &self,
        level: usize,
        shape: &mut [Option<usize>; RANK],
        out: &mut Vec<T>,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        reader.read_is_begin_array_with_verify()?;
        let mut count = 0;
        while !reader.read_is_end_array_with_skip_value_separator(&mut count)? {
            if level + 1 == RANK {
                out.push(self.element.decode(reader, registry)?);
            } else {
                self.read_level(level + 1, shape, out, reader, registry)?;
            }
        }
        match shape[level] {
            None => shape[level] = Some(count),
            Some(expected) if expected != count => {
                return Err(CodecError::DimensionMismatch {
                    dimension: level,
                    expected,
                    got: count,
                })
            }
            Some(_) => {}
        }
        Ok(())
    }
}

impl<T: 'static, const RANK: usize> Codec<NdArray<T, RANK>> for NdArrayCodec<T, RANK> {
    fn encode(
        &self,
        value: &NdArray<T, RANK>,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<(), CodecError> {
        self.write_level(value.as_slice(), &value.dims(), writer, registry)
    }

    fn decode(
        &self,
        reader: &mut JsonReader<'_>,
        registry: &Registry,
    ) -> Result<NdArray<T, RANK>, CodecError> {
        if reader.read_is_null()? || RANK == 0 {
            return Err(CodecError::UnexpectedNull {
                type_name: type_name::<NdArray<T, RANK>>(),
            });
        }
        let mut shape = [None; RANK];
        let mut data = Vec::new();
        self.read_level(0, &mut shape, &mut data, reader, registry)?;
        let dims = shape.map(|d| d.unwrap_or(0));
        let expected = dims.iter().product::<usize>();
        let got = data.len();
        NdArray::new(dims, data).ok_or(CodecError::DimensionMismatch {
            dimension: RANK - 1,
            expected,
            got,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::codecs::primitive::I32Codec;
    use crate::Array2;

    fn codec() -> NdArrayCodec<i32, 2> {
        NdArrayCodec::new(Arc::new(I32Codec))
    }

    #[test]
    fn writes_rows_as_nested_arrays() {
        let registry = Registry::builder().build();
        let array = Array2::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]]).unwrap();
        let mut writer = JsonWriter::new();
        codec().encode(&array, &mut writer, &registry).unwrap();
        assert_eq!(writer.as_bytes(), b"[[1,2],[3,4],[5,6]]");
    }

    #[test]
    fn jagged_input_is_rejected() {
        let registry = Registry::builder().build();
        let mut reader = JsonReader::new(b"[[1,2],[3]]");
        assert!(matches!(
            codec().decode(&mut reader, &registry),
            Err(CodecError::DimensionMismatch { dimension: 1, expected: 2, got: 1 })
        ));
    }

    #[test]
    fn empty_rows_keep_the_outer_dimension() {
        let registry = Registry::builder().build();
        let mut reader = JsonReader::new(b"[[],[]]");
        let array = codec().decode(&mut reader, &registry).unwrap();
        assert_eq!(array.dims(), [2, 0]);
    }
}
