//! Tuple codecs for arities one through eight.
//!
//! A tuple is an object whose members are named `Item1`, `Item2`, ... in
//! position order. Every item is required on decode.

use std::any::type_name;

use crate::{Codec, CodecError, CodecRef, FieldMatcher, JsonReader, JsonWriter, Registry};

const ITEM_NAMES: [&str; 8] = [
    "Item1", "Item2", "Item3", "Item4", "Item5", "Item6", "Item7", "Item8",
];

macro_rules! tuple_codec {
    ($name:ident, $arity:literal; $($idx:tt $T:ident $item:ident),+) => {
        pub struct $name<$($T),+> {
            $($item: CodecRef<$T>,)+
            matcher: FieldMatcher,
        }

        impl<$($T),+> $name<$($T),+> {
            pub fn new($($item: CodecRef<$T>),+) -> Self {
                Self {
                    $($item,)+
                    matcher: FieldMatcher::new(&ITEM_NAMES[..$arity]),
                }
            }
        }

        impl<$($T: 'static),+> Codec<($($T,)+)> for $name<$($T),+> {
            fn encode(
                &self,
                value: &($($T,)+),
                writer: &mut JsonWriter,
                registry: &Registry,
            ) -> Result<(), CodecError> {
                writer.write_begin_object();
                $(
                    if $idx != 0 {
                        writer.write_value_separator();
                    }
                    writer.write_property_name(ITEM_NAMES[$idx]);
                    self.$item.encode(&value.$idx, writer, registry)?;
                )+
                writer.write_end_object();
                Ok(())
            }

            fn decode(
                &self,
                reader: &mut JsonReader<'_>,
                registry: &Registry,
            ) -> Result<($($T,)+), CodecError> {
                let type_name = type_name::<($($T,)+)>();
                if reader.read_is_null()? {
                    return Err(CodecError::UnexpectedNull { type_name });
                }
                $(let mut $item: Option<$T> = None;)+
                reader.read_is_begin_object_with_verify()?;
                let mut count = 0;
                while !reader.read_is_end_object_with_skip_value_separator(&mut count)? {
                    let name = reader.read_property_name_raw()?;
                    match self.matcher.try_get(&name) {
                        $(Some($idx) => $item = Some(self.$item.decode(reader, registry)?),)+
                        _ => reader.read_next_block()?,
                    }
                }
                Ok(($(
                    $item.ok_or(CodecError::MissingField {
                        type_name,
                        field: ITEM_NAMES[$idx],
                    })?,
                )+))
            }
        }
    };
}

tuple_codec!(Tuple1Codec, 1; 0 A a);
tuple_codec!(Tuple2Codec, 2; 0 A a, 1 B b);
tuple_codec!(Tuple3Codec, 3; 0 A a, 1 B b, 2 C c);
tuple_codec!(Tuple4Codec, 4; 0 A a, 1 B b, 2 C c, 3 D d);
tuple_codec!(Tuple5Codec, 5; 0 A a, 1 B b, 2 C c, 3 D d, 4 E e);
tuple_codec!(Tuple6Codec, 6; 0 A a, 1 B b, 2 C c, 3 D d, 4 E e, 5 F f);
tuple_codec!(Tuple7Codec, 7; 0 A a, 1 B b, 2 C c, 3 D d, 4 E e, 5 F f, 6 G g);
tuple_codec!(Tuple8Codec, 8; 0 A a, 1 B b, 2 C c, 3 D d, 4 E e, 5 F f, 6 G g, 7 H h);
