//! Codec templates
//!
//! Each function here is an [`Instantiate`](crate::Instantiate): given the
//! resolved codecs of a type's arguments, in order, it builds the codec for
//! the type itself. [`Reflect`](crate::Reflect) impls attach monomorphized
//! instances of these to their descriptors; user types can do the same.
//!
//! Every template returns `None` when handed the wrong number of codecs or
//! codecs for the wrong types.

use std::sync::Arc;

use crate::codecs::{
    ArrayCodec, CollectionCodec, DictionaryCodec, KeyValueCodec, MapCodec, NdArrayCodec,
    NullableCodec, SegmentCodec, SequenceCodec, StackCodec, Tuple1Codec, Tuple2Codec, Tuple3Codec,
    Tuple4Codec, Tuple5Codec, Tuple6Codec, Tuple7Codec, Tuple8Codec, UntypedListCodec,
    UntypedMapCodec,
};
use crate::{downcast, erase, Dynamic, ErasedCodec, KeyValue, NdArray, Segment, Stack};

// ============================================================================
// Fixed shapes
// ============================================================================

pub fn array<E: 'static>(args: &[ErasedCodec]) -> Option<ErasedCodec> {
    let [element] = args else { return None };
    let codec = ArrayCodec::new(downcast::<E>(element)?);
    Some(erase::<Box<[E]>>(Arc::new(codec)))
}

pub fn nd_array<E: 'static, const RANK: usize>(args: &[ErasedCodec]) -> Option<ErasedCodec> {
    let [element] = args else { return None };
    let codec = NdArrayCodec::<E, RANK>::new(downcast::<E>(element)?);
    Some(erase::<NdArray<E, RANK>>(Arc::new(codec)))
}

pub fn nullable<T: 'static>(args: &[ErasedCodec]) -> Option<ErasedCodec> {
    let [inner] = args else { return None };
    let codec = NullableCodec::new(downcast::<T>(inner)?);
    Some(erase::<Option<T>>(Arc::new(codec)))
}

pub fn key_value<K: 'static, V: 'static>(args: &[ErasedCodec]) -> Option<ErasedCodec> {
    let [key, value] = args else { return None };
    let codec = KeyValueCodec::new(downcast::<K>(key)?, downcast::<V>(value)?);
    Some(erase::<KeyValue<K, V>>(Arc::new(codec)))
}

#[cfg(feature = "deferred")]
pub fn deferred<T: 'static>(args: &[ErasedCodec]) -> Option<ErasedCodec> {
    let [inner] = args else { return None };
    let codec = crate::codecs::DeferredCodec::new(downcast::<T>(inner)?);
    Some(erase::<std::sync::OnceLock<T>>(Arc::new(codec)))
}

pub fn segment<T: 'static>(args: &[ErasedCodec]) -> Option<ErasedCodec> {
    let [element] = args else { return None };
    let codec = SegmentCodec::new(downcast::<T>(element)?);
    Some(erase::<Segment<T>>(Arc::new(codec)))
}

macro_rules! tuple_template {
    ($fn_name:ident, $codec:ident; $($T:ident $arg:ident),+) => {
        pub fn $fn_name<$($T: 'static),+>(args: &[ErasedCodec]) -> Option<ErasedCodec> {
            let [$($arg),+] = args else { return None };
            let codec = $codec::new($(downcast::<$T>($arg)?),+);
            Some(erase::<($($T,)+)>(Arc::new(codec)))
        }
    };
}

tuple_template!(tuple1, Tuple1Codec; A a);
tuple_template!(tuple2, Tuple2Codec; A a, B b);
tuple_template!(tuple3, Tuple3Codec; A a, B b, C c);
tuple_template!(tuple4, Tuple4Codec; A a, B b, C c, D d);
tuple_template!(tuple5, Tuple5Codec; A a, B b, C c, D d, E e);
tuple_template!(tuple6, Tuple6Codec; A a, B b, C c, D d, E e, F f);
tuple_template!(tuple7, Tuple7Codec; A a, B b, C c, D d, E e, F f, G g);
tuple_template!(tuple8, Tuple8Codec; A a, B b, C c, D d, E e, F f, G g, H h);

// ============================================================================
// Containers
// ============================================================================

/// Lists, sets, queues and linked lists: anything collected from an iterator.
pub fn list<C, E>(args: &[ErasedCodec]) -> Option<ErasedCodec>
where
    C: FromIterator<E> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a E>,
    E: 'static,
{
    let [element] = args else { return None };
    let codec = SequenceCodec::<C, E>::new(downcast::<E>(element)?);
    Some(erase::<C>(Arc::new(codec)))
}

pub fn collection<C, E>(args: &[ErasedCodec]) -> Option<ErasedCodec>
where
    C: Default + Extend<E> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a E>,
    E: 'static,
{
    let [element] = args else { return None };
    let codec = CollectionCodec::<C, E>::new(downcast::<E>(element)?);
    Some(erase::<C>(Arc::new(codec)))
}

pub fn stack<E: 'static>(args: &[ErasedCodec]) -> Option<ErasedCodec> {
    let [element] = args else { return None };
    let codec = StackCodec::new(downcast::<E>(element)?);
    Some(erase::<Stack<E>>(Arc::new(codec)))
}

pub fn map<M, K, V>(args: &[ErasedCodec]) -> Option<ErasedCodec>
where
    M: FromIterator<(K, V)> + 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
    K: 'static,
    V: 'static,
{
    let [key, value] = args else { return None };
    let codec = MapCodec::<M, K, V>::new(downcast::<K>(key)?, downcast::<V>(value)?);
    Some(erase::<M>(Arc::new(codec)))
}

pub fn dictionary<M, K, V>(args: &[ErasedCodec]) -> Option<ErasedCodec>
where
    M: Default + Extend<(K, V)> + 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
    K: 'static,
    V: 'static,
{
    let [key, value] = args else { return None };
    let codec = DictionaryCodec::<M, K, V>::new(downcast::<K>(key)?, downcast::<V>(value)?);
    Some(erase::<M>(Arc::new(codec)))
}

pub fn untyped_list<C>(args: &[ErasedCodec]) -> Option<ErasedCodec>
where
    C: Default + Extend<Dynamic> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a Dynamic>,
{
    if !args.is_empty() {
        return None;
    }
    Some(erase::<C>(Arc::new(UntypedListCodec::<C>::new())))
}

pub fn untyped_map<M>(args: &[ErasedCodec]) -> Option<ErasedCodec>
where
    M: Default + Extend<(String, Dynamic)> + 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a String, &'a Dynamic)>,
{
    if !args.is_empty() {
        return None;
    }
    Some(erase::<M>(Arc::new(UntypedMapCodec::<M>::new())))
}
