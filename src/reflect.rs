//! [`Reflect`] impls for std types and the value types in [`crate::types`].
//!
//! Leaf types are opaque and found by the builtin table. Everything else
//! declares its shape and the templates it can be built with; which template
//! is used is decided by the structural resolver, not here.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;

use crate::templates;
use crate::{
    Definition, Dynamic, KeyValue, NdArray, Reflect, Segment, Shape, Stack, Template,
    TypeDescriptor,
};

macro_rules! opaque {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::opaque::<$ty>()
                }
            }
        )+
    };
}

opaque!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, char, String, Dynamic);

// ============================================================================
// Fixed shapes
// ============================================================================

impl<T: Reflect> Reflect for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Nullable)
            .with_args(vec![T::descriptor()])
            .with_template(Template::Nullable, templates::nullable::<T>)
    }
}

impl<T: Reflect> Reflect for Box<[T]> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Array { rank: 1 })
            .with_args(vec![T::descriptor()])
            .with_template(Template::Array, templates::array::<T>)
    }
}

impl<T: Reflect, const RANK: usize> Reflect for NdArray<T, RANK> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Array { rank: RANK })
            .with_args(vec![T::descriptor()])
            .with_template(Template::Array, templates::nd_array::<T, RANK>)
    }
}

impl<K: Reflect, V: Reflect> Reflect for KeyValue<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::KeyValue)
            .with_args(vec![K::descriptor(), V::descriptor()])
            .with_template(Template::KeyValue, templates::key_value::<K, V>)
    }
}

#[cfg(feature = "deferred")]
impl<T: Reflect> Reflect for std::sync::OnceLock<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Deferred)
            .with_args(vec![T::descriptor()])
            .with_template(Template::Deferred, templates::deferred::<T>)
    }
}

impl<T: Reflect> Reflect for Segment<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Segment)
            .with_args(vec![T::descriptor()])
            .with_template(Template::Segment, templates::segment::<T>)
    }
}

/// The unit tuple has no members to encode and gets no template.
impl Reflect for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Tuple)
    }
}

macro_rules! tuple_reflect {
    ($template:ident; $($T:ident),+) => {
        impl<$($T: Reflect),+> Reflect for ($($T,)+) {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::new::<Self>(Shape::Tuple)
                    .with_args(vec![$($T::descriptor()),+])
                    .with_template(Template::Tuple, templates::$template::<$($T),+>)
            }
        }
    };
}

tuple_reflect!(tuple1; A);
tuple_reflect!(tuple2; A, B);
tuple_reflect!(tuple3; A, B, C);
tuple_reflect!(tuple4; A, B, C, D);
tuple_reflect!(tuple5; A, B, C, D, E);
tuple_reflect!(tuple6; A, B, C, D, E, F);
tuple_reflect!(tuple7; A, B, C, D, E, F, G);
tuple_reflect!(tuple8; A, B, C, D, E, F, G, H);

/// Nine-element tuples describe themselves but have no codec.
impl<A, B, C, D, E, F, G, H, I> Reflect for (A, B, C, D, E, F, G, H, I)
where
    A: Reflect,
    B: Reflect,
    C: Reflect,
    D: Reflect,
    E: Reflect,
    F: Reflect,
    G: Reflect,
    H: Reflect,
    I: Reflect,
{
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Tuple).with_args(vec![
            A::descriptor(),
            B::descriptor(),
            C::descriptor(),
            D::descriptor(),
            E::descriptor(),
            F::descriptor(),
            G::descriptor(),
            H::descriptor(),
            I::descriptor(),
        ])
    }
}

// ============================================================================
// Parametric containers
// ============================================================================

impl<T: Reflect> Reflect for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(Definition::VEC, vec![T::descriptor()])
            .with_template(Template::List, templates::list::<Self, T>)
            .with_template(Template::Collection, templates::collection::<Self, T>)
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(Definition::VEC_DEQUE, vec![T::descriptor()])
            .with_template(Template::Queue, templates::list::<Self, T>)
            .with_template(Template::Collection, templates::collection::<Self, T>)
    }
}

impl<T: Reflect> Reflect for LinkedList<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(Definition::LINKED_LIST, vec![T::descriptor()])
            .with_template(Template::LinkedList, templates::list::<Self, T>)
            .with_template(Template::Collection, templates::collection::<Self, T>)
    }
}

impl<T: Reflect + Eq + Hash> Reflect for HashSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(Definition::HASH_SET, vec![T::descriptor()])
            .with_template(Template::Set, templates::list::<Self, T>)
            .with_template(Template::Collection, templates::collection::<Self, T>)
    }
}

impl<T: Reflect + Ord> Reflect for BTreeSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(Definition::BTREE_SET, vec![T::descriptor()])
            .with_template(Template::Set, templates::list::<Self, T>)
            .with_template(Template::Collection, templates::collection::<Self, T>)
    }
}

impl<T: Reflect> Reflect for Stack<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(Definition::STACK, vec![T::descriptor()])
            .with_template(Template::Stack, templates::stack::<T>)
            .with_template(Template::Collection, templates::collection::<Self, T>)
    }
}

impl<K: Reflect + Eq + Hash, V: Reflect> Reflect for HashMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(
            Definition::HASH_MAP,
            vec![K::descriptor(), V::descriptor()],
        )
            .with_template(Template::Map, templates::map::<Self, K, V>)
            .with_template(Template::Dictionary, templates::dictionary::<Self, K, V>)
    }
}

impl<K: Reflect + Ord, V: Reflect> Reflect for BTreeMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(
            Definition::BTREE_MAP,
            vec![K::descriptor(), V::descriptor()],
        )
            .with_template(Template::Map, templates::map::<Self, K, V>)
            .with_template(Template::Dictionary, templates::dictionary::<Self, K, V>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capabilities;

    #[test]
    fn containers_declare_their_insertion_capabilities() {
        let vec = Vec::<i32>::descriptor();
        assert_eq!(vec.shape(), Shape::Generic(Definition::VEC));
        assert!(vec.capabilities().contains(Capabilities::INSERT));
        assert!(vec.args()[0].is::<i32>());

        let map = BTreeMap::<String, u8>::descriptor();
        assert_eq!(map.arity(), 2);
        assert!(map.capabilities().contains(Capabilities::INSERT_KEY_VALUE));
    }

    #[test]
    fn rank_comes_from_the_type() {
        assert_eq!(NdArray::<u8, 3>::descriptor().shape(), Shape::Array { rank: 3 });
        assert_eq!(Box::<[u8]>::descriptor().shape(), Shape::Array { rank: 1 });
    }

    #[test]
    fn unit_and_wide_tuples_offer_no_template() {
        assert!(<()>::descriptor().instantiator(Template::Tuple).is_none());
        type Wide = (u8, u8, u8, u8, u8, u8, u8, u8, u8);
        assert_eq!(<Wide as Reflect>::descriptor().arity(), 9);
        assert!(<Wide as Reflect>::descriptor().instantiator(Template::Tuple).is_none());
    }
}
