use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;

use super::Resolver;
use crate::codecs::{
    BoolCodec, CharCodec, DynamicCodec, F32Codec, F64Codec, I16Codec, I32Codec, I64Codec, I8Codec,
    NullableCodec, StringCodec, U16Codec, U32Codec, U64Codec, U8Codec,
};
use crate::{
    erase, fixed, Codec, Dynamic, ErasedCodec, Factory, Registry, ResolveError, TypeDescriptor,
};

fn optional<T: 'static, C: Codec<T> + Default + 'static>() -> ErasedCodec {
    let inner = Arc::new(C::default());
    erase::<Option<T>>(Arc::new(NullableCodec::<T>::new(inner)))
}

macro_rules! builtins {
    ($table:ident; $($ty:ty => $codec:ty),+ $(,)?) => {
        $(
            $table.insert(TypeId::of::<$ty>(), fixed::<$ty, $codec> as Factory);
            $table.insert(TypeId::of::<Option<$ty>>(), optional::<$ty, $codec> as Factory);
        )+
    };
}

fn table() -> &'static HashMap<TypeId, Factory> {
    static TABLE: OnceLock<HashMap<TypeId, Factory>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        builtins!(table;
            bool => BoolCodec,
            i8 => I8Codec,
            i16 => I16Codec,
            i32 => I32Codec,
            i64 => I64Codec,
            u8 => U8Codec,
            u16 => U16Codec,
            u32 => U32Codec,
            u64 => U64Codec,
            f32 => F32Codec,
            f64 => F64Codec,
            char => CharCodec,
            String => StringCodec,
        );
        table.insert(TypeId::of::<Dynamic>(), fixed::<Dynamic, DynamicCodec> as Factory);
        table
    })
}

/// Fixed codecs for scalars, strings, their optional forms and [`Dynamic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinResolver;

impl Resolver for BuiltinResolver {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        _: &Registry,
    ) -> Result<Option<ErasedCodec>, ResolveError> {
        Ok(table().get(&descriptor.id()).map(|factory| factory()))
    }
}
