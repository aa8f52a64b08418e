//! Dynamically typed values
//!
//! [`Dynamic`] is the element type of non-parametric containers. Decoding
//! produces the plain JSON variants; encoding additionally accepts
//! [`Dynamic::Typed`], whose codec is looked up by the runtime type of the
//! wrapped value rather than by any declared type.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{CodecError, JsonWriter, Reflect, Registry, ResolveError, TypeDescriptor};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dynamic {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Dynamic>),
    Object(BTreeMap<String, Dynamic>),
    Typed(TypedValue),
}

impl Dynamic {
    /// Wraps any reflectable value; its codec is resolved when encoded.
    pub fn typed<T: Reflect + Send + Sync>(value: T) -> Self {
        Dynamic::Typed(TypedValue::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }
}

impl From<bool> for Dynamic {
    fn from(v: bool) -> Self {
        Dynamic::Bool(v)
    }
}

impl From<f64> for Dynamic {
    fn from(v: f64) -> Self {
        Dynamic::Number(v)
    }
}

impl From<i32> for Dynamic {
    fn from(v: i32) -> Self {
        Dynamic::Number(f64::from(v))
    }
}

impl From<String> for Dynamic {
    fn from(v: String) -> Self {
        Dynamic::String(v)
    }
}

impl From<&str> for Dynamic {
    fn from(v: &str) -> Self {
        Dynamic::String(v.to_string())
    }
}

impl<T: Into<Dynamic>> From<Vec<T>> for Dynamic {
    fn from(v: Vec<T>) -> Self {
        Dynamic::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Dynamic>> From<Option<T>> for Dynamic {
    fn from(v: Option<T>) -> Self {
        v.map_or(Dynamic::Null, Into::into)
    }
}

/// Writes the value with the codec for its runtime type. `Ok(false)` means
/// that type has no codec and nothing was written.
type EncodeFn =
    fn(&(dyn Any + Send + Sync), &mut JsonWriter, &Registry) -> Result<bool, CodecError>;

/// A value of some reflectable type, boxed with what is needed to find its
/// codec later.
#[derive(Clone)]
pub struct TypedValue {
    value: Arc<dyn Any + Send + Sync>,
    descriptor: fn() -> TypeDescriptor,
    type_name: &'static str,
    encode: EncodeFn,
}

impl TypedValue {
    pub fn new<T: Reflect + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            descriptor: T::descriptor,
            type_name: std::any::type_name::<T>(),
            encode: encode_as::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Descriptor of the runtime type.
    pub fn descriptor(&self) -> TypeDescriptor {
        (self.descriptor)()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub(crate) fn encode(
        &self,
        writer: &mut JsonWriter,
        registry: &Registry,
    ) -> Result<bool, CodecError> {
        (self.encode)(self.value.as_ref(), writer, registry)
    }
}

fn encode_as<T: Reflect>(
    value: &(dyn Any + Send + Sync),
    writer: &mut JsonWriter,
    registry: &Registry,
) -> Result<bool, CodecError> {
    let type_name = std::any::type_name::<T>();
    let value = value
        .downcast_ref::<T>()
        .ok_or(ResolveError::TypeMismatch { type_name })?;
    match registry.get_codec::<T>()? {
        Some(codec) => codec.encode(value, writer, registry).map(|_| true),
        None => Ok(false),
    }
}

/// Two typed values are equal only if they share the same allocation.
impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedValue").field(&self.type_name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_values_keep_their_runtime_type() {
        let value = TypedValue::new(7u16);
        assert_eq!(value.downcast_ref::<u16>(), Some(&7));
        assert!(value.downcast_ref::<u32>().is_none());
        assert!(value.descriptor().is::<u16>());
    }

    #[test]
    fn conversions_build_plain_variants() {
        let value: Dynamic = vec![Some("a"), None].into();
        assert_eq!(
            value,
            Dynamic::Array(vec![Dynamic::String("a".into()), Dynamic::Null])
        );
    }
}
