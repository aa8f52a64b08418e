use std::any::TypeId;

use hashbrown::HashMap;

use super::Resolver;
use crate::{fixed, Codec, ErasedCodec, Factory, Registry, ResolveError, TypeDescriptor};

/// Leaf codecs written by hand or emitted by `#[derive(Record)]`.
///
/// Explicit registrations win over the factory a descriptor carries, so a
/// hand-written codec can replace a derived one.
#[derive(Debug, Default, Clone)]
pub struct GeneratedResolver {
    table: HashMap<TypeId, Factory>,
}

impl GeneratedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `C` as the codec for `T`.
    pub fn register<T: 'static, C: Codec<T> + Default + 'static>(self) -> Self {
        self.register_factory::<T>(fixed::<T, C>)
    }

    pub fn register_factory<T: 'static>(mut self, factory: Factory) -> Self {
        self.table.insert(TypeId::of::<T>(), factory);
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Resolver for GeneratedResolver {
    fn name(&self) -> &'static str {
        "generated"
    }

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        _: &Registry,
    ) -> Result<Option<ErasedCodec>, ResolveError> {
        let factory = self
            .table
            .get(&descriptor.id())
            .copied()
            .or_else(|| descriptor.factory());
        Ok(factory.map(|factory| factory()))
    }
}
