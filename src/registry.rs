//! Codec registry
//!
//! The registry owns the resolver chain and the per-type cache. Every type
//! is resolved at most once per registry: the cache maps a [`TypeId`] to a
//! [`OnceLock`] cell, so concurrent first requests for the same type block on
//! a single construction and all observe its result. Absent results and
//! resolution errors are cached the same way as codecs. Entries are never
//! replaced or removed.
//!
//! A type whose resolution needs itself, on this thread or through threads
//! blocked on each other's cells, fails with [`ResolveError::Cycle`] instead
//! of waiting forever.

use std::any::{type_name, TypeId};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use dashmap::DashMap;
use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::resolver::{BuiltinResolver, GeneratedResolver, Resolver, StructuralResolver};
use crate::{
    downcast, CodecError, CodecRef, ErasedCodec, JsonReader, JsonWriter, Limits, Reflect,
    ResolveError, TypeDescriptor,
};

type Resolution = Result<Option<ErasedCodec>, ResolveError>;

/// Which thread is building each cache cell, and which cell each thread is
/// blocked on.
#[derive(Debug, Default)]
struct WaitGraph {
    owners: HashMap<TypeId, ThreadId>,
    waiting: HashMap<ThreadId, TypeId>,
}

impl WaitGraph {
    /// Whether blocking `thread` on the cell for `id` would never return:
    /// following owner -> awaited cell leads back to `thread`.
    fn closes_cycle(&self, thread: ThreadId, id: TypeId) -> bool {
        let mut next = id;
        for _ in 0..=self.owners.len() {
            let Some(&owner) = self.owners.get(&next) else {
                return false;
            };
            if owner == thread {
                return true;
            }
            match self.waiting.get(&owner) {
                Some(&awaited) => next = awaited,
                None => return false,
            }
        }
        false
    }
}

/// Clears the waiting edge of a thread, even if a resolver panics.
struct WaitingGuard<'a> {
    graph: &'a Mutex<WaitGraph>,
    thread: ThreadId,
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.graph.lock().waiting.remove(&self.thread);
    }
}

/// Releases ownership of a cell once its resolution finishes.
struct OwnerGuard<'a> {
    graph: &'a Mutex<WaitGraph>,
    id: TypeId,
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        self.graph.lock().owners.remove(&self.id);
    }
}

pub struct Registry {
    resolvers: Vec<Box<dyn Resolver>>,
    cache: DashMap<TypeId, Arc<OnceLock<Resolution>>>,
    graph: Mutex<WaitGraph>,
    limits: Limits,
}

impl Registry {
    /// A registry with the default resolver chain and default limits.
    pub fn new() -> Self {
        RegistryBuilder::new().with_default_resolvers().build()
    }

    /// An empty builder: no resolvers, default limits.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The process-wide registry used by the crate-level helpers.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Number of types resolved so far, absent ones included.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolves the codec for `descriptor`, consulting the cache first.
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> Resolution {
        let cell = self
            .cache
            .entry(descriptor.id())
            .or_default()
            .value()
            .clone();
        if let Some(done) = cell.get() {
            return done.clone();
        }

        let id = descriptor.id();
        let thread = thread::current().id();
        let _waiting = {
            let mut graph = self.graph.lock();
            if graph.closes_cycle(thread, id) {
                tracing::debug!(type_name = descriptor.type_name(), "cyclic codec resolution");
                return Err(ResolveError::Cycle {
                    type_name: descriptor.type_name(),
                });
            }
            graph.waiting.insert(thread, id);
            WaitingGuard {
                graph: &self.graph,
                thread,
            }
        };

        cell.get_or_init(|| {
            let _owner = self.own(id, thread);
            tracing::trace!(type_name = descriptor.type_name(), "resolving codec");
            self.run_chain(descriptor)
        })
        .clone()
    }

    fn own(&self, id: TypeId, thread: ThreadId) -> OwnerGuard<'_> {
        let mut graph = self.graph.lock();
        graph.waiting.remove(&thread);
        graph.owners.insert(id, thread);
        OwnerGuard {
            graph: &self.graph,
            id,
        }
    }

    fn run_chain(&self, descriptor: &TypeDescriptor) -> Resolution {
        for resolver in &self.resolvers {
            if let Some(codec) = resolver.resolve(descriptor, self)? {
                tracing::debug!(
                    type_name = descriptor.type_name(),
                    resolver = resolver.name(),
                    "resolved codec"
                );
                return Ok(Some(codec));
            }
        }
        tracing::debug!(type_name = descriptor.type_name(), "no codec");
        Ok(None)
    }

    /// Typed lookup. `Ok(None)` means no resolver handles `T`.
    pub fn get_codec<T: Reflect>(&self) -> Result<Option<CodecRef<T>>, ResolveError> {
        let cached = self
            .cache
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value().get().cloned());
        let resolution = match cached {
            Some(done) => done,
            None => self.resolve(&T::descriptor()),
        };
        match resolution? {
            Some(erased) => downcast::<T>(&erased).map(Some).ok_or(ResolveError::TypeMismatch {
                type_name: type_name::<T>(),
            }),
            None => Ok(None),
        }
    }

    /// Like [`get_codec`](Self::get_codec), but a missing codec is an error.
    pub fn codec<T: Reflect>(&self) -> Result<CodecRef<T>, CodecError> {
        self.get_codec::<T>()?.ok_or(CodecError::NoCodec {
            type_name: type_name::<T>(),
        })
    }

    pub fn to_vec<T: Reflect>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let codec = self.codec::<T>()?;
        let mut writer = JsonWriter::new();
        codec.encode(value, &mut writer, self)?;
        Ok(writer.into_bytes())
    }

    /// Decodes exactly one value; trailing non-whitespace is an error.
    pub fn from_slice<T: Reflect>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        if bytes.len() > self.limits.max_buffer_size {
            return Err(CodecError::BufferTooLarge {
                len: bytes.len(),
                limit: self.limits.max_buffer_size,
            });
        }
        let codec = self.codec::<T>()?;
        let mut reader = JsonReader::with_limits(bytes, self.limits);
        let value = codec.decode(&mut reader, self)?;
        reader.finish()?;
        Ok(value)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "resolvers",
                &self.resolvers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("cached", &self.cache.len())
            .field("limits", &self.limits)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles a resolver chain. Resolvers run in the order they are added.
pub struct RegistryBuilder {
    resolvers: Vec<Box<dyn Resolver>>,
    limits: Limits,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
            limits: Limits::default(),
        }
    }

    pub fn resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Appends builtin, generated and structural resolvers, in that order.
    pub fn with_default_resolvers(self) -> Self {
        self.resolver(BuiltinResolver)
            .resolver(GeneratedResolver::new())
            .resolver(StructuralResolver::new())
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            resolvers: self.resolvers,
            cache: DashMap::new(),
            graph: Mutex::new(WaitGraph::default()),
            limits: self.limits,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
