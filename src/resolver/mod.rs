//! Resolver chain
//!
//! A [`Resolver`] is one strategy for producing a codec from a
//! [`TypeDescriptor`]. The registry asks each resolver in turn and keeps the
//! first codec it gets:
//!
//! ```text
//! descriptor
//!     |
//!     v
//! BuiltinResolver ----> scalars, String, Option<scalar>, Dynamic
//!     | absent
//!     v
//! GeneratedResolver --> registered and derived leaf codecs
//!     | absent
//!     v
//! StructuralResolver -> classify by shape, assemble from argument codecs
//!     | absent
//!     v
//!   Absent (cached)
//! ```

mod assemble;
mod builtin;
mod generated;
mod structural;

pub use assemble::assemble;
pub use builtin::BuiltinResolver;
pub use generated::GeneratedResolver;
pub use structural::{Rule, ShapeRules, StructuralResolver};

use crate::{ErasedCodec, Registry, ResolveError, TypeDescriptor};

/// One strategy in the resolver chain.
///
/// `Ok(None)` means "not mine"; the registry moves on to the next resolver.
/// Errors stop the chain and are cached for the descriptor like a codec.
pub trait Resolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        registry: &Registry,
    ) -> Result<Option<ErasedCodec>, ResolveError>;
}
