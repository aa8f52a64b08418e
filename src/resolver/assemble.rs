use crate::{ErasedCodec, Registry, ResolveError, Template, TypeDescriptor};

/// Builds the codec for `descriptor` from `template`.
///
/// Each type argument is resolved through `registry` first; if any of them
/// has no codec, neither does the assembled type. The result is not cached
/// here, the registry caches it under the outer descriptor.
pub fn assemble(
    registry: &Registry,
    descriptor: &TypeDescriptor,
    template: Template,
) -> Result<Option<ErasedCodec>, ResolveError> {
    let Some(instantiate) = descriptor.instantiator(template) else {
        return Ok(None);
    };

    let mut args = Vec::with_capacity(descriptor.arity());
    for arg in descriptor.args() {
        match registry.resolve(arg)? {
            Some(codec) => args.push(codec),
            None => {
                tracing::debug!(
                    type_name = descriptor.type_name(),
                    argument = arg.type_name(),
                    "type argument has no codec"
                );
                return Ok(None);
            }
        }
    }

    instantiate(&args)
        .map(Some)
        .ok_or(ResolveError::TypeMismatch {
            type_name: descriptor.type_name(),
        })
}
