use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use codex::codecs::StringCodec;
use codex::{
    erase, ErasedCodec, Reflect, Registry, RegistryBuilder, ResolveError, Resolver, TypeDescriptor,
};

const THREADS: usize = 16;

struct Token;

impl Reflect for Token {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
    }
}

struct Unknown;

impl Reflect for Unknown {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
    }
}

/// Builds a codec for `Token` slowly, counting every construction.
struct SlowResolver {
    constructions: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl Resolver for SlowResolver {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        _: &Registry,
    ) -> Result<Option<ErasedCodec>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        if !descriptor.is::<Token>() {
            return Ok(None);
        }
        self.constructions.fetch_add(1, Ordering::SeqCst);
        Ok(Some(erase::<String>(Arc::new(StringCodec))))
    }
}

fn slow_registry() -> (Registry, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let constructions = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = RegistryBuilder::new()
        .resolver(SlowResolver {
            constructions: constructions.clone(),
            calls: calls.clone(),
        })
        .build();
    (registry, constructions, calls)
}

#[test]
fn concurrent_first_lookups_construct_once() {
    let (registry, constructions, _) = slow_registry();
    let barrier = Barrier::new(THREADS);

    let descriptor = Token::descriptor();
    let results: Vec<ErasedCodec> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    registry
                        .resolve(&descriptor)
                        .expect("resolve")
                        .expect("codec")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect()
    });

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert_eq!(results.len(), THREADS);
    for codec in &results[1..] {
        assert!(Arc::ptr_eq(codec, &results[0]));
    }
}

#[test]
fn concurrent_absent_lookups_classify_once() {
    let (registry, _, calls) = slow_registry();
    let barrier = Barrier::new(THREADS);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                barrier.wait();
                assert!(registry.get_codec::<Unknown>().expect("resolve").is_none());
            });
        }
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(registry.cached_len(), 1);
}

struct Left;

impl Reflect for Left {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
    }
}

struct Right;

impl Reflect for Right {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
    }
}

/// `Left` needs `Right` and `Right` needs `Left`; both wait at the barrier
/// so each thread is already building one side when it asks for the other.
struct CrossResolver {
    barrier: Arc<Barrier>,
}

impl Resolver for CrossResolver {
    fn name(&self) -> &'static str {
        "cross"
    }

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        registry: &Registry,
    ) -> Result<Option<ErasedCodec>, ResolveError> {
        let other = if descriptor.is::<Left>() {
            Right::descriptor()
        } else if descriptor.is::<Right>() {
            Left::descriptor()
        } else {
            return Ok(None);
        };
        self.barrier.wait();
        registry.resolve(&other)?;
        Ok(Some(erase::<String>(Arc::new(StringCodec))))
    }
}

#[test]
fn cycle_split_across_threads_fails_instead_of_blocking() {
    let registry = RegistryBuilder::new()
        .resolver(CrossResolver {
            barrier: Arc::new(Barrier::new(2)),
        })
        .build();

    let (left, right) = thread::scope(|scope| {
        let left = scope.spawn(|| registry.resolve(&Left::descriptor()));
        let right = scope.spawn(|| registry.resolve(&Right::descriptor()));
        (
            left.join().expect("thread"),
            right.join().expect("thread"),
        )
    });

    assert!(matches!(left, Err(ResolveError::Cycle { .. })));
    assert!(matches!(right, Err(ResolveError::Cycle { .. })));
    assert!(registry.resolve(&Left::descriptor()).is_err());
    assert!(registry.resolve(&Right::descriptor()).is_err());
}

#[test]
fn concurrent_lookups_of_nested_types_agree() {
    let registry = Registry::new();
    let barrier = Barrier::new(THREADS);

    let outputs: Vec<Vec<u8>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let registry = &registry;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    let value = vec![Some(i as u32), None];
                    let bytes = registry.to_vec(&value).expect("encode");
                    let back: Vec<Option<u32>> = registry.from_slice(&bytes).expect("decode");
                    assert_eq!(back, value);
                    registry.to_vec(&vec![Some(1u32), None]).expect("encode")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect()
    });

    assert!(outputs.iter().all(|o| o == b"[1,null]"));
}
