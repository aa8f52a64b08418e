use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use codex::codecs::{I32Codec, StringCodec};
use codex::resolver::{GeneratedResolver, Rule, ShapeRules, StructuralResolver};
use codex::{
    erase, templates, Codec, CodecError, Definition, Dynamic, JsonReader, JsonWriter, KeyValue,
    NdArray, Reflect, Registry, ResolveError, Resolver, Template, TypeDescriptor,
};

/// A type nothing knows how to encode.
struct Opaque;

impl Reflect for Opaque {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
    }
}

// ============================================================================
// User-defined containers
// ============================================================================

const BAG: Definition = Definition::new("tests::Bag");

/// Sequence-like container the shape rule table does not know about.
#[derive(Debug, PartialEq)]
struct Bag<T>(Vec<T>);

impl<T> Default for Bag<T> {
    fn default() -> Self {
        Bag(Vec::new())
    }
}

impl<T> Extend<T> for Bag<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<T> FromIterator<T> for Bag<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Bag(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a Bag<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Reflect> Reflect for Bag<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(BAG, vec![T::descriptor()])
            .with_template(Template::List, templates::list::<Self, T>)
            .with_template(Template::Collection, templates::collection::<Self, T>)
    }
}

/// Map-like container built by key/value insertion.
#[derive(Debug, PartialEq)]
struct Index<K: Ord, V>(BTreeMap<K, V>);

impl<K: Ord, V> Default for Index<K, V> {
    fn default() -> Self {
        Index(BTreeMap::new())
    }
}

impl<K: Ord, V> Extend<(K, V)> for Index<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a Index<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::collections::btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Reflect + Ord, V: Reflect> Reflect for Index<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::generic::<Self>(
            Definition::new("tests::Index"),
            vec![K::descriptor(), V::descriptor()],
        )
        .with_template(Template::Dictionary, templates::dictionary::<Self, K, V>)
    }
}

/// Non-parametric list of dynamic values.
#[derive(Debug, Default, PartialEq)]
struct Log(Vec<Dynamic>);

impl Extend<Dynamic> for Log {
    fn extend<I: IntoIterator<Item = Dynamic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Log {
    type Item = &'a Dynamic;
    type IntoIter = std::slice::Iter<'a, Dynamic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Reflect for Log {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
            .with_template(Template::UntypedList, templates::untyped_list::<Self>)
    }
}

/// Non-parametric string-keyed map of dynamic values.
#[derive(Debug, Default, PartialEq)]
struct Props(BTreeMap<String, Dynamic>);

impl Extend<(String, Dynamic)> for Props {
    fn extend<I: IntoIterator<Item = (String, Dynamic)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Props {
    type Item = (&'a String, &'a Dynamic);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Dynamic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Reflect for Props {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
            .with_template(Template::UntypedMap, templates::untyped_map::<Self>)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn unsupported_shapes_are_absent() {
    let registry = Registry::new();
    assert!(registry.get_codec::<NdArray<u8, 5>>().expect("resolve").is_none());
    assert!(registry.get_codec::<()>().expect("resolve").is_none());
    assert!(registry
        .get_codec::<(u8, u8, u8, u8, u8, u8, u8, u8, u8)>()
        .expect("resolve")
        .is_none());
    assert!(registry.get_codec::<Opaque>().expect("resolve").is_none());
}

#[test]
fn absent_type_arguments_make_the_container_absent() {
    let registry = Registry::new();
    assert!(registry.get_codec::<Vec<Opaque>>().expect("resolve").is_none());
    assert!(registry.get_codec::<HashMap<String, Opaque>>().expect("resolve").is_none());
    assert!(registry.get_codec::<Option<KeyValue<Opaque, u8>>>().expect("resolve").is_none());
    assert!(registry.get_codec::<(u8, Opaque)>().expect("resolve").is_none());
    assert!(registry.get_codec::<Vec<u8>>().expect("resolve").is_some());
}

#[test]
fn nullable_does_not_unwrap_table_shapes() {
    let registry = Registry::new();
    assert!(registry.get_codec::<Option<Vec<u8>>>().expect("resolve").is_none());
    assert!(registry.get_codec::<Option<KeyValue<u8, u8>>>().expect("resolve").is_some());
}

#[test]
fn missing_codec_is_an_encode_error() {
    let registry = Registry::new();
    assert!(matches!(
        registry.to_vec(&vec![Opaque]),
        Err(CodecError::NoCodec { .. })
    ));
}

#[test]
fn lookups_are_idempotent() {
    let registry = Registry::new();
    let first = registry
        .get_codec::<BTreeMap<String, Vec<i32>>>()
        .expect("resolve")
        .expect("codec");
    let cached = registry.cached_len();
    let second = registry
        .get_codec::<BTreeMap<String, Vec<i32>>>()
        .expect("resolve")
        .expect("codec");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.cached_len(), cached);

    assert!(registry.get_codec::<Vec<Opaque>>().expect("resolve").is_none());
    assert!(registry.get_codec::<Vec<Opaque>>().expect("resolve").is_none());
}

#[test]
fn table_entry_wins_over_structural_fallback() {
    let descriptor = Bag::<u8>::descriptor();

    let without_entry = StructuralResolver::new();
    assert_eq!(without_entry.classify(&descriptor), Some(Rule::Collection));

    let with_entry = StructuralResolver::new().with_rule(BAG, Template::List);
    assert_eq!(with_entry.classify(&descriptor), Some(Rule::Table(Template::List)));

    let empty = StructuralResolver::with_rules(ShapeRules::empty());
    assert_eq!(
        empty.classify(&Vec::<u8>::descriptor()),
        Some(Rule::Collection)
    );
    assert_eq!(
        StructuralResolver::new().classify(&Vec::<u8>::descriptor()),
        Some(Rule::Table(Template::List))
    );
}

#[test]
fn structural_fallback_containers_roundtrip() {
    let registry = Registry::new();

    for bag in [Bag(Vec::new()), Bag(vec![7]), Bag(vec![1, 2, 3])] {
        let bytes = registry.to_vec(&bag).expect("encode");
        assert_eq!(registry.from_slice::<Bag<i32>>(&bytes).expect("decode"), bag);
    }

    let index = Index(BTreeMap::from([(3u8, Some("c".to_string())), (1, None)]));
    let bytes = registry.to_vec(&index).expect("encode");
    assert_eq!(bytes, br#"{"1":null,"3":"c"}"#);
    assert_eq!(registry.from_slice::<Index<u8, Option<String>>>(&bytes).expect("decode"), index);
}

#[test]
fn untyped_containers_roundtrip() {
    let registry = Registry::new();

    let log = Log(vec![
        Dynamic::Null,
        Dynamic::from(1),
        Dynamic::from("two"),
        Dynamic::Array(vec![Dynamic::from(true)]),
    ]);
    let bytes = registry.to_vec(&log).expect("encode");
    assert_eq!(bytes, br#"[null,1,"two",[true]]"#);
    assert_eq!(registry.from_slice::<Log>(&bytes).expect("decode"), log);

    let props = Props(BTreeMap::from([
        ("a".to_string(), Dynamic::from(2.5)),
        ("b".to_string(), Dynamic::Object(BTreeMap::new())),
    ]));
    let bytes = registry.to_vec(&props).expect("encode");
    assert_eq!(registry.from_slice::<Props>(&bytes).expect("decode"), props);
}

#[test]
fn untyped_slots_encode_by_runtime_type() {
    let registry = Registry::new();
    let log = Log(vec![
        Dynamic::typed(vec![1u8, 2]),
        Dynamic::typed(KeyValue::new("k".to_string(), 'v')),
        Dynamic::typed(Bag(vec![true])),
    ]);
    let bytes = registry.to_vec(&log).expect("encode");
    assert_eq!(bytes, br#"[[1,2],{"Key":"k","Value":"v"},[true]]"#);

    let unsupported = Log(vec![Dynamic::typed(Opaque)]);
    assert!(matches!(
        registry.to_vec(&unsupported),
        Err(CodecError::NoCodec { .. })
    ));
}

/// Writes a `Vec<i32>` as a comma-separated string.
#[derive(Default)]
struct CsvCodec;

impl Codec<Vec<i32>> for CsvCodec {
    fn encode(
        &self,
        value: &Vec<i32>,
        writer: &mut JsonWriter,
        _: &Registry,
    ) -> Result<(), CodecError> {
        let text: Vec<String> = value.iter().map(i32::to_string).collect();
        writer.write_string(&text.join(","));
        Ok(())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _: &Registry) -> Result<Vec<i32>, CodecError> {
        let offset = reader.offset();
        let text = reader.read_string()?;
        text.split(',')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse().map_err(|_| CodecError::InvalidNumber {
                    offset,
                    reason: part.to_string(),
                })
            })
            .collect()
    }
}

#[test]
fn registered_codec_wins_over_structural() {
    let registry = Registry::builder()
        .resolver(codex::resolver::BuiltinResolver)
        .resolver(GeneratedResolver::new().register::<Vec<i32>, CsvCodec>())
        .resolver(StructuralResolver::new())
        .build();

    let bytes = registry.to_vec(&vec![1, 2, 3]).expect("encode");
    assert_eq!(bytes, br#""1,2,3""#);
    assert_eq!(registry.from_slice::<Vec<i32>>(&bytes).expect("decode"), vec![1, 2, 3]);

    // Containers of the registered type pick it up as their element codec.
    let nested = registry.to_vec(&vec![vec![4]]).expect("encode");
    assert_eq!(nested, br#"["4"]"#);
}

#[test]
fn wrong_codec_type_is_reported() {
    struct Confused;

    impl Resolver for Confused {
        fn name(&self) -> &'static str {
            "confused"
        }

        fn resolve(
            &self,
            _: &TypeDescriptor,
            _: &Registry,
        ) -> Result<Option<codex::ErasedCodec>, ResolveError> {
            Ok(Some(erase::<String>(Arc::new(StringCodec))))
        }
    }

    let registry = Registry::builder().resolver(Confused).build();
    assert!(matches!(
        registry.get_codec::<i32>(),
        Err(ResolveError::TypeMismatch { .. })
    ));
    assert!(registry.get_codec::<String>().expect("resolve").is_some());
}

/// A type whose codec needs the codec of a list of itself while being built.
struct Node;

impl Reflect for Node {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
    }
}

struct NodeResolver;

impl Resolver for NodeResolver {
    fn name(&self) -> &'static str {
        "node"
    }

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        registry: &Registry,
    ) -> Result<Option<codex::ErasedCodec>, ResolveError> {
        if !descriptor.is::<Node>() {
            return Ok(None);
        }
        registry.resolve(&Vec::<Node>::descriptor())?;
        Ok(Some(erase::<i32>(Arc::new(I32Codec))))
    }
}

#[test]
fn self_referential_resolution_fails_instead_of_recursing() {
    let registry = Registry::builder()
        .resolver(NodeResolver)
        .resolver(StructuralResolver::new())
        .build();

    let err = registry.get_codec::<Node>().err().expect("cycle");
    assert!(matches!(err, ResolveError::Cycle { .. }));
    assert_eq!(registry.get_codec::<Node>().err().expect("cached"), err);
    assert!(registry.get_codec::<Vec<Node>>().is_err());
}
