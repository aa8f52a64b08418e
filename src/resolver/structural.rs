//! Structural resolution: the type classifier and the shape rule table.

use std::sync::Arc;

use hashbrown::HashMap;

use super::{assemble, Resolver};
use crate::codecs::{ByteArrayCodec, ByteSegmentCodec};
use crate::{
    erase, Capabilities, Definition, ErasedCodec, Registry, ResolveError, Segment, Shape, Template,
    TypeDescriptor,
};

/// Highest array rank with a codec.
const MAX_ARRAY_RANK: usize = 4;

/// Highest tuple arity with a codec.
const MAX_TUPLE_ARITY: usize = 8;

/// The construction rule the classifier picked for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `Box<[u8]>`, written as base64.
    ByteArray,
    Array { rank: usize },
    /// Optional wrapper over a key/value pair, deferred handle or segment.
    Nullable,
    KeyValue,
    Deferred,
    Tuple { arity: usize },
    /// `Segment<u8>`, written as base64.
    ByteSegment,
    Segment,
    /// Matched a shape rule table entry.
    Table(Template),
    /// Unknown definition with one argument, built by repeated insertion.
    Collection,
    /// Unknown definition with two arguments, built by key/value insertion.
    Dictionary,
    UntypedList,
    UntypedMap,
}

impl Rule {
    fn template(self) -> Option<Template> {
        match self {
            Rule::ByteArray | Rule::ByteSegment => None,
            Rule::Array { .. } => Some(Template::Array),
            Rule::Nullable => Some(Template::Nullable),
            Rule::KeyValue => Some(Template::KeyValue),
            Rule::Deferred => Some(Template::Deferred),
            Rule::Tuple { .. } => Some(Template::Tuple),
            Rule::Segment => Some(Template::Segment),
            Rule::Table(template) => Some(template),
            Rule::Collection => Some(Template::Collection),
            Rule::Dictionary => Some(Template::Dictionary),
            Rule::UntypedList => Some(Template::UntypedList),
            Rule::UntypedMap => Some(Template::UntypedMap),
        }
    }
}

// ============================================================================
// Shape rule table
// ============================================================================

/// Maps a parametric definition to the template that builds its codec.
#[derive(Debug, Clone)]
pub struct ShapeRules {
    rules: HashMap<Definition, Template>,
}

impl ShapeRules {
    /// A table with no entries; every parametric type goes to the fallbacks.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn insert(&mut self, definition: Definition, template: Template) -> Option<Template> {
        self.rules.insert(definition, template)
    }

    pub fn get(&self, definition: Definition) -> Option<Template> {
        self.rules.get(&definition).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ShapeRules {
    fn default() -> Self {
        let mut rules = Self::empty();
        rules.insert(Definition::VEC, Template::List);
        rules.insert(Definition::VEC_DEQUE, Template::Queue);
        rules.insert(Definition::LINKED_LIST, Template::LinkedList);
        rules.insert(Definition::HASH_SET, Template::Set);
        rules.insert(Definition::BTREE_SET, Template::Set);
        rules.insert(Definition::STACK, Template::Stack);
        rules.insert(Definition::HASH_MAP, Template::Map);
        rules.insert(Definition::BTREE_MAP, Template::Map);
        rules
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Classifies a descriptor by shape and assembles its codec from the codecs
/// of its type arguments.
#[derive(Debug, Clone, Default)]
pub struct StructuralResolver {
    rules: ShapeRules,
}

impl StructuralResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ShapeRules) -> Self {
        Self { rules }
    }

    /// Adds or replaces a shape rule table entry.
    pub fn with_rule(mut self, definition: Definition, template: Template) -> Self {
        self.rules.insert(definition, template);
        self
    }

    pub fn rules(&self) -> &ShapeRules {
        &self.rules
    }

    /// Picks the construction rule for `descriptor`, first match wins.
    ///
    /// Classification only looks at the descriptor itself; whether the type
    /// arguments have codecs is decided later, during assembly.
    pub fn classify(&self, descriptor: &TypeDescriptor) -> Option<Rule> {
        let has = |template| descriptor.instantiator(template).is_some();

        match descriptor.shape() {
            Shape::Array { rank } => {
                if rank == 1 && descriptor.is::<Box<[u8]>>() {
                    return Some(Rule::ByteArray);
                }
                return ((1..=MAX_ARRAY_RANK).contains(&rank) && has(Template::Array))
                    .then_some(Rule::Array { rank });
            }
            Shape::Nullable => {
                let wraps_special = descriptor.args().first().is_some_and(|inner| {
                    matches!(
                        inner.shape(),
                        Shape::KeyValue | Shape::Deferred | Shape::Segment
                    )
                });
                if wraps_special && has(Template::Nullable) {
                    return Some(Rule::Nullable);
                }
            }
            Shape::KeyValue if has(Template::KeyValue) => return Some(Rule::KeyValue),
            Shape::Deferred if has(Template::Deferred) => return Some(Rule::Deferred),
            Shape::Tuple => {
                let arity = descriptor.arity();
                return ((1..=MAX_TUPLE_ARITY).contains(&arity) && has(Template::Tuple))
                    .then_some(Rule::Tuple { arity });
            }
            Shape::Segment => {
                if descriptor.is::<Segment<u8>>() {
                    return Some(Rule::ByteSegment);
                }
                if has(Template::Segment) {
                    return Some(Rule::Segment);
                }
            }
            Shape::Generic(definition) => {
                if let Some(template) = self.rules.get(definition) {
                    if has(template) {
                        return Some(Rule::Table(template));
                    }
                }
                let capabilities = descriptor.capabilities();
                match descriptor.arity() {
                    1 if capabilities.contains(Capabilities::DEFAULT_CTOR | Capabilities::INSERT)
                        && has(Template::Collection) =>
                    {
                        return Some(Rule::Collection)
                    }
                    2 if capabilities
                        .contains(Capabilities::DEFAULT_CTOR | Capabilities::INSERT_KEY_VALUE)
                        && has(Template::Dictionary) =>
                    {
                        return Some(Rule::Dictionary)
                    }
                    _ => {}
                }
            }
            _ => {}
        }

        let capabilities = descriptor.capabilities();
        if descriptor.arity() == 0 && capabilities.contains(Capabilities::DEFAULT_CTOR) {
            if capabilities.contains(Capabilities::UNTYPED_SEQUENCE) && has(Template::UntypedList) {
                return Some(Rule::UntypedList);
            }
            if capabilities.contains(Capabilities::UNTYPED_MAP) && has(Template::UntypedMap) {
                return Some(Rule::UntypedMap);
            }
        }
        None
    }

    fn build(
        &self,
        rule: Rule,
        descriptor: &TypeDescriptor,
        registry: &Registry,
    ) -> Result<Option<ErasedCodec>, ResolveError> {
        match rule {
            Rule::ByteArray => Ok(Some(erase::<Box<[u8]>>(Arc::new(ByteArrayCodec)))),
            Rule::ByteSegment => Ok(Some(erase::<Segment<u8>>(Arc::new(ByteSegmentCodec)))),
            _ => match rule.template() {
                Some(template) => assemble(registry, descriptor, template),
                None => Ok(None),
            },
        }
    }
}

impl Resolver for StructuralResolver {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        registry: &Registry,
    ) -> Result<Option<ErasedCodec>, ResolveError> {
        match self.classify(descriptor) {
            Some(rule) => {
                tracing::trace!(type_name = descriptor.type_name(), ?rule, "classified");
                self.build(rule, descriptor, registry)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet, VecDeque};

    use super::*;
    use crate::{KeyValue, NdArray, Reflect, Stack};

    fn classify<T: Reflect>() -> Option<Rule> {
        StructuralResolver::new().classify(&T::descriptor())
    }

    #[test]
    fn arrays_by_rank() {
        assert_eq!(classify::<Box<[u8]>>(), Some(Rule::ByteArray));
        assert_eq!(classify::<Box<[u16]>>(), Some(Rule::Array { rank: 1 }));
        assert_eq!(classify::<NdArray<u8, 4>>(), Some(Rule::Array { rank: 4 }));
        assert_eq!(classify::<NdArray<u8, 5>>(), None);
    }

    #[test]
    fn tuples_by_arity() {
        assert_eq!(classify::<(u8,)>(), Some(Rule::Tuple { arity: 1 }));
        assert_eq!(
            classify::<(u8, u8, u8, u8, u8, u8, u8, u8)>(),
            Some(Rule::Tuple { arity: 8 })
        );
        assert_eq!(classify::<()>(), None);
        assert_eq!(classify::<(u8, u8, u8, u8, u8, u8, u8, u8, u8)>(), None);
    }

    #[test]
    fn nullable_unwraps_only_special_shapes() {
        assert_eq!(classify::<Option<KeyValue<u8, u8>>>(), Some(Rule::Nullable));
        assert_eq!(classify::<Option<Segment<u8>>>(), Some(Rule::Nullable));
        #[cfg(feature = "deferred")]
        assert_eq!(
            classify::<Option<std::sync::OnceLock<u8>>>(),
            Some(Rule::Nullable)
        );
        assert_eq!(classify::<Option<Vec<u8>>>(), None);
        assert_eq!(classify::<Option<u8>>(), None);
    }

    #[test]
    fn known_definitions_use_the_table() {
        assert_eq!(classify::<Vec<u8>>(), Some(Rule::Table(Template::List)));
        assert_eq!(classify::<VecDeque<u8>>(), Some(Rule::Table(Template::Queue)));
        assert_eq!(classify::<HashSet<u8>>(), Some(Rule::Table(Template::Set)));
        assert_eq!(classify::<Stack<u8>>(), Some(Rule::Table(Template::Stack)));
        assert_eq!(classify::<BTreeMap<u8, u8>>(), Some(Rule::Table(Template::Map)));
    }

    #[test]
    fn without_a_table_entry_capabilities_decide() {
        let resolver = StructuralResolver::with_rules(ShapeRules::empty());
        assert_eq!(resolver.classify(&Vec::<u8>::descriptor()), Some(Rule::Collection));
        assert_eq!(
            resolver.classify(&BTreeMap::<u8, u8>::descriptor()),
            Some(Rule::Dictionary)
        );
    }

    #[test]
    fn opaque_types_are_not_classified() {
        assert_eq!(classify::<u8>(), None);
        assert_eq!(classify::<String>(), None);
    }
}
