//! Type descriptors
//!
//! A [`TypeDescriptor`] is what the resolvers see of a type: its identity,
//! its structural [`Shape`], the descriptors of its type arguments, the
//! [`Capabilities`] it declares, and the codec templates it can be
//! instantiated with. Descriptors are produced by [`Reflect`] impls, which is
//! where the monomorphized template instantiations come from: the classifier
//! picks a template by shape, the type supplies the concrete code for it.
//!
//! ```text
//! Vec<i32>::descriptor()
//! +-- id / type_name
//! +-- shape: Generic(Definition::VEC)
//! +-- args: [i32::descriptor()]
//! +-- templates: [(List, ..), (Collection, ..)]
//! +-- capabilities: DEFAULT_CTOR | INSERT
//! ```

use std::any::{type_name, TypeId};
use std::fmt;

use bitflags::bitflags;

use crate::ErasedCodec;

/// Builds a codec for a type from the resolved codecs of its type arguments,
/// in argument order. Returns `None` if `args` do not fit.
pub type Instantiate = fn(&[ErasedCodec]) -> Option<ErasedCodec>;

/// Builds a fixed (hand-written or generated) codec.
pub type Factory = fn() -> ErasedCodec;

/// Identifies a parametric type independent of its type arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Definition(&'static str);

impl Definition {
    pub const VEC: Self = Self("alloc::vec::Vec");
    pub const VEC_DEQUE: Self = Self("alloc::collections::VecDeque");
    pub const LINKED_LIST: Self = Self("alloc::collections::LinkedList");
    pub const HASH_SET: Self = Self("std::collections::HashSet");
    pub const BTREE_SET: Self = Self("alloc::collections::BTreeSet");
    pub const HASH_MAP: Self = Self("std::collections::HashMap");
    pub const BTREE_MAP: Self = Self("alloc::collections::BTreeMap");
    pub const STACK: Self = Self("codex::Stack");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

/// Structural category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// No structure the classifier understands.
    Opaque,
    /// Array with `rank` dimensions over a single element type argument.
    Array { rank: usize },
    /// Optional wrapper over one type argument.
    Nullable,
    /// Two-slot key/value pair.
    KeyValue,
    /// Deferred single-value handle.
    Deferred,
    /// Fixed-arity tuple; the arity is the number of type arguments.
    Tuple,
    /// View over a contiguous range of elements.
    Segment,
    /// Instantiation of a parametric definition.
    Generic(Definition),
}

/// Parametric codec templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    Array,
    Nullable,
    KeyValue,
    Deferred,
    Tuple,
    Segment,
    List,
    Set,
    Queue,
    Stack,
    LinkedList,
    Map,
    /// Sequence built by repeated single-element insertion.
    Collection,
    /// Map built by repeated key/value insertion.
    Dictionary,
    /// Non-parametric sequence of dynamic values.
    UntypedList,
    /// Non-parametric string-keyed map of dynamic values.
    UntypedMap,
}

impl Template {
    fn implied_capabilities(self) -> Capabilities {
        match self {
            Template::Collection => Capabilities::DEFAULT_CTOR | Capabilities::INSERT,
            Template::Dictionary => Capabilities::DEFAULT_CTOR | Capabilities::INSERT_KEY_VALUE,
            Template::UntypedList => Capabilities::DEFAULT_CTOR | Capabilities::UNTYPED_SEQUENCE,
            Template::UntypedMap => Capabilities::DEFAULT_CTOR | Capabilities::UNTYPED_MAP,
            _ => Capabilities::empty(),
        }
    }
}

bitflags! {
    /// Structural capabilities a type declares.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Constructible with no arguments.
        const DEFAULT_CTOR = 1 << 0;
        /// Accepts single elements.
        const INSERT = 1 << 1;
        /// Accepts key/value pairs.
        const INSERT_KEY_VALUE = 1 << 2;
        /// Holds a sequence of dynamic values.
        const UNTYPED_SEQUENCE = 1 << 3;
        /// Holds a string-keyed map of dynamic values.
        const UNTYPED_MAP = 1 << 4;
    }
}

/// Runtime description of a type, used as the registry cache key and as the
/// input to classification.
#[derive(Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    shape: Shape,
    args: Vec<TypeDescriptor>,
    capabilities: Capabilities,
    templates: Vec<(Template, Instantiate)>,
    factory: Option<Factory>,
}

impl TypeDescriptor {
    pub fn new<T: 'static>(shape: Shape) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            shape,
            args: Vec::new(),
            capabilities: Capabilities::empty(),
            templates: Vec::new(),
            factory: None,
        }
    }

    /// A type with no structure, resolvable only by a fixed codec.
    pub fn opaque<T: 'static>() -> Self {
        Self::new::<T>(Shape::Opaque)
    }

    /// A type whose codec is built by `factory`.
    pub fn record<T: 'static>(factory: Factory) -> Self {
        Self::opaque::<T>().with_factory(factory)
    }

    pub fn generic<T: 'static>(definition: Definition, args: Vec<TypeDescriptor>) -> Self {
        Self::new::<T>(Shape::Generic(definition)).with_args(args)
    }

    pub fn with_args(mut self, args: Vec<TypeDescriptor>) -> Self {
        self.args = args;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities |= capabilities;
        self
    }

    /// Declares that the type can be built with `template`.
    pub fn with_template(mut self, template: Template, instantiate: Instantiate) -> Self {
        self.capabilities |= template.implied_capabilities();
        self.templates.push((template, instantiate));
        self
    }

    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn args(&self) -> &[TypeDescriptor] {
        &self.args
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn instantiator(&self, template: Template) -> Option<Instantiate> {
        self.templates
            .iter()
            .find(|(t, _)| *t == template)
            .map(|(_, instantiate)| *instantiate)
    }

    pub fn factory(&self) -> Option<Factory> {
        self.factory
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("args", &self.args.iter().map(|a| a.name).collect::<Vec<_>>())
            .field("capabilities", &self.capabilities)
            .field(
                "templates",
                &self.templates.iter().map(|(t, _)| *t).collect::<Vec<_>>(),
            )
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

/// Types that can describe themselves to the registry.
///
/// This is where a type opts in to codec resolution: leaf types attach a
/// factory (usually via `#[derive(Record)]`), structured types declare a
/// shape and the templates they support.
pub trait Reflect: 'static {
    fn descriptor() -> TypeDescriptor;
}
