//! Domain types: declared fields and registered transitions.
//!
//! A domain type never sees the tree. Its transitions receive the canonical
//! node for the value they act on (`this`) plus their arguments, and return
//! the next plain value (or `this` to signal "no change").

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use serde_json::Value;

use crate::path::PathKey;
use crate::picostate::Picostate;
use crate::Result;

/// Name of the transition run once on every freshly created node, if a type
/// registers one.
pub const INITIALIZE: &str = "initialize";

/// Name reserved for [`Picostate::set`]; types cannot register it.
pub const SET: &str = "set";

pub type TypeRef = Arc<dyn Type>;

pub type TransitionFn = Arc<dyn Fn(&Picostate, &[Arg]) -> Result<Next> + Send + Sync>;

/// A domain type.
///
/// Types are shared as [`TypeRef`]s. The identity of that `Arc` is the identity
/// of the type: decoration and parameterization are memoized on it.
pub trait Type: Send + Sync + 'static {
    fn name(&self) -> String;

    /// Child fields declared by a zero-argument instance of the type.
    fn fields(&self) -> Vec<Field> {
        Vec::new()
    }

    /// Registers the type's transitions.
    fn transitions(&self, _transitions: &mut Transitions) {}

    /// Type-level setup, run once per distinct parameterization.
    fn initialize_type(&self) {}

    /// Keys of children the type exposes beyond its declared fields.
    fn child_keys(&self, _state: &Value) -> Vec<PathKey> {
        Vec::new()
    }

    /// Builds the child at `key` when it is not a declared field.
    fn child_at(&self, _parent: &Picostate, _key: &PathKey) -> Option<Picostate> {
        None
    }
}

/// A declared child field.
#[derive(Clone)]
pub struct Field {
    pub key: PathKey,
    pub ty: TypeRef,
    /// Plain value used when the parent's value has nothing at `key`.
    pub default: Value,
}

impl Field {
    pub fn new(key: impl Into<PathKey>, ty: TypeRef) -> Self {
        Self {
            key: key.into(),
            ty,
            default: Value::Null,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("ty", &self.ty.name())
            .field("default", &self.default)
            .finish()
    }
}

/// Registration table of a type's transitions, in declaration order.
#[derive(Clone, Default)]
pub struct Transitions {
    table: IndexMap<String, TransitionFn>,
}

impl Transitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define<F>(&mut self, name: impl Into<String>, transition: F) -> &mut Self
    where
        F: Fn(&Picostate, &[Arg]) -> Result<Next> + Send + Sync + 'static,
    {
        self.table.insert(name.into(), Arc::new(transition));
        self
    }

    pub fn get(&self, name: &str) -> Option<&TransitionFn> {
        self.table.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<TransitionFn> {
        self.table.shift_remove(name)
    }
}

impl fmt::Debug for Transitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.table.keys()).finish()
    }
}

/// An argument to a transition.
#[derive(Clone)]
pub enum Arg {
    Value(Arc<Value>),
    Node(Picostate),
    /// A callback run against nodes, e.g. a filter predicate.
    Fn(Arc<dyn Fn(&Picostate) -> Value + Send + Sync>),
    /// A comparator over two nodes, e.g. a sort order.
    Compare(Arc<dyn Fn(&Picostate, &Picostate) -> Ordering + Send + Sync>),
}

impl Arg {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Picostate) -> Value + Send + Sync + 'static,
    {
        Arg::Fn(Arc::new(f))
    }

    pub fn compare<F>(f: F) -> Self
    where
        F: Fn(&Picostate, &Picostate) -> Ordering + Send + Sync + 'static,
    {
        Arg::Compare(Arc::new(f))
    }

    /// The plain value carried by the argument. Nodes yield their state.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            Arg::Node(node) => Some(node.value()),
            Arg::Fn(_) | Arg::Compare(_) => None,
        }
    }

    /// Runs a callback argument against `node`.
    pub fn call(&self, node: &Picostate) -> Option<Value> {
        match self {
            Arg::Fn(f) => Some(f(node)),
            _ => None,
        }
    }

    /// Runs a comparator argument against `a` and `b`.
    pub fn order(&self, a: &Picostate, b: &Picostate) -> Option<Ordering> {
        match self {
            Arg::Compare(f) => Some(f(a, b)),
            _ => None,
        }
    }

    pub(crate) fn into_next(self) -> Option<Next> {
        match self {
            Arg::Value(value) => Some(Next::Value(value)),
            Arg::Node(node) => Some(Next::Node(node)),
            Arg::Fn(_) | Arg::Compare(_) => None,
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Arg::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Arg::Fn(_) => f.write_str("Fn(..)"),
            Arg::Compare(_) => f.write_str("Compare(..)"),
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(Arc::new(value))
    }
}

impl From<Arc<Value>> for Arg {
    fn from(value: Arc<Value>) -> Self {
        Arg::Value(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Value::from(value).into()
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Value::from(value).into()
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Value::from(value).into()
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Value::from(value).into()
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Value::from(value).into()
    }
}

impl From<Picostate> for Arg {
    fn from(node: Picostate) -> Self {
        Arg::Node(node)
    }
}

/// What a transition produced.
#[derive(Debug, Clone)]
pub enum Next {
    /// A plain value. Handing back the node's own state `Arc` is a no-op.
    Value(Arc<Value>),
    /// A decorated node, adopted as is.
    Node(Picostate),
}

impl From<Value> for Next {
    fn from(value: Value) -> Self {
        Next::Value(Arc::new(value))
    }
}

impl From<Arc<Value>> for Next {
    fn from(value: Arc<Value>) -> Self {
        Next::Value(value)
    }
}

impl From<Picostate> for Next {
    fn from(node: Picostate) -> Self {
        Next::Node(node)
    }
}

impl From<&Picostate> for Next {
    fn from(node: &Picostate) -> Self {
        Next::Node(node.clone())
    }
}

/// The unconstrained placeholder type: no fields, no transitions.
#[derive(Debug, Default)]
pub struct AnyType;

impl Type for AnyType {
    fn name(&self) -> String {
        "Any".to_owned()
    }
}

/// The process-wide [`AnyType`] instance.
pub fn any() -> TypeRef {
    static ANY: OnceLock<TypeRef> = OnceLock::new();
    Arc::clone(ANY.get_or_init(|| Arc::new(AnyType)))
}
