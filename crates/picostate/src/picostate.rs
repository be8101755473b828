//! Decorated nodes.
//!
//! A [`Picostate`] is a cheap handle on an immutable, `Arc`-shared tree node.
//! The node holds the plain value (`state`), its decorated children, and a
//! private metadata slot naming its canonical source. Position lives on the
//! handle: the root it was reached from and the keys leading to it. A node
//! therefore never records where it sits, and the same allocation can be
//! shared by every version of a tree that leaves it untouched.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::create::create;
use crate::decorate::PicoType;
use crate::meta::Meta;
use crate::path::{format_path, prefixed, Path, PathKey};
use crate::substate::substate_path;
use crate::types::{Arg, Next, TypeRef, SET};
use crate::{PicostateError, Result};

pub(crate) struct Node {
    pub(crate) ty: Arc<PicoType>,
    pub(crate) state: Arc<Value>,
    pub(crate) children: IndexMap<PathKey, Arc<Node>>,
    pub(crate) slot: Slot,
}

/// Out-of-band metadata stored on a node. Never part of the node's data.
#[derive(Clone, Default)]
pub(crate) struct Slot {
    /// `None` when the node is its own canonical source.
    pub(crate) source: Option<Arc<Node>>,
}

impl Node {
    pub(crate) fn new(ty: Arc<PicoType>, state: Arc<Value>) -> Self {
        Self {
            ty,
            state,
            children: IndexMap::new(),
            slot: Slot::default(),
        }
    }

    pub(crate) fn with_slot(&self, slot: Slot) -> Self {
        Self {
            ty: Arc::clone(&self.ty),
            state: Arc::clone(&self.state),
            children: self.children.clone(),
            slot,
        }
    }

    pub(crate) fn with_children(&self, children: IndexMap<PathKey, Arc<Node>>) -> Self {
        Self {
            ty: Arc::clone(&self.ty),
            state: Arc::clone(&self.state),
            children,
            slot: self.slot.clone(),
        }
    }
}

/// A typed, addressable node of an immutable state tree.
#[derive(Clone)]
pub struct Picostate {
    pub(crate) node: Arc<Node>,
    /// Root of the tree this handle was reached from; `None` for a root.
    pub(crate) context: Option<Arc<Node>>,
    /// Keys from the context root to this node.
    pub(crate) path: Path,
}

impl Picostate {
    pub(crate) fn root(node: Arc<Node>) -> Self {
        Self {
            node,
            context: None,
            path: Path::new(),
        }
    }

    /// A handle on `node` at `path` under `context`.
    pub(crate) fn within(node: Arc<Node>, context: Arc<Node>, path: Path) -> Self {
        if Arc::ptr_eq(&node, &context) {
            return Self::root(node);
        }
        Self {
            node,
            context: Some(context),
            path,
        }
    }

    pub(crate) fn context_node(&self) -> Arc<Node> {
        self.context
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.node))
    }

    /// The same position, viewed through another node.
    pub(crate) fn with_node(&self, node: Arc<Node>) -> Self {
        Self {
            node,
            context: self.context.clone(),
            path: self.path.clone(),
        }
    }

    /// The plain value wrapped by this node.
    pub fn state(&self) -> &Arc<Value> {
        &self.node.state
    }

    pub fn value(&self) -> &Value {
        &self.node.state
    }

    /// The domain type this node was created from.
    pub fn ty(&self) -> &TypeRef {
        self.node.ty.ty()
    }

    /// Name of the decorated type, e.g. `Picostate<Person>`.
    pub fn type_name(&self) -> &str {
        self.node.ty.name()
    }

    /// Keys from the context root to this node.
    pub fn path(&self) -> &[PathKey] {
        &self.path
    }

    /// Whether both handles point at the same node allocation.
    pub fn ptr_eq(a: &Picostate, b: &Picostate) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }

    /// The child at `key`: a declared field, or a child the type builds on
    /// demand (such as a sequence item). `None` when there is no such child.
    pub fn child(&self, key: impl Into<PathKey>) -> Option<Picostate> {
        let key = key.into();
        match self.node.children.get(&key) {
            Some(child) => Some(Picostate::within(
                Arc::clone(child),
                self.context_node(),
                prefixed(&self.path, std::slice::from_ref(&key)),
            )),
            None => self.ty().child_at(self, &key),
        }
    }

    /// All children in order: type-provided keys first, then declared fields.
    pub fn children(&self) -> Vec<(PathKey, Picostate)> {
        let mut keys = self.ty().child_keys(&self.node.state);
        for key in self.node.children.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys.into_iter()
            .filter_map(|key| self.child(key.clone()).map(|child| (key, child)))
            .collect()
    }

    /// Replaces this node's value and returns the new root.
    ///
    /// Handing back the node's own state returns the current root untouched.
    /// A decorated node is adopted as is; any other plain value is assembled
    /// into a fresh node of this node's type first.
    pub fn set(&self, next: impl Into<Next>) -> Result<Picostate> {
        let meta = Meta::get(self);
        let replacement = match next.into() {
            Next::Value(value) if Arc::ptr_eq(&value, &self.node.state) => {
                return Ok(meta.context);
            }
            Next::Value(value) => create(self.ty(), value)?,
            Next::Node(node) => node,
        };
        if meta.path.is_empty() {
            return Ok(Picostate::root(Meta::source(&replacement).node));
        }
        tracing::trace!(path = %format_path(&meta.path), ty = self.type_name(), "replacing node");
        substate_path(&meta.path)
            .set(Some(replacement), &Some(meta.context))
            .ok_or_else(|| PicostateError::Unreachable {
                path: format_path(&meta.path),
            })
    }

    /// Runs the transition `name` and returns the new root.
    ///
    /// The transition sees the canonical source of this node, never a stale
    /// wrapper; its result goes through [`Picostate::set`].
    pub fn invoke(&self, name: &str, args: &[Arg]) -> Result<Picostate> {
        if name == SET {
            let next = args
                .first()
                .cloned()
                .and_then(Arg::into_next)
                .ok_or_else(|| PicostateError::InvalidArgument {
                    transition: SET.to_owned(),
                    reason: "expected a value or a node".to_owned(),
                })?;
            return self.set(next);
        }
        let transition =
            self.node
                .ty
                .transition(name)
                .ok_or_else(|| PicostateError::UnknownTransition {
                    ty: self.type_name().to_owned(),
                    name: name.to_owned(),
                })?;
        tracing::trace!(
            ty = self.type_name(),
            transition = name,
            path = %format_path(self.path()),
            "invoking transition"
        );
        let next = transition(&Meta::source(self), args)?;
        self.set(next)
    }
}

impl PartialEq for Picostate {
    fn eq(&self, other: &Self) -> bool {
        self.node.state == other.node.state
    }
}

impl fmt::Debug for Picostate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Picostate")
            .field("type", &self.type_name())
            .field("path", &format_path(self.path()))
            .field("state", &*self.node.state)
            .finish()
    }
}
