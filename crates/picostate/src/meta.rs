//! The out-of-band metadata channel.
//!
//! Every handle has a [`Meta`] record: its path from the root, the root
//! (context) it was reached from, and the canonical source of its node.
//! Path and context live on the handle; only the source is stored in the
//! node. The record is
//! read and written only through [`Meta::lens`]; it never shows up in a
//! node's children, its `Debug` output or its equality.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::lens::Lens;
use crate::path::{format_path, prefixed, Path};
use crate::picostate::{Node, Picostate, Slot};
use crate::{PicostateError, Result};

/// Metadata of a node.
#[derive(Clone)]
pub struct Meta {
    pub path: Path,
    /// Root of the tree the node lives in.
    pub context: Picostate,
    /// Canonical node for the plain value. Used to detect no-op writes.
    pub source: Picostate,
}

/// A partial [`Meta`]; fields left `None` keep their current value.
#[derive(Clone, Default)]
pub struct MetaPatch {
    pub path: Option<Path>,
    pub context: Option<Picostate>,
    pub source: Option<Picostate>,
}

impl MetaPatch {
    pub fn path(path: Path) -> Self {
        Self {
            path: Some(path),
            ..Self::default()
        }
    }

    pub fn context(context: Picostate) -> Self {
        Self {
            context: Some(context),
            ..Self::default()
        }
    }

    pub fn source(source: Picostate) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }
}

impl Meta {
    /// The record attached to `node`, or the default `{path: [], context:
    /// node, source: node}` when none was ever attached.
    pub fn get(node: &Picostate) -> Meta {
        Meta::lookup(node)
    }

    /// Like [`Meta::get`] for a node that may be absent.
    pub fn try_get(node: Option<&Picostate>) -> Result<Meta> {
        node.map(Meta::get).ok_or(PicostateError::NullNode)
    }

    /// Reads the record of `node`.
    pub fn lookup(node: &Picostate) -> Meta {
        let source = match &node.node.slot.source {
            Some(source) => node.with_node(Arc::clone(source)),
            None => node.clone(),
        };
        Meta {
            path: node.path.clone(),
            context: Picostate::root(node.context_node()),
            source,
        }
    }

    /// The canonical node `node` resolves to, at the same position.
    pub fn source(node: &Picostate) -> Picostate {
        Meta::get(node).source
    }

    /// The lens onto a node's record.
    ///
    /// Writing the current record back returns the very same handle. Path
    /// and context belong to the handle, so changing them never copies the
    /// node; only a change of source does.
    pub fn lens() -> Lens<Picostate, Meta> {
        Lens::new(Meta::lookup, |meta: Meta, node: &Picostate| {
            let current_source = node.node.slot.source.as_ref().unwrap_or(&node.node);
            let context = meta.context.node;
            let same_source = Arc::ptr_eq(&meta.source.node, current_source);
            if same_source && meta.path == node.path && Arc::ptr_eq(&context, &node.context_node()) {
                return node.clone();
            }
            let target = if same_source {
                Arc::clone(&node.node)
            } else {
                // The copy is never canonical itself: it points at the
                // canonical node of whatever source the record names.
                let canonical = meta
                    .source
                    .node
                    .slot
                    .source
                    .clone()
                    .unwrap_or_else(|| Arc::clone(&meta.source.node));
                Arc::new(node.node.with_slot(Slot {
                    source: Some(canonical),
                }))
            };
            // A record naming the old allocation as its own context follows
            // the node to its copy.
            if Arc::ptr_eq(&context, &node.node) {
                return Picostate {
                    node: target,
                    context: None,
                    path: meta.path,
                };
            }
            Picostate::within(target, context, meta.path)
        })
    }

    /// Merges `f(current)` over the record of `node`.
    pub fn map<F>(f: F, node: &Picostate) -> Picostate
    where
        F: FnOnce(&Meta) -> MetaPatch,
    {
        Meta::lens().over(
            |meta| {
                let patch = f(&meta);
                meta.merge(patch)
            },
            node,
        )
    }

    /// Applies [`Meta::map`] to `node` and to every decorated descendant.
    ///
    /// Each descendant is visited once, through a handle positioned under
    /// the mapped node. Only source changes stick to descendants: their path
    /// and context always follow from the handle they are read through.
    /// Subtrees that come out unchanged keep their allocation.
    pub fn treemap<F>(f: &F, node: &Picostate) -> Picostate
    where
        F: Fn(&Meta) -> MetaPatch,
    {
        let mapped = Meta::map(f, node);
        let mut changed = false;
        let children: IndexMap<_, _> = mapped
            .node
            .children
            .iter()
            .map(|(key, child)| {
                let handle = Picostate::within(
                    Arc::clone(child),
                    mapped.context_node(),
                    prefixed(&mapped.path, std::slice::from_ref(key)),
                );
                let next = Meta::treemap(f, &handle).node;
                changed |= !Arc::ptr_eq(&next, child);
                (key.clone(), next)
            })
            .collect();
        if !changed {
            return mapped;
        }
        let node: Arc<Node> = Arc::new(mapped.node.with_children(children));
        mapped.with_node(node)
    }

    fn merge(self, patch: MetaPatch) -> Meta {
        Meta {
            path: patch.path.unwrap_or(self.path),
            context: patch.context.unwrap_or(self.context),
            source: patch.source.unwrap_or(self.source),
        }
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meta")
            .field("path", &format_path(&self.path))
            .field("context", &self.context.type_name())
            .field("source", &self.source.type_name())
            .finish()
    }
}
