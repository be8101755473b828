//! Lenses onto child nodes.
//!
//! [`substate_at`] is where tree surgery happens: its setter installs a new
//! child under a parent and folds the child's plain value into the parent's
//! state. Nodes do not record their position, so the child's allocation is
//! stored as is. Composed along
//! a path by [`substate_path`], a single write at any depth produces a new
//! root in which only the nodes on the written path are new.

use std::sync::Arc;

use crate::lens::{transparent, Lens};
use crate::meta::Meta;
use crate::path::{format_path, value_at, PathKey};
use crate::picostate::{Picostate, Slot};

/// Lens onto the child at `key`.
///
/// Reading yields the canonical source of the child, or `None` when either
/// the parent or the child is absent. Writing the child's current source back
/// returns the parent unchanged; writing `None`, writing into an absent
/// parent, or writing a key the parent's value cannot hold (a non-index key
/// on a sequence) leaves the parent as it is.
pub fn substate_at(key: impl Into<PathKey>) -> Lens<Option<Picostate>, Option<Picostate>> {
    let key = key.into();
    let read_key = key.clone();
    Lens::new(
        move |parent: &Option<Picostate>| {
            let child = parent.as_ref()?.child(read_key.clone())?;
            Some(Meta::source(&child))
        },
        move |child: Option<Picostate>, parent: &Option<Picostate>| match (child, parent) {
            (Some(child), Some(parent)) => Some(install(&key, child, parent)),
            _ => parent.clone(),
        },
    )
}

/// Lens from a root to the node at `path`.
pub fn substate_path(path: &[PathKey]) -> Lens<Option<Picostate>, Option<Picostate>> {
    path.iter()
        .fold(transparent(), |lens, key| lens.compose(&substate_at(key.clone())))
}

fn install(key: &PathKey, child: Picostate, parent: &Picostate) -> Picostate {
    let source = Meta::source(&child);
    if let Some(current) = parent.node.children.get(key) {
        if Arc::ptr_eq(current, &source.node) {
            return parent.clone();
        }
    }

    let lens = value_at(key.clone());
    let state = lens.set(source.value().clone(), parent.value());
    if lens.get(&state) != *source.value() {
        // The parent's value cannot hold the child at `key`.
        tracing::debug!(
            key = %key,
            parent = %format_path(parent.path()),
            "refusing substate the parent value cannot hold"
        );
        return parent.clone();
    }
    tracing::trace!(
        key = %key,
        parent = %format_path(parent.path()),
        ty = source.type_name(),
        "installing substate"
    );

    // Only the parent is copied; every other child keeps its allocation.
    let mut children = parent.node.children.clone();
    children.insert(key.clone(), Arc::clone(&source.node));
    let mut whole = parent.node.with_children(children);
    whole.state = Arc::new(state);
    whole.slot = Slot::default();
    // Every handle read through the new parent takes it as its context.
    Picostate::root(Arc::new(whole))
}
