//! Building trees from domain types and plain values.

use std::sync::Arc;

use serde_json::Value;

use crate::decorate::decorate;
use crate::path::{prefixed, PathKey};
use crate::picostate::{Node, Picostate};
use crate::substate::substate_at;
use crate::types::{Arg, TypeRef, INITIALIZE};
use crate::Result;

/// Builds the tree for `value` under `ty`.
///
/// Every declared field gets a child node. If the type registers an
/// `initialize` transition, it runs once on the assembled node with the raw
/// value, and its result is returned instead.
pub fn create(ty: &TypeRef, value: impl Into<Arc<Value>>) -> Result<Picostate> {
    let value = value.into();
    let decorated = decorate(ty);
    let has_initializer = decorated.has_initializer();
    let node = Picostate::root(Arc::new(Node::new(decorated, Arc::clone(&value))));
    let assembled = assemble(ty, node, &value)?;
    if has_initializer {
        return assembled.invoke(INITIALIZE, &[Arg::Value(value)]);
    }
    Ok(assembled)
}

/// Installs a child under `node` for every field `ty` declares.
///
/// The child's value is `value[key]`, or the field's default when that is
/// missing or null.
pub fn assemble(ty: &TypeRef, node: Picostate, value: &Value) -> Result<Picostate> {
    ty.fields().into_iter().try_fold(node, |parent, field| {
        let given = match value {
            Value::Object(map) => map.get(field.key.as_key().as_ref()),
            Value::Array(items) => field.key.as_index().and_then(|index| items.get(index)),
            _ => None,
        };
        let child = match given {
            Some(given) if !given.is_null() => create(&field.ty, given.clone())?,
            _ => create(&field.ty, field.default)?,
        };
        Ok(substate_at(field.key)
            .set(Some(child), &Some(parent.clone()))
            .unwrap_or(parent))
    })
}

/// Places `child` at `key` under `parent` without touching `parent`.
///
/// The returned handle records `parent.path ++ [key]` as its path and
/// `parent`'s root as its context, so transitions invoked on it write
/// through to that root.
pub fn mount(parent: &Picostate, child: &Picostate, key: impl Into<PathKey>) -> Picostate {
    let path = prefixed(parent.path(), &[key.into()]);
    Picostate::within(Arc::clone(&child.node), parent.context_node(), path)
}
