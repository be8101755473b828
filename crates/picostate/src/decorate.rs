//! Decorated types.
//!
//! Decoration is derived once per domain type and then shared: the registry
//! is keyed by the identity of the type's `Arc`, so every node created from
//! the same [`TypeRef`] points at the same [`PicoType`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::types::{TransitionFn, Transitions, TypeRef, INITIALIZE, SET};

/// A domain type together with its collected transitions.
pub struct PicoType {
    ty: TypeRef,
    name: String,
    transitions: Transitions,
}

impl PicoType {
    fn derive(ty: &TypeRef) -> Self {
        let mut transitions = Transitions::new();
        ty.transitions(&mut transitions);
        if transitions.remove(SET).is_some() {
            tracing::warn!(ty = %ty.name(), "dropping reserved transition `set`");
        }
        Self {
            ty: Arc::clone(ty),
            name: format!("Picostate<{}>", ty.name()),
            transitions,
        }
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transition(&self, name: &str) -> Option<&TransitionFn> {
        self.transitions.get(name)
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    pub fn has_initializer(&self) -> bool {
        self.transitions.contains(INITIALIZE)
    }
}

impl fmt::Debug for PicoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PicoType")
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .finish()
    }
}

fn registry() -> &'static Mutex<HashMap<usize, Arc<PicoType>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<usize, Arc<PicoType>>>> = OnceLock::new();
    REGISTRY.get_or_init(Default::default)
}

fn identity(ty: &TypeRef) -> usize {
    Arc::as_ptr(ty) as *const () as usize
}

/// Returns the decorated version of `ty`, deriving it on first use.
///
/// Entries are never evicted. The registry holds on to the type, so its
/// address cannot be reused by another type while the entry exists.
pub fn decorate(ty: &TypeRef) -> Arc<PicoType> {
    let key = identity(ty);
    if let Some(found) = registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Arc::clone(found);
    }

    // Types may create nodes while registering, so derive outside the lock.
    let derived = Arc::new(PicoType::derive(ty));
    let mut registry = registry().lock().unwrap_or_else(PoisonError::into_inner);
    let entry = registry.entry(key).or_insert_with(|| {
        tracing::debug!(ty = %derived.name, "registered decorated type");
        Arc::clone(&derived)
    });
    Arc::clone(entry)
}
