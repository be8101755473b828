//! Types parameterized by other types.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::types::{any, TypeRef};

type Factory = Arc<dyn Fn(&[TypeRef]) -> TypeRef + Send + Sync>;

/// A family of types built from `arity` type parameters.
///
/// Each distinct list of parameters maps to one instance; the instance's
/// [`Type::initialize_type`](crate::types::Type::initialize_type) hook runs
/// right after instantiation, outside the family's lock. The instance with every parameter set to
/// [`any()`] is built up front.
pub struct Parameterized {
    arity: usize,
    factory: Factory,
    /// Keyed by parameter identity. The parameters are kept alive with the
    /// instance so their addresses stay unique.
    instances: Mutex<HashMap<Vec<usize>, (Vec<TypeRef>, TypeRef)>>,
    default: TypeRef,
}

impl Parameterized {
    pub fn new<F>(arity: usize, factory: F) -> Self
    where
        F: Fn(&[TypeRef]) -> TypeRef + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(factory);
        let params = vec![any(); arity];
        let default = instantiate(&factory, &params);
        let mut instances = HashMap::new();
        instances.insert(identities(&params), (params, Arc::clone(&default)));
        Self {
            arity,
            factory,
            instances: Mutex::new(instances),
            default,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The instance with every parameter defaulted.
    pub fn default_type(&self) -> TypeRef {
        Arc::clone(&self.default)
    }

    /// The instance for `params`.
    ///
    /// Missing trailing parameters default to [`any()`]; extra ones are
    /// ignored.
    pub fn of(&self, params: &[TypeRef]) -> TypeRef {
        let mut params: Vec<TypeRef> = params.iter().take(self.arity).cloned().collect();
        params.resize_with(self.arity, any);
        let key = identities(&params);
        if let Some((_, ty)) = self.lock().get(&key) {
            return Arc::clone(ty);
        }
        // Built unlocked so a factory may ask its own family for instances.
        // When two callers race, the first insert wins and the other
        // instance is dropped.
        let built = instantiate(&self.factory, &params);
        let mut instances = self.lock();
        let (_, ty) = instances.entry(key).or_insert((params, built));
        Arc::clone(ty)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Vec<usize>, (Vec<TypeRef>, TypeRef)>> {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn instantiate(factory: &Factory, params: &[TypeRef]) -> TypeRef {
    let ty = factory(params);
    ty.initialize_type();
    tracing::debug!(ty = %ty.name(), "instantiated parameterized type");
    ty
}

fn identities(params: &[TypeRef]) -> Vec<usize> {
    params
        .iter()
        .map(|param| Arc::as_ptr(param) as *const () as usize)
        .collect()
}

impl fmt::Debug for Parameterized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameterized")
            .field("arity", &self.arity)
            .field("default", &self.default.name())
            .finish_non_exhaustive()
    }
}
