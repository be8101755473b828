//! Functional lenses over immutable values.
//!
//! A [`Lens`] pairs a pure getter with a pure setter. Neither touches its
//! arguments: `set` always returns a new context (or the same one when the
//! focus is unchanged).
//!
//! # Example
//!
//! ```
//! use picostate::lens::{compose, over, set, view, Lens};
//!
//! let first: Lens<(i32, (i32, i32)), (i32, i32)> =
//!     Lens::new(|c: &(i32, (i32, i32))| c.1, |v, c: &(i32, (i32, i32))| (c.0, v));
//! let second: Lens<(i32, i32), i32> = Lens::new(|c: &(i32, i32)| c.1, |v, c: &(i32, i32)| (c.0, v));
//! let deep = compose(&first, &second);
//!
//! assert_eq!(view(&deep, &(1, (2, 3))), 3);
//! assert_eq!(set(&deep, 9, &(1, (2, 3))), (1, (2, 9)));
//! assert_eq!(over(&deep, |v| v * 10, &(1, (2, 3))), (1, (2, 30)));
//! ```

use std::fmt;
use std::sync::Arc;

type Getter<S, A> = Arc<dyn Fn(&S) -> A + Send + Sync>;
type Setter<S, A> = Arc<dyn Fn(A, &S) -> S + Send + Sync>;

/// A get/set pair focusing a value of type `A` inside a context of type `S`.
pub struct Lens<S, A> {
    get: Getter<S, A>,
    set: Setter<S, A>,
}

impl<S, A> Clone for Lens<S, A> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<S, A> fmt::Debug for Lens<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens").finish_non_exhaustive()
    }
}

impl<S: 'static, A: 'static> Lens<S, A> {
    pub fn new<G, T>(get: G, set: T) -> Self
    where
        G: Fn(&S) -> A + Send + Sync + 'static,
        T: Fn(A, &S) -> S + Send + Sync + 'static,
    {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn get(&self, context: &S) -> A {
        (self.get)(context)
    }

    pub fn set(&self, value: A, context: &S) -> S {
        (self.set)(value, context)
    }

    /// Applies `f` to the focus and writes the result back.
    pub fn over(&self, f: impl FnOnce(A) -> A, context: &S) -> S {
        self.set(f(self.get(context)), context)
    }

    /// Focuses `inner` through `self`.
    ///
    /// The composite reads with `inner.get(self.get(s))` and writes with
    /// `self.set(inner.set(v, &self.get(s)), s)`, so it obeys the lens laws
    /// whenever both parts do.
    pub fn compose<B: 'static>(&self, inner: &Lens<A, B>) -> Lens<S, B> {
        let outer_get = Arc::clone(&self.get);
        let outer_set = Arc::clone(&self.set);
        let inner_get = Arc::clone(&inner.get);
        let inner_set = Arc::clone(&inner.set);
        let read = Arc::clone(&outer_get);
        Lens {
            get: Arc::new(move |context| inner_get(&read(context))),
            set: Arc::new(move |value, context| {
                let focus = outer_get(context);
                outer_set(inner_set(value, &focus), context)
            }),
        }
    }
}

/// The identity lens: `get(x) = x`, `set(v, _) = v`.
pub fn transparent<S: Clone + 'static>() -> Lens<S, S> {
    Lens::new(|context: &S| context.clone(), |value, _| value)
}

pub fn compose<S: 'static, A: 'static, B: 'static>(
    outer: &Lens<S, A>,
    inner: &Lens<A, B>,
) -> Lens<S, B> {
    outer.compose(inner)
}

pub fn view<S: 'static, A: 'static>(lens: &Lens<S, A>, context: &S) -> A {
    lens.get(context)
}

pub fn set<S: 'static, A: 'static>(lens: &Lens<S, A>, value: A, context: &S) -> S {
    lens.set(value, context)
}

pub fn over<S: 'static, A: 'static>(lens: &Lens<S, A>, f: impl FnOnce(A) -> A, context: &S) -> S {
    lens.over(f, context)
}
