//! Arrays of a member type.
//!
//! Members are not stored as declared fields. Each one is built on demand
//! from the array's plain value and mounted at its index, so a transition
//! invoked on a member writes through to the array and on up to the root.

use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

use picostate::{
    create, mount, Arg, Next, Parameterized, PathKey, Picostate, PicostateError, Result,
    Transitions, Type, TypeRef, INITIALIZE,
};
use serde_json::Value;

use crate::coerce;

/// An array whose members are of type `of`.
pub struct ArrayType {
    of: TypeRef,
}

impl ArrayType {
    pub fn member_type(&self) -> &TypeRef {
        &self.of
    }
}

impl std::fmt::Debug for ArrayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayType").field("of", &self.of.name()).finish()
    }
}

fn items(this: &Picostate) -> &[Value] {
    this.value().as_array().map(Vec::as_slice).unwrap_or_default()
}

/// Number of members in the array held by `node`; zero for anything that is
/// not an array.
pub fn length(node: &Picostate) -> usize {
    items(node).len()
}

/// Order used by `sort` without a comparator: numbers numerically, anything
/// else by its text.
fn default_order(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        _ => coerce::text(a).cmp(&coerce::text(b)),
    }
}

fn changed_or_this(this: &Picostate, before: usize, next: Vec<Value>) -> Next {
    if next.len() == before {
        Next::from(this)
    } else {
        Next::from(Value::Array(next))
    }
}

/// Resolves a `slice` bound: negative counts from the end, both clamp to
/// the array.
fn bound(value: Option<&Value>, len: usize, default: usize) -> usize {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return default;
    };
    let n = coerce::number(value);
    if n.is_nan() {
        return 0;
    }
    let n = n.trunc();
    if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        n.min(len as f64) as usize
    }
}

fn predicate<'a>(transition: &str, args: &'a [Arg]) -> Result<&'a Arg> {
    match args.first() {
        Some(arg @ Arg::Fn(_)) => Ok(arg),
        _ => Err(PicostateError::InvalidArgument {
            transition: transition.to_owned(),
            reason: "expected a callback".to_owned(),
        }),
    }
}

impl Type for ArrayType {
    fn name(&self) -> String {
        format!("Array<{}>", self.of.name())
    }

    fn transitions(&self, transitions: &mut Transitions) {
        let filter_of = Arc::clone(&self.of);
        let map_of = Arc::clone(&self.of);
        let remove_of = Arc::clone(&self.of);
        let sort_of = Arc::clone(&self.of);

        transitions
            .define(INITIALIZE, |this, args| {
                let value = args.first().and_then(Arg::value).unwrap_or(&Value::Null);
                Ok(match value {
                    Value::Null => Next::from(Value::Array(Vec::new())),
                    Value::Array(_) if this.value().is_array() => Next::from(this),
                    Value::Array(list) => Next::from(Value::Array(list.clone())),
                    other => Next::from(Value::Array(vec![other.clone()])),
                })
            })
            .define("push", |this, args| {
                let mut next = items(this).to_vec();
                next.push(coerce::operand("push", args, 0)?.clone());
                Ok(Next::from(Value::Array(next)))
            })
            .define("pop", |this, _| {
                let list = items(this);
                let keep = list.len().saturating_sub(1);
                Ok(Next::from(Value::Array(list[..keep].to_vec())))
            })
            .define("shift", |this, _| {
                let rest = items(this).iter().skip(1).cloned().collect();
                Ok(Next::from(Value::Array(rest)))
            })
            .define("unshift", |this, args| {
                let mut next = vec![coerce::operand("unshift", args, 0)?.clone()];
                next.extend_from_slice(items(this));
                Ok(Next::from(Value::Array(next)))
            })
            .define("slice", |this, args| {
                let list = items(this);
                let begin = bound(args.first().and_then(Arg::value), list.len(), 0);
                let end = bound(args.get(1).and_then(Arg::value), list.len(), list.len());
                let next = list.get(begin..end.max(begin)).unwrap_or_default().to_vec();
                Ok(changed_or_this(this, list.len(), next))
            })
            .define("sort", move |this, args| {
                let list = items(this);
                let mut order: Vec<usize> = (0..list.len()).collect();
                match args.first() {
                    None => order.sort_by(|&a, &b| default_order(&list[a], &list[b])),
                    Some(compare @ Arg::Compare(_)) => {
                        let members = list
                            .iter()
                            .map(|member| create(&sort_of, member.clone()))
                            .collect::<Result<Vec<_>>>()?;
                        order.sort_by(|&a, &b| {
                            compare
                                .order(&members[a], &members[b])
                                .unwrap_or(Ordering::Equal)
                        });
                    }
                    Some(_) => {
                        return Err(PicostateError::InvalidArgument {
                            transition: "sort".to_owned(),
                            reason: "expected a comparator".to_owned(),
                        })
                    }
                }
                if order.iter().enumerate().all(|(at, &from)| at == from) {
                    return Ok(Next::from(this));
                }
                let sorted = order.into_iter().map(|from| list[from].clone()).collect();
                Ok(Next::from(Value::Array(sorted)))
            })
            .define("filter", move |this, args| {
                let keep = predicate("filter", args)?;
                let list = items(this);
                let mut next = Vec::with_capacity(list.len());
                for member in list {
                    let node = create(&filter_of, member.clone())?;
                    if keep.call(&node).as_ref().is_some_and(coerce::truthy) {
                        next.push(member.clone());
                    }
                }
                Ok(changed_or_this(this, list.len(), next))
            })
            .define("map", move |this, args| {
                let f = predicate("map", args)?;
                let list = items(this);
                let mut next = Vec::with_capacity(list.len());
                for member in list {
                    let node = create(&map_of, member.clone())?;
                    next.push(f.call(&node).unwrap_or(Value::Null));
                }
                if next.as_slice() == list {
                    return Ok(Next::from(this));
                }
                Ok(Next::from(Value::Array(next)))
            })
            .define("remove", move |this, args| {
                let item = coerce::operand("remove", args, 0)?;
                let list = items(this);
                let mut next = Vec::with_capacity(list.len());
                for member in list {
                    let node = create(&remove_of, member.clone())?;
                    if node.value() != item {
                        next.push(member.clone());
                    }
                }
                Ok(changed_or_this(this, list.len(), next))
            })
            .define("clear", |_, _| Ok(Next::from(Value::Array(Vec::new()))));
    }

    fn child_keys(&self, state: &Value) -> Vec<PathKey> {
        let len = state.as_array().map_or(0, Vec::len);
        (0..len).map(PathKey::Index).collect()
    }

    fn child_at(&self, parent: &Picostate, key: &PathKey) -> Option<Picostate> {
        let index = key.as_index()?;
        let member = items(parent).get(index)?;
        match create(&self.of, member.clone()) {
            Ok(child) => Some(mount(parent, &child, index)),
            Err(err) => {
                tracing::debug!(index, error = %err, "could not build array member");
                None
            }
        }
    }
}

/// The array type family, parameterized by member type.
pub fn array() -> &'static Parameterized {
    static ARRAY: OnceLock<Parameterized> = OnceLock::new();
    ARRAY.get_or_init(|| {
        Parameterized::new(1, |params| {
            Arc::new(ArrayType {
                of: Arc::clone(&params[0]),
            })
        })
    })
}

/// Arrays of `ty`.
pub fn array_of(ty: TypeRef) -> TypeRef {
    array().of(&[ty])
}
