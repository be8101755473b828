use std::sync::{Arc, OnceLock};

use picostate::{Next, Transitions, Type, TypeRef};
use serde_json::Value;

use crate::coerce;

/// A boolean. Non-boolean values are read by truthiness.
#[derive(Debug, Default)]
pub struct BooleanType;

impl Type for BooleanType {
    fn name(&self) -> String {
        "Boolean".to_owned()
    }

    fn transitions(&self, transitions: &mut Transitions) {
        transitions.define("toggle", |this, _| {
            Ok(Next::from(Value::from(!coerce::truthy(this.value()))))
        });
    }
}

pub fn boolean() -> TypeRef {
    static BOOLEAN: OnceLock<TypeRef> = OnceLock::new();
    Arc::clone(BOOLEAN.get_or_init(|| Arc::new(BooleanType)))
}
