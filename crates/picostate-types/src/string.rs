use std::sync::{Arc, OnceLock};

use picostate::{Next, Transitions, Type, TypeRef};
use serde_json::Value;

use crate::coerce;

/// A string. `null` reads as the empty string.
#[derive(Debug, Default)]
pub struct StringType;

impl Type for StringType {
    fn name(&self) -> String {
        "String".to_owned()
    }

    fn transitions(&self, transitions: &mut Transitions) {
        transitions.define("concat", |this, args| {
            let mut out = coerce::text(this.value());
            out.push_str(&coerce::text(coerce::operand("concat", args, 0)?));
            Ok(Next::from(Value::from(out)))
        });
    }
}

pub fn string() -> TypeRef {
    static STRING: OnceLock<TypeRef> = OnceLock::new();
    Arc::clone(STRING.get_or_init(|| Arc::new(StringType)))
}
