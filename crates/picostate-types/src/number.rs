use std::sync::{Arc, OnceLock};

use picostate::{Arg, Next, Picostate, Result, Transitions, Type, TypeRef};

use crate::coerce;

/// A number. `null` reads as zero.
#[derive(Debug, Default)]
pub struct NumberType;

fn arithmetic(
    name: &'static str,
    default: Option<f64>,
    op: fn(f64, f64) -> f64,
) -> impl Fn(&Picostate, &[Arg]) -> Result<Next> + Send + Sync + 'static {
    move |this: &Picostate, args: &[Arg]| {
        let operand = match (args.is_empty(), default) {
            (true, Some(step)) => step,
            _ => coerce::number(coerce::operand(name, args, 0)?),
        };
        let current = coerce::number(this.value());
        Ok(Next::from(coerce::from_f64(op(current, operand))))
    }
}

impl Type for NumberType {
    fn name(&self) -> String {
        "Number".to_owned()
    }

    fn transitions(&self, transitions: &mut Transitions) {
        transitions
            .define("increment", arithmetic("increment", Some(1.0), |a, b| a + b))
            .define("decrement", arithmetic("decrement", Some(1.0), |a, b| a - b))
            .define("add", arithmetic("add", None, |a, b| a + b))
            .define("subtract", arithmetic("subtract", None, |a, b| a - b))
            .define("multiply", arithmetic("multiply", None, |a, b| a * b))
            .define("divide", arithmetic("divide", None, |a, b| a / b));
    }
}

pub fn number() -> TypeRef {
    static NUMBER: OnceLock<TypeRef> = OnceLock::new();
    Arc::clone(NUMBER.get_or_init(|| Arc::new(NumberType)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use picostate::{create, PicostateError};
    use serde_json::{json, Value};

    fn run(start: Value, name: &str, args: &[Arg]) -> Value {
        let root = create(&number(), start).unwrap();
        root.invoke(name, args).unwrap().value().clone()
    }

    #[test]
    fn test_increment_and_decrement() {
        assert_eq!(run(json!(1), "increment", &[]), json!(2));
        assert_eq!(run(json!(1), "increment", &[5_i64.into()]), json!(6));
        assert_eq!(run(json!(1), "decrement", &[]), json!(0));
        assert_eq!(run(Value::Null, "increment", &[]), json!(1));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(run(json!(6), "add", &[2_i64.into()]), json!(8));
        assert_eq!(run(json!(6), "subtract", &[2_i64.into()]), json!(4));
        assert_eq!(run(json!(6), "multiply", &[2.5_f64.into()]), json!(15));
        assert_eq!(run(json!(6), "divide", &[4_i64.into()]), json!(1.5));
    }

    #[test]
    fn test_missing_operand() {
        let root = create(&number(), json!(1)).unwrap();
        assert!(matches!(
            root.invoke("add", &[]),
            Err(PicostateError::InvalidArgument { .. })
        ));
    }
}
