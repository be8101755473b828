//! Ready-made types for picostate trees: strings, numbers, booleans and
//! arrays of any other type.
//!
//! # Example
//!
//! ```
//! use picostate::{create, Arg};
//! use picostate_types::{array_of, number};
//! use serde_json::json;
//!
//! let numbers = array_of(number());
//! let root = create(&numbers, json!([1, 2, 3]))?;
//!
//! let pushed = root.invoke("push", &[Arg::from(4_i64)])?;
//! assert_eq!(pushed.value(), &json!([1, 2, 3, 4]));
//!
//! let bumped = root.child(1_usize).unwrap().invoke("increment", &[])?;
//! assert_eq!(bumped.value(), &json!([1, 3, 3]));
//! # Ok::<(), picostate::PicostateError>(())
//! ```

pub mod array;
pub mod boolean;
pub mod coerce;
pub mod number;
pub mod string;

pub use array::{array, array_of, length, ArrayType};
pub use boolean::{boolean, BooleanType};
pub use number::{number, NumberType};
pub use picostate::{any, AnyType};
pub use string::{string, StringType};
