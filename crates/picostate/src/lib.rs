//! Immutable, path-aware state trees.
//!
//! A domain [`Type`] declares child fields and registers transitions.
//! [`create`] wraps a plain [`serde_json::Value`] in a tree of [`Picostate`]
//! nodes, one per declared field. Invoking a transition on any node, however
//! deep, returns a brand new root; the old tree is left as it was and every
//! subtree off the written path is shared between the two.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use picostate::{create, Field, Next, Transitions, Type, TypeRef};
//! use serde_json::json;
//!
//! struct Text;
//!
//! impl Type for Text {
//!     fn name(&self) -> String {
//!         "Text".to_owned()
//!     }
//!
//!     fn transitions(&self, transitions: &mut Transitions) {
//!         transitions.define("shout", |this, _| {
//!             let loud = this.value().as_str().unwrap_or_default().to_uppercase();
//!             Ok(Next::from(json!(loud)))
//!         });
//!     }
//! }
//!
//! struct Greeting {
//!     text: TypeRef,
//! }
//!
//! impl Type for Greeting {
//!     fn name(&self) -> String {
//!         "Greeting".to_owned()
//!     }
//!
//!     fn fields(&self) -> Vec<Field> {
//!         vec![Field::new("message", Arc::clone(&self.text))]
//!     }
//! }
//!
//! let greeting: TypeRef = Arc::new(Greeting { text: Arc::new(Text) });
//! let root = create(&greeting, json!({"message": "hi"}))?;
//! let next = root.child("message").unwrap().invoke("shout", &[])?;
//!
//! assert_eq!(next.value(), &json!({"message": "HI"}));
//! assert_eq!(root.value(), &json!({"message": "hi"}));
//! # Ok::<(), picostate::PicostateError>(())
//! ```

use thiserror::Error;

pub mod create;
pub mod decorate;
pub mod lens;
pub mod meta;
pub mod parameterized;
pub mod path;
pub mod picostate;
pub mod substate;
pub mod types;

pub use create::{assemble, create, mount};
pub use decorate::{decorate, PicoType};
pub use lens::{compose, over, set, transparent, view, Lens};
pub use meta::{Meta, MetaPatch};
pub use parameterized::Parameterized;
pub use path::{format_path, value_at, Path, PathKey};
pub use crate::picostate::Picostate;
pub use substate::{substate_at, substate_path};
pub use types::{
    any, AnyType, Arg, Field, Next, TransitionFn, Transitions, Type, TypeRef, INITIALIZE, SET,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PicostateError {
    #[error("cannot look up metadata of an absent node")]
    NullNode,
    #[error("{ty} has no transition named `{name}`")]
    UnknownTransition { ty: String, name: String },
    #[error("invalid argument to `{transition}`: {reason}")]
    InvalidArgument { transition: String, reason: String },
    #[error("path `{path}` does not resolve against its context")]
    Unreachable { path: String },
}

pub type Result<T> = std::result::Result<T, PicostateError>;
