//! Foundation types for the ioc object container.
//!
//! This crate provides the declarative and runtime types shared by every
//! other ioc crate.
//!
//! # Key Types
//!
//! - [`ObjectDefinition`]: How to build one named object
//! - [`ValueSpec`]: Unresolved constructor argument or property value
//! - [`Scope`]: Lifecycle policy: singleton, prototype or session
//! - [`Value`]: A resolved runtime value
//! - [`ObjectRef`]: Shared handle to a live object
//! - [`ContextHash`]: Content hash identifying a definition document

pub mod context;
pub mod definition;
pub mod error;
pub mod ident;
pub mod scope;
pub mod spec;
pub mod value;

pub use context::ContextHash;
pub use definition::{ObjectDefinition, PropertySpec};
pub use error::{TypeError, TypeResult};
pub use ident::{is_valid_id, is_valid_name, validate_id, validate_name};
pub use scope::Scope;
pub use spec::{MapEntry, ScalarType, ValueSpec};
pub use value::{ObjectRef, Value};
