//! Resolution engine of the ioc object container.
//!
//! A [`Container`] reads object definitions and builds live, fully wired
//! instances on demand. Constructor arguments and properties may reference
//! other definitions, which are resolved transitively. Each definition has a
//! scope deciding how long its instance lives:
//!
//! - `singleton` (default): built once per container
//! - `prototype`: built fresh on every resolution
//! - `session`: built once per session store and document
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ioc_core::{Container, ObjectFactory};
//! use ioc_document::TomlDocumentParser;
//! use ioc_registry::{TypeDescriptor, TypeRegistry};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let registry = TypeRegistry::new()
//!     .with(
//!         TypeDescriptor::builder::<Greeter>("Greeter")
//!             .constructor(|args| Ok(Greeter { greeting: args.string(0)?.to_string() }))
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let document = r#"
//! [[object]]
//! id = "greeter"
//! type = "Greeter"
//!
//! [[object.constructor-arg]]
//! value = "hello"
//! "#;
//!
//! let container = Container::builder()
//!     .document(document, TomlDocumentParser)
//!     .registry(Arc::new(registry))
//!     .build()
//!     .unwrap();
//!
//! let greeter = container.get_object("greeter").unwrap();
//! assert_eq!(greeter, container.get_object("greeter").unwrap());
//! let greeting = greeter.as_object().unwrap().with(|g: &Greeter| g.greeting.clone());
//! assert_eq!(greeting.as_deref(), Some("hello"));
//! ```

pub mod cache;
pub mod check;
pub mod config;
pub mod error;
pub mod factory;
pub mod index;
pub mod resolver;
pub mod values;

#[cfg(test)]
mod testing;

pub use cache::{ResolutionStack, ScopeCache, StackFrame};
pub use check::{check_definitions, Problem, Severity};
pub use config::{AbsentPolicy, ContainerConfig};
pub use error::{ContainerError, ContainerResult};
pub use factory::{Container, ContainerBuilder, ObjectFactory};
pub use index::DefinitionIndex;
pub use resolver::InstanceResolver;
pub use values::{ReferenceResolver, ValueResolver};
