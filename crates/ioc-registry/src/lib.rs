//! Explicit type registry for the ioc container.
//!
//! The container never discovers types on its own. The host application
//! registers every type it wants the container to build, describing its
//! constructor, static and instance methods, and assignable fields by name.
//!
//! # Modules
//!
//! - [`descriptor`]: [`TypeDescriptor`] and its typed [`TypeBuilder`]
//! - [`registry`]: [`TypeRegistry`] and the [`TypeIntrospection`] trait
//! - [`args`]: [`Args`], positional arguments with typed accessors
//! - [`error`]: [`RegistryError`] and [`InvokeError`]

pub mod args;
pub mod descriptor;
pub mod error;
pub mod registry;

pub use args::Args;
pub use descriptor::{
    FieldDescriptor, MethodDescriptor, MethodKind, TypeBuilder, TypeDescriptor, Visibility,
};
pub use error::{InvokeError, InvokeResult, RegistryError, RegistryResult};
pub use registry::{TypeIntrospection, TypeRegistry};
