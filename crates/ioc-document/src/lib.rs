//! Definition documents for the ioc container.
//!
//! A document lists object definitions in JSON or TOML. Parsing checks
//! identifiers, rejects duplicate objects and properties, and turns every
//! value node into an [`ioc_types::ValueSpec`]. Nothing is resolved here.
//!
//! # Modules
//!
//! - [`parser`]: the [`DocumentParser`] trait and the JSON and TOML parsers
//! - [`document`]: [`Document`], a parsed document with its source text
//! - [`error`]: [`DocumentError`]

pub mod document;
pub mod error;
pub mod parser;
mod raw;

pub use document::{load_file, Document};
pub use error::{DocumentError, DocumentResult};
pub use parser::{DocumentFormat, DocumentParser, JsonDocumentParser, TomlDocumentParser};
