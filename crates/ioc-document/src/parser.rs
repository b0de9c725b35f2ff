use std::path::Path;

use ioc_types::ObjectDefinition;
use tracing::debug;

use crate::error::{DocumentError, DocumentResult};
use serde_json::value::RawValue;

use crate::raw::{self, RawDocument, TomlScalar};

/// Turns the text of a definition document into object definitions.
///
/// Implementations only handle syntax; identifier, duplicate and node shape
/// checks are shared by every format.
pub trait DocumentParser: Send + Sync {
    /// The format this parser reads.
    fn format(&self) -> DocumentFormat;

    /// Parse a whole document.
    fn parse(&self, raw: &str) -> DocumentResult<Vec<ObjectDefinition>>;
}

/// Supported document formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick a format from a file extension (`.json` or `.toml`, any case).
    pub fn from_path(path: &Path) -> DocumentResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(DocumentError::UnknownFormat(path.to_path_buf())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    /// The built-in parser for this format.
    pub fn parser(&self) -> Box<dyn DocumentParser> {
        match self {
            Self::Json => Box::new(JsonDocumentParser),
            Self::Toml => Box::new(TomlDocumentParser),
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads documents of the form `{"objects": [{"id": ..., ...}]}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonDocumentParser;

impl DocumentParser for JsonDocumentParser {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Json
    }

    fn parse(&self, raw: &str) -> DocumentResult<Vec<ObjectDefinition>> {
        let doc: RawDocument<Box<RawValue>> =
            serde_json::from_str(raw).map_err(|e| DocumentError::Syntax {
                format: "json",
                message: e.to_string(),
            })?;
        let definitions = raw::into_definitions(doc, raw)?;
        debug!(format = "json", objects = definitions.len(), "parsed definitions");
        Ok(definitions)
    }
}

/// Reads documents made of `[[object]]` tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct TomlDocumentParser;

impl DocumentParser for TomlDocumentParser {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Toml
    }

    fn parse(&self, raw: &str) -> DocumentResult<Vec<ObjectDefinition>> {
        let doc: RawDocument<toml::Spanned<TomlScalar>> =
            toml::from_str(raw).map_err(|e| DocumentError::Syntax {
                format: "toml",
                message: e.to_string(),
            })?;
        let definitions = raw::into_definitions(doc, raw)?;
        debug!(format = "toml", objects = definitions.len(), "parsed definitions");
        Ok(definitions)
    }
}
