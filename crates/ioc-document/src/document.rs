use std::path::Path;

use ioc_types::{ContextHash, ObjectDefinition};
use tracing::info;

use crate::error::DocumentResult;
use crate::parser::{DocumentFormat, DocumentParser};

/// A parsed definition document together with its source text.
///
/// The source text is kept so that the context hash is derived from exactly
/// what was read.
#[derive(Clone, Debug)]
pub struct Document {
    format: DocumentFormat,
    raw: String,
    definitions: Vec<ObjectDefinition>,
}

impl Document {
    /// Parse document text with the built-in parser for `format`.
    pub fn parse(raw: impl Into<String>, format: DocumentFormat) -> DocumentResult<Self> {
        Self::parse_with(raw, format.parser().as_ref())
    }

    /// Parse document text with a caller-supplied parser.
    pub fn parse_with(raw: impl Into<String>, parser: &dyn DocumentParser) -> DocumentResult<Self> {
        let raw = raw.into();
        let definitions = parser.parse(&raw)?;
        Ok(Self {
            format: parser.format(),
            raw,
            definitions,
        })
    }

    /// Read and parse a file, choosing the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        let raw = std::fs::read_to_string(path)?;
        let doc = Self::parse(raw, format)?;
        info!(
            path = %path.display(),
            format = %format,
            objects = doc.definitions.len(),
            "loaded definition document"
        );
        Ok(doc)
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn definitions(&self) -> &[ObjectDefinition] {
        &self.definitions
    }

    pub fn into_definitions(self) -> Vec<ObjectDefinition> {
        self.definitions
    }

    /// Context hash of the source text.
    pub fn context(&self) -> ContextHash {
        ContextHash::from_document(&self.raw)
    }

    /// Look up a definition by exact identifier.
    pub fn get(&self, id: &str) -> Option<&ObjectDefinition> {
        self.definitions.iter().find(|def| def.id == id)
    }
}

/// Read and parse a definition file. Shorthand for [`Document::load`].
pub fn load_file(path: impl AsRef<Path>) -> DocumentResult<Document> {
    Document::load(path)
}
