use std::fmt;

use serde::{Deserialize, Serialize};

use crate::definition::ObjectDefinition;
use crate::error::{TypeError, TypeResult};

/// Domain tag prepended to every context hash computation.
const CONTEXT_DOMAIN: &str = "ioc-context-v1";

/// Content-derived identifier of a definition document.
///
/// Two containers built from the same document share a context; containers
/// built from different documents never collide when they share a session
/// store, because session keys are qualified by the context.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextHash([u8; 32]);

impl ContextHash {
    /// Hash raw document text with domain separation.
    pub fn from_document(raw: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(CONTEXT_DOMAIN.as_bytes());
        hasher.update(b":");
        hasher.update(raw.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Hash the JSON form of a definition list, for containers assembled
    /// without a source document.
    pub fn from_definitions(definitions: &[ObjectDefinition]) -> TypeResult<Self> {
        let data =
            serde_json::to_string(definitions).map_err(|e| TypeError::Serialization(e.to_string()))?;
        Ok(Self::from_document(&data))
    }

    /// Create a `ContextHash` from a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> TypeResult<Self> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ContextHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextHash({})", self.short_hex())
    }
}

impl fmt::Display for ContextHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_document_same_context() {
        let a = ContextHash::from_document("objects");
        let b = ContextHash::from_document("objects");
        assert_eq!(a, b);
    }

    #[test]
    fn different_documents_differ() {
        let a = ContextHash::from_document("[[object]]\nid = \"a\"");
        let b = ContextHash::from_document("[[object]]\nid = \"b\"");
        assert_ne!(a, b);
    }

    #[test]
    fn domain_separated_from_plain_blake3() {
        let ctx = ContextHash::from_document("x");
        assert_ne!(ctx.as_bytes(), blake3::hash(b"x").as_bytes());
    }

    #[test]
    fn definitions_hash_is_deterministic() {
        let defs = vec![ObjectDefinition::new("a").of_type("A")];
        let a = ContextHash::from_definitions(&defs).unwrap();
        let b = ContextHash::from_definitions(&defs.clone()).unwrap();
        assert_eq!(a, b);
        let other = vec![ObjectDefinition::new("a").of_type("B")];
        assert_ne!(a, ContextHash::from_definitions(&other).unwrap());
    }

    #[test]
    fn hex_roundtrip() {
        let ctx = ContextHash::from_document("doc");
        assert_eq!(ContextHash::from_hex(&ctx.to_hex()).unwrap(), ctx);
        assert_eq!(ctx.short_hex().len(), 8);
        assert!(ContextHash::from_hex("abcd").is_err());
    }
}
