//! Value specifications: the declarative, unresolved form of constructor
//! arguments and property values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The coercion target of a scalar value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Int,
    Float,
    String,
    Null,
}

impl FromStr for ScalarType {
    type Err = TypeError;

    /// Accepts `bool`/`boolean`, `int`/`integer`, `float`, `string` and
    /// `null`, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(Self::Bool),
            "int" | "integer" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::String),
            "null" => Ok(Self::Null),
            _ => Err(TypeError::UnknownScalarType(s.to_string())),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Null => "null",
        };
        f.write_str(s)
    }
}

/// One node of a value specification tree.
///
/// Declared scalar types are kept as raw strings and validated when the node
/// is resolved, so a malformed document only fails for the definitions that
/// are actually requested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueSpec {
    /// Literal text coerced to `ty` (string when absent).
    Scalar {
        raw: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        preserve_whitespace: bool,
    },
    /// The null value.
    Null,
    /// The bare identifier of another definition, checked for existence.
    IdRef { target: String },
    /// The live instance of another definition.
    Ref { target: String },
    /// An ordered sequence.
    List { items: Vec<ValueSpec> },
    /// An ordered sequence of keyed entries.
    Map { entries: Vec<MapEntry> },
    /// A node kind the container does not understand. Resolving it fails.
    Unrecognized { node: String },
}

/// One `key => value` entry of a [`ValueSpec::Map`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: String,
    pub value: ValueSpec,
}

impl ValueSpec {
    /// An untyped (string) scalar.
    pub fn string(raw: impl Into<String>) -> Self {
        Self::Scalar {
            raw: raw.into(),
            ty: None,
            preserve_whitespace: false,
        }
    }

    /// A scalar with a declared coercion type.
    pub fn typed(raw: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::Scalar {
            raw: raw.into(),
            ty: Some(ty.into()),
            preserve_whitespace: false,
        }
    }

    /// An untyped scalar whose surrounding whitespace is kept.
    pub fn preserved(raw: impl Into<String>) -> Self {
        Self::Scalar {
            raw: raw.into(),
            ty: None,
            preserve_whitespace: true,
        }
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Self::Ref {
            target: target.into(),
        }
    }

    pub fn idref(target: impl Into<String>) -> Self {
        Self::IdRef {
            target: target.into(),
        }
    }

    pub fn list(items: impl IntoIterator<Item = ValueSpec>) -> Self {
        Self::List {
            items: items.into_iter().collect(),
        }
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, ValueSpec)>) -> Self {
        Self::Map {
            entries: entries
                .into_iter()
                .map(|(key, value)| MapEntry {
                    key: key.into(),
                    value,
                })
                .collect(),
        }
    }

    /// Short name of the node kind, for diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Self::Scalar { .. } => "value",
            Self::Null => "null",
            Self::IdRef { .. } => "idref",
            Self::Ref { .. } => "ref",
            Self::List { .. } => "list",
            Self::Map { .. } => "map",
            Self::Unrecognized { node } => node,
        }
    }

    /// Identifiers of every definition this node instantiates through `ref`,
    /// depth first, in declaration order. `idref` targets are not included
    /// because they are never instantiated.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Ref { target } => out.push(target),
            Self::List { items } => items.iter().for_each(|item| item.collect_references(out)),
            Self::Map { entries } => entries
                .iter()
                .for_each(|entry| entry.value.collect_references(out)),
            Self::Scalar { .. } | Self::Null | Self::IdRef { .. } | Self::Unrecognized { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_type_aliases() {
        assert_eq!("boolean".parse::<ScalarType>().unwrap(), ScalarType::Bool);
        assert_eq!("BOOL".parse::<ScalarType>().unwrap(), ScalarType::Bool);
        assert_eq!("Integer".parse::<ScalarType>().unwrap(), ScalarType::Int);
        assert_eq!("float".parse::<ScalarType>().unwrap(), ScalarType::Float);
        assert_eq!("null".parse::<ScalarType>().unwrap(), ScalarType::Null);
    }

    #[test]
    fn scalar_type_rejects_others() {
        for bad in ["double", "array", "object", "ints", ""] {
            assert!(bad.parse::<ScalarType>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn references_walk_nested_nodes_in_order() {
        let spec = ValueSpec::list([
            ValueSpec::reference("a"),
            ValueSpec::map([
                ("x", ValueSpec::reference("b")),
                ("y", ValueSpec::idref("not_followed")),
            ]),
            ValueSpec::reference("c"),
        ]);
        assert_eq!(spec.references(), vec!["a", "b", "c"]);
    }

    #[test]
    fn kind_names() {
        assert_eq!(ValueSpec::Null.kind(), "null");
        assert_eq!(ValueSpec::string("x").kind(), "value");
        assert_eq!(
            ValueSpec::Unrecognized {
                node: "expression".into()
            }
            .kind(),
            "expression"
        );
    }

    #[test]
    fn serde_tags_by_kind() {
        let json = serde_json::to_value(ValueSpec::typed("5", "int")).unwrap();
        assert_eq!(json["kind"], "scalar");
        assert_eq!(json["raw"], "5");
        assert_eq!(json["ty"], "int");
        assert!(json.get("preserve_whitespace").is_none());
    }
}
