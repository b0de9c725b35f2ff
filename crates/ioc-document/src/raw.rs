//! Serde shapes of a definition document and their conversion into
//! [`ObjectDefinition`]s.
//!
//! The same shapes are read from JSON and TOML. A document is a list of
//! objects under `object` (TOML `[[object]]` tables) or `objects` (JSON).
//! Every value node is a table carrying exactly one value shape:
//!
//! | key                          | shape                               |
//! |------------------------------|-------------------------------------|
//! | `value` (+ `type`, `preserve-space`) | scalar                      |
//! | `ref` / `value-ref`          | live instance of another object     |
//! | `idref`                      | identifier of another object        |
//! | `list`                       | ordered value nodes                 |
//! | `map`                        | ordered value nodes with `key`      |
//! | `null = true`                | null                                |
//!
//! Keys outside this table (for example `expression`) turn the node into
//! [`ValueSpec::Unrecognized`], which fails when it is resolved. A `name`
//! outside a property, a `key` outside a map entry, or a `type` without a
//! `value` is a document error.
//!
//! Scalars keep the text they were written with. Each format supplies its
//! own `Literal` reader for that.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::marker::PhantomData;

use ioc_types::{is_valid_id, MapEntry, ObjectDefinition, PropertySpec, ValueSpec};
use serde::de::{self, DeserializeOwned, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

use crate::error::{DocumentError, DocumentResult};

/// A scalar `value` as read by one document format.
///
/// The text handed to the container is the literal as written: `3.0` stays
/// `"3.0"` and integers wider than 64 bits keep every digit.
pub(crate) trait Literal: DeserializeOwned {
    /// Literal text of the scalar, given the whole document `source`.
    fn into_text(self, source: &str) -> Result<String, &'static str>;
}

/// JSON keeps the raw token of every value.
impl Literal for Box<RawValue> {
    fn into_text(self, _source: &str) -> Result<String, &'static str> {
        let token = self.get().trim();
        match token {
            "true" => Ok(bool_text(true)),
            "false" => Ok(bool_text(false)),
            _ if token.starts_with('"') => {
                serde_json::from_str(token).map_err(|_| "malformed string literal")
            }
            _ if token.starts_with('{') || token.starts_with('[') => {
                Err("'value' must be a string, number or boolean")
            }
            _ => Ok(token.to_string()),
        }
    }
}

/// Scalar literal as typed by the TOML reader.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TomlScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

/// TOML floats are read back from their span so the written digits survive.
impl Literal for toml::Spanned<TomlScalar> {
    fn into_text(self, source: &str) -> Result<String, &'static str> {
        let span = self.span();
        Ok(match self.into_inner() {
            TomlScalar::Text(s) => s,
            TomlScalar::Integer(i) => i.to_string(),
            TomlScalar::Float(f) => source
                .get(span)
                .map(|written| written.trim().replace('_', ""))
                .unwrap_or_else(|| f.to_string()),
            TomlScalar::Bool(b) => bool_text(b),
        })
    }
}

/// Booleans render as `"1"` and `""` so that string truthiness gives back
/// the written value.
fn bool_text(value: bool) -> String {
    if value {
        "1".to_string()
    } else {
        String::new()
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "L: Literal"))]
pub(crate) struct RawDocument<L> {
    #[serde(default = "Vec::new", rename = "object", alias = "objects")]
    pub objects: Vec<RawObject<L>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", bound(deserialize = "L: Literal"))]
pub(crate) struct RawObject<L> {
    id: Option<String>,
    #[serde(rename = "type")]
    type_name: Option<String>,
    scope: Option<String>,
    factory_object: Option<String>,
    factory_method: Option<String>,
    init_method: Option<String>,
    #[serde(default = "Vec::new", alias = "constructor-args")]
    constructor_arg: Vec<RawNode<L>>,
    #[serde(default = "Vec::new", alias = "properties")]
    property: Vec<RawNode<L>>,
}

#[derive(Debug)]
struct RawNode<L> {
    /// Property name; only meaningful under `property`.
    name: Option<String>,
    /// Entry key; only meaningful under `map`.
    key: Option<String>,
    value: Option<L>,
    ty: Option<String>,
    preserve_space: Option<bool>,
    reference: Option<String>,
    value_ref: Option<String>,
    idref: Option<String>,
    list: Option<Vec<RawNode<L>>>,
    map: Option<Vec<RawNode<L>>>,
    null: Option<bool>,
    /// Keys outside the known node shapes.
    other: BTreeSet<String>,
}

impl<L> RawNode<L> {
    fn empty() -> Self {
        Self {
            name: None,
            key: None,
            value: None,
            ty: None,
            preserve_space: None,
            reference: None,
            value_ref: None,
            idref: None,
            list: None,
            map: None,
            null: None,
            other: BTreeSet::new(),
        }
    }
}

// Read key by key: `#[serde(flatten)]` buffers every value and drops the
// literal token of `value`.
impl<'de, L: Literal> Deserialize<'de> for RawNode<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NodeVisitor(PhantomData))
    }
}

struct NodeVisitor<L>(PhantomData<L>);

impl<'de, L: Literal> Visitor<'de> for NodeVisitor<L> {
    type Value = RawNode<L>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a value node table")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut node = RawNode::empty();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "name" => put(&mut map, &mut node.name, "name")?,
                "key" => put(&mut map, &mut node.key, "key")?,
                "value" => put(&mut map, &mut node.value, "value")?,
                "type" => put(&mut map, &mut node.ty, "type")?,
                "preserve-space" => put(&mut map, &mut node.preserve_space, "preserve-space")?,
                "ref" => put(&mut map, &mut node.reference, "ref")?,
                "value-ref" => put(&mut map, &mut node.value_ref, "value-ref")?,
                "idref" => put(&mut map, &mut node.idref, "idref")?,
                "list" => put(&mut map, &mut node.list, "list")?,
                "map" => put(&mut map, &mut node.map, "map")?,
                "null" => put(&mut map, &mut node.null, "null")?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    node.other.insert(key.clone());
                }
            }
        }
        Ok(node)
    }
}

/// Read the next value into `slot`. An explicit `null` leaves it unset.
fn put<'de, A, T>(map: &mut A, slot: &mut Option<T>, field: &'static str) -> Result<(), A::Error>
where
    A: MapAccess<'de>,
    T: Deserialize<'de>,
{
    if slot.is_some() {
        return Err(de::Error::duplicate_field(field));
    }
    *slot = map.next_value::<Option<T>>()?;
    Ok(())
}

impl<L: Literal> RawNode<L> {
    /// Convert the node. The caller has already taken the `name` of a
    /// property or the `key` of a map entry; any left over is misplaced.
    fn into_spec(self, source: &str, object: &str, location: &str) -> DocumentResult<ValueSpec> {
        if let Some(node) = self.other.into_iter().next() {
            return Ok(ValueSpec::Unrecognized { node });
        }
        if self.name.is_some() {
            return Err(invalid(object, location, "'name' is only allowed on a property"));
        }
        if self.key.is_some() {
            return Err(invalid(object, location, "'key' is only allowed on a map entry"));
        }
        if self.value.is_none() && (self.ty.is_some() || self.preserve_space.is_some()) {
            return Err(invalid(
                object,
                location,
                "'type' and 'preserve-space' only apply to 'value'",
            ));
        }

        let shapes = [
            ("value", self.value.is_some()),
            ("ref", self.reference.is_some()),
            ("value-ref", self.value_ref.is_some()),
            ("idref", self.idref.is_some()),
            ("list", self.list.is_some()),
            ("map", self.map.is_some()),
            ("null", self.null == Some(true)),
        ];
        let present: Vec<&str> = shapes
            .iter()
            .filter(|(_, set)| *set)
            .map(|(shape, _)| *shape)
            .collect();
        match present.len() {
            0 => return Err(invalid(object, location, "node has no value")),
            1 => {}
            _ => {
                return Err(invalid(
                    object,
                    location,
                    format!("conflicting value shapes: {}", present.join(", ")),
                ))
            }
        }

        if let Some(value) = self.value {
            let raw = value
                .into_text(source)
                .map_err(|reason| invalid(object, location, reason))?;
            return Ok(ValueSpec::Scalar {
                raw,
                ty: self.ty,
                preserve_whitespace: self.preserve_space.unwrap_or(false),
            });
        }
        if let Some(target) = self.reference.or(self.value_ref) {
            return Ok(ValueSpec::Ref { target });
        }
        if let Some(target) = self.idref {
            return Ok(ValueSpec::IdRef { target });
        }
        if let Some(items) = self.list {
            let items = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| item.into_spec(source, object, &format!("{location} > list[{i}]")))
                .collect::<DocumentResult<Vec<_>>>()?;
            return Ok(ValueSpec::List { items });
        }
        if let Some(raw_entries) = self.map {
            let mut entries = Vec::with_capacity(raw_entries.len());
            for (i, mut entry) in raw_entries.into_iter().enumerate() {
                let entry_location = format!("{location} > map[{i}]");
                let key = entry
                    .key
                    .take()
                    .ok_or_else(|| invalid(object, &entry_location, "map entry without 'key'"))?;
                let value = entry.into_spec(source, object, &entry_location)?;
                entries.push(MapEntry { key, value });
            }
            return Ok(ValueSpec::Map { entries });
        }
        Ok(ValueSpec::Null)
    }
}

impl<L: Literal> RawObject<L> {
    fn into_definition(self, source: &str, index: usize) -> DocumentResult<ObjectDefinition> {
        let id = self.id.ok_or_else(|| DocumentError::MissingAttribute {
            object: format!("#{index}"),
            attribute: "id",
        })?;
        if !is_valid_id(&id) {
            return Err(DocumentError::InvalidId(id));
        }

        let constructor_args = self
            .constructor_arg
            .into_iter()
            .enumerate()
            .map(|(i, node)| node.into_spec(source, &id, &format!("constructor-arg #{i}")))
            .collect::<DocumentResult<Vec<_>>>()?;

        let mut seen = HashSet::new();
        let mut properties = Vec::with_capacity(self.property.len());
        for mut node in self.property {
            let name = node.name.take().ok_or_else(|| DocumentError::MissingAttribute {
                object: id.clone(),
                attribute: "name",
            })?;
            if !seen.insert(name.clone()) {
                return Err(DocumentError::DuplicateProperty {
                    object: id.clone(),
                    name,
                });
            }
            let value = node.into_spec(source, &id, &format!("property '{name}'"))?;
            properties.push(PropertySpec { name, value });
        }

        Ok(ObjectDefinition {
            id,
            type_name: self.type_name,
            scope: self.scope,
            factory_object: self.factory_object,
            factory_method: self.factory_method,
            init_method: self.init_method,
            constructor_args,
            properties,
        })
    }
}

/// Convert every raw object of a document read from `source`, rejecting
/// duplicate identifiers.
pub(crate) fn into_definitions<L: Literal>(
    doc: RawDocument<L>,
    source: &str,
) -> DocumentResult<Vec<ObjectDefinition>> {
    let mut seen = HashSet::new();
    let mut definitions = Vec::with_capacity(doc.objects.len());
    for (index, object) in doc.objects.into_iter().enumerate() {
        let definition = object.into_definition(source, index)?;
        if !seen.insert(definition.id.clone()) {
            return Err(DocumentError::DuplicateId(definition.id));
        }
        definitions.push(definition);
    }
    Ok(definitions)
}

fn invalid(object: &str, location: &str, reason: impl Into<String>) -> DocumentError {
    DocumentError::InvalidNode {
        object: object.to_string(),
        location: location.to_string(),
        reason: reason.into(),
    }
}
