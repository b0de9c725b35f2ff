use indexmap::IndexMap;
use ioc_types::{is_valid_id, is_valid_name, ObjectDefinition, Scope};

use crate::error::{ContainerError, ContainerResult};

/// Read-only lookup of object definitions by identifier.
///
/// Lookups are exact. Every read is free of side effects and answers
/// absent for identifiers that are not indexed.
#[derive(Debug, Default)]
pub struct DefinitionIndex {
    definitions: IndexMap<String, ObjectDefinition>,
}

impl DefinitionIndex {
    /// Index definitions in document order, rejecting malformed and
    /// duplicate identifiers.
    pub fn new(definitions: Vec<ObjectDefinition>) -> ContainerResult<Self> {
        let mut indexed = IndexMap::with_capacity(definitions.len());
        for definition in definitions {
            Self::check_id(&definition.id)?;
            if indexed.contains_key(&definition.id) {
                return Err(ContainerError::parse(&definition.id, "duplicate object id"));
            }
            indexed.insert(definition.id.clone(), definition);
        }
        Ok(Self {
            definitions: indexed,
        })
    }

    /// The identifier syntax check: `[A-Za-z0-9_]+`.
    pub fn check_id(id: &str) -> ContainerResult<()> {
        if is_valid_id(id) {
            Ok(())
        } else {
            Err(ContainerError::InvalidIdentifier(id.to_string()))
        }
    }

    pub fn lookup(&self, id: &str) -> Option<&ObjectDefinition> {
        self.definitions.get(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Resolved scope of an indexed definition.
    ///
    /// Singleton only when no scope is declared; an unrecognized declared
    /// scope is a parse error.
    pub fn scope_of(&self, id: &str) -> ContainerResult<Option<Scope>> {
        self.lookup(id).map(scope_for).transpose()
    }

    /// Declared type name, absent when it fails `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn type_of(&self, id: &str) -> Option<&str> {
        self.lookup(id)?
            .type_name
            .as_deref()
            .filter(|name| is_valid_name(name))
    }

    /// Identifiers in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ObjectDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

pub(crate) fn scope_for(definition: &ObjectDefinition) -> ContainerResult<Scope> {
    definition
        .declared_scope()
        .map_err(|e| ContainerError::parse(&definition.id, e.to_string()))
}
