use serde::{Deserialize, Serialize};

use crate::error::TypeResult;
use crate::scope::Scope;
use crate::spec::ValueSpec;

/// A named property assignment on a definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub value: ValueSpec,
}

/// The declarative description of how to build one named object.
///
/// Attribute strings are stored exactly as declared. Syntax and enum checks
/// happen when an attribute is read, so a single malformed definition does
/// not prevent the rest of a document from being used.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    /// Unique identifier, `[A-Za-z0-9_]+`.
    pub id: String,
    /// Concrete registered type to construct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Declared scope; `None` means singleton.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Definition whose instance provides the factory method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_object: Option<String>,
    /// Instance factory method when `factory_object` is set, otherwise a
    /// static factory method on `type_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_method: Option<String>,
    /// No-argument method invoked after property injection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_method: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructor_args: Vec<ValueSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySpec>,
}

impl ObjectDefinition {
    /// An empty definition with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: None,
            scope: None,
            factory_object: None,
            factory_method: None,
            init_method: None,
            constructor_args: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn of_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Construct through `method` on the instance of definition `object`.
    pub fn with_factory(mut self, object: impl Into<String>, method: impl Into<String>) -> Self {
        self.factory_object = Some(object.into());
        self.factory_method = Some(method.into());
        self
    }

    /// Construct through the static `method` of `type_name`.
    pub fn with_static_factory(mut self, method: impl Into<String>) -> Self {
        self.factory_method = Some(method.into());
        self
    }

    pub fn with_init_method(mut self, method: impl Into<String>) -> Self {
        self.init_method = Some(method.into());
        self
    }

    pub fn with_arg(mut self, value: ValueSpec) -> Self {
        self.constructor_args.push(value);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: ValueSpec) -> Self {
        self.properties.push(PropertySpec {
            name: name.into(),
            value,
        });
        self
    }

    /// The declared scope, defaulting to singleton only when none is declared.
    pub fn declared_scope(&self) -> TypeResult<Scope> {
        match &self.scope {
            Some(raw) => raw.parse(),
            None => Ok(Scope::Singleton),
        }
    }

    /// The `(factory object id, method)` pair when both are declared.
    pub fn instance_factory(&self) -> Option<(&str, &str)> {
        match (&self.factory_object, &self.factory_method) {
            (Some(object), Some(method)) => Some((object.as_str(), method.as_str())),
            _ => None,
        }
    }

    /// The static factory method, which applies only without a factory object.
    pub fn static_factory_method(&self) -> Option<&str> {
        if self.factory_object.is_some() {
            return None;
        }
        self.factory_method.as_deref()
    }

    /// Identifiers of every definition this one instantiates through `ref`,
    /// including its factory object.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps = Vec::new();
        if let Some((object, _)) = self.instance_factory() {
            deps.push(object);
        }
        for arg in &self.constructor_args {
            deps.extend(arg.references());
        }
        for property in &self.properties {
            deps.extend(property.value.references());
        }
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeError;

    #[test]
    fn missing_scope_defaults_to_singleton() {
        let def = ObjectDefinition::new("a");
        assert_eq!(def.declared_scope().unwrap(), Scope::Singleton);
    }

    #[test]
    fn unknown_scope_is_an_error() {
        let def = ObjectDefinition::new("a").with_scope("request");
        assert_eq!(
            def.declared_scope(),
            Err(TypeError::UnknownScope("request".into()))
        );
    }

    #[test]
    fn factory_object_shadows_static_factory() {
        let def = ObjectDefinition::new("a")
            .of_type("Widget")
            .with_factory("maker", "make");
        assert_eq!(def.instance_factory(), Some(("maker", "make")));
        assert_eq!(def.static_factory_method(), None);

        let def = ObjectDefinition::new("b")
            .of_type("Widget")
            .with_static_factory("create");
        assert_eq!(def.instance_factory(), None);
        assert_eq!(def.static_factory_method(), Some("create"));
    }

    #[test]
    fn dependencies_cover_factory_args_and_properties() {
        let def = ObjectDefinition::new("svc")
            .with_factory("maker", "make")
            .with_arg(ValueSpec::reference("db"))
            .with_arg(ValueSpec::idref("ignored"))
            .with_property("log", ValueSpec::list([ValueSpec::reference("logger")]));
        assert_eq!(def.dependencies(), vec!["maker", "db", "logger"]);
    }

    #[test]
    fn serde_skips_empty_fields() {
        let json = serde_json::to_value(ObjectDefinition::new("a")).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "a" }));
    }
}
