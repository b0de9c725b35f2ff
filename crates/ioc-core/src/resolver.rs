use ioc_registry::{Args, RegistryError, TypeIntrospection};
use ioc_types::{is_valid_name, validate_name, ObjectDefinition, ObjectRef, Scope, Value};
use tracing::{debug, trace, warn};

use crate::cache::{ResolutionStack, ScopeCache};
use crate::config::ContainerConfig;
use crate::error::{ContainerError, ContainerResult};
use crate::index::{scope_for, DefinitionIndex};
use crate::values::{ReferenceResolver, ValueResolver};

/// Builds instances of indexed definitions, recursively resolving what
/// they depend on.
///
/// Borrowed per call from the container; holds no state of its own.
pub struct InstanceResolver<'c> {
    index: &'c DefinitionIndex,
    cache: &'c ScopeCache,
    types: &'c dyn TypeIntrospection,
    config: &'c ContainerConfig,
}

impl<'c> InstanceResolver<'c> {
    pub fn new(
        index: &'c DefinitionIndex,
        cache: &'c ScopeCache,
        types: &'c dyn TypeIntrospection,
        config: &'c ContainerConfig,
    ) -> Self {
        Self {
            index,
            cache,
            types,
            config,
        }
    }

    /// Return the instance for `id`, building it if its scope requires.
    ///
    /// Cache hits bypass cycle tracking. Unindexed ids resolve to null.
    pub fn resolve(&self, id: &str, stack: &mut ResolutionStack) -> ContainerResult<Value> {
        DefinitionIndex::check_id(id)?;
        if let Some(value) = self.cache.get_cached(id)? {
            trace!(id, "cache hit");
            return Ok(value);
        }
        let Some(definition) = self.index.lookup(id) else {
            return Ok(Value::Null);
        };
        let scope = scope_for(definition)?;

        if !scope.is_cached() {
            return self.build(definition, scope, stack);
        }
        let _guard = self.cache.lock_construction();
        // Another caller may have finished while this one waited.
        if let Some(value) = self.cache.get_cached(id)? {
            trace!(id, "cache hit after wait");
            return Ok(value);
        }
        self.build(definition, scope, stack)
    }

    fn build(
        &self,
        definition: &ObjectDefinition,
        scope: Scope,
        stack: &mut ResolutionStack,
    ) -> ContainerResult<Value> {
        let id = definition.id.as_str();
        let instance = {
            let mut frame = stack.enter(id)?;
            let instance = self.instantiate(definition, &mut frame)?;
            self.inject_properties(definition, &instance, &mut frame)?;
            self.run_init(definition, &instance)?;
            instance
        };

        if instance.is_null() {
            warn!(id, scope = %scope, "definition produced a null instance");
        }
        self.cache.cache(id, instance.clone(), scope)?;
        debug!(id, scope = %scope, kind = instance.kind(), "constructed object");
        Ok(instance)
    }

    fn instantiate(
        &self,
        definition: &ObjectDefinition,
        stack: &mut ResolutionStack,
    ) -> ContainerResult<Value> {
        let id = definition.id.as_str();

        if let Some((factory_id, method)) = definition.instance_factory() {
            self.check_method_name(id, method)?;
            let factory = self.resolve_ref(id, factory_id, stack)?;
            let receiver = factory.as_object().ok_or_else(|| {
                ContainerError::instantiation(
                    id,
                    format!("factory object {factory_id} is {}, not an object", factory.kind()),
                )
            })?;
            self.check_instance_method(id, receiver.type_name(), method)?;
            let args = self.resolve_args(definition, stack)?;
            return self
                .types
                .invoke(receiver, method, args)
                .map_err(|e| registry_failure(id, e));
        }

        let Some(type_name) = definition.type_name.as_deref() else {
            return Err(ContainerError::instantiation(
                id,
                "definition declares neither a type nor a factory object",
            ));
        };
        if !is_valid_name(type_name) {
            return Err(ContainerError::parse(id, format!("invalid type name {type_name:?}")));
        }
        if !self.types.has_type(type_name) {
            return Err(ContainerError::instantiation(id, format!("unknown type {type_name}")));
        }
        if self.types.is_abstract(type_name).map_err(|e| registry_failure(id, e))? {
            return Err(ContainerError::instantiation(id, format!("type {type_name} is abstract")));
        }

        match definition.static_factory_method() {
            Some(method) => {
                self.check_method_name(id, method)?;
                self.check_static_method(id, type_name, method)?;
                let args = self.resolve_args(definition, stack)?;
                self.types
                    .invoke_static(type_name, method, args)
                    .map_err(|e| registry_failure(id, e))
            }
            None => {
                let args = self.resolve_args(definition, stack)?;
                self.types
                    .construct(type_name, args)
                    .map_err(|e| registry_failure(id, e))
            }
        }
    }

    fn resolve_args(
        &self,
        definition: &ObjectDefinition,
        stack: &mut ResolutionStack,
    ) -> ContainerResult<Args> {
        let values = self.values();
        definition
            .constructor_args
            .iter()
            .map(|spec| values.resolve(&definition.id, spec, stack))
            .collect::<ContainerResult<Vec<_>>>()
            .map(Args::new)
    }

    fn inject_properties(
        &self,
        definition: &ObjectDefinition,
        instance: &Value,
        stack: &mut ResolutionStack,
    ) -> ContainerResult<()> {
        if definition.properties.is_empty() {
            return Ok(());
        }
        let id = definition.id.as_str();
        let target = receiver(id, instance, "inject properties into")?;
        let values = self.values();

        for property in &definition.properties {
            let name = property.name.as_str();
            if self.config.strict_names {
                validate_name("property", name)
                    .map_err(|e| ContainerError::parse(id, e.to_string()))?;
            }
            let public = self.types.has_field(target, name)
                && self
                    .types
                    .field_is_public(target, name)
                    .map_err(|e| registry_failure(id, e))?;
            if !public {
                return Err(ContainerError::instantiation(
                    id,
                    format!("{} has no public field {name}", target.type_name()),
                ));
            }
            let value = values.resolve(id, &property.value, stack)?;
            self.types
                .set_field(target, name, value)
                .map_err(|e| registry_failure(id, e))?;
        }
        Ok(())
    }

    fn run_init(&self, definition: &ObjectDefinition, instance: &Value) -> ContainerResult<()> {
        let Some(method) = definition.init_method.as_deref() else {
            return Ok(());
        };
        let id = definition.id.as_str();
        self.check_method_name(id, method)?;
        let target = receiver(id, instance, "run init method on")?;
        self.check_instance_method(id, target.type_name(), method)?;
        self.types
            .invoke(target, method, Args::empty())
            .map_err(|e| registry_failure(id, e))?;
        Ok(())
    }

    fn check_method_name(&self, id: &str, method: &str) -> ContainerResult<()> {
        if self.config.strict_names {
            validate_name("method", method).map_err(|e| ContainerError::parse(id, e.to_string()))?;
        }
        Ok(())
    }

    /// Public, non-static, non-abstract and not a destructor.
    fn check_instance_method(&self, id: &str, type_name: &str, method: &str) -> ContainerResult<()> {
        self.check_method(id, type_name, method, false)
    }

    /// Public, static and non-abstract.
    fn check_static_method(&self, id: &str, type_name: &str, method: &str) -> ContainerResult<()> {
        self.check_method(id, type_name, method, true)
    }

    fn check_method(
        &self,
        id: &str,
        type_name: &str,
        method: &str,
        want_static: bool,
    ) -> ContainerResult<()> {
        if !self.types.has_method(type_name, method) {
            return Err(ContainerError::instantiation(
                id,
                format!("{type_name} has no method {method}"),
            ));
        }
        let misuse = |reason: &str| {
            ContainerError::instantiation(id, format!("method {type_name}::{method} {reason}"))
        };
        let flag = |result: Result<bool, RegistryError>| result.map_err(|e| registry_failure(id, e));

        if !flag(self.types.method_is_public(type_name, method))? {
            return Err(misuse("is not public"));
        }
        if flag(self.types.method_is_abstract(type_name, method))? {
            return Err(misuse("is abstract"));
        }
        if flag(self.types.method_is_destructor(type_name, method))? {
            return Err(misuse("is a destructor"));
        }
        let is_static = flag(self.types.method_is_static(type_name, method))?;
        match (want_static, is_static) {
            (true, false) => Err(misuse("is not static")),
            (false, true) => Err(misuse("is static")),
            _ => Ok(()),
        }
    }

    fn values(&self) -> ValueResolver<'_> {
        ValueResolver::new(self.index, self, self.config.strict_names)
    }
}

impl ReferenceResolver for InstanceResolver<'_> {
    /// References must name an indexed definition; they never fall back to
    /// null the way a top-level lookup does.
    fn resolve_ref(
        &self,
        owner: &str,
        target: &str,
        stack: &mut ResolutionStack,
    ) -> ContainerResult<Value> {
        if DefinitionIndex::check_id(target).is_err() {
            return Err(ContainerError::instantiation(
                owner,
                format!("invalid reference target {target:?}"),
            ));
        }
        if !self.index.exists(target) {
            return Err(ContainerError::instantiation(
                owner,
                format!("reference to undefined object {target}"),
            ));
        }
        self.resolve(target, stack)
    }
}

fn receiver<'v>(id: &str, instance: &'v Value, action: &str) -> ContainerResult<&'v ObjectRef> {
    instance.as_object().ok_or_else(|| {
        ContainerError::instantiation(id, format!("cannot {action} a {} value", instance.kind()))
    })
}

fn registry_failure(id: &str, error: RegistryError) -> ContainerError {
    ContainerError::instantiation(id, error.to_string())
}
