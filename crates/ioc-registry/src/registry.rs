use std::collections::HashMap;
use std::sync::Arc;

use ioc_types::{ObjectRef, Value};
use tracing::debug;

use crate::args::Args;
use crate::descriptor::{MethodBody, MethodDescriptor, TypeDescriptor};
use crate::error::{RegistryError, RegistryResult};

/// By-name introspection and invocation of registered types.
///
/// This is the only way the container touches host types: every
/// abstractness, visibility and binding check is asked through this trait
/// before anything is constructed or called.
pub trait TypeIntrospection: Send + Sync {
    /// Returns `true` if a type with this name is registered.
    fn has_type(&self, type_name: &str) -> bool;

    /// Whether the type is abstract. Fails for unknown types.
    fn is_abstract(&self, type_name: &str) -> RegistryResult<bool>;

    fn has_method(&self, type_name: &str, method: &str) -> bool;

    fn method_is_public(&self, type_name: &str, method: &str) -> RegistryResult<bool>;

    fn method_is_static(&self, type_name: &str, method: &str) -> RegistryResult<bool>;

    fn method_is_abstract(&self, type_name: &str, method: &str) -> RegistryResult<bool>;

    fn method_is_destructor(&self, type_name: &str, method: &str) -> RegistryResult<bool>;

    /// Call a static method on the type itself.
    fn invoke_static(&self, type_name: &str, method: &str, args: Args) -> RegistryResult<Value>;

    /// Call an instance method on a live object.
    fn invoke(&self, instance: &ObjectRef, method: &str, args: Args) -> RegistryResult<Value>;

    fn has_field(&self, instance: &ObjectRef, name: &str) -> bool;

    fn field_is_public(&self, instance: &ObjectRef, name: &str) -> RegistryResult<bool>;

    fn set_field(&self, instance: &ObjectRef, name: &str, value: Value) -> RegistryResult<()>;

    /// Build a new instance through the type's constructor.
    fn construct(&self, type_name: &str, args: Args) -> RegistryResult<Value>;
}

/// Registry of host types, populated at startup and read-only afterwards.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. Fails if the name is already taken.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> RegistryResult<()> {
        let name = descriptor.name().to_string();
        if self.types.contains_key(&name) {
            return Err(RegistryError::DuplicateType(name));
        }
        debug!(type_name = %name, "registered type");
        self.types.insert(name, Arc::new(descriptor));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, descriptor: TypeDescriptor) -> RegistryResult<Self> {
        self.register(descriptor)?;
        Ok(self)
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Sorted list of registered type names.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn descriptor(&self, type_name: &str) -> RegistryResult<&TypeDescriptor> {
        self.get(type_name)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))
    }

    fn method(&self, type_name: &str, method: &str) -> RegistryResult<&MethodDescriptor> {
        self.descriptor(type_name)?
            .method(method)
            .ok_or_else(|| RegistryError::UnknownMethod {
                type_name: type_name.to_string(),
                method: method.to_string(),
            })
    }
}

impl TypeIntrospection for TypeRegistry {
    fn has_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    fn is_abstract(&self, type_name: &str) -> RegistryResult<bool> {
        Ok(self.descriptor(type_name)?.is_abstract())
    }

    fn has_method(&self, type_name: &str, method: &str) -> bool {
        self.get(type_name)
            .is_some_and(|desc| desc.method(method).is_some())
    }

    fn method_is_public(&self, type_name: &str, method: &str) -> RegistryResult<bool> {
        Ok(self.method(type_name, method)?.is_public())
    }

    fn method_is_static(&self, type_name: &str, method: &str) -> RegistryResult<bool> {
        Ok(self.method(type_name, method)?.is_static())
    }

    fn method_is_abstract(&self, type_name: &str, method: &str) -> RegistryResult<bool> {
        Ok(self.method(type_name, method)?.is_abstract())
    }

    fn method_is_destructor(&self, type_name: &str, method: &str) -> RegistryResult<bool> {
        Ok(self.method(type_name, method)?.is_destructor())
    }

    fn invoke_static(&self, type_name: &str, method: &str, args: Args) -> RegistryResult<Value> {
        let desc = self.method(type_name, method)?;
        match &desc.body {
            MethodBody::Static(f) => {
                f(args).map_err(|e| RegistryError::invoke(format!("{type_name}::{method}"), e))
            }
            _ => Err(RegistryError::NotCallable {
                type_name: type_name.to_string(),
                method: method.to_string(),
                reason: "not a static method",
            }),
        }
    }

    fn invoke(&self, instance: &ObjectRef, method: &str, args: Args) -> RegistryResult<Value> {
        let type_name = instance.type_name();
        let desc = self.method(type_name, method)?;
        match &desc.body {
            MethodBody::Instance(f) => f(instance, args)
                .map_err(|e| RegistryError::invoke(format!("{type_name}->{method}"), e)),
            _ => Err(RegistryError::NotCallable {
                type_name: type_name.to_string(),
                method: method.to_string(),
                reason: "not an instance method",
            }),
        }
    }

    fn has_field(&self, instance: &ObjectRef, name: &str) -> bool {
        self.get(instance.type_name())
            .is_some_and(|desc| desc.field(name).is_some())
    }

    fn field_is_public(&self, instance: &ObjectRef, name: &str) -> RegistryResult<bool> {
        let type_name = instance.type_name();
        self.descriptor(type_name)?
            .field(name)
            .map(|field| field.is_public())
            .ok_or_else(|| RegistryError::UnknownField {
                type_name: type_name.to_string(),
                field: name.to_string(),
            })
    }

    fn set_field(&self, instance: &ObjectRef, name: &str, value: Value) -> RegistryResult<()> {
        let type_name = instance.type_name();
        let field = self
            .descriptor(type_name)?
            .field(name)
            .ok_or_else(|| RegistryError::UnknownField {
                type_name: type_name.to_string(),
                field: name.to_string(),
            })?;
        (field.setter)(instance, value)
            .map_err(|e| RegistryError::invoke(format!("{type_name}.{name}"), e))
    }

    fn construct(&self, type_name: &str, args: Args) -> RegistryResult<Value> {
        let desc = self.descriptor(type_name)?;
        if desc.is_abstract() {
            return Err(RegistryError::NotConstructible(type_name.to_string()));
        }
        let ctor = desc
            .constructor
            .as_ref()
            .ok_or_else(|| RegistryError::NotConstructible(type_name.to_string()))?;
        ctor(args).map_err(|e| RegistryError::invoke(format!("{type_name}::new"), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Visibility;
    use crate::error::InvokeError;

    #[derive(Debug, Default)]
    struct Point {
        x: i64,
        y: i64,
    }

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with(
                TypeDescriptor::builder::<Point>("Point")
                    .constructor(|args| {
                        Ok(Point {
                            x: args.int(0)?,
                            y: args.int(1)?,
                        })
                    })
                    .static_method("origin", |_| Ok(ObjectRef::new("Point", Point::default()).into()))
                    .method("sum", |p: &mut Point, _| Ok(Value::Int(p.x + p.y)))
                    .handle_method("this", |obj, _| Ok(Value::Object(obj.clone())))
                    .field("x", |p: &mut Point, v| {
                        p.x = v.as_int().ok_or_else(|| InvokeError::failed("x must be int"))?;
                        Ok(())
                    })
                    .field_with("y", Visibility::Private, |p: &mut Point, v| {
                        p.y = v.as_int().unwrap_or_default();
                        Ok(())
                    })
                    .build(),
            )
            .unwrap()
            .with(TypeDescriptor::builder::<()>("Shape").abstract_type().build())
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    #[test]
    fn duplicate_type_is_rejected() {
        let mut reg = registry();
        let err = reg
            .register(TypeDescriptor::builder::<()>("Point").build())
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateType(name) if name == "Point"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn type_names_are_sorted() {
        assert_eq!(registry().type_names(), vec!["Point", "Shape"]);
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn construct_passes_arguments() {
        let reg = registry();
        let value = reg
            .construct("Point", Args::new(vec![Value::Int(2), Value::Int(3)]))
            .unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(reg.invoke(obj, "sum", Args::empty()).unwrap(), Value::Int(5));
    }

    #[test]
    fn construct_abstract_or_unknown_fails() {
        let reg = registry();
        assert!(matches!(
            reg.construct("Shape", Args::empty()),
            Err(RegistryError::NotConstructible(_))
        ));
        assert!(matches!(
            reg.construct("Nope", Args::empty()),
            Err(RegistryError::UnknownType(_))
        ));
    }

    #[test]
    fn constructor_errors_are_wrapped() {
        let reg = registry();
        let err = reg.construct("Point", Args::empty()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Invoke { source: InvokeError::MissingArgument { index: 0 }, .. }
        ));
    }

    // -----------------------------------------------------------------------
    // Methods and fields
    // -----------------------------------------------------------------------

    #[test]
    fn static_and_instance_methods_are_not_interchangeable() {
        let reg = registry();
        let origin = reg.invoke_static("Point", "origin", Args::empty()).unwrap();
        let obj = origin.as_object().unwrap();
        assert!(matches!(
            reg.invoke(obj, "origin", Args::empty()),
            Err(RegistryError::NotCallable { .. })
        ));
        assert!(matches!(
            reg.invoke_static("Point", "sum", Args::empty()),
            Err(RegistryError::NotCallable { .. })
        ));
    }

    #[test]
    fn field_visibility_and_assignment() {
        let reg = registry();
        let obj = reg.invoke_static("Point", "origin", Args::empty()).unwrap();
        let obj = obj.as_object().unwrap();
        assert!(reg.has_field(obj, "x"));
        assert!(reg.field_is_public(obj, "x").unwrap());
        assert!(!reg.field_is_public(obj, "y").unwrap());
        assert!(!reg.has_field(obj, "z"));

        reg.set_field(obj, "x", Value::Int(9)).unwrap();
        assert_eq!(obj.with(|p: &Point| p.x), Some(9));
        assert!(reg.set_field(obj, "x", Value::from("nine")).is_err());
    }

    #[test]
    fn handle_methods_receive_the_shared_handle() {
        let reg = registry();
        let origin = reg.invoke_static("Point", "origin", Args::empty()).unwrap();
        let obj = origin.as_object().unwrap();
        let back = reg.invoke(obj, "this", Args::empty()).unwrap();
        assert!(back.as_object().unwrap().ptr_eq(obj));
    }

    #[test]
    fn method_flag_queries() {
        let reg = registry();
        assert!(reg.has_method("Point", "sum"));
        assert!(!reg.has_method("Point", "nope"));
        assert!(!reg.has_method("Nope", "sum"));
        assert!(reg.method_is_static("Point", "origin").unwrap());
        assert!(!reg.method_is_abstract("Point", "sum").unwrap());
        assert!(reg.method_is_public("Point", "nope").is_err());
    }
}
