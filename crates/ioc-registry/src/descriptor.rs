//! Type descriptors: the registered, by-name surface of a host type.
//!
//! A [`TypeDescriptor`] lists what the container may do with a type: build
//! it through a constructor, call its static and instance methods, and assign
//! its fields. Descriptors are built with [`TypeBuilder`], which wraps typed
//! closures over the concrete Rust type into the dynamic signatures the
//! container uses.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use ioc_types::{ObjectRef, Value};

use crate::args::Args;
use crate::error::{InvokeError, InvokeResult};

pub type ConstructorFn = Arc<dyn Fn(Args) -> InvokeResult<Value> + Send + Sync>;
pub type StaticFn = Arc<dyn Fn(Args) -> InvokeResult<Value> + Send + Sync>;
pub type InstanceFn = Arc<dyn Fn(&ObjectRef, Args) -> InvokeResult<Value> + Send + Sync>;
pub type FieldSetter = Arc<dyn Fn(&ObjectRef, Value) -> InvokeResult<()> + Send + Sync>;

/// Access level of a method or field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// How a method is bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// Called on an instance.
    Instance,
    /// Called on the type itself.
    Static,
    /// Declared without a body.
    Abstract,
    /// Teardown hook; never callable through the container.
    Destructor,
}

#[derive(Clone)]
pub(crate) enum MethodBody {
    Static(StaticFn),
    Instance(InstanceFn),
    None,
}

/// A registered method.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    visibility: Visibility,
    kind: MethodKind,
    pub(crate) body: MethodBody,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_static(&self) -> bool {
        self.kind == MethodKind::Static
    }

    pub fn is_abstract(&self) -> bool {
        self.kind == MethodKind::Abstract
    }

    pub fn is_destructor(&self) -> bool {
        self.kind == MethodKind::Destructor
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A registered assignable field.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    visibility: Visibility,
    pub(crate) setter: FieldSetter,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// The registered surface of one named type.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    is_abstract: bool,
    pub(crate) constructor: Option<ConstructorFn>,
    methods: IndexMap<String, MethodDescriptor>,
    fields: IndexMap<String, FieldDescriptor>,
}

impl TypeDescriptor {
    /// Start describing the Rust type `T` under the registered name `name`.
    pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> TypeBuilder<T> {
        TypeBuilder {
            desc: Self {
                name: name.into(),
                is_abstract: false,
                constructor: None,
                methods: IndexMap::new(),
                fields: IndexMap::new(),
            },
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("is_abstract", &self.is_abstract)
            .field("has_constructor", &self.constructor.is_some())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for a [`TypeDescriptor`] over the concrete Rust type `T`.
///
/// ```
/// use ioc_registry::{Args, TypeDescriptor};
/// use ioc_types::Value;
///
/// struct Greeter { name: String }
///
/// let desc = TypeDescriptor::builder::<Greeter>("Greeter")
///     .constructor(|args: Args| Ok(Greeter { name: args.string(0)?.to_string() }))
///     .method("greet", |g: &mut Greeter, _args| Ok(Value::from(format!("hi {}", g.name))))
///     .field("name", |g: &mut Greeter, v: Value| {
///         g.name = v.as_str().unwrap_or_default().to_string();
///         Ok(())
///     })
///     .build();
/// assert!(desc.has_constructor());
/// assert!(desc.method("greet").unwrap().is_public());
/// ```
pub struct TypeBuilder<T> {
    desc: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeBuilder<T> {
    /// Mark the type abstract. Abstract types are never constructed.
    pub fn abstract_type(mut self) -> Self {
        self.desc.is_abstract = true;
        self
    }

    /// Register the constructor. The built `T` is wrapped as an object of
    /// this type.
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(Args) -> InvokeResult<T> + Send + Sync + 'static,
    {
        let type_name = self.desc.name.clone();
        self.desc.constructor = Some(Arc::new(move |args| {
            let instance = f(args)?;
            Ok(Value::Object(ObjectRef::new(type_name.clone(), instance)))
        }));
        self
    }

    /// Register a public static method.
    pub fn static_method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Args) -> InvokeResult<Value> + Send + Sync + 'static,
    {
        self.static_method_with(name, Visibility::Public, f)
    }

    /// Register a static method with an explicit visibility.
    pub fn static_method_with<F>(mut self, name: impl Into<String>, visibility: Visibility, f: F) -> Self
    where
        F: Fn(Args) -> InvokeResult<Value> + Send + Sync + 'static,
    {
        self.push_method(name.into(), visibility, MethodKind::Static, MethodBody::Static(Arc::new(f)));
        self
    }

    /// Register a public instance method.
    pub fn method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T, Args) -> InvokeResult<Value> + Send + Sync + 'static,
    {
        self.method_with(name, Visibility::Public, f)
    }

    /// Register an instance method with an explicit visibility.
    pub fn method_with<F>(mut self, name: impl Into<String>, visibility: Visibility, f: F) -> Self
    where
        F: Fn(&mut T, Args) -> InvokeResult<Value> + Send + Sync + 'static,
    {
        let type_name = self.desc.name.clone();
        let body: InstanceFn = Arc::new(move |obj: &ObjectRef, args: Args| {
            obj.with_mut(|instance: &mut T| f(instance, args))
                .unwrap_or_else(|| Err(InvokeError::WrongReceiver(type_name.clone())))
        });
        self.push_method(name.into(), visibility, MethodKind::Instance, MethodBody::Instance(body));
        self
    }

    /// Register a public instance method that receives the shared handle
    /// instead of a borrowed instance, e.g. to return the receiver itself.
    pub fn handle_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ObjectRef, Args) -> InvokeResult<Value> + Send + Sync + 'static,
    {
        self.push_method(
            name.into(),
            Visibility::Public,
            MethodKind::Instance,
            MethodBody::Instance(Arc::new(f)),
        );
        self
    }

    /// Declare a public abstract method (no body).
    pub fn abstract_method(mut self, name: impl Into<String>) -> Self {
        self.push_method(name.into(), Visibility::Public, MethodKind::Abstract, MethodBody::None);
        self
    }

    /// Declare the destructor.
    pub fn destructor(mut self, name: impl Into<String>) -> Self {
        self.push_method(name.into(), Visibility::Public, MethodKind::Destructor, MethodBody::None);
        self
    }

    /// Register a public field setter.
    pub fn field<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T, Value) -> InvokeResult<()> + Send + Sync + 'static,
    {
        self.field_with(name, Visibility::Public, f)
    }

    /// Register a field setter with an explicit visibility.
    pub fn field_with<F>(mut self, name: impl Into<String>, visibility: Visibility, f: F) -> Self
    where
        F: Fn(&mut T, Value) -> InvokeResult<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let type_name = self.desc.name.clone();
        let setter: FieldSetter = Arc::new(move |obj: &ObjectRef, value: Value| {
            obj.with_mut(|instance: &mut T| f(instance, value))
                .unwrap_or_else(|| Err(InvokeError::WrongReceiver(type_name.clone())))
        });
        self.desc.fields.insert(
            name.clone(),
            FieldDescriptor {
                name,
                visibility,
                setter,
            },
        );
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.desc
    }

    fn push_method(&mut self, name: String, visibility: Visibility, kind: MethodKind, body: MethodBody) {
        self.desc.methods.insert(
            name.clone(),
            MethodDescriptor {
                name,
                visibility,
                kind,
                body,
            },
        );
    }
}
