//! Sample types shared by the container tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ioc_registry::{InvokeError, TypeDescriptor, TypeRegistry, Visibility};
use ioc_types::{ObjectDefinition, ObjectRef, Value};

use crate::factory::Container;

#[derive(Debug, Default)]
pub(crate) struct Widget {
    pub size: i64,
    pub label: String,
    pub owner: Value,
    pub booted: bool,
}

/// Keeps whatever it is given.
#[derive(Debug, Default)]
pub(crate) struct Holder {
    pub args: Vec<Value>,
    pub value: Value,
    pub peer: Value,
}

#[derive(Debug, Default)]
pub(crate) struct Factory {
    pub prefix: String,
}

/// Registry plus construction counters.
pub(crate) struct Fixture {
    pub registry: Arc<TypeRegistry>,
    /// Calls of the `Widget` constructor.
    pub constructed: Arc<AtomicUsize>,
    /// Calls of `Widget::create`.
    pub created: Arc<AtomicUsize>,
    /// Calls of the `Slow` constructor.
    pub slow: Arc<AtomicUsize>,
}

impl Fixture {
    pub fn new() -> Self {
        let constructed = Arc::new(AtomicUsize::new(0));
        let created = Arc::new(AtomicUsize::new(0));
        let slow = Arc::new(AtomicUsize::new(0));

        let ctor_count = Arc::clone(&constructed);
        let create_count = Arc::clone(&created);
        let slow_count = Arc::clone(&slow);

        let widget = TypeDescriptor::builder::<Widget>("Widget")
            .constructor(move |args| {
                ctor_count.fetch_add(1, Ordering::SeqCst);
                Ok(Widget {
                    size: args.get(0).and_then(Value::as_int).unwrap_or_default(),
                    ..Widget::default()
                })
            })
            .static_method("create", move |args| {
                create_count.fetch_add(1, Ordering::SeqCst);
                let widget = Widget {
                    size: args.int(0)?,
                    ..Widget::default()
                };
                Ok(ObjectRef::new("Widget", widget).into())
            })
            .static_method_with("internal", Visibility::Private, |_| Ok(Value::Null))
            .method("boot", |w: &mut Widget, _| {
                w.booted = true;
                Ok(Value::Null)
            })
            .method("explode", |_: &mut Widget, _| Err(InvokeError::failed("boom")))
            .method_with("hidden", Visibility::Protected, |_: &mut Widget, _| Ok(Value::Null))
            .abstract_method("render")
            .destructor("dispose")
            .field("size", |w: &mut Widget, v: Value| {
                w.size = v.as_int().ok_or_else(|| InvokeError::failed("size must be an int"))?;
                Ok(())
            })
            .field("label", |w: &mut Widget, v: Value| {
                w.label = v.as_str().unwrap_or_default().to_string();
                Ok(())
            })
            .field("owner", |w: &mut Widget, v: Value| {
                w.owner = v;
                Ok(())
            })
            .field_with("secret", Visibility::Private, |_: &mut Widget, _| Ok(()))
            .build();

        let holder = TypeDescriptor::builder::<Holder>("Holder")
            .constructor(|args| {
                Ok(Holder {
                    args: args.into_vec(),
                    ..Holder::default()
                })
            })
            .field("value", |h: &mut Holder, v: Value| {
                h.value = v;
                Ok(())
            })
            .field("peer", |h: &mut Holder, v: Value| {
                h.peer = v;
                Ok(())
            })
            .build();

        let factory = TypeDescriptor::builder::<Factory>("Factory")
            .constructor(|args| {
                Ok(Factory {
                    prefix: args.get(0).and_then(Value::as_str).unwrap_or_default().to_string(),
                })
            })
            .method("build", |f: &mut Factory, args| {
                let widget = Widget {
                    size: args.int(0)?,
                    label: format!("{}-widget", f.prefix),
                    ..Widget::default()
                };
                Ok(ObjectRef::new("Widget", widget).into())
            })
            .static_method("shared", |_| Ok(Value::Null))
            .build();

        let shape = TypeDescriptor::builder::<()>("Shape")
            .abstract_type()
            .static_method("create", |_| Ok(Value::Null))
            .build();

        let slow_type = TypeDescriptor::builder::<Holder>("Slow")
            .constructor(move |_| {
                slow_count.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(25));
                Ok(Holder::default())
            })
            .build();

        let mut registry = TypeRegistry::new();
        for descriptor in [widget, holder, factory, shape, slow_type] {
            registry.register(descriptor).unwrap();
        }

        Self {
            registry: Arc::new(registry),
            constructed,
            created,
            slow,
        }
    }

    pub fn container(&self, definitions: Vec<ObjectDefinition>) -> Container {
        Container::builder()
            .definitions(definitions)
            .registry(self.registry.clone())
            .build()
            .unwrap()
    }

    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn slow(&self) -> usize {
        self.slow.load(Ordering::SeqCst)
    }
}

/// Read a field of a live `T` out of an object value.
pub(crate) fn read<T: 'static, R>(value: &Value, f: impl FnOnce(&T) -> R) -> R {
    value
        .as_object()
        .expect("value is not an object")
        .with(f)
        .expect("object has a different type")
}
