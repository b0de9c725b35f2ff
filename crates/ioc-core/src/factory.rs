use std::fmt;
use std::sync::Arc;

use ioc_document::{Document, DocumentParser};
use ioc_registry::{TypeIntrospection, TypeRegistry};
use ioc_session::{InMemorySessionStore, SessionStore};
use ioc_types::{ContextHash, ObjectDefinition, Scope, Value};
use tracing::info;

use crate::cache::ScopeCache;
use crate::config::{AbsentPolicy, ContainerConfig};
use crate::error::{ContainerError, ContainerResult};
use crate::index::DefinitionIndex;
use crate::resolver::InstanceResolver;

/// Public lookup surface of a container.
///
/// Every operation fails with [`ContainerError::InvalidIdentifier`] before
/// anything else when `id` is malformed. Only `get_object` ever builds.
pub trait ObjectFactory: Send + Sync {
    /// The instance for `id`, built on first use for cached scopes.
    fn get_object(&self, id: &str) -> ContainerResult<Value>;

    /// Whether a definition exists for `id`.
    fn has_object(&self, id: &str) -> ContainerResult<bool>;

    /// Declared type name of `id`, when present and well-formed.
    fn get_object_type(&self, id: &str) -> ContainerResult<Option<&str>>;

    /// Resolved scope of `id`, when defined.
    fn get_object_scope(&self, id: &str) -> ContainerResult<Option<Scope>>;
}

/// A declarative object container.
///
/// Built once from definitions, a type registry and a session store, then
/// shared freely between threads.
pub struct Container {
    index: DefinitionIndex,
    cache: ScopeCache,
    types: Arc<dyn TypeIntrospection>,
    config: ContainerConfig,
    context: ContextHash,
}

impl Container {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    /// Content hash of the definition document this container was built from.
    pub fn context(&self) -> &ContextHash {
        &self.context
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Defined identifiers, in document order.
    pub fn definition_ids(&self) -> Vec<&str> {
        self.index.ids().collect()
    }

    pub fn definition(&self, id: &str) -> Option<&ObjectDefinition> {
        self.index.lookup(id)
    }

    /// Number of singletons built so far.
    pub fn singleton_count(&self) -> usize {
        self.cache.singleton_count()
    }

    /// Definitions currently under construction. Zero between calls.
    pub fn resolution_depth(&self) -> usize {
        self.cache.depth()
    }

    /// Session store key of `id` in this container.
    pub fn session_key(&self, id: &str) -> ContainerResult<String> {
        DefinitionIndex::check_id(id)?;
        Ok(self.cache.session_key(id))
    }

    fn resolver(&self) -> InstanceResolver<'_> {
        InstanceResolver::new(&self.index, &self.cache, self.types.as_ref(), &self.config)
    }
}

impl ObjectFactory for Container {
    fn get_object(&self, id: &str) -> ContainerResult<Value> {
        DefinitionIndex::check_id(id)?;
        if !self.index.exists(id) {
            return match self.config.absent_objects {
                AbsentPolicy::Null => Ok(Value::Null),
                AbsentPolicy::Error => Err(ContainerError::NotFound(id.to_string())),
            };
        }
        let mut stack = self.cache.stack();
        self.resolver().resolve(id, &mut stack)
    }

    fn has_object(&self, id: &str) -> ContainerResult<bool> {
        DefinitionIndex::check_id(id)?;
        Ok(self.index.exists(id))
    }

    fn get_object_type(&self, id: &str) -> ContainerResult<Option<&str>> {
        DefinitionIndex::check_id(id)?;
        Ok(self.index.type_of(id))
    }

    fn get_object_scope(&self, id: &str) -> ContainerResult<Option<Scope>> {
        DefinitionIndex::check_id(id)?;
        self.index.scope_of(id)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("context", &self.context)
            .field("definitions", &self.index.len())
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}

enum Source {
    Definitions(Vec<ObjectDefinition>),
    Document(Document),
    Raw {
        raw: String,
        parser: Box<dyn DocumentParser>,
    },
}

/// Builder for a [`Container`].
///
/// Without a registry no type can be built; without a session store an
/// in-memory one is used.
#[derive(Default)]
pub struct ContainerBuilder {
    source: Option<Source>,
    types: Option<Arc<dyn TypeIntrospection>>,
    session: Option<Arc<dyn SessionStore>>,
    config: ContainerConfig,
}

impl ContainerBuilder {
    /// Use definitions assembled in code. The context hash covers their
    /// serialized form.
    pub fn definitions(mut self, definitions: Vec<ObjectDefinition>) -> Self {
        self.source = Some(Source::Definitions(definitions));
        self
    }

    /// Parse `raw` with `parser` when the container is built.
    pub fn document(mut self, raw: impl Into<String>, parser: impl DocumentParser + 'static) -> Self {
        self.source = Some(Source::Raw {
            raw: raw.into(),
            parser: Box::new(parser),
        });
        self
    }

    /// Use an already parsed document.
    pub fn parsed(mut self, document: Document) -> Self {
        self.source = Some(Source::Document(document));
        self
    }

    pub fn registry(mut self, types: Arc<dyn TypeIntrospection>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session = Some(store);
        self
    }

    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ContainerResult<Container> {
        self.config.validate()?;
        let (definitions, context) = match self.source {
            Some(Source::Definitions(definitions)) => {
                let context = ContextHash::from_definitions(&definitions)?;
                (definitions, context)
            }
            Some(Source::Document(document)) => {
                let context = document.context();
                (document.into_definitions(), context)
            }
            Some(Source::Raw { raw, parser }) => {
                let document = Document::parse_with(raw, parser.as_ref())?;
                let context = document.context();
                (document.into_definitions(), context)
            }
            None => (Vec::new(), ContextHash::from_definitions(&[])?),
        };

        let index = DefinitionIndex::new(definitions)?;
        let session = self
            .session
            .unwrap_or_else(|| Arc::new(InMemorySessionStore::new()) as Arc<dyn SessionStore>);
        let types = self
            .types
            .unwrap_or_else(|| Arc::new(TypeRegistry::new()) as Arc<dyn TypeIntrospection>);
        let cache = ScopeCache::new(session, &self.config.session_namespace, &context);

        info!(
            context = %context.short_hex(),
            definitions = index.len(),
            "container built"
        );
        Ok(Container {
            index,
            cache,
            types,
            config: self.config,
            context,
        })
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("has_source", &self.source.is_some())
            .field("has_registry", &self.types.is_some())
            .field("has_session_store", &self.session.is_some())
            .field("config", &self.config)
            .finish()
    }
}
