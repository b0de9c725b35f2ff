use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, ContainerResult};

/// What `get_object` returns for an identifier with no definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsentPolicy {
    /// Return the null value.
    #[default]
    Null,
    /// Fail with [`ContainerError::NotFound`].
    Error,
}

/// Configuration for a container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Prefix of every session key: `<namespace>::<context>::<id>`.
    pub session_namespace: String,
    /// Behavior of `get_object` for unknown identifiers.
    pub absent_objects: AbsentPolicy,
    /// Check method names, property names and map keys against
    /// `[A-Za-z_][A-Za-z0-9_]*` before using them.
    pub strict_names: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            session_namespace: "ioc".to_string(),
            absent_objects: AbsentPolicy::Null,
            strict_names: true,
        }
    }
}

impl ContainerConfig {
    /// Unknown identifiers are errors instead of null.
    pub fn strict() -> Self {
        Self {
            absent_objects: AbsentPolicy::Error,
            ..Default::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> ContainerResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| ContainerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. Missing keys take their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ContainerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub(crate) fn validate(&self) -> ContainerResult<()> {
        if self.session_namespace.is_empty() || self.session_namespace.contains("::") {
            return Err(ContainerError::Config(format!(
                "invalid session namespace {:?}",
                self.session_namespace
            )));
        }
        Ok(())
    }
}
