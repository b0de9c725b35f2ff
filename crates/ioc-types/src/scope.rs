use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Lifecycle and caching policy of a resolved instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One instance per container, created on first request.
    #[default]
    Singleton,
    /// A fresh instance on every resolution; never cached.
    Prototype,
    /// One instance per external session, namespaced by container context.
    Session,
}

impl Scope {
    /// Returns `true` if instances of this scope are cached anywhere.
    pub fn is_cached(&self) -> bool {
        !matches!(self, Self::Prototype)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Prototype => "prototype",
            Self::Session => "session",
        }
    }
}

impl FromStr for Scope {
    type Err = TypeError;

    /// Parse a scope string, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "singleton" => Ok(Self::Singleton),
            "prototype" => Ok(Self::Prototype),
            "session" => Ok(Self::Session),
            _ => Err(TypeError::UnknownScope(s.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
