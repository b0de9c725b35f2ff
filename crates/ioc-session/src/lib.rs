//! Session-backed storage for session-scoped objects.
//!
//! A session-scoped definition is built at most once per session and
//! container context. The container stores such instances through the
//! [`SessionStore`] trait under keys of the form
//! `<namespace>::<context hash>::<id>`; the store itself never interprets
//! keys or values.
//!
//! # Storage Backends
//!
//! - [`InMemorySessionStore`] -- `HashMap`-based store for tests and embedding

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{SessionError, SessionResult};
pub use memory::InMemorySessionStore;
pub use traits::SessionStore;
