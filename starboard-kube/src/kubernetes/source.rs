//! Configuration sources
//!
//! A [`ConfigSource`] is one namespaced key/value resource. The manager holds
//! two of them, a public one (ConfigMap) and a secret one (Secret), and merges
//! what they return.

use super::error::StoreResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

/// Flat key/value content of one resource
pub type Entries = BTreeMap<String, String>;

/// Which of the two backing resources a source manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Non-sensitive strings
    Public,
    /// Sensitive values, stored as bytes
    Secret,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Public => write!(f, "ConfigMap"),
            SourceKind::Secret => write!(f, "Secret"),
        }
    }
}

/// Operations a source supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Create,
    Delete,
}

/// Namespaced key/value store for one kind of resource
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fetch the resource content, `NotFound` when it does not exist
    async fn get(&self, namespace: &str, name: &str) -> StoreResult<Entries>;

    /// Create the resource, `AlreadyExists` when it is already there
    async fn create(&self, namespace: &str, name: &str, entries: &Entries) -> StoreResult<()>;

    /// Delete the resource, `NotFound` when it does not exist
    async fn delete(&self, namespace: &str, name: &str) -> StoreResult<()>;
}
