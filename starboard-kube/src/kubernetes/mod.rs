//! Kubernetes-backed configuration store
//!
//! Configuration lives in two resources of the same namespace:
//! - a ConfigMap with non-sensitive settings
//! - a Secret with credentials
//!
//! [`ConfigManager`] reads them as one merged view and manages their
//! lifecycle. The sources are pluggable so the manager can run against
//! [`MemorySource`] in tests.

pub mod error;
pub mod manager;
pub mod memory;
pub mod source;

#[cfg(feature = "kubernetes")]
pub mod client;
#[cfg(feature = "kubernetes")]
pub mod configmaps;
#[cfg(feature = "kubernetes")]
pub mod secrets;

use std::collections::BTreeMap;

pub use error::{StoreError, StoreResult};
pub use manager::{merge, ConfigManager};
pub use memory::MemorySource;
pub use source::{ConfigSource, Entries, Operation, SourceKind};

#[cfg(feature = "kubernetes")]
pub use client::K8sClient;

/// Namespace used when none is configured
pub const NAMESPACE_NAME: &str = "starboard";
/// Name of the ConfigMap holding public configuration
pub const CONFIG_MAP_NAME: &str = "starboard";
/// Name of the Secret holding sensitive configuration
pub const SECRET_NAME: &str = "starboard";

const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
const MANAGED_BY_VALUE: &str = "starboard";

/// Labels put on every resource this crate creates
pub fn managed_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string())])
}
