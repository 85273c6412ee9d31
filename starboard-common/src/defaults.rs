//! Compiled-in default configuration
//!
//! The built-in table is what `init` writes into a fresh ConfigMap and what
//! accessors fall back to when a key is missing. Callers that need different
//! defaults (tests, site-wide settings) build their own [`DefaultTable`].

use crate::keys;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

pub const DEFAULT_TRIVY_IMAGE_REF: &str = "docker.io/aquasec/trivy:0.14.0";
pub const DEFAULT_TRIVY_MODE: &str = "Standalone";
pub const DEFAULT_TRIVY_SERVER_URL: &str = "http://trivy-server.trivy-server:4954";
pub const DEFAULT_TRIVY_SEVERITY: &str = "UNKNOWN,LOW,MEDIUM,HIGH,CRITICAL";
pub const DEFAULT_KUBE_BENCH_IMAGE_REF: &str = "docker.io/aquasec/kube-bench:0.4.0";
pub const DEFAULT_KUBE_HUNTER_IMAGE_REF: &str = "docker.io/aquasec/kube-hunter:0.4.0";
pub const DEFAULT_KUBE_HUNTER_QUICK: &str = "false";
pub const DEFAULT_POLARIS_IMAGE_REF: &str = "quay.io/fairwinds/polaris:1.2";

pub const DEFAULT_POLARIS_CONFIG_YAML: &str = r#"checks:
  # reliability
  multipleReplicasForDeployment: ignore
  priorityClassNotSet: ignore
  # resources
  cpuRequestsMissing: warning
  cpuLimitsMissing: warning
  memoryRequestsMissing: warning
  memoryLimitsMissing: warning
  # images
  tagNotSpecified: danger
  pullPolicyNotAlways: ignore
  # healthChecks
  readinessProbeMissing: warning
  livenessProbeMissing: warning
  # networking
  hostNetworkSet: warning
  hostPortSet: warning
  # security
  hostIPCSet: danger
  hostPIDSet: danger
  notReadOnlyRootFilesystem: warning
  privilegeEscalationAllowed: danger
  runAsRootAllowed: warning
  runAsPrivileged: danger
  dangerousCapabilities: danger
  insecureCapabilities: warning
exemptions:
  - controllerNames:
      - kube-apiserver
      - kube-proxy
      - kube-scheduler
      - etcd-manager-events
      - kube-controller-manager
      - kube-dns
      - etcd-manager-main
    rules:
      - hostPortSet
      - hostNetworkSet
      - readinessProbeMissing
      - livenessProbeMissing
      - cpuRequestsMissing
      - cpuLimitsMissing
      - memoryRequestsMissing
      - memoryLimitsMissing
      - runAsRootAllowed
      - runAsPrivileged
      - notReadOnlyRootFilesystem
      - hostPIDSet
"#;

static BUILTIN: LazyLock<Arc<DefaultTable>> = LazyLock::new(|| {
    Arc::new(DefaultTable::from_entries([
        (keys::TRIVY_SEVERITY, DEFAULT_TRIVY_SEVERITY),
        (keys::TRIVY_IMAGE_REF, DEFAULT_TRIVY_IMAGE_REF),
        (keys::TRIVY_MODE, DEFAULT_TRIVY_MODE),
        (keys::TRIVY_SERVER_URL, DEFAULT_TRIVY_SERVER_URL),
        (keys::KUBE_BENCH_IMAGE_REF, DEFAULT_KUBE_BENCH_IMAGE_REF),
        (keys::KUBE_HUNTER_IMAGE_REF, DEFAULT_KUBE_HUNTER_IMAGE_REF),
        (keys::KUBE_HUNTER_QUICK, DEFAULT_KUBE_HUNTER_QUICK),
        (keys::POLARIS_IMAGE_REF, DEFAULT_POLARIS_IMAGE_REF),
        (keys::POLARIS_CONFIG_YAML, DEFAULT_POLARIS_CONFIG_YAML),
    ]))
});

/// Immutable key/value table of default configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefaultTable {
    entries: BTreeMap<String, String>,
}

impl DefaultTable {
    /// The compiled-in table, shared
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Copy of this table with `overrides` replacing or adding entries
    pub fn with_overrides<I, K, V>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = self.entries.clone();
        entries.extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// The table as a plain mapping, ready to be written to a store
    pub fn to_entries(&self) -> BTreeMap<String, String> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
