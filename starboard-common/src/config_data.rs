//! Merged configuration view
//!
//! [`ConfigData`] is the snapshot a read produces: the ConfigMap entries with
//! the Secret entries laid over them. Typed accessors read a key when it is
//! present and non-empty and otherwise fall back to the [`DefaultTable`] the
//! snapshot was built with.

use crate::defaults::DefaultTable;
use crate::image_ref::version_from_image_ref;
use crate::keys;
use crate::{Error, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Scanners whose images are configured here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scanner {
    Trivy,
    KubeBench,
    KubeHunter,
    Polaris,
}

impl Scanner {
    pub const ALL: [Scanner; 4] = [
        Scanner::Trivy,
        Scanner::KubeBench,
        Scanner::KubeHunter,
        Scanner::Polaris,
    ];

    /// Key holding this scanner's image reference
    pub fn image_ref_key(self) -> &'static str {
        match self {
            Scanner::Trivy => keys::TRIVY_IMAGE_REF,
            Scanner::KubeBench => keys::KUBE_BENCH_IMAGE_REF,
            Scanner::KubeHunter => keys::KUBE_HUNTER_IMAGE_REF,
            Scanner::Polaris => keys::POLARIS_IMAGE_REF,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scanner::Trivy => "trivy",
            Scanner::KubeBench => "kube-bench",
            Scanner::KubeHunter => "kube-hunter",
            Scanner::Polaris => "polaris",
        }
    }
}

impl fmt::Display for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How Trivy scan jobs reach the vulnerability database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrivyMode {
    /// Each scan job downloads the database itself
    Standalone,
    /// Scan jobs query a Trivy server at `trivy.serverURL`
    ClientServer,
}

impl FromStr for TrivyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Standalone" => Ok(TrivyMode::Standalone),
            "ClientServer" => Ok(TrivyMode::ClientServer),
            other => Err(Error::Malformed {
                key: keys::TRIVY_MODE.to_string(),
                value: other.to_string(),
                reason: "expected Standalone or ClientServer".to_string(),
            }),
        }
    }
}

impl fmt::Display for TrivyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrivyMode::Standalone => write!(f, "Standalone"),
            TrivyMode::ClientServer => write!(f, "ClientServer"),
        }
    }
}

/// Merged, read-only configuration snapshot
#[derive(Clone)]
pub struct ConfigData {
    entries: BTreeMap<String, String>,
    defaults: Arc<DefaultTable>,
}

impl ConfigData {
    /// Snapshot over `entries` with the built-in defaults
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self::with_defaults(entries, DefaultTable::builtin())
    }

    pub fn with_defaults(entries: BTreeMap<String, String>, defaults: Arc<DefaultTable>) -> Self {
        Self { entries, defaults }
    }

    /// Raw value, exactly as stored
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn into_entries(self) -> BTreeMap<String, String> {
        self.entries
    }

    pub fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // Stored value if non-empty, else the default. `None` when neither exists.
    fn resolve(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .or_else(|| self.defaults.get(key).filter(|v| !v.is_empty()))
    }

    fn resolve_or_empty(&self, key: &str) -> &str {
        self.resolve(key).unwrap_or_default()
    }

    fn resolve_bool(&self, key: &str) -> Result<bool> {
        match self.resolve(key) {
            Some(value) => parse_bool(key, value),
            None => Ok(false),
        }
    }

    pub fn image_ref(&self, scanner: Scanner) -> &str {
        self.resolve_or_empty(scanner.image_ref_key())
    }

    /// Version token of the scanner's configured image
    pub fn image_version(&self, scanner: Scanner) -> Result<String> {
        version_from_image_ref(self.image_ref(scanner))
    }

    pub fn trivy_image_ref(&self) -> &str {
        self.image_ref(Scanner::Trivy)
    }

    pub fn trivy_mode(&self) -> Result<TrivyMode> {
        match self.resolve(keys::TRIVY_MODE) {
            Some(value) => value.parse(),
            None => Ok(TrivyMode::Standalone),
        }
    }

    pub fn trivy_server_url(&self) -> &str {
        self.resolve_or_empty(keys::TRIVY_SERVER_URL)
    }

    pub fn trivy_severity(&self) -> &str {
        self.resolve_or_empty(keys::TRIVY_SEVERITY)
    }

    pub fn trivy_http_proxy(&self) -> Option<&str> {
        self.resolve(keys::TRIVY_HTTP_PROXY)
    }

    pub fn trivy_https_proxy(&self) -> Option<&str> {
        self.resolve(keys::TRIVY_HTTPS_PROXY)
    }

    pub fn trivy_no_proxy(&self) -> Option<&str> {
        self.resolve(keys::TRIVY_NO_PROXY)
    }

    pub fn trivy_github_token(&self) -> Option<&str> {
        self.resolve(keys::TRIVY_GITHUB_TOKEN)
    }

    pub fn trivy_server_token(&self) -> Option<&str> {
        self.resolve(keys::TRIVY_SERVER_TOKEN)
    }

    pub fn kube_bench_image_ref(&self) -> &str {
        self.image_ref(Scanner::KubeBench)
    }

    pub fn kube_hunter_image_ref(&self) -> &str {
        self.image_ref(Scanner::KubeHunter)
    }

    pub fn kube_hunter_quick(&self) -> Result<bool> {
        self.resolve_bool(keys::KUBE_HUNTER_QUICK)
    }

    pub fn polaris_image_ref(&self) -> &str {
        self.image_ref(Scanner::Polaris)
    }

    pub fn polaris_config_yaml(&self) -> &str {
        self.resolve_or_empty(keys::POLARIS_CONFIG_YAML)
    }
}

/// Boolean spellings accepted in configuration values
fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(Error::Malformed {
            key: key.to_string(),
            value: other.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

impl Default for ConfigData {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

// Snapshots compare by content; the default table is not part of the data.
impl PartialEq for ConfigData {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for ConfigData {}

impl fmt::Debug for ConfigData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| {
                if keys::is_secret_key(k) {
                    (k.as_str(), "<redacted>")
                } else {
                    (k.as_str(), v.as_str())
                }
            }))
            .finish()
    }
}

impl Serialize for ConfigData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl From<BTreeMap<String, String>> for ConfigData {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self::new(entries)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivy_image_ref_default() {
        assert_eq!(
            ConfigData::default().trivy_image_ref(),
            "docker.io/aquasec/trivy:0.14.0"
        );
    }

    #[test]
    fn test_trivy_image_ref_from_data() {
        let data: ConfigData = [("trivy.imageRef", "gcr.io/aquasecurity/trivy:0.8.0")]
            .into_iter()
            .collect();
        assert_eq!(data.trivy_image_ref(), "gcr.io/aquasecurity/trivy:0.8.0");

        let data: ConfigData = [("trivy.imageRef", "x")].into_iter().collect();
        assert_eq!(data.trivy_image_ref(), "x");
    }

    #[test]
    fn test_kube_bench_image_ref() {
        assert_eq!(
            ConfigData::default().kube_bench_image_ref(),
            "docker.io/aquasec/kube-bench:0.4.0"
        );

        let data: ConfigData = [("kube-bench.imageRef", "gcr.io/aquasecurity/kube-bench:0.4.0")]
            .into_iter()
            .collect();
        assert_eq!(data.kube_bench_image_ref(), "gcr.io/aquasecurity/kube-bench:0.4.0");
    }

    #[test]
    fn test_empty_value_falls_back_to_default() {
        let data: ConfigData = [("kube-hunter.imageRef", "")].into_iter().collect();
        assert_eq!(data.kube_hunter_image_ref(), "docker.io/aquasec/kube-hunter:0.4.0");
        assert_eq!(data.get("kube-hunter.imageRef"), Some(""));
    }

    #[test]
    fn test_custom_default_table() {
        let defaults = Arc::new(DefaultTable::from_entries([(
            keys::POLARIS_IMAGE_REF,
            "mirror.local/polaris:1.2",
        )]));
        let data = ConfigData::with_defaults(BTreeMap::new(), defaults);

        assert_eq!(data.polaris_image_ref(), "mirror.local/polaris:1.2");
        // Not in the custom table and not stored
        assert_eq!(data.trivy_image_ref(), "");
        assert_eq!(data.trivy_mode().unwrap(), TrivyMode::Standalone);
        assert!(!data.kube_hunter_quick().unwrap());
    }

    #[test]
    fn test_kube_hunter_quick() {
        assert!(!ConfigData::default().kube_hunter_quick().unwrap());

        for (value, expected) in [("true", true), ("1", true), ("T", true), ("False", false), ("0", false)] {
            let data: ConfigData = [(keys::KUBE_HUNTER_QUICK, value)].into_iter().collect();
            assert_eq!(data.kube_hunter_quick().unwrap(), expected, "value: {}", value);
        }
    }

    #[test]
    fn test_kube_hunter_quick_malformed() {
        let data: ConfigData = [(keys::KUBE_HUNTER_QUICK, "yes")].into_iter().collect();

        match data.kube_hunter_quick() {
            Err(Error::Malformed { key, value, .. }) => {
                assert_eq!(key, keys::KUBE_HUNTER_QUICK);
                assert_eq!(value, "yes");
            }
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_trivy_mode() {
        assert_eq!(ConfigData::default().trivy_mode().unwrap(), TrivyMode::Standalone);

        let data: ConfigData = [(keys::TRIVY_MODE, "ClientServer")].into_iter().collect();
        assert_eq!(data.trivy_mode().unwrap(), TrivyMode::ClientServer);
        assert_eq!(data.trivy_server_url(), "http://trivy-server.trivy-server:4954");

        let data: ConfigData = [(keys::TRIVY_MODE, "clientserver")].into_iter().collect();
        assert!(matches!(data.trivy_mode(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_optional_values() {
        let data = ConfigData::default();
        assert_eq!(data.trivy_http_proxy(), None);
        assert_eq!(data.trivy_github_token(), None);

        let data: ConfigData = [
            (keys::TRIVY_HTTP_PROXY, "http://proxy:3128"),
            (keys::TRIVY_NO_PROXY, ""),
            (keys::TRIVY_GITHUB_TOKEN, "ghp_abc"),
        ]
        .into_iter()
        .collect();
        assert_eq!(data.trivy_http_proxy(), Some("http://proxy:3128"));
        assert_eq!(data.trivy_no_proxy(), None);
        assert_eq!(data.trivy_github_token(), Some("ghp_abc"));
    }

    #[test]
    fn test_image_versions() {
        let data: ConfigData = [(keys::TRIVY_IMAGE_REF, "registry:5000/aquasec/trivy:0.16.0")]
            .into_iter()
            .collect();

        assert_eq!(data.image_version(Scanner::Trivy).unwrap(), "0.16.0");
        assert_eq!(data.image_version(Scanner::KubeBench).unwrap(), "0.4.0");
        assert_eq!(data.image_version(Scanner::Polaris).unwrap(), "1.2");
    }

    #[test]
    fn test_equality_ignores_defaults() {
        let a: ConfigData = [("foo", "bar")].into_iter().collect();
        let b = ConfigData::with_defaults(
            a.entries().clone(),
            Arc::new(DefaultTable::default()),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let data: ConfigData = [("foo", "bar"), (keys::TRIVY_GITHUB_TOKEN, "ghp_abc")]
            .into_iter()
            .collect();
        let printed = format!("{:?}", data);

        assert!(printed.contains("bar"));
        assert!(!printed.contains("ghp_abc"));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let data: ConfigData = [("foo", "bar")].into_iter().collect();
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            serde_json::json!({ "foo": "bar" })
        );
    }
}
