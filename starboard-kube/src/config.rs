//! Settings for the starboard tooling
//!
//! Loaded from, in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Configuration file (TOML format)
//! 3. Default values (lowest priority)
//!
//! These are the tool's own settings (where the cluster is, how to log). The
//! scanner configuration itself lives in the cluster and is handled by
//! [`crate::kubernetes::ConfigManager`].

use crate::kubernetes::NAMESPACE_NAME;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use starboard_common::DefaultTable;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Main settings struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarboardSettings {
    /// Cluster connection
    pub kubernetes: KubernetesSettings,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Entries replacing built-in defaults, e.g. to point at a mirror registry
    pub defaults: BTreeMap<String, String>,
}

/// Cluster connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesSettings {
    /// Namespace holding the ConfigMap and Secret
    pub namespace: String,
    /// Explicit kubeconfig, otherwise inferred like kubectl does
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context
    pub context: Option<String>,
    /// Use the in-cluster service account
    pub in_cluster: bool,
    /// Per-request timeout in seconds, unbounded when unset
    pub request_timeout_secs: Option<u64>,
}

impl Default for KubernetesSettings {
    fn default() -> Self {
        Self {
            namespace: NAMESPACE_NAME.to_string(),
            kubeconfig: None,
            context: None,
            in_cluster: false,
            request_timeout_secs: None,
        }
    }
}

impl KubernetesSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl StarboardSettings {
    /// Load settings from the first config file found, then apply environment
    /// overrides
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        settings.apply_env_overrides(|var| std::env::var(var).ok());
        settings.validate()?;

        Ok(settings)
    }

    /// Load settings from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::FileRead(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            // Environment variable override
            std::env::var("STARBOARD_CONFIG").ok().map(PathBuf::from),
            // Standard locations
            Some(PathBuf::from("/etc/starboard/config.toml")),
            Some(PathBuf::from("./starboard.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply environment variable overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Kubernetes
        if let Some(namespace) = lookup("STARBOARD_NAMESPACE") {
            self.kubernetes.namespace = namespace;
        }
        if let Some(path) = lookup("STARBOARD_KUBECONFIG") {
            self.kubernetes.kubeconfig = Some(PathBuf::from(path));
        }
        if let Some(context) = lookup("STARBOARD_CONTEXT") {
            self.kubernetes.context = Some(context);
        }
        if let Some(in_cluster) = lookup("STARBOARD_IN_CLUSTER") {
            self.kubernetes.in_cluster = in_cluster.parse().unwrap_or(false);
        }
        if let Some(secs) = lookup("STARBOARD_REQUEST_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.kubernetes.request_timeout_secs = Some(secs),
                Err(_) => tracing::warn!(value = %secs, "Ignoring invalid STARBOARD_REQUEST_TIMEOUT_SECS"),
            }
        }

        // Logging
        if let Some(level) = lookup("STARBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(path) = lookup("STARBOARD_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(path));
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !is_dns_label(&self.kubernetes.namespace) {
            return Err(SettingsError::Validation(format!(
                "Namespace '{}' is not a valid DNS label",
                self.kubernetes.namespace
            )));
        }

        if self.kubernetes.request_timeout_secs == Some(0) {
            return Err(SettingsError::Validation(
                "Request timeout cannot be 0".to_string(),
            ));
        }

        if let Some(key) = self.defaults.keys().find(|k| !k.contains('.')) {
            return Err(SettingsError::Validation(format!(
                "Default key '{}' must be of the form <component>.<property>",
                key
            )));
        }

        Ok(())
    }

    /// Built-in default table with the `[defaults]` overrides applied
    pub fn default_table(&self) -> Arc<DefaultTable> {
        if self.defaults.is_empty() {
            DefaultTable::builtin()
        } else {
            Arc::new(DefaultTable::builtin().with_overrides(self.defaults.clone()))
        }
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

// RFC 1123 label, which is what namespace names must be
fn is_dns_label(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
}

/// Settings loading errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Failed to read configuration file
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),
    /// Failed to parse configuration
    #[error("Failed to parse config: {0}")]
    Parse(String),
    /// Configuration validation failed
    #[error("Invalid configuration: {0}")]
    Validation(String),
}
