//! Kubernetes client wrapper
//!
//! Wraps the kube-rs Client with the API server it talks to.

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;

use super::error::{StoreError, StoreResult};
use crate::config::KubernetesSettings;

/// Wrapper around kube-rs Client
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    api_server: String,
}

impl K8sClient {
    /// Create client from a kubeconfig file with optional context
    pub async fn from_kubeconfig_path(path: &Path, context: Option<&str>) -> StoreResult<Self> {
        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            StoreError::InvalidKubeconfig(format!(
                "Failed to read kubeconfig {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: context.map(String::from),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| StoreError::InvalidKubeconfig(format!("Failed to create config: {}", e)))?;

        Self::from_config(config)
    }

    /// Create client from in-cluster configuration (for running inside K8s)
    pub fn from_incluster() -> StoreResult<Self> {
        let config = Config::incluster().map_err(|e| {
            StoreError::InvalidKubeconfig(format!("Failed to get in-cluster config: {}", e))
        })?;

        Self::from_config(config)
    }

    /// Create client the way kubectl would: `KUBECONFIG`, `~/.kube/config`,
    /// then in-cluster
    pub async fn infer(context: Option<&str>) -> StoreResult<Self> {
        let config = match context {
            Some(context) => Config::from_kubeconfig(&KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            })
            .await
            .map_err(|e| StoreError::InvalidKubeconfig(format!("Failed to load context: {}", e)))?,
            None => Config::infer().await.map_err(|e| {
                StoreError::InvalidKubeconfig(format!("Failed to infer config: {}", e))
            })?,
        };

        Self::from_config(config)
    }

    /// Create client from the `[kubernetes]` settings section
    pub async fn from_settings(settings: &KubernetesSettings) -> StoreResult<Self> {
        if settings.in_cluster {
            return Self::from_incluster();
        }

        match &settings.kubeconfig {
            Some(path) => Self::from_kubeconfig_path(path, settings.context.as_deref()).await,
            None => Self::infer(settings.context.as_deref()).await,
        }
    }

    fn from_config(config: Config) -> StoreResult<Self> {
        let api_server = config.cluster_url.to_string();

        let client = Client::try_from(config)
            .map_err(|e| StoreError::InvalidKubeconfig(format!("Failed to create client: {}", e)))?;

        tracing::debug!(api_server = %api_server, "Kubernetes client created");

        Ok(Self {
            inner: client,
            api_server,
        })
    }

    /// Get the inner kube-rs Client
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Get API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }
}

impl std::fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8sClient")
            .field("api_server", &self.api_server)
            .finish()
    }
}
