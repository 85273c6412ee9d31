//! ConfigMap backed source
//!
//! Holds the non-sensitive half of the configuration.

use super::client::K8sClient;
use super::error::{StoreError, StoreResult};
use super::managed_labels;
use super::source::{ConfigSource, Entries, SourceKind};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;

/// Source reading and writing a ConfigMap's `data`
#[derive(Clone)]
pub struct ConfigMapSource {
    client: Client,
}

impl ConfigMapSource {
    pub fn new(client: &K8sClient) -> Self {
        Self {
            client: client.inner().clone(),
        }
    }

    fn api(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ConfigSource for ConfigMapSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Public
    }

    async fn get(&self, namespace: &str, name: &str) -> StoreResult<Entries> {
        tracing::debug!(namespace, name, "Fetching ConfigMap");

        let configmap = self
            .api(namespace)
            .get(name)
            .await
            .map_err(|e| StoreError::from_kube(e, self.kind(), namespace, name))?;

        Ok(configmap_entries(configmap))
    }

    async fn create(&self, namespace: &str, name: &str, entries: &Entries) -> StoreResult<()> {
        tracing::debug!(namespace, name, keys = entries.len(), "Creating ConfigMap");

        let configmap = build_configmap(namespace, name, entries);
        self.api(namespace)
            .create(&PostParams::default(), &configmap)
            .await
            .map_err(|e| StoreError::from_kube(e, self.kind(), namespace, name))?;

        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> StoreResult<()> {
        tracing::debug!(namespace, name, "Deleting ConfigMap");

        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| StoreError::from_kube(e, self.kind(), namespace, name))?;

        Ok(())
    }
}

fn configmap_entries(configmap: ConfigMap) -> Entries {
    configmap.data.unwrap_or_default()
}

fn build_configmap(namespace: &str, name: &str, entries: &Entries) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(managed_labels()),
            ..Default::default()
        },
        data: if entries.is_empty() {
            None
        } else {
            Some(entries.clone())
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_configmap() {
        let entries: Entries = [("trivy.imageRef".to_string(), "aquasec/trivy:0.14.0".to_string())].into();
        let configmap = build_configmap("starboard", "starboard", &entries);

        assert_eq!(configmap.metadata.name.as_deref(), Some("starboard"));
        assert_eq!(configmap.metadata.namespace.as_deref(), Some("starboard"));
        assert_eq!(configmap.data, Some(entries));
        assert!(configmap.binary_data.is_none());
    }

    #[test]
    fn test_empty_entries_leave_data_unset() {
        let configmap = build_configmap("starboard", "starboard", &Entries::new());
        assert!(configmap.data.is_none());
        assert!(configmap_entries(configmap).is_empty());
    }
}
