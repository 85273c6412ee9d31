//! Secret backed source
//!
//! Holds the sensitive half of the configuration. Values travel as bytes and
//! are decoded to strings on read; bytes that are not UTF-8 are replaced
//! rather than rejected.

use super::client::K8sClient;
use super::error::{StoreError, StoreResult};
use super::managed_labels;
use super::source::{ConfigSource, Entries, SourceKind};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;

const SECRET_TYPE_OPAQUE: &str = "Opaque";

/// Source reading and writing a Secret's `data`
#[derive(Clone)]
pub struct SecretSource {
    client: Client,
}

impl SecretSource {
    pub fn new(client: &K8sClient) -> Self {
        Self {
            client: client.inner().clone(),
        }
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ConfigSource for SecretSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Secret
    }

    async fn get(&self, namespace: &str, name: &str) -> StoreResult<Entries> {
        tracing::debug!(namespace, name, "Fetching Secret");

        let secret = self
            .api(namespace)
            .get(name)
            .await
            .map_err(|e| StoreError::from_kube(e, self.kind(), namespace, name))?;

        Ok(secret_entries(secret))
    }

    async fn create(&self, namespace: &str, name: &str, entries: &Entries) -> StoreResult<()> {
        // Values are never logged, only the count
        tracing::debug!(namespace, name, keys = entries.len(), "Creating Secret");

        let secret = build_secret(namespace, name, entries);
        self.api(namespace)
            .create(&PostParams::default(), &secret)
            .await
            .map_err(|e| StoreError::from_kube(e, self.kind(), namespace, name))?;

        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> StoreResult<()> {
        tracing::debug!(namespace, name, "Deleting Secret");

        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| StoreError::from_kube(e, self.kind(), namespace, name))?;

        Ok(())
    }
}

/// Decoded `data`, with any `stringData` the server has not folded in yet
/// taking precedence.
fn secret_entries(secret: Secret) -> Entries {
    let mut entries: Entries = secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, ByteString(bytes))| (key, String::from_utf8_lossy(&bytes).into_owned()))
        .collect();

    if let Some(string_data) = secret.string_data {
        entries.extend(string_data);
    }

    entries
}

fn build_secret(namespace: &str, name: &str, entries: &Entries) -> Secret {
    let data = if entries.is_empty() {
        None
    } else {
        Some(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        )
    };

    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(managed_labels()),
            ..Default::default()
        },
        type_: Some(SECRET_TYPE_OPAQUE.to_string()),
        data,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_secret_bytes_are_decoded() {
        let secret = Secret {
            data: Some(BTreeMap::from([(
                "baz".to_string(),
                ByteString(b"s3cret".to_vec()),
            )])),
            ..Default::default()
        };

        let entries = secret_entries(secret);
        assert_eq!(entries.get("baz").map(String::as_str), Some("s3cret"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let secret = Secret {
            data: Some(BTreeMap::from([(
                "token".to_string(),
                ByteString(vec![0x61, 0xff, 0x62]),
            )])),
            ..Default::default()
        };

        assert_eq!(secret_entries(secret)["token"], "a\u{fffd}b");
    }

    #[test]
    fn test_string_data_overrides_data() {
        let secret = Secret {
            data: Some(BTreeMap::from([(
                "token".to_string(),
                ByteString(b"old".to_vec()),
            )])),
            string_data: Some(BTreeMap::from([("token".to_string(), "new".to_string())])),
            ..Default::default()
        };

        assert_eq!(secret_entries(secret)["token"], "new");
    }

    #[test]
    fn test_build_secret() {
        let entries: Entries = [("trivy.githubToken".to_string(), "ghp_abc".to_string())].into();
        let secret = build_secret("starboard", "starboard", &entries);

        assert_eq!(secret.type_.as_deref(), Some("Opaque"));
        let data = secret.data.unwrap();
        assert_eq!(data["trivy.githubToken"], ByteString(b"ghp_abc".to_vec()));
    }

    #[test]
    fn test_empty_secret_has_no_data() {
        let secret = build_secret("starboard", "starboard", &Entries::new());
        assert!(secret.data.is_none());
        assert!(secret_entries(secret).is_empty());
    }
}
