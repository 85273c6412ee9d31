//! Configuration manager
//!
//! Reads the ConfigMap and Secret into one [`ConfigData`], creates them with
//! defaults when missing, and deletes them. Every operation makes a single
//! attempt per resource; retrying is up to the caller.

use super::error::{StoreError, StoreResult};
use super::source::{ConfigSource, Entries};
use super::{CONFIG_MAP_NAME, SECRET_NAME};
use starboard_common::{ConfigData, DefaultTable};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Merge the two resources: every secret entry is laid over the public ones.
///
/// The key sets are disjoint by convention. On a collision the secret value
/// wins, which is logged since it usually means a key was put in the wrong
/// resource.
pub fn merge(public: Entries, secret: Entries) -> Entries {
    let mut merged = public;

    for (key, value) in secret {
        if merged.contains_key(&key) {
            tracing::warn!(key = %key, "Secret value overrides ConfigMap value");
        }
        merged.insert(key, value);
    }

    merged
}

/// Manages the public and secret configuration resources of one namespace
pub struct ConfigManager {
    public: Arc<dyn ConfigSource>,
    secret: Arc<dyn ConfigSource>,
    namespace: String,
    defaults: Arc<DefaultTable>,
    request_timeout: Option<Duration>,
}

impl ConfigManager {
    pub fn new(
        public: Arc<dyn ConfigSource>,
        secret: Arc<dyn ConfigSource>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            public,
            secret,
            namespace: namespace.into(),
            defaults: DefaultTable::builtin(),
            request_timeout: None,
        }
    }

    /// Manager over the cluster's ConfigMap and Secret
    #[cfg(feature = "kubernetes")]
    pub fn for_cluster(client: &super::client::K8sClient, namespace: impl Into<String>) -> Self {
        Self::new(
            Arc::new(super::configmaps::ConfigMapSource::new(client)),
            Arc::new(super::secrets::SecretSource::new(client)),
            namespace,
        )
    }

    /// Use `defaults` for bootstrap content and accessor fallbacks
    pub fn with_defaults(mut self, defaults: Arc<DefaultTable>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Bound each store call; exceeding it fails with [`StoreError::Timeout`]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn defaults(&self) -> &Arc<DefaultTable> {
        &self.defaults
    }

    /// Read both resources and merge them. A missing resource reads as empty.
    pub async fn read(&self) -> StoreResult<ConfigData> {
        let public = self.fetch(self.public.as_ref(), CONFIG_MAP_NAME).await?;
        let secret = self.fetch(self.secret.as_ref(), SECRET_NAME).await?;

        tracing::debug!(
            namespace = %self.namespace,
            public_keys = public.len(),
            secret_keys = secret.len(),
            "Read configuration"
        );

        Ok(ConfigData::with_defaults(
            merge(public, secret),
            Arc::clone(&self.defaults),
        ))
    }

    /// Create the ConfigMap with the default table and an empty Secret,
    /// leaving either untouched if it already exists. The namespace must
    /// already exist.
    pub async fn ensure_default(&self) -> StoreResult<()> {
        self.ensure(
            self.public.as_ref(),
            CONFIG_MAP_NAME,
            self.defaults.to_entries(),
        )
        .await?;
        self.ensure(self.secret.as_ref(), SECRET_NAME, Entries::new())
            .await
    }

    /// Delete both resources. Missing resources are not an error.
    pub async fn delete(&self) -> StoreResult<()> {
        self.remove(self.public.as_ref(), CONFIG_MAP_NAME).await?;
        self.remove(self.secret.as_ref(), SECRET_NAME).await
    }

    async fn fetch(&self, source: &dyn ConfigSource, name: &str) -> StoreResult<Entries> {
        match self.bounded(source.get(&self.namespace, name)).await {
            Ok(entries) => Ok(entries),
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    kind = %source.kind(),
                    namespace = %self.namespace,
                    name,
                    "Resource not found, reading as empty"
                );
                Ok(Entries::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn ensure(
        &self,
        source: &dyn ConfigSource,
        name: &str,
        initial: Entries,
    ) -> StoreResult<()> {
        match self.bounded(source.get(&self.namespace, name)).await {
            Ok(_) => {
                tracing::debug!(
                    kind = %source.kind(),
                    namespace = %self.namespace,
                    name,
                    "Resource exists, leaving it untouched"
                );
                return Ok(());
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        match self
            .bounded(source.create(&self.namespace, name, &initial))
            .await
        {
            Ok(()) => {
                tracing::info!(
                    kind = %source.kind(),
                    namespace = %self.namespace,
                    name,
                    keys = initial.len(),
                    "Created resource"
                );
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                tracing::debug!(
                    kind = %source.kind(),
                    namespace = %self.namespace,
                    name,
                    "Resource created concurrently"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn remove(&self, source: &dyn ConfigSource, name: &str) -> StoreResult<()> {
        match self.bounded(source.delete(&self.namespace, name)).await {
            Ok(()) => {
                tracing::info!(
                    kind = %source.kind(),
                    namespace = %self.namespace,
                    name,
                    "Deleted resource"
                );
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn bounded<T, F>(&self, call: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| StoreError::Timeout(limit))?,
            None => call.await,
        }
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("namespace", &self.namespace)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Entries {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_disjoint() {
        let merged = merge(entries(&[("foo", "bar")]), entries(&[("baz", "s3cret")]));
        assert_eq!(merged, entries(&[("foo", "bar"), ("baz", "s3cret")]));
    }

    #[test]
    fn test_merge_secret_wins_on_collision() {
        let merged = merge(
            entries(&[("trivy.githubToken", "public"), ("foo", "bar")]),
            entries(&[("trivy.githubToken", "secret")]),
        );
        assert_eq!(merged["trivy.githubToken"], "secret");
        assert_eq!(merged["foo"], "bar");
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge(Entries::new(), Entries::new()).is_empty());
    }
}
