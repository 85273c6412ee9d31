//! In-memory configuration source
//!
//! Behaves like the API server for the three operations the manager uses,
//! including `NotFound` / `AlreadyExists`. Faults can be queued per operation
//! to exercise error paths without a cluster.

use super::error::{StoreError, StoreResult};
use super::source::{ConfigSource, Entries, Operation, SourceKind};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};

type ObjectKey = (String, String);

/// Configuration source backed by a map
pub struct MemorySource {
    kind: SourceKind,
    objects: RwLock<HashMap<ObjectKey, Entries>>,
    faults: Mutex<HashMap<Operation, StoreError>>,
}

impl MemorySource {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            objects: RwLock::new(HashMap::new()),
            faults: Mutex::new(HashMap::new()),
        }
    }

    /// Builder variant of [`MemorySource::insert`]
    pub fn with_object<I, K, V>(mut self, namespace: &str, name: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.objects
            .get_mut()
            .insert(object_key(namespace, name), entries);
        self
    }

    /// Store an object, replacing any existing one
    pub async fn insert(&self, namespace: &str, name: &str, entries: Entries) {
        self.objects
            .write()
            .await
            .insert(object_key(namespace, name), entries);
    }

    /// Current content of an object, if it exists
    pub async fn object(&self, namespace: &str, name: &str) -> Option<Entries> {
        self.objects
            .read()
            .await
            .get(&object_key(namespace, name))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Make the next call of `operation` fail with `error`
    pub async fn fail_next(&self, operation: Operation, error: StoreError) {
        self.faults.lock().await.insert(operation, error);
    }

    async fn take_fault(&self, operation: Operation) -> StoreResult<()> {
        match self.faults.lock().await.remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn object_key(namespace: &str, name: &str) -> ObjectKey {
    (namespace.to_string(), name.to_string())
}

#[async_trait]
impl ConfigSource for MemorySource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn get(&self, namespace: &str, name: &str) -> StoreResult<Entries> {
        self.take_fault(Operation::Get).await?;

        self.object(namespace, name)
            .await
            .ok_or_else(|| StoreError::not_found(self.kind, namespace, name))
    }

    async fn create(&self, namespace: &str, name: &str, entries: &Entries) -> StoreResult<()> {
        self.take_fault(Operation::Create).await?;

        let mut objects = self.objects.write().await;
        let key = object_key(namespace, name);
        if objects.contains_key(&key) {
            return Err(StoreError::already_exists(self.kind, namespace, name));
        }
        objects.insert(key, entries.clone());
        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> StoreResult<()> {
        self.take_fault(Operation::Delete).await?;

        self.objects
            .write()
            .await
            .remove(&object_key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(self.kind, namespace, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_delete() {
        let source = MemorySource::new(SourceKind::Public);
        let entries: Entries = [("foo".to_string(), "bar".to_string())].into();

        source.create("ns", "cfg", &entries).await.unwrap();
        assert_eq!(source.get("ns", "cfg").await.unwrap(), entries);

        // Same name in another namespace is a different object
        assert!(source.get("other", "cfg").await.unwrap_err().is_not_found());

        source.delete("ns", "cfg").await.unwrap();
        assert!(source.get("ns", "cfg").await.unwrap_err().is_not_found());
        assert!(source.delete("ns", "cfg").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_existing_is_rejected() {
        let source = MemorySource::new(SourceKind::Secret).with_object("ns", "cfg", [("a", "1")]);

        let err = source
            .create("ns", "cfg", &Entries::new())
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(source.object("ns", "cfg").await.unwrap()["a"], "1");
    }

    #[tokio::test]
    async fn test_fault_is_one_shot() {
        let source = MemorySource::new(SourceKind::Public).with_object("ns", "cfg", [("a", "1")]);
        source
            .fail_next(Operation::Get, StoreError::Backend("connection reset".to_string()))
            .await;

        assert!(matches!(
            source.get("ns", "cfg").await,
            Err(StoreError::Backend(_))
        ));
        assert!(source.get("ns", "cfg").await.is_ok());
    }
}
