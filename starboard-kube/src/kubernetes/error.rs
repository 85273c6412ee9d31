//! Backing store errors
//!
//! Kube errors are classified exactly once, here: a 404 becomes
//! [`StoreError::NotFound`], a 409 `AlreadyExists` becomes
//! [`StoreError::AlreadyExists`], everything else is passed through.

use super::source::SourceKind;
use std::time::Duration;
use thiserror::Error;

/// Errors from a configuration source
#[derive(Debug, Error)]
pub enum StoreError {
    /// Resource does not exist
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: SourceKind,
        namespace: String,
        name: String,
    },

    /// Resource was created by someone else first
    #[error("{kind} {namespace}/{name} already exists")]
    AlreadyExists {
        kind: SourceKind,
        namespace: String,
        name: String,
    },

    /// Request did not finish within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Error from kube-rs client
    #[cfg(feature = "kubernetes")]
    #[error("Kubernetes API error: {0}")]
    Kube(#[source] kube::Error),

    /// Invalid kubeconfig or client setup
    #[error("Invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// Any other backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: SourceKind, namespace: &str, name: &str) -> Self {
        StoreError::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn already_exists(kind: SourceKind, namespace: &str, name: &str) -> Self {
        StoreError::AlreadyExists {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }

    /// Classify a kube-rs error for the resource it was raised on
    #[cfg(feature = "kubernetes")]
    pub fn from_kube(err: kube::Error, kind: SourceKind, namespace: &str, name: &str) -> Self {
        match &err {
            kube::Error::Api(response) if response.code == 404 => {
                Self::not_found(kind, namespace, name)
            }
            kube::Error::Api(response)
                if response.code == 409 && response.reason == "AlreadyExists" =>
            {
                Self::already_exists(kind, namespace, name)
            }
            _ => StoreError::Kube(err),
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(all(test, feature = "kubernetes"))]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} error", reason),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_classify_not_found() {
        let err = StoreError::from_kube(api_error(404, "NotFound"), SourceKind::Public, "starboard", "starboard");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "ConfigMap starboard/starboard not found");
    }

    #[test]
    fn test_classify_already_exists() {
        let err = StoreError::from_kube(api_error(409, "AlreadyExists"), SourceKind::Secret, "starboard", "starboard");
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_update_conflict_is_not_already_exists() {
        let err = StoreError::from_kube(api_error(409, "Conflict"), SourceKind::Public, "starboard", "starboard");
        assert!(matches!(err, StoreError::Kube(_)));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = StoreError::from_kube(api_error(403, "Forbidden"), SourceKind::Public, "starboard", "starboard");
        assert!(!err.is_not_found());
        assert!(!err.is_already_exists());
        assert!(matches!(err, StoreError::Kube(_)));
    }
}
