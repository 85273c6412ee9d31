//! Cluster-side configuration store for starboard scanners
//!
//! The configuration is split over a ConfigMap and a Secret in one namespace.
//! [`kubernetes::ConfigManager`] reads both as a single
//! [`starboard_common::ConfigData`] snapshot, bootstraps them with defaults
//! and removes them again.

pub mod config;
pub mod kubernetes;
pub mod logging;

pub use config::{KubernetesSettings, SettingsError, StarboardSettings};
pub use kubernetes::{ConfigManager, StoreError, StoreResult};
