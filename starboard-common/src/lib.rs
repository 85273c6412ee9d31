//! Common types shared between starboard-kube and starboard-cli
//!
//! Holds the merged configuration view ([`ConfigData`]), the compiled-in
//! default table and the image reference parsing used to derive scanner
//! versions. Nothing in here talks to a cluster.

pub mod config_data;
pub mod defaults;
pub mod image_ref;
pub mod keys;

pub use config_data::{ConfigData, Scanner, TrivyMode};
pub use defaults::DefaultTable;
pub use image_ref::version_from_image_ref;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed value {value:?} for key '{key}': {reason}")]
    Malformed {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid image reference {reference:?}: {reason}")]
    InvalidImageRef { reference: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
