//! Logging configuration module
//! Console output plus an optional rolling JSON log file

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_NAME: &str = "starboard.log";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,
    /// Directory for a rolling log file, console only when unset
    pub log_dir: Option<PathBuf>,
    /// Log file rotation policy
    pub rotation: LogRotation,
    /// JSON console output
    pub json_format: bool,
}

/// Log rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            log_dir: None,
            rotation: LogRotation::Daily,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Initialize logging based on configuration.
    ///
    /// Console output goes to stderr so command output on stdout stays
    /// machine readable. The returned guard must be held for the life of the
    /// process when a log file is configured.
    pub fn init(&self) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(!self.json_format)
            .with_writer(io::stderr);
        let console_layer = if self.json_format {
            console_layer.json().boxed()
        } else {
            console_layer.boxed()
        };

        let registry = tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer);

        let guard = if let Some(ref dir) = self.log_dir {
            let file_appender = match self.rotation {
                LogRotation::Hourly => rolling::hourly(dir, LOG_FILE_NAME),
                LogRotation::Daily => rolling::daily(dir, LOG_FILE_NAME),
                LogRotation::Never => rolling::never(dir, LOG_FILE_NAME),
            };
            let (writer, guard) = non_blocking(file_appender);

            let file_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_writer(writer);

            registry.with(file_layer).try_init()?;
            Some(guard)
        } else {
            registry.try_init()?;
            None
        };

        tracing::debug!("Logging initialized - level: {}", self.level);

        Ok(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert!(config.log_dir.is_none());
        assert_eq!(config.rotation, LogRotation::Daily);
    }

    #[test]
    fn test_rotation_from_toml() {
        let config: LoggingConfig = toml::from_str(
            r#"
            level = "debug"
            rotation = "hourly"
            "#,
        )
        .unwrap();

        assert_eq!(config.level, "debug");
        assert_eq!(config.rotation, LogRotation::Hourly);
        assert!(!config.json_format);
    }
}
