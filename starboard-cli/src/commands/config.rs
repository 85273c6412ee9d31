use crate::output::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use starboard_common::{keys, ConfigData, Scanner};
use starboard_kube::ConfigManager;
use tabled::Tabled;

const MASK: &str = "********";

#[derive(Debug, Serialize, Tabled)]
struct ConfigRow {
    #[tabled(rename = "KEY")]
    key: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct ImageRow {
    #[tabled(rename = "SCANNER")]
    scanner: String,
    #[tabled(rename = "IMAGE")]
    image_ref: String,
    #[tabled(rename = "VERSION")]
    version: String,
}

#[derive(Debug, Serialize)]
struct KeyValue<'a> {
    key: &'a str,
    value: &'a str,
}

/// Create the ConfigMap and Secret if they are missing
pub async fn handle_init(manager: &ConfigManager) -> Result<()> {
    manager
        .ensure_default()
        .await
        .context("Failed to initialize configuration")?;

    output::print_success(&format!(
        "Configuration initialized in namespace '{}'",
        manager.namespace()
    ));
    Ok(())
}

/// Remove the ConfigMap and Secret
pub async fn handle_cleanup(manager: &ConfigManager) -> Result<()> {
    manager
        .delete()
        .await
        .context("Failed to delete configuration")?;

    output::print_success(&format!(
        "Configuration deleted from namespace '{}'",
        manager.namespace()
    ));
    Ok(())
}

/// Show the merged configuration, or one key of it
pub async fn handle_config(
    manager: &ConfigManager,
    key: Option<&str>,
    show_secrets: bool,
    format: OutputFormat,
) -> Result<()> {
    let data = manager
        .read()
        .await
        .context("Failed to read configuration")?;

    match key {
        Some(key) => {
            let value = match lookup(&data, key) {
                Some(value) => value,
                None => bail!("Key '{}' is not set and has no default", key),
            };
            let value = mask(key, value, show_secrets);
            output::print_single(value, &KeyValue { key, value }, format)
        }
        None => output::print_output(config_rows(&data, show_secrets), format),
    }
}

/// Show the scanner images and the versions derived from them
pub async fn handle_images(manager: &ConfigManager, format: OutputFormat) -> Result<()> {
    let data = manager
        .read()
        .await
        .context("Failed to read configuration")?;

    output::print_output(image_rows(&data), format)
}

// Stored value, else the default the accessors would use
fn lookup<'a>(data: &'a ConfigData, key: &str) -> Option<&'a str> {
    data.get(key)
        .filter(|v| !v.is_empty())
        .or_else(|| data.defaults().get(key))
}

fn mask<'a>(key: &str, value: &'a str, show_secrets: bool) -> &'a str {
    if keys::is_secret_key(key) && !show_secrets {
        MASK
    } else {
        value
    }
}

fn config_rows(data: &ConfigData, show_secrets: bool) -> Vec<ConfigRow> {
    data.iter()
        .map(|(key, value)| ConfigRow {
            key: key.to_string(),
            value: mask(key, value, show_secrets).to_string(),
        })
        .collect()
}

fn image_rows(data: &ConfigData) -> Vec<ImageRow> {
    Scanner::ALL
        .into_iter()
        .map(|scanner| ImageRow {
            scanner: scanner.to_string(),
            image_ref: data.image_ref(scanner).to_string(),
            version: data
                .image_version(scanner)
                .unwrap_or_else(|e| format!("invalid ({})", e)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigData {
        [
            ("trivy.imageRef", "registry:5000/aquasec/trivy:0.16.0"),
            ("trivy.githubToken", "ghp_abc"),
            ("kube-bench.imageRef", "aquasec/kube-bench"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_config_rows_mask_secrets() {
        let rows = config_rows(&sample(), false);
        let token = rows.iter().find(|r| r.key == "trivy.githubToken").unwrap();
        assert_eq!(token.value, MASK);

        let rows = config_rows(&sample(), true);
        let token = rows.iter().find(|r| r.key == "trivy.githubToken").unwrap();
        assert_eq!(token.value, "ghp_abc");
    }

    #[test]
    fn test_lookup_falls_back_to_defaults() {
        let data = sample();
        assert_eq!(lookup(&data, "trivy.imageRef"), Some("registry:5000/aquasec/trivy:0.16.0"));
        assert_eq!(lookup(&data, "kube-hunter.quick"), Some("false"));
        assert_eq!(lookup(&data, "unknown.key"), None);
    }

    #[test]
    fn test_image_rows() {
        let rows = image_rows(&sample());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].scanner, "trivy");
        assert_eq!(rows[0].version, "0.16.0");
        assert_eq!(rows[1].scanner, "kube-bench");
        assert_eq!(rows[1].version, "latest");
        assert_eq!(rows[3].image_ref, "quay.io/fairwinds/polaris:1.2");
    }
}
