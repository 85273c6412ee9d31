//! Starboard CLI
//!
//! Manages the scanner configuration stored in the cluster

mod commands;
mod output;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use output::OutputFormat;
use starboard_kube::kubernetes::K8sClient;
use starboard_kube::{ConfigManager, StarboardSettings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Namespace holding the configuration
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Path to a kubeconfig file
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output format (table, json, yaml)
    #[arg(short, long, global = true, default_value = "table")]
    output: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration ConfigMap and Secret if missing
    Init,
    /// Show the merged configuration
    Config {
        /// Only show this key
        key: Option<String>,
        /// Print secret values instead of masking them
        #[arg(long)]
        show_secrets: bool,
    },
    /// Show scanner images and their versions
    Images,
    /// Delete the configuration ConfigMap and Secret
    Cleanup,
    /// Print the version token of an image reference
    Version {
        /// Image reference, e.g. docker.io/aquasec/trivy:0.14.0
        image_ref: String,
    },
    /// Print a sample settings file
    SampleSettings,
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    /// Command line flags override the settings file and environment
    fn apply_overrides(&self, settings: &mut StarboardSettings) {
        if let Some(namespace) = &self.namespace {
            settings.kubernetes.namespace = namespace.clone();
        }
        if let Some(path) = &self.kubeconfig {
            settings.kubernetes.kubeconfig = Some(path.clone());
        }
        if let Some(context) = &self.context {
            settings.kubernetes.context = Some(context.clone());
        }
        if let Some(secs) = self.timeout {
            settings.kubernetes.request_timeout_secs = Some(secs);
        }
        match self.verbose {
            0 => {}
            1 => settings.logging.level = "debug".to_string(),
            _ => settings.logging.level = "trace".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    // Commands that never touch the cluster
    match &cli.command {
        Commands::Version { image_ref } => return commands::version::handle_version(image_ref, format),
        Commands::SampleSettings => {
            print!("{}", StarboardSettings::generate_sample());
            return Ok(());
        }
        Commands::Completions { shell } => {
            generate_completions(*shell);
            return Ok(());
        }
        _ => {}
    }

    let mut settings = StarboardSettings::load().context("Failed to load settings")?;
    cli.apply_overrides(&mut settings);
    settings.validate()?;

    let _log_guard = settings
        .logging
        .init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    let client = K8sClient::from_settings(&settings.kubernetes)
        .await
        .context("Failed to connect to Kubernetes")?;
    tracing::debug!(api_server = client.api_server(), "Connected");

    let mut manager = ConfigManager::for_cluster(&client, settings.kubernetes.namespace.clone())
        .with_defaults(settings.default_table());
    if let Some(timeout) = settings.kubernetes.request_timeout() {
        manager = manager.with_request_timeout(timeout);
    }

    match cli.command {
        Commands::Init => commands::config::handle_init(&manager).await?,
        Commands::Config { key, show_secrets } => {
            commands::config::handle_config(&manager, key.as_deref(), show_secrets, format).await?
        }
        Commands::Images => commands::config::handle_images(&manager, format).await?,
        Commands::Cleanup => commands::config::handle_cleanup(&manager).await?,
        Commands::Version { .. } | Commands::SampleSettings | Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
