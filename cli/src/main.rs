use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use delta_append_kernel::config::WriterConfig;
use delta_append_kernel::log::{next_version, LogStore, Version};
use delta_append_kernel::notify::{
    NotificationSink, SinkError, TransactionNotification, TransportMessage,
};
use delta_append_kernel::pipeline::CommitPipeline;
use delta_append_kernel::schema::{encode_schema, TableSchema};

mod input;
mod store;

use input::{DestinationFile, RequestFile};
use store::FsLogStore;

/// Delta append commit generator
#[derive(Parser, Debug)]
#[command(name = "delta-append")]
#[command(about = "Generate Delta Lake append commits and transaction notifications", long_about = None)]
struct Cli {
    /// Path to writer config JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the Delta schema string for a column list
    Schema {
        /// Path to columns JSON
        #[arg(long)]
        schema: PathBuf,
    },

    /// Print the commit text for an append request
    Commit {
        /// Path to append request JSON
        #[arg(long)]
        request: PathBuf,

        /// Table root to append the commit to
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Log version to write; defaults to the next free version
        #[arg(long, requires = "log_dir")]
        version: Option<Version>,
    },

    /// Print the transaction notification for an append request
    Notify {
        /// Path to append request JSON
        #[arg(long)]
        request: PathBuf,

        /// Path to transaction destination JSON
        #[arg(long)]
        destination: PathBuf,
    },
}

/// Writes each delivered message body to stdout.
struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn deliver(&mut self, message: TransportMessage) -> Result<(), SinkError> {
        info!(
            content_type = message.content_type,
            message_type = message.message_type,
            timestamp = %message.timestamp,
            "delivering notification"
        );
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", message.body)?;
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<WriterConfig> {
    let Some(path) = path else {
        return Ok(WriterConfig::default_config());
    };

    let data =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    WriterConfig::from_json_str(&data).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // ----------------------------
    // Load config
    // ----------------------------
    let config = load_config(cli.config.as_deref())?;

    let pipeline = CommitPipeline::new(&config);

    match cli.command {
        Command::Schema { schema } => {
            let schema: TableSchema = read_json(&schema)?;
            println!("{}", encode_schema(&schema)?);
        }

        Command::Commit {
            request,
            log_dir,
            version,
        } => {
            let (schema, request) = read_json::<RequestFile>(&request)?.resolve(&config);
            let text = pipeline.commit_text(&schema, &request)?;

            if let Some(root) = log_dir {
                let mut store = FsLogStore::new(&root);
                let version = match version {
                    Some(v) => v,
                    None => next_version(store.latest_version()?)?,
                };
                store.append(version, &text)?;
                info!(version, table = %root.display(), "appended commit");
            }

            println!("{text}");
        }

        Command::Notify {
            request,
            destination,
        } => {
            let (schema, request) = read_json::<RequestFile>(&request)?.resolve(&config);
            let destination = read_json::<DestinationFile>(&destination)?.resolve(&config);

            let text = pipeline.commit_text(&schema, &request)?;
            let notification = TransactionNotification::new(&text, destination);
            StdoutSink.deliver(TransportMessage::from_notification(&notification)?)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use delta_append_kernel::config::ValidationMode;

    #[test]
    fn missing_config_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("writer.json");

        let err = load_config(Some(&path)).unwrap_err();
        assert_eq!(err.to_string(), format!("reading config {}", path.display()));
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("writer.json");
        fs::write(&path, r#"{ "validation": "permissive" }"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.validation, ValidationMode::Permissive);
        assert_eq!(config.min_writer_version, 2);

        assert_eq!(load_config(None).unwrap().validation, ValidationMode::Strict);
    }
}
