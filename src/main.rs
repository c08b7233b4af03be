//! Scene engine replay tool.
//!
//! Feeds a JSON message script through a store backed by the in-memory
//! audio backend and prints the final Model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use scene_engine::config::EngineConfig;
use scene_engine::engine::{Message, Model, Pipeline, Store};
use scene_engine::logging::init_tracing;
use scene_engine::mixer::{MemoryBackend, Reconciler};
use scene_engine::persistence::{FileStorage, PersistenceAdapter};

#[derive(Parser, Debug)]
#[command(name = "scene-engine", version, about = "Declarative scene-state engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dispatch every message of a JSON script and print the final Model.
    Replay(ReplayArgs),
}

#[derive(clap::Args, Debug)]
struct ReplayArgs {
    /// JSON array of messages, each tagged with `type`.
    script: PathBuf,

    /// Engine config file (defaults to the user config file, if any).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from the model stored under this key instead of a fresh one.
    #[arg(long, requires = "store_dir")]
    resume: Option<String>,

    /// Store the final model under this key.
    #[arg(long, requires = "store_dir")]
    save: Option<String>,

    /// Directory holding stored models.
    #[arg(long)]
    store_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay(args) => replay(args).await,
    }
}

async fn replay(args: ReplayArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load()?,
    };
    let script = read_script(&args.script)?;

    let adapter = args
        .store_dir
        .as_ref()
        .map(|dir| PersistenceAdapter::new(Arc::new(FileStorage::new(dir))));

    let mut model = match (&adapter, &args.resume) {
        (Some(adapter), Some(key)) => adapter
            .load(key)?
            .with_context(|| format!("No stored model under '{}'", key))?,
        _ => Model::default(),
    };
    model.config = config;

    let backend = MemoryBackend::new();
    let driver = Arc::new(Reconciler::new(backend.clone()));
    let mut store = Store::with_model(Pipeline::new(driver), model);

    info!(messages = script.len(), "Replaying script");
    for message in script {
        store.dispatch(message);
    }
    store.settle().await;
    info!(
        live_nodes = backend.live_nodes(),
        backend_events = backend.events().len(),
        "Replay finished"
    );

    let model = store.model();
    println!("{}", serde_json::to_string_pretty(model)?);

    if let (Some(adapter), Some(key)) = (&adapter, &args.save) {
        adapter.save(key, model)?;
    }
    Ok(())
}

fn read_script(path: &Path) -> anyhow::Result<Vec<Message>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script '{}'", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse script '{}'", path.display()))?;
    let serde_json::Value::Array(items) = value else {
        bail!("Script '{}' must be a JSON array of messages", path.display());
    };
    Ok(items.into_iter().map(Message::from_value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_replay() {
        let cli = Cli::try_parse_from([
            "scene-engine",
            "replay",
            "script.json",
            "--save",
            "slot",
            "--store-dir",
            "/tmp/saves",
        ])
        .unwrap();
        let Commands::Replay(args) = cli.command;
        assert_eq!(args.script, PathBuf::from("script.json"));
        assert_eq!(args.save.as_deref(), Some("slot"));
    }

    #[test]
    fn save_requires_store_dir() {
        let result = Cli::try_parse_from(["scene-engine", "replay", "s.json", "--save", "slot"]);
        assert!(result.is_err());
    }

    #[test]
    fn script_must_be_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, r#"{"type": "AwaitAction"}"#).unwrap();
        assert!(read_script(&path).is_err());

        std::fs::write(&path, r#"[{"type": "AwaitAction"}, {"type": "Bogus"}]"#).unwrap();
        let script = read_script(&path).unwrap();
        assert_eq!(script[0], Message::AwaitAction);
        assert!(matches!(script[1], Message::Error { .. }));
    }
}
