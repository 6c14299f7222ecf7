//! `flow-forge` CLI entry-point.
//!
//! Available sub-commands:
//! - `validate` — load a workflow definition file and check it.
//! - `catalog`  — list the primitives the engine offers.
//! - `replay`   — drive the editor with a recorded gesture script.
//! - `save`     — store a definition file through the dashboard API.
//! - `execute`  — start a saved workflow.

mod replay;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use catalog::{load_catalog, Catalog};
use clap::{Parser, Subcommand};
use client::{ClientConfig, HttpClient};
use forge::service::trigger_execution;
use forge::serializer::{from_json_str, to_json_string};
use forge::{validate_dag, Editor, GraphStore, Notification, Trigger, WorkflowRef, WorkflowService};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flow-forge", about = "Visual workflow graph editor core", version)]
struct Cli {
    /// Dashboard API base URL (overrides the config file).
    #[arg(long, global = true, env = "FLOW_FORGE_API_URL")]
    api_url: Option<String>,

    /// Bearer token for the API (overrides the config file).
    #[arg(long, global = true, env = "FLOW_FORGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// TOML client config.
    #[arg(long, global = true, env = "FLOW_FORGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the definition JSON file.
        path: PathBuf,
    },
    /// Fetch the primitive catalog (built-in set if the engine is down).
    Catalog,
    /// Replay a gesture script and write the resulting definition.
    Replay {
        /// Path to the script JSON file.
        script: PathBuf,
        /// Write the definition here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Save a definition file as a new workflow.
    Save {
        path: PathBuf,
        /// Workflow name; defaults to the file stem.
        #[arg(long)]
        name: Option<String>,
        /// Cron schedule; the workflow is saved with a manual trigger if omitted.
        #[arg(long)]
        cron: Option<String>,
    },
    /// Start a saved workflow.
    Execute {
        /// Id returned by `save`.
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { ref path } => validate(path),
        Command::Catalog => {
            let catalog = load_catalog(&http_client(&cli)?).await;
            print_catalog(&catalog);
            Ok(())
        }
        Command::Replay { ref script, ref out } => {
            let client = http_client(&cli)?;
            replay_script(&client, script, out.as_deref()).await
        }
        Command::Save { ref path, ref name, ref cron } => {
            let client = http_client(&cli)?;
            save(&client, path, name.as_deref(), cron.as_deref()).await
        }
        Command::Execute { ref id } => {
            let client = http_client(&cli)?;
            let notification = trigger_execution(&client, &WorkflowRef::new(id.as_str())).await;
            report(notification)
        }
    }
}

/// Config file first, then flags and env vars on top.
fn http_client(cli: &Cli) -> Result<HttpClient> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.api_url {
        config.base_url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.token = Some(token.clone());
    }
    info!("using API at {}", config.base_url);
    Ok(HttpClient::new(config)?)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read file {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| forge::models::DEFAULT_WORKFLOW_NAME.to_owned())
}

fn validate(path: &Path) -> Result<()> {
    let content = read_file(path)?;
    let (workflow, load) = from_json_str(&content, &file_stem(path));

    if load.is_clean() {
        println!("✅ Definition loaded: {} nodes, {} edges", workflow.nodes.len(), workflow.edges.len());
    } else {
        println!(
            "⚠️  Definition loaded partially: {} node(s) and {} edge(s) skipped{}{}",
            load.skipped_nodes,
            load.skipped_edges,
            if load.invalid_viewport { ", viewport ignored" } else { "" },
            if load.invalid_document { ", document unreadable" } else { "" },
        );
    }

    match validate_dag(&workflow) {
        Ok(order) => {
            let order: Vec<&str> = order.iter().map(|id| id.as_str()).collect();
            println!("✅ Workflow is valid. Execution order: {order:?}");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Validation failed: {e}");
            std::process::exit(1);
        }
    }
}

fn print_catalog(catalog: &Catalog) {
    for primitive in catalog.iter() {
        let appearance = primitive.appearance();
        let kind = primitive.kind.map(|k| k.as_str()).unwrap_or("-");
        print!("{:<20} {:<10} {:<16}", primitive.type_id, appearance.icon.name(), kind);
        if primitive.description.is_empty() {
            println!();
        } else {
            println!(" {}", primitive.description);
        }
    }
}

async fn replay_script(client: &HttpClient, path: &Path, out: Option<&Path>) -> Result<()> {
    let script: replay::Script = serde_json::from_str(&read_file(path)?)
        .with_context(|| format!("invalid script {}", path.display()))?;

    let mut editor = Editor::new(load_catalog(client).await);
    let outcome = replay::replay(&mut editor, &script)?;
    for line in &outcome.skipped {
        eprintln!("⚠️  {line}");
    }
    info!("{} step(s) applied, {} skipped", outcome.applied, outcome.skipped.len());

    let definition = to_json_string(editor.workflow())?;
    match out {
        Some(out) => {
            std::fs::write(out, definition).with_context(|| format!("cannot write {}", out.display()))?;
            println!("✅ Definition written to {}", out.display());
        }
        None => println!("{definition}"),
    }
    Ok(())
}

async fn save(client: &HttpClient, path: &Path, name: Option<&str>, cron: Option<&str>) -> Result<()> {
    let content = read_file(path)?;
    let name = name.map(str::to_owned).unwrap_or_else(|| file_stem(path));
    let (workflow, load) = from_json_str(&content, &name);
    if !load.is_clean() {
        eprintln!(
            "⚠️  {} node(s) and {} edge(s) could not be read and will not be saved",
            load.skipped_nodes, load.skipped_edges
        );
    }

    let mut editor = Editor::with_store(Catalog::builtin(), GraphStore::from_workflow(workflow));
    if let Some(expression) = cron {
        editor.set_trigger(Trigger::Cron { expression: expression.to_owned() });
    }

    let pending = editor.begin_save()?;
    let result = client.save(&pending.request).await;
    editor.finish_save(pending, result);

    if let Some(id) = editor.saved_id() {
        println!("Workflow id: {id}");
    }
    editor.drain_notifications().into_iter().try_for_each(report)
}

/// Print a notification; an error becomes the command's failure.
fn report(notification: Notification) -> Result<()> {
    match notification {
        Notification::Success(msg) => println!("✅ {msg}"),
        Notification::Warning(msg) => eprintln!("⚠️  {msg}"),
        Notification::Error(msg) => anyhow::bail!(msg),
    }
    Ok(())
}
