// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod journal;
pub mod logging;
pub mod notify;
pub mod provider;
pub mod report;
pub mod store;
pub mod types;
pub mod vault;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{Settings, default_settings_path, load_and_validate, write_default};
use crate::engine::{Collaborators, RunController, RunEvent, Runtime};
use crate::fs::RealFileSystem;
use crate::journal::Journal;
use crate::notify::ConsoleNotifier;
use crate::provider::GeminiProviderFactory;
use crate::report::VaultReportSink;
use crate::store::FileRunStore;
use crate::vault::{Subject, Vault};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading
/// - the production collaborators (vault, store, provider, sink, journal)
/// - controller / runtime
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_settings_path);

    if let Command::Init = args.command {
        write_default(&config_path)?;
        println!("wrote {}", config_path.display());
        return Ok(());
    }

    let settings = load_and_validate(&config_path)?;
    let deps = production_collaborators(&settings, &config_path);

    if let Command::Status { entries } = args.command {
        return print_status(&settings, &deps, &config_path, entries).await;
    }

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RunEvent>(64);
    let mut controller = RunController::new(settings, deps, rt_tx.clone());

    let keep_polling = match args.command {
        Command::Start { note, detach } => {
            let subject = Subject::from_path(note);
            controller.start_research(&subject).await?;
            !detach
        }
        Command::Resume => controller.start_polling().await?,
        Command::Abandon => {
            controller.reset_abandon_run().await?;
            false
        }
        Command::Status { .. } | Command::Init => false,
    };

    if !keep_polling {
        debug!("nothing to poll; exiting");
        return Ok(());
    }

    // Ctrl-C → stop polling, keep the persisted run.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RunEvent::ShutdownRequested).await;
        });
    }
    drop(rt_tx);

    let mut runtime = Runtime::new(controller, rt_rx);
    let outcome = runtime.run().await?;
    info!(?outcome, "polling finished");
    Ok(())
}

/// Build the collaborators used by the CLI.
///
/// The vault root is `vault_dir` resolved against the settings file's
/// directory; the journal lives under the vault root.
pub fn production_collaborators(settings: &Settings, config_path: &Path) -> Collaborators {
    let fs = Arc::new(RealFileSystem);
    let vault = Vault::new(fs.clone(), config_root_dir(config_path).join(settings.vault_dir()));
    let journal = Journal::new(fs, vault.resolve(settings.log_path()));

    Collaborators {
        store: Arc::new(FileRunStore::new(config_path)),
        providers: Arc::new(GeminiProviderFactory),
        reports: Arc::new(VaultReportSink::new(vault.clone())),
        notifier: Arc::new(ConsoleNotifier),
        vault,
        journal,
    }
}

/// Directory that relative settings paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "vault/DeepResearch.toml"),
///   we use that directory.
/// - If it's just a bare filename like "DeepResearch.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

async fn print_status(
    settings: &Settings,
    deps: &Collaborators,
    config_path: &Path,
    entries: usize,
) -> Result<()> {
    let section = settings.section();
    println!("deep-research status");
    println!("  settings      = {}", config_path.display());
    println!("  enabled       = {}", section.enabled);
    println!("  prompt_path   = {}", settings.prompt_path().unwrap_or("<unset>"));
    println!(
        "  env_file_path = {}",
        settings
            .env_file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unset>".to_string())
    );
    println!(
        "  intervals     = check {}s, notice {}s",
        section.check_interval_secs, section.notice_interval_secs
    );
    println!("  vault         = {}", deps.vault.root().display());
    println!();

    match deps.store.get().await? {
        Some(run) => {
            println!("current run:");
            println!("  subject        = {} ({})", run.subject_name(), run.subject_path());
            println!("  interaction_id = {}", run.interaction_id());
            println!("  started        = {}", run.start_time().to_rfc3339());
        }
        None => println!("no active run"),
    }

    let recent = deps.journal.recent(entries);
    if !recent.is_empty() {
        println!();
        println!("recent log ({}):", deps.journal.path().display());
        for entry in recent {
            println!("  {}", entry.format());
        }
    }
    Ok(())
}
