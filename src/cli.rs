// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `deep-research`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "deep-research",
    version,
    about = "Launch and track long-running deep-research jobs for vault notes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the settings file (TOML).
    ///
    /// Default: `DEEP_RESEARCH_CONFIG`, else `DeepResearch.toml` in the
    /// current working directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEEP_RESEARCH_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start a research run for a note (vault-relative path).
    Start {
        #[arg(value_name = "NOTE")]
        note: String,

        /// Return as soon as the run is accepted instead of polling it.
        #[arg(long)]
        detach: bool,
    },

    /// Resume polling the persisted run, e.g. after a restart.
    Resume,

    /// Reset/abandon the current run without contacting the provider.
    Abandon,

    /// Print effective settings, the current run and recent log entries.
    Status {
        /// Number of journal entries to show.
        #[arg(long, default_value_t = 10)]
        entries: usize,
    },

    /// Write a default settings file if none exists.
    Init,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_takes_note_and_global_flags() {
        let args = CliArgs::try_parse_from([
            "deep-research",
            "start",
            "Notes/noteA.md",
            "--detach",
            "--config",
            "vault/DeepResearch.toml",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("vault/DeepResearch.toml")));
        match args.command {
            Command::Start { note, detach } => {
                assert_eq!(note, "Notes/noteA.md");
                assert!(detach);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(CliArgs::try_parse_from(["deep-research"]).is_err());
    }
}
