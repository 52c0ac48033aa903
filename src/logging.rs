// src/logging.rs

//! Diagnostic logging via `tracing` + `tracing-subscriber`.
//!
//! Filter resolution:
//! 1. `--log-level` CLI flag applies one level to everything
//! 2. `DEEP_RESEARCH_LOG` holds full filter directives
//!    (e.g. `deep_research=debug,reqwest=info`)
//! 3. otherwise `info`, with the HTTP stack held at `warn`
//!
//! Diagnostics go to STDERR; user notices are printed on stdout. The
//! reason-coded run journal is separate (see `journal`).

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "DEEP_RESEARCH_LOG";

const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(cli_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.as_directive());
    }
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_becomes_a_global_directive() {
        assert_eq!(build_filter(Some(LogLevel::Debug)).to_string(), "debug");
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
    }
}
