// src/provider/credentials.rs

//! Credential file parsing.
//!
//! ```text
//! # deep-research credentials
//! LLM_PROVIDER=gemini
//! GEMINI_API_KEY=...
//! GEMINI_MODEL=deep-research-pro-preview-12-2025   # optional
//! GEMINI_BASE_URL=https://...                       # optional
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use super::ProviderError;

pub const PROVIDER_KEY: &str = "LLM_PROVIDER";
pub const EXPECTED_PROVIDER: &str = "gemini";
pub const API_KEY_KEY: &str = "GEMINI_API_KEY";
pub const AGENT_KEY: &str = "GEMINI_MODEL";
pub const BASE_URL_KEY: &str = "GEMINI_BASE_URL";

pub const DEFAULT_AGENT: &str = "deep-research-pro-preview-12-2025";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub agent: String,
    pub base_url: String,
}

// Keep the key out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("agent", &self.agent)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        if !path.is_file() {
            return Err(ProviderError::Credentials(format!(
                "env file not found: {}",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Credentials(format!("reading {}: {e}", path.display()))
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ProviderError> {
        let vars = parse_env(contents);

        match vars.get(PROVIDER_KEY).map(String::as_str) {
            Some(EXPECTED_PROVIDER) => {}
            Some(other) => {
                return Err(ProviderError::Credentials(format!(
                    "{PROVIDER_KEY} is '{other}', expected '{EXPECTED_PROVIDER}'"
                )));
            }
            None => {
                return Err(ProviderError::Credentials(format!(
                    "{PROVIDER_KEY} is not set"
                )));
            }
        }

        let api_key = vars
            .get(API_KEY_KEY)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| ProviderError::Credentials(format!("{API_KEY_KEY} is missing")))?;

        let agent = vars
            .get(AGENT_KEY)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_AGENT.to_string());

        let base_url = vars
            .get(BASE_URL_KEY)
            .filter(|v| !v.is_empty())
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            agent,
            base_url,
        })
    }
}

/// `KEY=value` lines; blank lines and `#` comments are skipped, values may be
/// wrapped in matching quotes.
fn parse_env(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| {
            let v = strip_inline_comment(v.trim());
            (k.trim().to_string(), unquote(v).to_string())
        })
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

/// Drop a trailing ` # ...` comment. A `#` inside quotes or glued to the
/// value (`abc#1`) is kept.
fn strip_inline_comment(v: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(rest) = v.strip_prefix(q) {
            if let Some(end) = rest.find(q) {
                return &v[..end + 2];
            }
        }
    }
    let cut = v
        .match_indices('#')
        .map(|(i, _)| i)
        .find(|&i| v[..i].ends_with(char::is_whitespace));
    match cut {
        Some(i) => v[..i].trim_end(),
        None => v,
    }
}

fn unquote(v: &str) -> &str {
    for q in ['"', '\''] {
        if v.len() >= 2 && v.starts_with(q) && v.ends_with(q) {
            return &v[1..v.len() - 1];
        }
    }
    v
}
