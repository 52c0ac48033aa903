// src/provider/gemini.rs

//! Gemini deep-research agent over the interactions REST API.
//!
//! - start:  `POST {base}/interactions` with
//!   `{input, agent, background: true, store: true}`; the reply carries `id`.
//! - status: `GET {base}/interactions/{id}`; the reply carries `status`
//!   (`running` / `completed` / `failed`), `outputs: [{text}]` whose last
//!   element is the report, and `error` (string or structured).

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::BoxFuture;

use super::credentials::Credentials;
use super::{ProviderError, ProviderFactory, ResearchProvider, ResearchStatus};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    credentials: Credentials,
}

#[derive(Debug, Serialize)]
struct CreateInteraction<'a> {
    input: String,
    agent: &'a str,
    background: bool,
    store: bool,
}

#[derive(Debug, Default, Deserialize)]
struct InteractionResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    outputs: Option<Vec<InteractionOutput>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct InteractionOutput {
    #[serde(default)]
    text: Option<String>,
}

impl InteractionResponse {
    /// Text of the last output, if non-empty.
    fn report(&self) -> Option<String> {
        self.outputs
            .as_ref()
            .and_then(|outputs| outputs.last())
            .and_then(|o| o.text.clone())
            .filter(|t| !t.trim().is_empty())
    }

    fn error_text(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => "unknown error".to_string(),
            Some(other) => other.to_string(),
        }
    }

    fn status(&self) -> Result<ResearchStatus, ProviderError> {
        let status = self
            .status
            .as_deref()
            .ok_or_else(|| ProviderError::Parse("response has no `status`".to_string()))?;

        Ok(match status {
            "completed" => ResearchStatus::Completed {
                report: self.report(),
            },
            "failed" | "cancelled" => ResearchStatus::Failed {
                error: self.error_text(),
            },
            // `running` and any in-between state the API may add.
            _ => ResearchStatus::Running,
        })
    }
}

/// Build the single `input` text sent to the agent.
pub fn merge_prompt(prompt: &str, context: &str) -> String {
    format!("{prompt}\n\n---\n\n{context}")
}

async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    if !resp.status().is_success() {
        return Err(ProviderError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

impl GeminiProvider {
    pub fn new(credentials: Credentials) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("deep-research/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    fn interactions_url(&self) -> String {
        format!("{}/interactions", self.credentials.base_url)
    }

    async fn fetch(&self, interaction_id: &str) -> Result<InteractionResponse, ProviderError> {
        let url = format!("{}/{}", self.interactions_url(), interaction_id);
        let resp = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.credentials.api_key)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        resp.json::<InteractionResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

impl ResearchProvider for GeminiProvider {
    fn start<'a>(
        &'a self,
        context: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let body = CreateInteraction {
                input: merge_prompt(prompt, context),
                agent: &self.credentials.agent,
                background: true,
                store: true,
            };
            debug!(agent = %self.credentials.agent, "creating interaction");

            let resp = self
                .client
                .post(self.interactions_url())
                .header(API_KEY_HEADER, &self.credentials.api_key)
                .json(&body)
                .send()
                .await?;
            let resp = check_response(resp).await?;
            let parsed: InteractionResponse = resp
                .json()
                .await
                .map_err(|e| ProviderError::Parse(e.to_string()))?;

            parsed
                .id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ProviderError::Parse("response has no `id`".to_string()))
        })
    }

    fn check_status<'a>(
        &'a self,
        interaction_id: &'a str,
    ) -> BoxFuture<'a, Result<ResearchStatus, ProviderError>> {
        Box::pin(async move { self.fetch(interaction_id).await?.status() })
    }

    fn get_report<'a>(
        &'a self,
        interaction_id: &'a str,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let resp = self.fetch(interaction_id).await?;
            match resp.status()? {
                ResearchStatus::Completed { report: Some(text) } => Ok(text),
                ResearchStatus::Completed { report: None } => {
                    Err(ProviderError::EmptyReport(interaction_id.to_string()))
                }
                _ => Err(ProviderError::NotCompleted {
                    id: interaction_id.to_string(),
                    status: resp.status.unwrap_or_default(),
                }),
            }
        })
    }
}

/// Production factory: reads the credential file and builds a client.
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderFactory;

impl ProviderFactory for GeminiProviderFactory {
    fn create(&self, env_file: &Path) -> Result<Arc<dyn ResearchProvider>, ProviderError> {
        let credentials = Credentials::load(env_file)?;
        Ok(Arc::new(GeminiProvider::new(credentials)?))
    }
}
