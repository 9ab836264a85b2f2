//! Chat Backends
//!
//! HTTP clients that turn a transcript into one reply.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::AssistantError;
use super::types::ChatTurn;

/// Anything that can answer a conversation with a single reply
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the whole transcript and return the reply text
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, AssistantError>;
}

#[async_trait]
impl<B: ChatBackend + ?Sized> ChatBackend for std::sync::Arc<B> {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, AssistantError> {
        (**self).complete(turns).await
    }
}

// ============================================
// Hosted chat-completion API
// ============================================

/// Configuration for the hosted chat-completion client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API credential; absence only fails at call time
    pub api_key: Option<String>,
    /// Model identifier sent with every request
    pub model: String,
    /// Base URL of the API (e.g. "https://api.openai.com/v1")
    pub api_base: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            request_timeout_ms: 60_000,
        }
    }
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        let client = match Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    timeout_ms = config.request_timeout_ms,
                    "Failed to build HTTP client, using defaults without the request timeout"
                );
                Client::default()
            }
        };

        Self { client, config }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Whether a credential is present (the call may still fail)
    pub fn has_credential(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    fn request_body<'a>(&'a self, turns: &'a [ChatTurn]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages: turns,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, AssistantError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(AssistantError::MissingCredential),
        };

        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(turns))
            .send()
            .await
            .map_err(AssistantError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let completion: CompletionResponse =
            response.json().await.map_err(AssistantError::Request)?;

        tracing::debug!(
            model = %self.config.model,
            turns = turns.len(),
            choices = completion.choices.len(),
            "Chat completion received"
        );

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AssistantError::EmptyReply)
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

// ============================================
// GameVerse proxy
// ============================================

/// Client for a GameVerse server's `/api/ai` proxy route.
///
/// The proxy holds the API credential so clients never see it.
pub struct ProxyBackend {
    client: Client,
    base_url: String,
}

impl ProxyBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ChatBackend for ProxyBackend {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, AssistantError> {
        let url = format!("{}/api/ai", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&ProxyRequest { messages: turns })
            .send()
            .await
            .map_err(AssistantError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let body: ProxyReply = response.json().await.map_err(AssistantError::Request)?;
        Ok(body.reply)
    }
}

#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    messages: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
struct ProxyReply {
    reply: String,
}
