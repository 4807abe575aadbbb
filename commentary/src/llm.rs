//! Text completion backends.
//!
//! Three interchangeable backends satisfy the same "messages in, text out"
//! contract:
//! - [`CompletionBackend::Local`]: an Ollama-style `/api/generate` server.
//! - [`CompletionBackend::Hosted`]: an OpenAI-style `/chat/completions` API.
//! - [`CompletionBackend::Aggregator`]: an OpenRouter-style `/chat/completions`
//!   API, which also lists its models.
//!
//! Response decoding lives in plain functions so it can be tested without a
//! server.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The aggregator reports the model as overloaded; another model may work.
    #[error("Model {model} is currently overloaded: {message}")]
    Overloaded { model: String, message: String },

    #[error("Unexpected response format: {0}")]
    Format(String),

    /// This backend has no model listing.
    #[error("{0} does not list models")]
    Unsupported(&'static str),
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Prefix every hosted API project key starts with.
pub const HOSTED_KEY_PREFIX: &str = "sk-proj-";

/// Cheap shape check on a hosted API key before any request is made.
pub fn is_hosted_key(key: &str) -> bool {
    key.starts_with(HOSTED_KEY_PREFIX) && key.len() > HOSTED_KEY_PREFIX.len()
}

/// Which service answers, with everything needed to reach it.
#[derive(Debug)]
pub enum CompletionBackend {
    Local {
        base_url: String,
        model: String,
    },
    Hosted {
        base_url: String,
        model: String,
        api_key: SecretString,
    },
    Aggregator {
        base_url: String,
        model: String,
        api_key: SecretString,
        referer: String,
        title: String,
    },
}

impl CompletionBackend {
    /// Human-readable name used in inline error messages.
    pub fn label(&self) -> &'static str {
        match self {
            CompletionBackend::Local { .. } => "local model",
            CompletionBackend::Hosted { .. } => "OpenAI API",
            CompletionBackend::Aggregator { .. } => "OpenRouter API",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            CompletionBackend::Local { model, .. }
            | CompletionBackend::Hosted { model, .. }
            | CompletionBackend::Aggregator { model, .. } => model,
        }
    }
}

/// Anything that turns a conversation into a single answer.
#[async_trait]
pub trait Completion {
    fn label(&self) -> &str;

    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// The local generate endpoint takes a single prompt: all message contents
/// joined by a blank line.
pub fn flatten_prompt(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `{"error": {"message": ...}}` or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Decodes a `/api/generate` reply.
pub fn parse_generate_response(status: StatusCode, body: &str) -> Result<String, LlmError> {
    if !status.is_success() {
        return Err(LlmError::Api {
            status: status.as_u16(),
            message: error_message(body),
        });
    }
    let value: Value =
        serde_json::from_str(body).map_err(|e| LlmError::Format(format!("{e}: {body}")))?;
    value
        .get("response")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::Format("no 'response' key in output".to_string()))
}

/// Decodes a `/chat/completions` reply. `model` is only used to label an
/// overloaded error.
pub fn parse_chat_response(status: StatusCode, body: &str, model: &str) -> Result<String, LlmError> {
    if !status.is_success() {
        let message = error_message(body);
        if message.contains("Overloaded") {
            return Err(LlmError::Overloaded {
                model: model.to_string(),
                message,
            });
        }
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Format(format!("{e}: {body}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::Format(format!("no choices in {body}")))
}

/// Decodes a model listing: `{"data": [{"id": ...}]}` or a bare list.
pub fn parse_models_response(status: StatusCode, body: &str) -> Result<Vec<String>, LlmError> {
    if !status.is_success() {
        return Err(LlmError::Api {
            status: status.as_u16(),
            message: error_message(body),
        });
    }
    let value: Value =
        serde_json::from_str(body).map_err(|e| LlmError::Format(format!("{e}: {body}")))?;
    let entries = match &value {
        Value::Object(map) => map.get("data").and_then(Value::as_array),
        Value::Array(list) => Some(list),
        _ => None,
    }
    .ok_or_else(|| LlmError::Format(format!("unexpected model list: {body}")))?;

    Ok(entries
        .iter()
        .filter_map(|m| m.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// HTTP client bound to one backend.
pub struct LlmClient {
    client: Client,
    backend: CompletionBackend,
}

impl LlmClient {
    pub fn new(client: Client, backend: CompletionBackend) -> Self {
        Self { client, backend }
    }

    pub fn backend(&self) -> &CompletionBackend {
        &self.backend
    }

    /// Lists the aggregator's model ids.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let CompletionBackend::Aggregator {
            base_url, api_key, ..
        } = &self.backend
        else {
            return Err(LlmError::Unsupported(self.backend.label()));
        };

        let response = self
            .client
            .get(join_url(base_url, "models"))
            .bearer_auth(api_key.expose_secret())
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        parse_models_response(status, &body)
    }

    async fn complete_local(
        &self,
        base_url: &str,
        model: &str,
        messages: &[Message],
    ) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model,
            prompt: flatten_prompt(messages),
            stream: false,
        };
        let response = self
            .client
            .post(join_url(base_url, "api/generate"))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        parse_generate_response(status, &body)
    }

    async fn complete_chat(
        &self,
        base_url: &str,
        model: &str,
        api_key: &SecretString,
        extra_headers: &[(&str, &str)],
        messages: &[Message],
    ) -> Result<String, LlmError> {
        let mut request = self
            .client
            .post(join_url(base_url, "chat/completions"))
            .bearer_auth(api_key.expose_secret())
            .json(&ChatRequest { model, messages });
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_chat_response(status, &body, model)
    }
}

#[async_trait]
impl Completion for LlmClient {
    fn label(&self) -> &str {
        self.backend.label()
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        debug!(backend = self.backend.label(), model = self.backend.model(), "requesting completion");
        let answer = match &self.backend {
            CompletionBackend::Local { base_url, model } => {
                self.complete_local(base_url, model, messages).await
            }
            CompletionBackend::Hosted {
                base_url,
                model,
                api_key,
            } => self.complete_chat(base_url, model, api_key, &[], messages).await,
            CompletionBackend::Aggregator {
                base_url,
                model,
                api_key,
                referer,
                title,
            } => {
                let headers = [("HTTP-Referer", referer.as_str()), ("X-Title", title.as_str())];
                self.complete_chat(base_url, model, api_key, &headers, messages)
                    .await
            }
        }?;
        info!(model = self.backend.model(), chars = answer.len(), "completion received");
        Ok(answer)
    }
}
