use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use warrantly_core::config::{LlmConfig, LlmProvider};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// A structured extraction schema offered to the classifier.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// The classifier's selection: at most one tool with its arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("llm transport failure: {0}")]
    Transport(String),
    #[error("llm returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm response could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Plain completion for generation tasks (FAQ answering).
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Offer the given schemas and return the model's selection, if any.
    /// `None` means the model chose to answer without a tool.
    async fn select_tool(
        &self,
        query: &str,
        tools: &[ToolSpec],
    ) -> Result<Option<ToolInvocation>, LlmError>;
}

/// Chat-completions client for OpenAI-compatible backends (OpenAI itself, or
/// an Ollama endpoint serving the `/v1` surface). Temperature is pinned to
/// zero: classification must be repeatable.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    max_retries: u32,
}

impl OpenAiChatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Transport(error.to_string()))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| match config.provider {
                LlmProvider::OpenAi => OPENAI_BASE_URL.to_string(),
                LlmProvider::Ollama => "http://localhost:11434/v1".to_string(),
            })
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn post_chat(&self, body: &Value) -> Result<ChatResponseMessage, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut attempt = 0u32;

        loop {
            let mut request = self.http.post(&url).json(body);
            if let Some(api_key) = &self.api_key {
                request = request.bearer_auth(api_key.expose_secret());
            }

            let (retryable, error) = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let decoded = response
                            .json::<ChatResponse>()
                            .await
                            .map_err(|error| LlmError::Decode(error.to_string()))?;
                        let message = decoded
                            .choices
                            .into_iter()
                            .next()
                            .map(|choice| choice.message)
                            .ok_or_else(|| {
                                LlmError::Decode("chat response contained no choices".to_string())
                            })?;
                        return Ok(message);
                    }

                    let retryable = status.is_server_error();
                    let body_text = response.text().await.unwrap_or_default();
                    (retryable, LlmError::Status { status: status.as_u16(), body: body_text })
                }
                Err(error) => (true, LlmError::Transport(error.to_string())),
            };

            if !retryable || attempt >= self.max_retries {
                return Err(error);
            }
            attempt += 1;
            tracing::warn!(
                event_name = "llm.request_retry",
                attempt,
                error = %error,
                "retrying chat completion request"
            );
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "temperature": 0.0,
            "messages": [{"role": "user", "content": prompt}],
        });

        let message = self.post_chat(&body).await?;
        message
            .content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::Decode("chat response contained no content".to_string()))
    }

    async fn select_tool(
        &self,
        query: &str,
        tools: &[ToolSpec],
    ) -> Result<Option<ToolInvocation>, LlmError> {
        let tool_payload = tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    },
                })
            })
            .collect::<Vec<_>>();

        let body = json!({
            "model": self.model,
            "temperature": 0.0,
            "messages": [{"role": "user", "content": query}],
            "tools": tool_payload,
            "tool_choice": "auto",
        });

        let message = self.post_chat(&body).await?;
        let Some(call) = message.tool_calls.into_iter().next() else {
            return Ok(None);
        };

        // Arguments arrive as a JSON-encoded string; an undecodable payload
        // becomes `null` so the extractor's schema check rejects it instead
        // of failing the turn.
        let arguments =
            serde_json::from_str(&call.function.arguments).unwrap_or(Value::Null);

        Ok(Some(ToolInvocation { name: call.function.name, arguments }))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ChatToolCall>,
}

#[derive(Debug, Deserialize)]
struct ChatToolCall {
    function: ChatFunctionCall,
}

#[derive(Debug, Deserialize)]
struct ChatFunctionCall {
    name: String,
    arguments: String,
}
