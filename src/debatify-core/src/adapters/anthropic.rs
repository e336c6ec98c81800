//! Anthropic messages API adapter.
//!
//! Differs from the chat-completions shape on every axis: `x-api-key`
//! header instead of bearer auth, a pinned `anthropic-version` header, and
//! the reply at `content[0].text`. The persona is folded into the single
//! user message.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{error_message, GenerationParams, ProviderAdapter};
use crate::error::DebateError;
use crate::provider::{ProviderCredentials, ProviderId};

const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-2";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<UserMessage>,
}

#[derive(Serialize)]
struct UserMessage {
    role: &'static str,
    content: String,
}

pub struct AnthropicAdapter {
    api_key: Option<String>,
    http: reqwest::Client,
}

impl AnthropicAdapter {
    pub fn new(credentials: &ProviderCredentials, http: reqwest::Client) -> Self {
        Self {
            api_key: credentials
                .for_provider(ProviderId::Anthropic)
                .map(str::to_string),
            http,
        }
    }
}

pub(crate) fn extract_text(body: &Value) -> Result<String, DebateError> {
    body.get("content")
        .and_then(|content| content.get(0))
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DebateError::ResponseShape {
            provider: ProviderId::Anthropic,
            path: "content[0].text",
        })
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn invoke(
        &self,
        system_persona: &str,
        user_prompt: &str,
        params: GenerationParams,
    ) -> Result<String, DebateError> {
        let api_key = self.api_key.as_deref().ok_or(DebateError::MissingCredential {
            provider: ProviderId::Anthropic,
        })?;

        let request = MessagesRequest {
            model: MODEL,
            max_tokens: params.max_tokens,
            messages: vec![UserMessage {
                role: "user",
                content: format!("{system_persona}\n\n{user_prompt}"),
            }],
        };

        let response = self
            .http
            .post(ENDPOINT)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|source| DebateError::Transport {
                provider: ProviderId::Anthropic,
                source,
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|source| DebateError::Transport {
                provider: ProviderId::Anthropic,
                source,
            })?;

        if !status.is_success() {
            return Err(DebateError::ProviderHttp {
                provider: ProviderId::Anthropic,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        extract_text(&body)
    }
}
