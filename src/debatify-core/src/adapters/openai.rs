//! OpenAI-compatible chat-completions transport.
//!
//! OpenAI, DeepSeek, and Meta all speak the chat-completions wire shape
//! (bearer auth, system/user message roles, text at
//! `choices[0].message.content`), so they share this one adapter and differ
//! only in endpoint, model, and credential.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{error_message, GenerationParams, ProviderAdapter};
use crate::error::DebateError;
use crate::provider::{ProviderCredentials, ProviderId};

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEEPSEEK_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";
const META_ENDPOINT: &str = "https://api.llama.meta.com/v1/chat/completions";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

/// Adapter for any backend speaking the OpenAI chat-completions contract.
pub struct OpenAiCompatibleAdapter {
    provider: ProviderId,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl OpenAiCompatibleAdapter {
    pub fn openai(credentials: &ProviderCredentials, http: reqwest::Client) -> Self {
        Self::custom(
            ProviderId::OpenAi,
            OPENAI_ENDPOINT,
            "gpt-3.5-turbo",
            credentials.for_provider(ProviderId::OpenAi),
            http,
        )
    }

    pub fn deepseek(credentials: &ProviderCredentials, http: reqwest::Client) -> Self {
        Self::custom(
            ProviderId::DeepSeek,
            DEEPSEEK_ENDPOINT,
            "deepseek-chat",
            credentials.for_provider(ProviderId::DeepSeek),
            http,
        )
    }

    pub fn meta(credentials: &ProviderCredentials, http: reqwest::Client) -> Self {
        Self::custom(
            ProviderId::Meta,
            META_ENDPOINT,
            "llama-2-70b-chat",
            credentials.for_provider(ProviderId::Meta),
            http,
        )
    }

    /// Point the transport at any chat-completions-compatible deployment.
    pub fn custom(
        provider: ProviderId,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<&str>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            provider,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.map(str::to_string),
            http,
        }
    }
}

/// Pull the generated text out of a chat-completions response body.
pub(crate) fn extract_text(provider: ProviderId, body: &Value) -> Result<String, DebateError> {
    body.get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DebateError::ResponseShape {
            provider,
            path: "choices[0].message.content",
        })
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn invoke(
        &self,
        system_persona: &str,
        user_prompt: &str,
        params: GenerationParams,
    ) -> Result<String, DebateError> {
        let api_key = self.api_key.as_deref().ok_or(DebateError::MissingCredential {
            provider: self.provider,
        })?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_persona,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| DebateError::Transport {
                provider: self.provider,
                source,
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|source| DebateError::Transport {
                provider: self.provider,
                source,
            })?;

        if !status.is_success() {
            return Err(DebateError::ProviderHttp {
                provider: self.provider,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        extract_text(self.provider, &body)
    }
}
