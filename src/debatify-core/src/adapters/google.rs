//! Google Gemini `generateContent` adapter.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{error_message, GenerationParams, ProviderAdapter};
use crate::error::DebateError;
use crate::provider::{ProviderCredentials, ProviderId};

const ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

pub struct GoogleAdapter {
    api_key: Option<String>,
    http: reqwest::Client,
}

impl GoogleAdapter {
    pub fn new(credentials: &ProviderCredentials, http: reqwest::Client) -> Self {
        Self {
            api_key: credentials
                .for_provider(ProviderId::Google)
                .map(str::to_string),
            http,
        }
    }
}

pub(crate) fn extract_text(body: &Value) -> Result<String, DebateError> {
    body.get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.get(0))
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DebateError::ResponseShape {
            provider: ProviderId::Google,
            path: "candidates[0].content.parts[0].text",
        })
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Google
    }

    async fn invoke(
        &self,
        system_persona: &str,
        user_prompt: &str,
        params: GenerationParams,
    ) -> Result<String, DebateError> {
        let api_key = self.api_key.as_deref().ok_or(DebateError::MissingCredential {
            provider: ProviderId::Google,
        })?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{system_persona}\n\n{user_prompt}"),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: params.max_tokens,
                temperature: params.temperature,
            },
        };

        let response = self
            .http
            .post(ENDPOINT)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| DebateError::Transport {
                provider: ProviderId::Google,
                source,
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|source| DebateError::Transport {
                provider: ProviderId::Google,
                source,
            })?;

        if !status.is_success() {
            return Err(DebateError::ProviderHttp {
                provider: ProviderId::Google,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        extract_text(&body)
    }
}
