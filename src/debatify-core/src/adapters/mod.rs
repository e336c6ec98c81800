//! Provider adapter layer.
//!
//! One adapter per backend, each translating a generic generation request
//! into that vendor's HTTP contract: endpoint, auth header shape, payload
//! schema, and response field path all differ per vendor. Adapters perform
//! exactly one request per invocation and never retry.

pub mod anthropic;
pub mod google;
pub mod hosted;
pub mod openai;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DebateError;
use crate::provider::{ProviderCredentials, ProviderId};

/// Sampling parameters shared by every adapter.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            temperature: 0.7,
        }
    }
}

/// Uniform request surface over a single vendor backend.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The backend this adapter speaks to.
    fn provider(&self) -> ProviderId;

    /// Issue exactly one generation request and return the plain text reply.
    async fn invoke(
        &self,
        system_persona: &str,
        user_prompt: &str,
        params: GenerationParams,
    ) -> Result<String, DebateError>;
}

/// Build the adapter for a provider identity.
///
/// `remote_identity` is forwarded verbatim by the hosted fallback and
/// ignored by the direct vendor adapters.
pub fn adapter_for(
    remote_identity: &str,
    provider: ProviderId,
    credentials: &ProviderCredentials,
    http: &reqwest::Client,
) -> Box<dyn ProviderAdapter> {
    match provider {
        ProviderId::OpenAi => Box::new(openai::OpenAiCompatibleAdapter::openai(
            credentials,
            http.clone(),
        )),
        ProviderId::DeepSeek => Box::new(openai::OpenAiCompatibleAdapter::deepseek(
            credentials,
            http.clone(),
        )),
        ProviderId::Meta => Box::new(openai::OpenAiCompatibleAdapter::meta(
            credentials,
            http.clone(),
        )),
        ProviderId::Anthropic => Box::new(anthropic::AnthropicAdapter::new(
            credentials,
            http.clone(),
        )),
        ProviderId::Google => Box::new(google::GoogleAdapter::new(credentials, http.clone())),
        ProviderId::Hosted => Box::new(hosted::HostedAdapter::new(
            remote_identity,
            credentials,
            http.clone(),
        )),
    }
}

/// Best-effort human message from a vendor error payload.
pub(crate) fn error_message(body: &Value) -> String {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
