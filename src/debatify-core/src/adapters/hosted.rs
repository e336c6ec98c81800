//! Generic fallback adapter that defers generation to a hosted gateway.
//!
//! Instead of speaking a vendor contract directly, this adapter forwards
//! the participant identity and prompt context to a deployed generation
//! gateway (the same surface `debatify-gateway` serves) and reads back
//! `generatedText`. The remote gateway applies its own persona wrapping,
//! so the local persona argument is not forwarded.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{GenerationParams, ProviderAdapter};
use crate::error::DebateError;
use crate::provider::{ProviderCredentials, ProviderId};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GatewayRequest<'a> {
    participant_identity: &'a str,
    prompt_context: &'a str,
}

pub struct HostedAdapter {
    /// Identity forwarded to the remote gateway.
    remote_identity: String,
    gateway_url: Option<String>,
    http: reqwest::Client,
}

impl HostedAdapter {
    pub fn new(
        remote_identity: impl Into<String>,
        credentials: &ProviderCredentials,
        http: reqwest::Client,
    ) -> Self {
        Self {
            remote_identity: remote_identity.into(),
            gateway_url: credentials
                .for_provider(ProviderId::Hosted)
                .map(str::to_string),
            http,
        }
    }
}

pub(crate) fn extract_text(body: &Value) -> Result<String, DebateError> {
    body.get("generatedText")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DebateError::ResponseShape {
            provider: ProviderId::Hosted,
            path: "generatedText",
        })
}

#[async_trait]
impl ProviderAdapter for HostedAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Hosted
    }

    async fn invoke(
        &self,
        _system_persona: &str,
        user_prompt: &str,
        _params: GenerationParams,
    ) -> Result<String, DebateError> {
        let gateway_url = self
            .gateway_url
            .as_deref()
            .ok_or(DebateError::MissingCredential {
                provider: ProviderId::Hosted,
            })?;

        let request = GatewayRequest {
            participant_identity: &self.remote_identity,
            prompt_context: user_prompt,
        };

        let response = self
            .http
            .post(gateway_url)
            .json(&request)
            .send()
            .await
            .map_err(|source| DebateError::Transport {
                provider: ProviderId::Hosted,
                source,
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|source| DebateError::Transport {
                provider: ProviderId::Hosted,
                source,
            })?;

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            return Err(DebateError::ProviderHttp {
                provider: ProviderId::Hosted,
                status: status.as_u16(),
                message,
            });
        }

        extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_text() {
        let body = json!({"generatedText": "A forwarded reply."});
        assert_eq!(extract_text(&body).unwrap(), "A forwarded reply.");
    }

    #[test]
    fn test_extract_text_missing_path() {
        let body = json!({"text": "wrong field"});
        let err = extract_text(&body).unwrap_err();
        assert!(matches!(
            err,
            DebateError::ResponseShape {
                provider: ProviderId::Hosted,
                path: "generatedText",
            }
        ));
    }

    #[test]
    fn test_gateway_request_wire_shape() {
        let request = GatewayRequest {
            participant_identity: "openai",
            prompt_context: "The debate topic is: \"tabs vs spaces\".",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["participantIdentity"], "openai");
        assert!(value["promptContext"].as_str().unwrap().contains("tabs"));
    }
}
