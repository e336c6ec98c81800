//! Response generation gateway.
//!
//! Single entry point turning a participant plus prompt context into plain
//! generated text, whatever backend the participant is bound to. The
//! gateway applies one persona wrapper across all adapters so behavior is
//! uniform per backend, and mirrors every successful generation into the
//! transcript sink as a fire-and-forget write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use crate::adapters::{self, GenerationParams, ProviderAdapter};
use crate::error::DebateError;
use crate::participant::Participant;
use crate::provider::{ProviderCredentials, ProviderId};
use crate::sink::{SinkRecord, TranscriptSink};

/// The seam the scheduler drives. Production uses [`ResponseGateway`];
/// tests substitute scripted generators.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(
        &self,
        participant: &Participant,
        prompt_context: &str,
    ) -> Result<String, DebateError>;
}

/// Persona system prompt applied uniformly across every backend.
pub fn persona_prompt(name: &str) -> String {
    format!(
        "You are {name}, an AI participating in a debate. Your responses should be \
         thoughtful, concise (2-3 sentences), and maintain a respectful tone."
    )
}

/// The topic embedded in a rendered context, for sink records. Falls back
/// to a generic label when the context carries no quoted topic.
fn topic_of(prompt_context: &str) -> String {
    prompt_context
        .split('"')
        .nth(1)
        .unwrap_or("General Topic")
        .to_string()
}

pub struct ResponseGateway {
    credentials: ProviderCredentials,
    params: GenerationParams,
    sink: Arc<dyn TranscriptSink>,
    http: reqwest::Client,
    /// Per-provider routing overrides (custom deployments, tests).
    overrides: HashMap<ProviderId, Box<dyn ProviderAdapter>>,
}

impl ResponseGateway {
    pub fn new(credentials: ProviderCredentials, sink: Arc<dyn TranscriptSink>) -> Self {
        Self {
            credentials,
            params: GenerationParams::default(),
            sink,
            http: reqwest::Client::new(),
            overrides: HashMap::new(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Route a provider through a custom adapter instead of the built-in
    /// vendor contract.
    pub fn with_adapter(mut self, adapter: Box<dyn ProviderAdapter>) -> Self {
        self.overrides.insert(adapter.provider(), adapter);
        self
    }

    async fn invoke_adapter(
        &self,
        participant: &Participant,
        persona: &str,
        prompt_context: &str,
    ) -> Result<String, DebateError> {
        match self.overrides.get(&participant.provider) {
            Some(adapter) => adapter.invoke(persona, prompt_context, self.params).await,
            None => {
                let adapter = adapters::adapter_for(
                    &participant.id,
                    participant.provider,
                    &self.credentials,
                    &self.http,
                );
                adapter.invoke(persona, prompt_context, self.params).await
            }
        }
    }
}

#[async_trait]
impl ResponseGenerator for ResponseGateway {
    async fn generate(
        &self,
        participant: &Participant,
        prompt_context: &str,
    ) -> Result<String, DebateError> {
        debug!(
            "generating response for {} via {}",
            participant.name, participant.provider
        );

        let persona = persona_prompt(&participant.name);
        let text = self
            .invoke_adapter(participant, &persona, prompt_context)
            .await?;

        // Persistence must not fail the turn; the generated text stays
        // authoritative either way.
        let record = SinkRecord {
            participant_identity: participant.id.clone(),
            topic: topic_of(prompt_context),
            response_text: text.clone(),
        };
        if let Err(err) = self.sink.append(record).await {
            warn!("transcript sink write failed for {}: {err}", participant.id);
        }

        Ok(text)
    }
}
