//! Error types for the debate system.

use thiserror::Error;

use crate::provider::ProviderId;
use crate::scheduler::DebatePhase;

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("{provider} API key not configured")]
    MissingCredential { provider: ProviderId },

    #[error("{provider} API error (status {status}): {message}")]
    ProviderHttp {
        provider: ProviderId,
        status: u16,
        message: String,
    },

    #[error("unexpected {provider} response: missing `{path}`")]
    ResponseShape {
        provider: ProviderId,
        path: &'static str,
    },

    #[error("failed to reach {provider}: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    #[error("unsupported AI provider: {0}")]
    UnknownProvider(String),

    #[error("invalid debate configuration: {0}")]
    InvalidConfiguration(String),

    #[error("cannot {action} while the debate phase is {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: DebatePhase,
    },
}
