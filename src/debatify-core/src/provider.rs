//! Provider identities, credentials, and availability state.
//!
//! Every participant is bound to one of a closed set of backends. The
//! credential set is resolved once at process start and stays immutable;
//! availability is probed explicitly against it and updated explicitly,
//! never read from ambient global state.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DebateError;

/// The set of AI backends a participant can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    Google,
    DeepSeek,
    Meta,
    /// Generic fallback routed through a hosted generation gateway.
    Hosted,
}

impl ProviderId {
    pub const ALL: [ProviderId; 6] = [
        ProviderId::OpenAi,
        ProviderId::Anthropic,
        ProviderId::Google,
        ProviderId::DeepSeek,
        ProviderId::Meta,
        ProviderId::Hosted,
    ];

    /// Canonical lowercase identity string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Google => "google",
            ProviderId::DeepSeek => "deepseek",
            ProviderId::Meta => "meta",
            ProviderId::Hosted => "hosted",
        }
    }

    /// Human-facing name, used as the default participant display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "OpenAI",
            ProviderId::Anthropic => "Anthropic",
            ProviderId::Google => "Google",
            ProviderId::DeepSeek => "DeepSeek",
            ProviderId::Meta => "Meta",
            ProviderId::Hosted => "Hosted",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = DebateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "anthropic" => Ok(ProviderId::Anthropic),
            "google" => Ok(ProviderId::Google),
            "deepseek" => Ok(ProviderId::DeepSeek),
            "meta" => Ok(ProviderId::Meta),
            "hosted" => Ok(ProviderId::Hosted),
            other => Err(DebateError::UnknownProvider(other.to_string())),
        }
    }
}

/// Per-provider credentials, resolved once at process start.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub meta_api_key: Option<String>,
    /// Base URL of the hosted generation gateway.
    pub hosted_gateway_url: Option<String>,
}

impl ProviderCredentials {
    /// Read every credential from the environment. Empty values count as
    /// absent.
    pub fn from_env() -> Self {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }

        Self {
            openai_api_key: var("OPENAI_API_KEY"),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            gemini_api_key: var("GEMINI_API_KEY"),
            deepseek_api_key: var("DEEPSEEK_API_KEY"),
            meta_api_key: var("META_API_KEY"),
            hosted_gateway_url: var("DEBATIFY_GATEWAY_URL"),
        }
    }

    /// The credential backing a provider, if configured.
    pub fn for_provider(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::OpenAi => self.openai_api_key.as_deref(),
            ProviderId::Anthropic => self.anthropic_api_key.as_deref(),
            ProviderId::Google => self.gemini_api_key.as_deref(),
            ProviderId::DeepSeek => self.deepseek_api_key.as_deref(),
            ProviderId::Meta => self.meta_api_key.as_deref(),
            ProviderId::Hosted => self.hosted_gateway_url.as_deref(),
        }
    }
}

/// Process-wide provider availability.
///
/// Initialized with one explicit [`probe`](Self::probe) against the resolved
/// credentials and updated only through [`mark_unavailable`](Self::mark_unavailable)
/// / [`mark_available`](Self::mark_available). Passed by reference into the
/// scheduler at `start`.
#[derive(Debug, Clone, Default)]
pub struct ProviderAvailability {
    unavailable: HashSet<ProviderId>,
}

impl ProviderAvailability {
    /// Probe every provider once: a provider with no credential is
    /// unavailable until explicitly marked otherwise.
    pub fn probe(credentials: &ProviderCredentials) -> Self {
        let unavailable = ProviderId::ALL
            .iter()
            .copied()
            .filter(|p| credentials.for_provider(*p).is_none())
            .collect();
        Self { unavailable }
    }

    /// Availability state that considers every provider usable. Useful when
    /// credentials are managed out-of-band (e.g. behind a hosted gateway).
    pub fn all_available() -> Self {
        Self::default()
    }

    pub fn is_available(&self, provider: ProviderId) -> bool {
        !self.unavailable.contains(&provider)
    }

    pub fn mark_unavailable(&mut self, provider: ProviderId) {
        self.unavailable.insert(provider);
    }

    pub fn mark_available(&mut self, provider: ProviderId) {
        self.unavailable.remove(&provider);
    }

    /// Providers currently marked unavailable, in identity order.
    pub fn unavailable(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .iter()
            .copied()
            .filter(|p| self.unavailable.contains(p))
            .collect()
    }
}
