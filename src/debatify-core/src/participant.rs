//! Debate participants and debate configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DebateError;
use crate::provider::{ProviderAvailability, ProviderId};

pub const MIN_PARTICIPANTS: usize = 2;
pub const MAX_PARTICIPANTS: usize = 4;

/// Default length of one exchange window.
pub const DEFAULT_TURN_DURATION: Duration = Duration::from_secs(30);

/// Role an identity plays in the debate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Produces debate turns.
    Participant,
    /// Judges the debate and produces the summary.
    Moderator,
}

/// An AI identity taking part in a debate.
///
/// Immutable once the debate has started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Stable identity, defaults to the provider's canonical string.
    pub id: String,
    /// Display name used in transcripts and prompts.
    pub name: String,
    /// Which backend generates this participant's turns.
    pub provider: ProviderId,
    pub role: Role,
    /// Set when the backing provider is currently unavailable.
    #[serde(default)]
    pub disabled: bool,
}

impl Participant {
    pub fn new(name: impl Into<String>, provider: ProviderId, role: Role) -> Self {
        Self {
            id: provider.as_str().to_string(),
            name: name.into(),
            provider,
            role,
            disabled: false,
        }
    }

    /// A debating participant.
    pub fn debater(name: impl Into<String>, provider: ProviderId) -> Self {
        Self::new(name, provider, Role::Participant)
    }

    /// The judging moderator.
    pub fn moderator(name: impl Into<String>, provider: ProviderId) -> Self {
        Self::new(name, provider, Role::Moderator)
    }

    /// Override the stable identity.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Mark the participant's provider as currently unavailable.
    pub fn disable(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Everything needed to run one debate. Immutable for the debate's lifetime.
#[derive(Debug, Clone)]
pub struct DebateConfig {
    pub topic: String,
    /// Speaking order; 2 to 4 entries.
    pub participants: Vec<Participant>,
    pub moderator: Participant,
    /// Wall-clock window allotted to each exchange.
    pub turn_duration: Duration,
}

impl DebateConfig {
    pub fn new(
        topic: impl Into<String>,
        participants: Vec<Participant>,
        moderator: Participant,
    ) -> Self {
        Self {
            topic: topic.into(),
            participants,
            moderator,
            turn_duration: DEFAULT_TURN_DURATION,
        }
    }

    pub fn with_turn_duration(mut self, turn_duration: Duration) -> Self {
        self.turn_duration = turn_duration;
        self
    }

    /// Validate the configuration against the probed availability state.
    ///
    /// Called eagerly when the debate starts so that a bad binding never
    /// surfaces mid-debate.
    pub fn validate(&self, availability: &ProviderAvailability) -> Result<(), DebateError> {
        let count = self.participants.len();
        if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&count) {
            return Err(DebateError::InvalidConfiguration(format!(
                "expected {MIN_PARTICIPANTS}-{MAX_PARTICIPANTS} participants, got {count}"
            )));
        }

        if self.moderator.role != Role::Moderator {
            return Err(DebateError::InvalidConfiguration(format!(
                "{} is not configured as a moderator",
                self.moderator.name
            )));
        }

        for member in self.participants.iter().chain(Some(&self.moderator)) {
            if member.disabled {
                return Err(DebateError::InvalidConfiguration(format!(
                    "{} is disabled",
                    member.name
                )));
            }
            if !availability.is_available(member.provider) {
                return Err(DebateError::InvalidConfiguration(format!(
                    "provider {} for {} is unavailable",
                    member.provider, member.name
                )));
            }
        }

        Ok(())
    }
}
