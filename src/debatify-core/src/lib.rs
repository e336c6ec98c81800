//! Debatify Core Library
//!
//! Orchestrates timed, turn-based debates between AI participants backed
//! by distinct vendor APIs, with an AI moderator that judges the debate
//! and announces the winner.

pub mod adapters;
pub mod error;
pub mod gateway;
pub mod judge;
pub mod participant;
pub mod provider;
pub mod scheduler;
pub mod sink;
pub mod timer;
pub mod transcript;

pub use error::DebateError;
pub use gateway::{persona_prompt, ResponseGateway, ResponseGenerator};
pub use judge::DebateOutcome;
pub use participant::{DebateConfig, Participant, Role, MAX_PARTICIPANTS, MIN_PARTICIPANTS};
pub use provider::{ProviderAvailability, ProviderCredentials, ProviderId};
pub use scheduler::{DebateEvent, DebatePhase, DebateScheduler, TurnAdvance};
pub use sink::{HttpSink, NullSink, SinkRecord, TranscriptSink};
pub use timer::TurnTimer;
pub use transcript::{render_context, TranscriptEntry};
