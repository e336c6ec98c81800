//! The append-only debate transcript and prompt-context derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One spoken turn. Entries are only ever appended, never mutated or
/// reordered; the transcript is the authoritative conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn now(speaker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Render the prompt context a speaker sees: the topic followed by every
/// prior turn as `speaker: message` lines, oldest first.
///
/// Pure and deterministic: the context for the speaker at index `i` is
/// exactly `render_context(topic, &transcript[..i])`, so later speakers
/// always see strictly more context than earlier ones.
pub fn render_context(topic: &str, entries: &[TranscriptEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(format!("The debate topic is: \"{topic}\"."));
    for entry in entries {
        lines.push(format!("{}: {}", entry.speaker, entry.message));
    }
    lines.join("\n")
}
