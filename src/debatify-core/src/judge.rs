//! Judging stage: moderator verdict, winner extraction, and summary.

use serde::{Deserialize, Serialize};

use crate::participant::Participant;
use crate::transcript::TranscriptEntry;

/// Final ruling for a concluded debate. Created exactly once per debate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebateOutcome {
    pub winner: String,
    pub summary: String,
}

/// Prompt put to the moderator once every participant has spoken.
pub fn build_judgment_prompt(topic: &str, transcript: &[TranscriptEntry]) -> String {
    let mut prompt = format!("Based on the following debate responses on the topic \"{topic}\":\n");
    for entry in transcript {
        prompt.push_str(&format!("{}: {}\n", entry.speaker, entry.message));
    }
    prompt.push_str(
        "\nWho provided the most compelling arguments? Respond with ONLY the name of the winner.",
    );
    prompt
}

/// Pick the winner out of the moderator's raw verdict: the first configured
/// participant whose name appears in the text, else the first participant.
/// Never fails for a non-empty participant list.
pub fn extract_winner<'a>(participants: &'a [Participant], verdict: &str) -> &'a Participant {
    participants
        .iter()
        .find(|p| verdict.contains(&p.name))
        .unwrap_or(&participants[0])
}

/// Turn a raw verdict into the final outcome.
pub fn decide(topic: &str, participants: &[Participant], verdict: &str) -> DebateOutcome {
    let winner = extract_winner(participants, verdict).name.clone();
    let summary = format!(
        "After a thoughtful debate on \"{topic}\", {winner} has been declared the winner! \
         Their arguments were particularly compelling and well-structured."
    );
    DebateOutcome { winner, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    fn participants() -> Vec<Participant> {
        vec![
            Participant::debater("OpenAI", ProviderId::OpenAi),
            Participant::debater("Anthropic", ProviderId::Anthropic),
            Participant::debater("Google", ProviderId::Google),
        ]
    }

    #[test]
    fn test_judgment_prompt_contains_topic_transcript_and_directive() {
        let transcript = vec![
            TranscriptEntry::now("OpenAI", "Regulation fosters trust."),
            TranscriptEntry::now("Anthropic", "Careful rules beat blanket bans."),
        ];
        let prompt = build_judgment_prompt("AI regulation", &transcript);

        assert!(prompt.contains("the topic \"AI regulation\""));
        assert!(prompt.contains("OpenAI: Regulation fosters trust."));
        assert!(prompt.contains("Anthropic: Careful rules beat blanket bans."));
        assert!(prompt.ends_with("Respond with ONLY the name of the winner."));
    }

    #[test]
    fn test_winner_by_substring_match() {
        let participants = participants();
        let winner = extract_winner(&participants, "After review, Anthropic made the best case.");
        assert_eq!(winner.name, "Anthropic");
    }

    #[test]
    fn test_winner_scan_follows_configuration_order() {
        let participants = participants();
        // Both names appear; the first in configuration order wins.
        let winner = extract_winner(&participants, "Google edged out OpenAI overall.");
        assert_eq!(winner.name, "OpenAI");
    }

    #[test]
    fn test_winner_fallback_to_first_participant() {
        let participants = participants();
        let winner = extract_winner(&participants, "It was a draw; no one stood out.");
        assert_eq!(winner.name, "OpenAI");
    }

    #[test]
    fn test_decide_embeds_topic_and_winner() {
        let outcome = decide("AI regulation", &participants(), "Google wins");
        assert_eq!(outcome.winner, "Google");
        assert!(outcome.summary.contains("\"AI regulation\""));
        assert!(outcome.summary.contains("Google has been declared the winner"));
    }
}
