//! Turn scheduling and the debate state machine.
//!
//! The scheduler is the only owner of the turn cursor and the transcript.
//! All transitions run through its `&mut self` entry points on one logical
//! thread of control, so at most one generation request is ever in flight
//! and no locking is needed.

use log::{debug, info};

use crate::error::DebateError;
use crate::gateway::ResponseGenerator;
use crate::judge::{self, DebateOutcome};
use crate::participant::{DebateConfig, Participant};
use crate::provider::ProviderAvailability;
use crate::transcript::{render_context, TranscriptEntry};

/// Where the debate currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebatePhase {
    /// No debate running.
    Idle,
    /// Waiting on the response for the participant at this index.
    ParticipantTurn(usize),
    /// All participants have spoken; the moderator has not yet ruled.
    Judging,
    /// Judgment recorded; the outcome is final.
    Concluded,
}

/// Result of an advance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnAdvance {
    /// The active participant spoke and the cursor moved on.
    Spoke { speaker: String },
    /// The final participant spoke; the debate is ready to be judged.
    ReadyToJudge { speaker: String },
    /// The caller's cursor no longer matches the active turn; nothing
    /// happened.
    Stale,
}

/// Events surfaced to the presentation boundary.
#[derive(Debug, Clone)]
pub enum DebateEvent {
    TurnStarted { cursor: usize, speaker: String },
    TurnRecorded { cursor: usize, entry: TranscriptEntry },
    JudgingStarted,
    Concluded { outcome: DebateOutcome },
    Stopped { recorded_turns: usize },
}

pub type DebateCallback = Box<dyn Fn(DebateEvent) + Send + Sync>;

/// Drives a debate from `Idle` through participant turns to judgment.
pub struct DebateScheduler {
    generator: Box<dyn ResponseGenerator>,
    config: Option<DebateConfig>,
    transcript: Vec<TranscriptEntry>,
    phase: DebatePhase,
    outcome: Option<DebateOutcome>,
    callback: Option<DebateCallback>,
}

impl DebateScheduler {
    pub fn new(generator: Box<dyn ResponseGenerator>) -> Self {
        Self {
            generator,
            config: None,
            transcript: Vec::new(),
            phase: DebatePhase::Idle,
            outcome: None,
            callback: None,
        }
    }

    /// Set a callback for debate events.
    pub fn with_callback(mut self, callback: DebateCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn phase(&self) -> DebatePhase {
        self.phase
    }

    /// The full transcript so far.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn outcome(&self) -> Option<&DebateOutcome> {
        self.outcome.as_ref()
    }

    /// Whoever holds the floor, when a participant turn is active.
    pub fn active_speaker(&self) -> Option<&Participant> {
        match self.phase {
            DebatePhase::ParticipantTurn(cursor) => self
                .config
                .as_ref()
                .and_then(|config| config.participants.get(cursor)),
            _ => None,
        }
    }

    /// Begin a debate. Valid only from `Idle` or `Concluded`; validates the
    /// configuration eagerly so bad provider bindings never surface
    /// mid-debate. Resets the transcript and sets the cursor to 0.
    pub fn start(
        &mut self,
        config: DebateConfig,
        availability: &ProviderAvailability,
    ) -> Result<(), DebateError> {
        match self.phase {
            DebatePhase::Idle | DebatePhase::Concluded => {}
            phase => {
                return Err(DebateError::InvalidTransition {
                    action: "start",
                    phase,
                });
            }
        }

        config.validate(availability)?;
        info!(
            "starting debate on \"{}\" with {} participants",
            config.topic,
            config.participants.len()
        );

        self.transcript.clear();
        self.outcome = None;
        let opener = config.participants[0].name.clone();
        self.config = Some(config);
        self.phase = DebatePhase::ParticipantTurn(0);
        self.emit(DebateEvent::TurnStarted {
            cursor: 0,
            speaker: opener,
        });
        Ok(())
    }

    /// Run the turn the caller believes is active.
    ///
    /// `from_cursor` is the cursor value the caller observed; if the debate
    /// has moved on the call is a silent no-op (`TurnAdvance::Stale`), which
    /// makes a countdown timer and a response-driven driver safe to combine
    /// without double-advancing a turn.
    ///
    /// On success exactly one transcript entry is appended and the cursor
    /// moves forward, entering `Judging` after the last participant. On
    /// failure the cursor and transcript are left untouched and the error
    /// is surfaced; the same turn can be re-triggered externally.
    pub async fn advance_turn(&mut self, from_cursor: usize) -> Result<TurnAdvance, DebateError> {
        let cursor = match self.phase {
            DebatePhase::ParticipantTurn(cursor) if cursor == from_cursor => cursor,
            _ => {
                debug!("ignoring stale advance for cursor {from_cursor}");
                return Ok(TurnAdvance::Stale);
            }
        };
        let Some(config) = self.config.as_ref() else {
            return Ok(TurnAdvance::Stale);
        };

        let participant = &config.participants[cursor];
        let speaker = participant.name.clone();
        let total = config.participants.len();
        let next_speaker = config.participants.get(cursor + 1).map(|p| p.name.clone());
        let context = render_context(&config.topic, &self.transcript);

        // Single in-flight request: state is untouched until this settles,
        // so a failure leaves the turn fully re-runnable.
        let text = self.generator.generate(participant, &context).await?;

        let entry = TranscriptEntry::now(speaker.clone(), text);
        self.transcript.push(entry.clone());
        self.emit(DebateEvent::TurnRecorded { cursor, entry });

        if cursor + 1 == total {
            info!("all {total} turns recorded; entering judging");
            self.phase = DebatePhase::Judging;
            self.emit(DebateEvent::JudgingStarted);
            Ok(TurnAdvance::ReadyToJudge { speaker })
        } else {
            self.phase = DebatePhase::ParticipantTurn(cursor + 1);
            if let Some(next) = next_speaker {
                self.emit(DebateEvent::TurnStarted {
                    cursor: cursor + 1,
                    speaker: next,
                });
            }
            Ok(TurnAdvance::Spoke { speaker })
        }
    }

    /// Have the moderator rule on the debate.
    ///
    /// Valid once all participant turns are recorded. Appends the summary
    /// as a final transcript entry attributed to the moderator and moves to
    /// `Concluded`. Calling again after conclusion is a no-op returning the
    /// existing outcome.
    pub async fn judge(&mut self) -> Result<DebateOutcome, DebateError> {
        match self.phase {
            DebatePhase::Judging => {}
            DebatePhase::Concluded => {
                if let Some(outcome) = &self.outcome {
                    return Ok(outcome.clone());
                }
                return Err(DebateError::InvalidTransition {
                    action: "judge",
                    phase: self.phase,
                });
            }
            phase => {
                return Err(DebateError::InvalidTransition {
                    action: "judge",
                    phase,
                });
            }
        }
        let Some(config) = self.config.as_ref() else {
            return Err(DebateError::InvalidTransition {
                action: "judge",
                phase: self.phase,
            });
        };

        let prompt = judge::build_judgment_prompt(&config.topic, &self.transcript);
        let verdict = self.generator.generate(&config.moderator, &prompt).await?;

        let outcome = judge::decide(&config.topic, &config.participants, &verdict);
        info!("moderator declared {} the winner", outcome.winner);

        let moderator = config.moderator.name.clone();
        self.transcript
            .push(TranscriptEntry::now(moderator, outcome.summary.clone()));
        self.outcome = Some(outcome.clone());
        self.phase = DebatePhase::Concluded;
        self.emit(DebateEvent::Concluded {
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// Abort a running debate at a turn boundary. The transcript is
    /// retained as-is and no judgment is computed.
    pub fn stop(&mut self) -> Result<(), DebateError> {
        match self.phase {
            DebatePhase::ParticipantTurn(_) => {
                info!(
                    "debate stopped with {} turns recorded",
                    self.transcript.len()
                );
                self.phase = DebatePhase::Idle;
                self.emit(DebateEvent::Stopped {
                    recorded_turns: self.transcript.len(),
                });
                Ok(())
            }
            phase => Err(DebateError::InvalidTransition {
                action: "stop",
                phase,
            }),
        }
    }

    fn emit(&self, event: DebateEvent) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::participant::Participant;
    use crate::provider::ProviderId;

    enum ScriptStep {
        Reply(&'static str),
        Fail,
    }

    /// Generator that replays a script and records every context it saw.
    struct ScriptedGenerator {
        script: Mutex<VecDeque<ScriptStep>>,
        contexts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<ScriptStep>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                contexts: Mutex::new(Vec::new()),
            }
        }

        fn replies(replies: &[&'static str]) -> Self {
            Self::new(replies.iter().copied().map(ScriptStep::Reply).collect())
        }
    }

    #[async_trait]
    impl ResponseGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _participant: &Participant,
            prompt_context: &str,
        ) -> Result<String, DebateError> {
            self.contexts
                .lock()
                .unwrap()
                .push(prompt_context.to_string());
            match self.script.lock().unwrap().pop_front() {
                Some(ScriptStep::Reply(reply)) => Ok(reply.to_string()),
                Some(ScriptStep::Fail) => Err(DebateError::ProviderHttp {
                    provider: ProviderId::OpenAi,
                    status: 429,
                    message: "You exceeded your current quota".to_string(),
                }),
                None => Ok("I rest my case.".to_string()),
            }
        }
    }

    fn config() -> DebateConfig {
        DebateConfig::new(
            "AI regulation",
            vec![
                Participant::debater("OpenAI", ProviderId::OpenAi),
                Participant::debater("Anthropic", ProviderId::Anthropic),
                Participant::debater("Google", ProviderId::Google),
            ],
            Participant::moderator("DeepSeek", ProviderId::DeepSeek),
        )
    }

    fn scheduler(script: Vec<ScriptStep>) -> DebateScheduler {
        DebateScheduler::new(Box::new(ScriptedGenerator::new(script)))
    }

    #[tokio::test]
    async fn test_start_resets_cursor_and_transcript() {
        let mut scheduler = scheduler(vec![]);
        let availability = ProviderAvailability::all_available();

        scheduler.start(config(), &availability).unwrap();
        for cursor in 0..3 {
            scheduler.advance_turn(cursor).await.unwrap();
        }
        scheduler.judge().await.unwrap();
        assert_eq!(scheduler.phase(), DebatePhase::Concluded);
        assert_eq!(scheduler.transcript().len(), 4);

        // Restarting from Concluded clears everything.
        scheduler.start(config(), &availability).unwrap();
        assert_eq!(scheduler.phase(), DebatePhase::ParticipantTurn(0));
        assert!(scheduler.transcript().is_empty());
        assert!(scheduler.outcome().is_none());
    }

    #[tokio::test]
    async fn test_start_rejected_mid_debate() {
        let mut scheduler = scheduler(vec![]);
        let availability = ProviderAvailability::all_available();
        scheduler.start(config(), &availability).unwrap();

        let err = scheduler.start(config(), &availability).unwrap_err();
        assert!(matches!(
            err,
            DebateError::InvalidTransition {
                action: "start",
                phase: DebatePhase::ParticipantTurn(0),
            }
        ));
    }

    #[tokio::test]
    async fn test_start_validates_participant_count() {
        let mut scheduler = scheduler(vec![]);
        let too_few = DebateConfig::new(
            "AI regulation",
            vec![Participant::debater("OpenAI", ProviderId::OpenAi)],
            Participant::moderator("DeepSeek", ProviderId::DeepSeek),
        );

        let err = scheduler
            .start(too_few, &ProviderAvailability::all_available())
            .unwrap_err();
        assert!(matches!(err, DebateError::InvalidConfiguration(_)));
        assert_eq!(scheduler.phase(), DebatePhase::Idle);
    }

    #[tokio::test]
    async fn test_advance_is_idempotent_per_cursor() {
        let mut scheduler = scheduler(vec![ScriptStep::Reply("Opening argument.")]);
        scheduler
            .start(config(), &ProviderAvailability::all_available())
            .unwrap();

        let first = scheduler.advance_turn(0).await.unwrap();
        assert!(matches!(first, TurnAdvance::Spoke { speaker } if speaker == "OpenAI"));
        assert_eq!(scheduler.phase(), DebatePhase::ParticipantTurn(1));

        // A late timer firing for the already-finished turn must not append
        // a second entry or skip a participant.
        let second = scheduler.advance_turn(0).await.unwrap();
        assert_eq!(second, TurnAdvance::Stale);
        assert_eq!(scheduler.transcript().len(), 1);
        assert_eq!(scheduler.phase(), DebatePhase::ParticipantTurn(1));
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_state_untouched() {
        let mut scheduler = scheduler(vec![
            ScriptStep::Fail,
            ScriptStep::Reply("Second attempt lands."),
        ]);
        scheduler
            .start(config(), &ProviderAvailability::all_available())
            .unwrap();

        let err = scheduler.advance_turn(0).await.unwrap_err();
        assert!(matches!(err, DebateError::ProviderHttp { status: 429, .. }));
        assert_eq!(scheduler.phase(), DebatePhase::ParticipantTurn(0));
        assert!(scheduler.transcript().is_empty());

        // An explicit external re-trigger runs the same turn again.
        let advance = scheduler.advance_turn(0).await.unwrap();
        assert!(matches!(advance, TurnAdvance::Spoke { .. }));
        assert_eq!(scheduler.transcript().len(), 1);
        assert_eq!(scheduler.transcript()[0].message, "Second attempt lands.");
    }

    #[tokio::test]
    async fn test_each_speaker_sees_exactly_prior_turns() {
        let generator = ScriptedGenerator::replies(&["first", "second", "third"]);
        let contexts_handle = std::sync::Arc::new(generator);

        struct Shared(std::sync::Arc<ScriptedGenerator>);

        #[async_trait]
        impl ResponseGenerator for Shared {
            async fn generate(
                &self,
                participant: &Participant,
                prompt_context: &str,
            ) -> Result<String, DebateError> {
                self.0.generate(participant, prompt_context).await
            }
        }

        let mut scheduler = DebateScheduler::new(Box::new(Shared(contexts_handle.clone())));
        scheduler
            .start(config(), &ProviderAvailability::all_available())
            .unwrap();
        for cursor in 0..3 {
            scheduler.advance_turn(cursor).await.unwrap();
        }
        scheduler.judge().await.unwrap();

        let contexts = contexts_handle.contexts.lock().unwrap();
        assert_eq!(contexts.len(), 4);
        // Opening speaker: topic only.
        assert!(contexts[0].contains("AI regulation"));
        assert!(!contexts[0].contains("first"));
        // Second speaker sees the first turn and nothing later.
        assert!(contexts[1].contains("OpenAI: first"));
        assert!(!contexts[1].contains("second"));
        // Third speaker sees both prior turns.
        assert!(contexts[2].contains("OpenAI: first"));
        assert!(contexts[2].contains("Anthropic: second"));
        // The judge sees all three.
        assert!(contexts[3].contains("Google: third"));
    }

    #[tokio::test]
    async fn test_full_debate_reaches_concluded() {
        let mut scheduler = scheduler(vec![
            ScriptStep::Reply("Regulation fosters trust."),
            ScriptStep::Reply("Careful rules beat blanket bans."),
            ScriptStep::Reply("Standards should be international."),
            ScriptStep::Reply("Anthropic made the strongest case."),
        ]);
        scheduler
            .start(config(), &ProviderAvailability::all_available())
            .unwrap();

        for cursor in 0..2 {
            let advance = scheduler.advance_turn(cursor).await.unwrap();
            assert!(matches!(advance, TurnAdvance::Spoke { .. }));
        }
        let last = scheduler.advance_turn(2).await.unwrap();
        assert!(matches!(last, TurnAdvance::ReadyToJudge { .. }));
        assert_eq!(scheduler.phase(), DebatePhase::Judging);

        let outcome = scheduler.judge().await.unwrap();
        assert_eq!(outcome.winner, "Anthropic");
        assert_eq!(scheduler.phase(), DebatePhase::Concluded);

        // Final entry is the moderator's summary.
        let transcript = scheduler.transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[3].speaker, "DeepSeek");
        assert!(transcript[3].message.contains("Anthropic"));
    }

    #[tokio::test]
    async fn test_winner_fallback_when_verdict_names_no_one() {
        let mut scheduler = scheduler(vec![
            ScriptStep::Reply("a"),
            ScriptStep::Reply("b"),
            ScriptStep::Reply("c"),
            ScriptStep::Reply("Everyone was splendid."),
        ]);
        scheduler
            .start(config(), &ProviderAvailability::all_available())
            .unwrap();
        for cursor in 0..3 {
            scheduler.advance_turn(cursor).await.unwrap();
        }

        let outcome = scheduler.judge().await.unwrap();
        assert_eq!(outcome.winner, "OpenAI");
    }

    #[tokio::test]
    async fn test_judge_requires_all_turns_recorded() {
        let mut scheduler = scheduler(vec![ScriptStep::Reply("only one turn")]);
        scheduler
            .start(config(), &ProviderAvailability::all_available())
            .unwrap();
        scheduler.advance_turn(0).await.unwrap();

        let err = scheduler.judge().await.unwrap_err();
        assert!(matches!(
            err,
            DebateError::InvalidTransition {
                action: "judge",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_judge_reentry_is_a_noop() {
        let mut scheduler = scheduler(vec![]);
        scheduler
            .start(config(), &ProviderAvailability::all_available())
            .unwrap();
        for cursor in 0..3 {
            scheduler.advance_turn(cursor).await.unwrap();
        }

        let first = scheduler.judge().await.unwrap();
        let transcript_len = scheduler.transcript().len();
        let second = scheduler.judge().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(scheduler.transcript().len(), transcript_len);
    }

    #[tokio::test]
    async fn test_stop_mid_debate_retains_transcript() {
        let mut scheduler = scheduler(vec![ScriptStep::Reply("Opening argument.")]);
        scheduler
            .start(config(), &ProviderAvailability::all_available())
            .unwrap();
        scheduler.advance_turn(0).await.unwrap();

        scheduler.stop().unwrap();
        assert_eq!(scheduler.phase(), DebatePhase::Idle);
        assert_eq!(scheduler.transcript().len(), 1);
        assert!(scheduler.outcome().is_none());

        // Stopping again is invalid; the debate is already idle.
        assert!(scheduler.stop().is_err());
    }

    #[tokio::test]
    async fn test_events_trace_the_debate() {
        use std::sync::Arc;

        let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut scheduler = DebateScheduler::new(Box::new(ScriptedGenerator::replies(&[
            "a", "b", "c", "OpenAI",
        ])))
        .with_callback(Box::new(move |event| {
            let tag = match event {
                DebateEvent::TurnStarted { cursor, .. } => format!("start:{cursor}"),
                DebateEvent::TurnRecorded { cursor, .. } => format!("recorded:{cursor}"),
                DebateEvent::JudgingStarted => "judging".to_string(),
                DebateEvent::Concluded { .. } => "concluded".to_string(),
                DebateEvent::Stopped { .. } => "stopped".to_string(),
            };
            sink.lock().unwrap().push(tag);
        }));

        scheduler
            .start(config(), &ProviderAvailability::all_available())
            .unwrap();
        for cursor in 0..3 {
            scheduler.advance_turn(cursor).await.unwrap();
        }
        scheduler.judge().await.unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "start:0",
                "recorded:0",
                "start:1",
                "recorded:1",
                "start:2",
                "recorded:2",
                "judging",
                "concluded",
            ]
        );
    }
}
