//! Debatify CLI - AI Debate Platform
//!
//! Runs a timed, turn-based debate between AI participants backed by
//! different vendor APIs, then has an AI moderator announce the winner.

use clap::{ArgAction, Parser};
use colored::Colorize;
use debatify_core::{
    DebateConfig, DebatePhase, DebateScheduler, HttpSink, NullSink, Participant,
    ProviderAvailability, ProviderCredentials, ProviderId, ResponseGateway, TranscriptSink,
    TurnAdvance, TurnTimer,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "debatify",
    version,
    about = "AI Debate Platform - Watch AIs debate any topic",
    long_about = "Runs a debate between 2-4 AI participants on different vendor APIs, \
                  with an AI moderator judging the result."
)]
struct Cli {
    /// The topic to debate
    #[arg(value_name = "TOPIC")]
    topic: String,

    /// Provider identities for the debaters, in speaking order (2-4)
    #[arg(
        short = 'p',
        long = "participant",
        action = ArgAction::Append,
        value_name = "PROVIDER",
        default_values = ["openai", "anthropic", "google"]
    )]
    participant: Vec<String>,

    /// Provider identity acting as moderator
    #[arg(short, long, default_value = "deepseek", value_name = "PROVIDER")]
    moderator: String,

    /// Seconds allotted to each exchange
    #[arg(long, default_value = "30", value_name = "SECONDS")]
    turn_duration: u64,

    /// REST endpoint that receives each response as it is recorded
    #[arg(long, value_name = "URL")]
    sink_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let credentials = ProviderCredentials::from_env();
    let availability = ProviderAvailability::probe(&credentials);
    for provider in availability.unavailable() {
        eprintln!(
            "{}",
            format!("Warning: no credential for {provider}; it cannot take part.").yellow()
        );
    }

    let participants = cli
        .participant
        .iter()
        .map(|identity| {
            let provider = ProviderId::from_str(identity)?;
            Ok(Participant::debater(provider.display_name(), provider))
        })
        .collect::<Result<Vec<_>, debatify_core::DebateError>>()?;

    let moderator_provider = ProviderId::from_str(&cli.moderator)?;
    let moderator = Participant::moderator(moderator_provider.display_name(), moderator_provider);

    let turn_duration = Duration::from_secs(cli.turn_duration);
    let config = DebateConfig::new(&cli.topic, participants.clone(), moderator.clone())
        .with_turn_duration(turn_duration);

    let sink: Arc<dyn TranscriptSink> = match &cli.sink_url {
        Some(url) => Arc::new(HttpSink::new(url.clone())),
        None => Arc::new(NullSink),
    };
    let gateway = ResponseGateway::new(credentials, sink);
    let mut scheduler = DebateScheduler::new(Box::new(gateway));

    println!("{}", "=== Debatify ===".bold());
    println!("Topic: {}", cli.topic.cyan());
    println!(
        "Debaters: {}  |  Moderator: {}\n",
        participants
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
            .bold(),
        moderator.name.bold()
    );

    scheduler.start(config, &availability)?;

    let total = participants.len();
    for cursor in 0..total {
        let speaker = &participants[cursor].name;
        println!(
            "{}",
            format!("[Turn {}/{}] {} has the floor", cursor + 1, total, speaker).bold()
        );

        let window = TurnTimer::start(turn_duration);
        match scheduler.advance_turn(cursor).await {
            Ok(TurnAdvance::Spoke { .. }) | Ok(TurnAdvance::ReadyToJudge { .. }) => {
                if let Some(entry) = scheduler.transcript().last() {
                    println!("{}\n", entry.message);
                }
            }
            // A stale advance records nothing; keep the pacing anyway.
            Ok(TurnAdvance::Stale) => {}
            Err(err) => {
                eprintln!("{} {}", "Error:".red().bold(), err);
                if scheduler.phase() != DebatePhase::Idle {
                    scheduler.stop()?;
                }
                return Err(err.into());
            }
        }

        // Hold the floor for whatever is left of the exchange window.
        window.wait_remaining().await;
    }

    println!("{}", "The moderator is deliberating...".bold());
    let outcome = scheduler.judge().await?;

    println!("\n{} {}", "Winner:".bold(), outcome.winner.green().bold());
    println!("{}", outcome.summary);
    Ok(())
}
