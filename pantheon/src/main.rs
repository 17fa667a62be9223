//! Pantheon simulation entry point.
//!
//! Wires the roster, event bus, LLM client, debate orchestrator, and
//! chat dispatcher together, then runs the debate loop and the autonomy
//! loop until ctrl-c.
//!
//! ```bash
//! # Live generation (requires PANTHEON_CLAUDE_API_KEY)
//! pantheon
//!
//! # Deterministic offline run
//! pantheon --offline --seed 42
//! ```

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pantheon::chat::ChatDispatcher;
use pantheon::config::Settings;
use pantheon::debate::{DebateOrchestrator, DebateTimings};
use pantheon::events::EventBus;
use pantheon::llm::{CannedGenerator, ClaudeClient, TextGenerator};
use pantheon::AgentRoster;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use the canned offline generator instead of the live API.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Seed for all decision RNGs (overrides PANTHEON_RNG_SEED).
    #[arg(long)]
    seed: Option<u64>,

    /// Log every broadcast event to stdout.
    #[arg(long, default_value_t = false)]
    log_events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = Settings::from_env();
    if args.seed.is_some() {
        settings.rng_seed = args.seed;
    }

    let llm: Arc<dyn TextGenerator> = if args.offline || settings.claude_api_key.is_empty() {
        info!("using offline generator");
        Arc::new(CannedGenerator::default())
    } else {
        Arc::new(ClaudeClient::new(&settings))
    };

    let bus = EventBus::new().shared();
    let roster = AgentRoster::standard(settings.rng_seed);

    if args.log_events {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                info!(event = event.event_type(), "{}", serde_json::to_string(&event).unwrap_or_default());
            }
        });
    }

    let dispatcher = Arc::new(ChatDispatcher::new(roster.clone(), bus.clone(), llm.clone()));
    let autonomy_flag = dispatcher.autonomy_flag();
    let poll_interval = Duration::from_secs(settings.autonomy_poll_secs);
    let autonomy_task = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.run_autonomy_loop(poll_interval).await })
    };

    let timings = DebateTimings::from_settings(&settings);
    let mut orchestrator =
        DebateOrchestrator::new(roster, bus, llm, timings, settings.rng_seed);
    let debate_flag = orchestrator.shutdown_flag();
    let debate_task = tokio::spawn(async move { orchestrator.run().await });

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    debate_flag.store(false, Ordering::SeqCst);
    autonomy_flag.store(false, Ordering::SeqCst);
    debate_task.abort();
    autonomy_task.abort();
    let _ = debate_task.await;
    let _ = autonomy_task.await;

    Ok(())
}
