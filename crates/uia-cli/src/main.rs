//! Thin demonstration binary for the Turn Orchestrator (C11).
//!
//! Wires a config, a canned `MockLlmClient`, the seeded fixture catalog and
//! a fixture-backed retrieval index, then drives one turn per stdin line --
//! no transport, no auth, in the spirit of `skynet-gateway`'s own `main.rs`
//! but scoped to a single local pipeline run rather than a server.

use std::sync::Arc;

use clap::Parser;
use rusqlite::Connection;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use uia_catalog::Catalog;
use uia_core::config::UiaConfig;
use uia_llm::{LlmClient, MockLlmClient};
use uia_orchestrator::{InMemoryChatHistory, TurnOrchestrator};
use uia_progress::ProgressBroker;
use uia_rag::RagEngine;
use uia_retrieval::{seed_chunks, IndexStore};
use uia_state::ChatStateStore;

#[derive(Parser)]
#[command(name = "uia-cli", about = "Drive the User Analysis Agent turn pipeline from stdin")]
struct Args {
    /// Path to a `uia.toml` config file (defaults to `~/.uia/uia.toml`, missing is fine).
    #[arg(long)]
    config: Option<String>,

    /// Chat id all stdin lines are attributed to.
    #[arg(long, default_value = "demo")]
    chat_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "uia_cli=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = UiaConfig::load(args.config.as_deref()).unwrap_or_else(|e| {
        warn!("config load failed ({}), using defaults", e);
        UiaConfig::default()
    });

    let llm: Arc<dyn LlmClient> = Arc::new(demo_llm());
    let catalog = Arc::new(Catalog::seeded());
    let store = Arc::new(ChatStateStore::new(Connection::open_in_memory()?)?);
    let progress = ProgressBroker::new();
    let index = Arc::new(IndexStore::new(seed_chunks()));
    let rag = Arc::new(RagEngine::new(
        llm.clone(),
        index,
        progress.clone(),
        config.llm.planner_model.clone(),
        config.llm.rerank_model.clone(),
        config.llm.model.clone(),
        config.llm.request_timeout_secs,
    ));
    let orchestrator = TurnOrchestrator::new(llm, catalog, store, progress, rag, config);
    let history = InMemoryChatHistory::new();

    info!(chat_id = %args.chat_id, "ready -- type a message and press enter (Ctrl-D to quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut turn = 0u64;
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        turn += 1;
        let request_id = format!("{}-{turn}", args.chat_id);
        match orchestrator.run_turn(&history, &args.chat_id, &request_id, text, None).await {
            Ok(message) => println!("{}", serde_json::to_string_pretty(&message)?),
            Err(e) => warn!(error = %e, "turn failed"),
        }
    }

    Ok(())
}

/// A small set of canned responses so the demo produces plausible in-scope
/// behaviour out of the box; every stage still degrades gracefully for any
/// prompt this doesn't cover (§7).
fn demo_llm() -> MockLlmClient {
    MockLlmClient::new()
        .with_response(
            "Known employment categories",
            r#"{"employmentIntent": true, "skillsIntent": false, "categoryHit": "ec_ds", "confidence": 0.8}"#,
        )
        .with_default(r#"{"proceed": true, "is_about_system": false, "message": ""}"#)
}
