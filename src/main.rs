//! Riddle backend
//!
//! - Axum HTTP + WebSocket API
//! - Riddle store: Firestore over REST, or in-memory when no project is set
//! - Optional OpenAI-compatible chat integration for hints and discussion
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   OPENAI_API_KEY        : enables the chat integration if present
//!   OPENAI_BASE_URL       : default "https://api.groq.com/openai/v1"
//!   OPENAI_MODEL          : default "llama3-8b-8192"
//!   FIRESTORE_PROJECT_ID  : selects the Firestore store when set
//!   DAILY_SELECTION_PATH  : where the riddle of the day is persisted
//!   RIDDLE_CONFIG_PATH    : path to TOML config (prompts + optional riddle bank)
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod store;
mod puzzle;
mod daily;
mod answer;
mod filter;
mod calculator;
mod openai;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: riddle store, daily selector, chat bridge. Seeds an empty store.
  let state = Arc::new(AppState::from_env().await);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "riddle_backend", %addr, store = state.puzzles.backend(), ai_enabled = state.chat.is_enabled(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
