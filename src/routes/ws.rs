//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::error::Result;
use crate::logic::*;
use crate::protocol::{to_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "riddle_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "riddle_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "riddle_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "riddle_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "riddle_backend", "WebSocket disconnected");
}

/// Failures become an `error` message; the socket stays open.
fn reply_or_error<T>(res: Result<T>, ok: impl FnOnce(T) -> ServerWsMessage) -> ServerWsMessage {
  match res {
    Ok(v) => ok(v),
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::GetRiddle { riddle_id } => {
      let res = state.puzzles.get_riddle(&riddle_id).await;
      reply_or_error(res, |r| ServerWsMessage::Riddle { riddle: Some(to_out(&r)) })
    }

    ClientWsMessage::Daily => {
      let res = riddle_of_the_day(state).await;
      reply_or_error(res, |riddle| ServerWsMessage::Riddle { riddle })
    }

    ClientWsMessage::SubmitAnswer { riddle_id, answer } => {
      let res = submit_answer(state, &riddle_id, &answer).await;
      reply_or_error(res, |result| ServerWsMessage::AnswerResult { result })
    }

    ClientWsMessage::Hint { riddle_id, hints_used } => {
      let res = get_hint_text(state, &riddle_id, hints_used).await;
      info!(target: "riddle", id = %riddle_id, ok = res.is_ok(), "WS hint served");
      reply_or_error(res, |text| ServerWsMessage::Hint { text })
    }

    ClientWsMessage::Chat { riddle_id, message } => {
      let res = do_discussion_reply(state, &riddle_id, &message).await;
      reply_or_error(res, |text| ServerWsMessage::ChatReply { text })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Prompts;
  use crate::daily::MemorySelectionStorage;
  use crate::store::MemoryStore;

  async fn state() -> AppState {
    let state = AppState::new(
      Arc::new(MemoryStore::new()),
      None,
      Prompts::default(),
      Arc::new(MemorySelectionStorage::default()),
    );
    state.seed(Vec::new()).await;
    state
  }

  fn to_json(msg: &ServerWsMessage) -> serde_json::Value {
    serde_json::to_value(msg).unwrap()
  }

  #[tokio::test]
  async fn submit_answer_reply_is_flattened() {
    let msg: ClientWsMessage =
      serde_json::from_str(r#"{"type":"submit_answer","riddleId":"1","answer":"l"}"#).unwrap();
    let out = to_json(&handle_client_ws(msg, &state().await).await);
    assert_eq!(out["type"], "answer_result");
    assert_eq!(out["correct"], true);
    assert_eq!(out["feedback"], "correct");
  }

  #[tokio::test]
  async fn errors_keep_the_conversation_going() {
    let msg: ClientWsMessage =
      serde_json::from_str(r#"{"type":"hint","riddleId":"1"}"#).unwrap();
    let out = to_json(&handle_client_ws(msg, &state().await).await);
    assert_eq!(out["type"], "error");
    assert!(out["message"].as_str().unwrap().contains("unavailable"));
  }

  #[tokio::test]
  async fn daily_returns_a_riddle() {
    let out = to_json(&handle_client_ws(ClientWsMessage::Daily, &state().await).await);
    assert_eq!(out["type"], "riddle");
    assert!(out["riddle"]["id"].is_string());
  }
}
