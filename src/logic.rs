//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Listing/filtering riddles and serving the riddle of the day
//!   - Evaluating answers (lenient local match, no AI involved)
//!   - Forwarding hint and discussion requests to the chat bridge
//!   - The calculator widget

use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::answer::{AnswerFeedback, FEEDBACK_TTL};
use crate::calculator;
use crate::error::{Result, RiddleError};
use crate::filter::{categories, RiddleFilter};
use crate::protocol::{to_out, AnswerOut, CalcOut, RiddleOut};
use crate::state::AppState;

#[instrument(level = "info", skip(state, filter), fields(search_len = filter.search.len(), difficulty = ?filter.difficulty, category = ?filter.category))]
pub async fn list_riddles(state: &AppState, filter: &RiddleFilter) -> Result<Vec<RiddleOut>> {
  let all = state.puzzles.get_all_riddles().await?;
  let total = all.len();
  let out: Vec<RiddleOut> = filter.apply(all).iter().map(to_out).collect();
  debug!(target: "riddle", total, shown = out.len(), "Riddles filtered");
  Ok(out)
}

pub async fn list_categories(state: &AppState) -> Result<Vec<String>> {
  let all = state.puzzles.get_all_riddles().await?;
  Ok(categories(&all))
}

pub async fn riddle_of_the_day(state: &AppState) -> Result<Option<RiddleOut>> {
  Ok(state.daily.riddle_of_the_day().await?.as_ref().map(to_out))
}

#[instrument(level = "info", skip(state, answer), fields(%riddle_id, answer_len = answer.len()))]
pub async fn submit_answer(state: &AppState, riddle_id: &str, answer: &str) -> Result<AnswerOut> {
  let riddle = state.puzzles.get_riddle(riddle_id).await?;

  let now = Instant::now();
  let mut feedback = AnswerFeedback::new();
  let correct = feedback.submit(answer, &riddle, now);

  let out = match correct {
    None => AnswerOut {
      evaluated: false,
      correct: None,
      feedback: None,
      feedback_ms: 0,
      points: None,
      answer: None,
      explanation: None,
    },
    Some(ok) => AnswerOut {
      evaluated: true,
      correct: Some(ok),
      feedback: feedback.current(now),
      feedback_ms: FEEDBACK_TTL.as_millis() as u64,
      points: ok.then_some(riddle.points),
      answer: ok.then(|| riddle.answer.clone()),
      explanation: if ok { riddle.explanation.clone() } else { None },
    },
  };
  info!(target: "riddle", id = %riddle_id, evaluated = out.evaluated, correct = ?out.correct, "Answer evaluated");
  Ok(out)
}

#[instrument(level = "info", skip(state), fields(%riddle_id))]
pub async fn get_hint_text(state: &AppState, riddle_id: &str, hints_used: usize) -> Result<String> {
  let riddle = state.puzzles.get_riddle(riddle_id).await?;
  state.chat.get_hint(&riddle, hints_used).await
}

#[instrument(level = "info", skip(state, message), fields(%riddle_id, msg_len = message.len()))]
pub async fn do_discussion_reply(state: &AppState, riddle_id: &str, message: &str) -> Result<String> {
  let message = message.trim();
  if message.is_empty() {
    return Err(RiddleError::InvalidInput("message must not be empty".into()));
  }
  let riddle = state.puzzles.get_riddle(riddle_id).await?;
  state.chat.get_discussion_reply(&riddle, message).await
}

#[instrument(level = "debug", skip(expression), fields(expr_len = expression.len()))]
pub fn do_calculate(expression: &str) -> Result<CalcOut> {
  let result = calculator::evaluate(expression)
    .map_err(|e| RiddleError::InvalidInput(e.to_string()))?;
  Ok(CalcOut { result, display: calculator::format_result(result) })
}
