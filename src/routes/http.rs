//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::domain::{NewRiddle, RiddlePatch};
use crate::error::RiddleError;
use crate::filter::RiddleFilter;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

impl RiddleError {
  pub fn status(&self) -> StatusCode {
    match self {
      RiddleError::NotFound(_) => StatusCode::NOT_FOUND,
      RiddleError::InvalidInput(_) => StatusCode::BAD_REQUEST,
      RiddleError::AiServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
      RiddleError::StoreUnavailable(_)
      | RiddleError::Service(_)
      | RiddleError::AiRequestFailed(_)
      | RiddleError::EvaluationParseError(_) => StatusCode::BAD_GATEWAY,
    }
  }
}

impl IntoResponse for RiddleError {
  fn into_response(self) -> Response {
    let status = self.status();
    warn!(target: "riddle_backend", %status, error = %self, "Request failed");
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

type ApiResult<T> = Result<Json<T>, RiddleError>;

/// Set text fields must not be blank.
fn reject_blank<'a>(fields: [(&str, Option<&'a String>); 3]) -> Result<(), RiddleError> {
  for (name, value) in fields {
    if value.is_some_and(|v| v.trim().is_empty()) {
      return Err(RiddleError::InvalidInput(format!("{name} must not be empty")));
    }
  }
  Ok(())
}

fn validate_new(r: &NewRiddle) -> Result<(), RiddleError> {
  reject_blank([("title", Some(&r.title)), ("riddle", Some(&r.riddle)), ("answer", Some(&r.answer))])
}

fn validate_patch(p: &RiddlePatch) -> Result<(), RiddleError> {
  reject_blank([("title", p.title.as_ref()), ("riddle", p.riddle.as_ref()), ("answer", p.answer.as_ref())])
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    store: state.puzzles.backend().to_string(),
    ai_enabled: state.chat.is_enabled(),
  })
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_list_riddles(
  State(state): State<Arc<AppState>>,
  Query(q): Query<RiddleListQuery>,
) -> ApiResult<Vec<RiddleOut>> {
  let filter = RiddleFilter::from_query(q.search.as_deref(), q.difficulty.as_deref(), q.category.as_deref());
  Ok(Json(list_riddles(&state, &filter).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_categories(State(state): State<Arc<AppState>>) -> ApiResult<CategoriesOut> {
  Ok(Json(CategoriesOut { categories: list_categories(&state).await? }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_random_riddle(State(state): State<Arc<AppState>>) -> ApiResult<OptionalRiddleOut> {
  let riddle = state.puzzles.get_random_riddle().await?;
  Ok(Json(OptionalRiddleOut { riddle: riddle.as_ref().map(to_out) }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_daily_riddle(State(state): State<Arc<AppState>>) -> ApiResult<OptionalRiddleOut> {
  Ok(Json(OptionalRiddleOut { riddle: riddle_of_the_day(&state).await? }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_riddle(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<RiddleOut> {
  let r = state.puzzles.get_riddle(&id).await?;
  Ok(Json(to_out(&r)))
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title))]
pub async fn http_create_riddle(
  State(state): State<Arc<AppState>>,
  Json(body): Json<NewRiddle>,
) -> Result<(StatusCode, Json<IdOut>), RiddleError> {
  validate_new(&body)?;
  let id = state.puzzles.add_riddle(body).await?;
  info!(target: "riddle", %id, "HTTP riddle created");
  Ok((StatusCode::CREATED, Json(IdOut { id })))
}

#[instrument(level = "info", skip(state, patch), fields(fields = ?patch.field_paths()))]
pub async fn http_update_riddle(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(patch): Json<RiddlePatch>,
) -> Result<StatusCode, RiddleError> {
  validate_patch(&patch)?;
  state.puzzles.update_riddle(&id, patch).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_riddle(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, RiddleError> {
  state.puzzles.delete_riddle(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, body), fields(answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> ApiResult<AnswerOut> {
  Ok(Json(submit_answer(&state, &id, &body.answer).await?))
}

#[instrument(level = "info", skip(state, body), fields(hints_used = body.hints_used))]
pub async fn http_post_hint(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<HintIn>,
) -> ApiResult<TextOut> {
  let text = get_hint_text(&state, &id, body.hints_used).await?;
  info!(target: "riddle", %id, "HTTP hint served");
  Ok(Json(TextOut { text }))
}

#[instrument(level = "info", skip(state, body), fields(msg_len = body.message.len()))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<ChatIn>,
) -> ApiResult<TextOut> {
  let text = do_discussion_reply(&state, &id, &body.message).await?;
  Ok(Json(TextOut { text }))
}

#[instrument(level = "info", skip(state, body), fields(difficulty = %body.difficulty, category = %body.category))]
pub async fn http_generate_riddle(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> ApiResult<NewRiddle> {
  Ok(Json(state.chat.generate_riddle(body.difficulty, &body.category).await?))
}

#[instrument(level = "info", skip(body))]
pub async fn http_post_calculator(Json(body): Json<CalcIn>) -> ApiResult<CalcOut> {
  Ok(Json(do_calculate(&body.expression)?))
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::body::{to_bytes, Body};
  use axum::http::Request;
  use serde::de::DeserializeOwned;
  use tower::ServiceExt;

  use crate::config::Prompts;
  use crate::daily::MemorySelectionStorage;
  use crate::routes::api_router;
  use crate::store::MemoryStore;

  async fn app() -> axum::Router {
    let state = AppState::new(
      Arc::new(MemoryStore::new()),
      None,
      Prompts::default(),
      Arc::new(MemorySelectionStorage::default()),
    );
    state.seed(Vec::new()).await;
    api_router(Arc::new(state))
  }

  async fn call(app: axum::Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        req = req.header("content-type", "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let res = app.oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
  }

  fn json<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
  }

  #[tokio::test]
  async fn health_reports_backends() {
    let (status, body) = call(app().await, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let h: HealthOut = json(&body);
    assert_eq!(h.store, "memory");
    assert!(!h.ai_enabled);
  }

  #[tokio::test]
  async fn list_filters_and_hides_answers() {
    let (status, body) = call(app().await, "GET", "/api/v1/riddles?difficulty=hard", None).await;
    assert_eq!(status, StatusCode::OK);
    let list: Vec<serde_json::Value> = json(&body);
    assert_eq!(list.len(), 4);
    assert!(list.iter().all(|r| r["difficulty"] == "hard" && r.get("answer").is_none()));
  }

  #[tokio::test]
  async fn unknown_riddle_is_404() {
    let (status, body) = call(app().await, "GET", "/api/v1/riddles/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json::<ErrorOut>(&body).error.contains("missing"));
  }

  #[tokio::test]
  async fn answer_endpoint_reveals_explanation_only_when_correct() {
    let app = app().await;
    let (_, body) = call(app.clone(), "POST", "/api/v1/riddles/2/answer", Some(serde_json::json!({ "answer": "Short" }))).await;
    let out: AnswerOut = json(&body);
    assert_eq!(out.correct, Some(true));
    assert_eq!(out.points, Some(15));
    assert!(out.explanation.is_some());
    assert_eq!(out.feedback_ms, 3000);

    let (_, body) = call(app.clone(), "POST", "/api/v1/riddles/2/answer", Some(serde_json::json!({ "answer": "tall" }))).await;
    let out: AnswerOut = json(&body);
    assert_eq!(out.correct, Some(false));
    assert!(out.answer.is_none());

    let (_, body) = call(app, "POST", "/api/v1/riddles/2/answer", Some(serde_json::json!({ "answer": "   " }))).await;
    let out: AnswerOut = json(&body);
    assert!(!out.evaluated);
    assert!(out.feedback.is_none());
  }

  #[tokio::test]
  async fn hint_without_credential_is_503() {
    let (status, _) = call(app().await, "POST", "/api/v1/riddles/1/hint", Some(serde_json::json!({ "hintsUsed": 0 }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  }

  #[tokio::test]
  async fn create_update_delete_flow() {
    let app = app().await;
    let new = serde_json::json!({
      "title": "Echo",
      "riddle": "I speak without a mouth.",
      "answer": "echo",
      "difficulty": "easy",
      "category": "wordplay",
      "points": 5
    });
    let (status, body) = call(app.clone(), "POST", "/api/v1/riddles", Some(new)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json::<IdOut>(&body).id;

    let uri = format!("/api/v1/riddles/{id}");
    let (status, _) = call(app.clone(), "PATCH", &uri, Some(serde_json::json!({ "points": 7 }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = call(app.clone(), "GET", &uri, None).await;
    assert_eq!(json::<RiddleOut>(&body).points, 7);

    let (status, _) = call(app.clone(), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(app.clone(), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(app, "PATCH", &uri, Some(serde_json::json!({ "points": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn create_rejects_blank_answer() {
    let new = serde_json::json!({
      "title": "Blank",
      "riddle": "?",
      "answer": " ",
      "difficulty": "easy",
      "category": "logic",
      "points": 1
    });
    let (status, _) = call(app().await, "POST", "/api/v1/riddles", Some(new)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn update_rejects_blanking_text_fields() {
    let app = app().await;
    let (status, _) = call(app.clone(), "PATCH", "/api/v1/riddles/2", Some(serde_json::json!({ "answer": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(app.clone(), "PATCH", "/api/v1/riddles/2", Some(serde_json::json!({ "title": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(app, "POST", "/api/v1/riddles/2/answer", Some(serde_json::json!({ "answer": "short" }))).await;
    assert_eq!(json::<AnswerOut>(&body).correct, Some(true));
  }

  #[tokio::test]
  async fn daily_is_stable_across_calls() {
    let app = app().await;
    let (_, a) = call(app.clone(), "GET", "/api/v1/riddles/daily", None).await;
    let (_, b) = call(app, "GET", "/api/v1/riddles/daily", None).await;
    let a: OptionalRiddleOut = json(&a);
    let b: OptionalRiddleOut = json(&b);
    assert_eq!(a.riddle.unwrap().id, b.riddle.unwrap().id);
  }

  #[tokio::test]
  async fn calculator_endpoint() {
    let (status, body) = call(app().await, "POST", "/api/v1/calculator", Some(serde_json::json!({ "expression": "(2+3)*4" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json::<CalcOut>(&body).display, "20");

    let (status, _) = call(app().await, "POST", "/api/v1/calculator", Some(serde_json::json!({ "expression": "2/0" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
