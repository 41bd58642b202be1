//! Hint/chat bridge over an OpenAI-compatible chat completion endpoint.
//!
//! Stateless: every call is one fresh round trip with no retry and no caching.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{ChatMessage, Difficulty, NewRiddle, Riddle};
use crate::error::{Result, RiddleError};
use crate::util::{extract_api_error, fill_template, trunc_for_log};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
  pub max_tokens: u32,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.groq.com/openai/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "llama3-8b-8192".into());
    Self::new(api_key, base_url, model)
  }

  pub fn new(api_key: String, base_url: String, model: String) -> Option<Self> {
    let client = match reqwest::Client::builder().timeout(Duration::from_secs(20)).build() {
      Ok(c) => c,
      Err(e) => {
        error!(target: "riddle_backend", error = %e, "Could not build chat HTTP client; chat bridge disabled");
        return None;
      }
    };

    Some(Self { client, api_key, base_url, model, temperature: 0.7, max_tokens: 150 })
  }

  /// One chat completion. `json_mode` asks for a strict JSON object reply.
  #[instrument(level = "info", skip(self, messages), fields(model = %self.model, messages = messages.len()))]
  async fn complete(&self, messages: Vec<ChatMessage>, json_mode: bool) -> Result<String> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages,
      temperature: self.temperature,
      response_format: json_mode.then(|| ResponseFormat { r#type: "json_object".into() }),
      max_tokens: if json_mode { None } else { Some(self.max_tokens) },
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "riddle-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await
      .map_err(|e| RiddleError::AiRequestFailed(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      error!(elapsed = ?start.elapsed(), %status, body = %trunc_for_log(&body, 300), "Chat completion rejected");
      let msg = extract_api_error(&body).unwrap_or(body);
      return Err(RiddleError::AiRequestFailed(format!("HTTP {}: {}", status, msg)));
    }

    let body: ChatCompletionResponse = res.json().await
      .map_err(|e| RiddleError::AiRequestFailed(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Chat usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    info!(elapsed = ?start.elapsed(), reply_len = text.len(), "Chat completion received");
    Ok(text)
  }
}

/// The UI-facing bridge. Without a client every call fails with
/// `AiServiceUnavailable` and nothing is sent.
#[derive(Clone)]
pub struct ChatBridge {
  openai: Option<OpenAI>,
  prompts: Prompts,
}

impl ChatBridge {
  pub fn new(openai: Option<OpenAI>, prompts: Prompts) -> Self {
    Self { openai, prompts }
  }

  pub fn is_enabled(&self) -> bool {
    self.openai.is_some()
  }

  fn client(&self) -> Result<&OpenAI> {
    self.openai.as_ref().ok_or(RiddleError::AiServiceUnavailable)
  }

  #[instrument(level = "info", skip(self, riddle), fields(id = %riddle.id))]
  pub async fn get_hint(&self, riddle: &Riddle, hints_used: usize) -> Result<String> {
    let oa = self.client()?;
    oa.complete(hint_messages(&self.prompts, riddle, hints_used), false).await
  }

  #[instrument(level = "info", skip(self, riddle, user_message), fields(id = %riddle.id, msg_len = user_message.len()))]
  pub async fn get_discussion_reply(&self, riddle: &Riddle, user_message: &str) -> Result<String> {
    let oa = self.client()?;
    oa.complete(discussion_messages(&self.prompts, riddle, user_message), false).await
  }

  /// Ask the model for a brand-new riddle. The reply must be a JSON object.
  #[instrument(level = "info", skip(self), fields(%difficulty, %category))]
  pub async fn generate_riddle(&self, difficulty: Difficulty, category: &str) -> Result<NewRiddle> {
    let oa = self.client()?;
    let pairs = [("difficulty", difficulty.as_str()), ("category", category)];
    let messages = vec![
      ChatMessage::system(fill_template(&self.prompts.generate_system, &pairs)),
      ChatMessage::user(fill_template(&self.prompts.generate_user_template, &pairs)),
    ];
    let text = oa.complete(messages, true).await?;
    let riddle = parse_generated(&text, difficulty, category)?;
    info!(title = %riddle.title, "Riddle generated");
    Ok(riddle)
  }
}

fn hint_messages(prompts: &Prompts, riddle: &Riddle, hints_used: usize) -> Vec<ChatMessage> {
  let used = hints_used.to_string();
  vec![
    ChatMessage::system(fill_template(&prompts.hint_system, &[("riddle", riddle.riddle.as_str())])),
    ChatMessage::user(fill_template(&prompts.hint_user_template, &[("hints_used", used.as_str())])),
  ]
}

fn discussion_messages(prompts: &Prompts, riddle: &Riddle, user_message: &str) -> Vec<ChatMessage> {
  vec![
    ChatMessage::system(fill_template(&prompts.discussion_system, &[("riddle", riddle.riddle.as_str())])),
    ChatMessage::user(user_message),
  ]
}

fn parse_generated(text: &str, difficulty: Difficulty, category: &str) -> Result<NewRiddle> {
  #[derive(Deserialize)]
  struct Gen {
    title: String,
    riddle: String,
    answer: String,
    #[serde(default)] hints: Vec<String>,
    #[serde(default)] points: Option<i64>,
    #[serde(default)] explanation: Option<String>,
  }

  let g: Gen = serde_json::from_str(text.trim())
    .map_err(|e| RiddleError::EvaluationParseError(e.to_string()))?;
  let default_points = match difficulty {
    Difficulty::Easy => 10,
    Difficulty::Medium => 20,
    Difficulty::Hard => 30,
  };
  Ok(NewRiddle {
    title: g.title,
    riddle: g.riddle,
    answer: g.answer,
    difficulty,
    category: category.to_string(),
    hints: g.hints,
    points: g.points.unwrap_or(default_points),
    alternative_answers: None,
    explanation: g.explanation,
  })
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessage>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}
