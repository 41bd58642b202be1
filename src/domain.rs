//! Domain models: riddles, partial updates, the daily selection record and chat messages.

use serde::{Deserialize, Serialize};

/// Difficulty buckets known to the UI filters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  /// Parse a filter value. `None` for "all", empty, or anything unknown.
  pub fn parse_filter(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "easy" => Some(Difficulty::Easy),
      "medium" => Some(Difficulty::Medium),
      "hard" => Some(Difficulty::Hard),
      _ => None,
    }
  }
}

impl std::fmt::Display for Difficulty {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A riddle as owned by the remote store. `id` is the store's document id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Riddle {
  pub id: String,
  pub title: String,
  pub riddle: String,
  pub answer: String,
  pub difficulty: Difficulty,
  pub category: String,
  #[serde(default)] pub hints: Vec<String>,
  pub points: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alternative_answers: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
}

/// A riddle before the store has assigned it an id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRiddle {
  pub title: String,
  pub riddle: String,
  pub answer: String,
  pub difficulty: Difficulty,
  pub category: String,
  #[serde(default)] pub hints: Vec<String>,
  pub points: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alternative_answers: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
}

impl NewRiddle {
  pub fn with_id(self, id: impl Into<String>) -> Riddle {
    Riddle {
      id: id.into(),
      title: self.title,
      riddle: self.riddle,
      answer: self.answer,
      difficulty: self.difficulty,
      category: self.category,
      hints: self.hints,
      points: self.points,
      alternative_answers: self.alternative_answers,
      explanation: self.explanation,
    }
  }
}

impl Riddle {
  /// Split into id + body, e.g. for seeding under a preserved id.
  pub fn into_parts(self) -> (String, NewRiddle) {
    let body = NewRiddle {
      title: self.title,
      riddle: self.riddle,
      answer: self.answer,
      difficulty: self.difficulty,
      category: self.category,
      hints: self.hints,
      points: self.points,
      alternative_answers: self.alternative_answers,
      explanation: self.explanation,
    };
    (self.id, body)
  }

  /// Merge the `Some` fields of a patch. The id never changes.
  pub fn apply(&mut self, patch: RiddlePatch) {
    if let Some(v) = patch.title { self.title = v; }
    if let Some(v) = patch.riddle { self.riddle = v; }
    if let Some(v) = patch.answer { self.answer = v; }
    if let Some(v) = patch.difficulty { self.difficulty = v; }
    if let Some(v) = patch.category { self.category = v; }
    if let Some(v) = patch.hints { self.hints = v; }
    if let Some(v) = patch.points { self.points = v; }
    if let Some(v) = patch.alternative_answers { self.alternative_answers = Some(v); }
    if let Some(v) = patch.explanation { self.explanation = Some(v); }
  }
}

/// Partial update. Only fields that are set get merged into the stored document.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiddlePatch {
  #[serde(default)] pub title: Option<String>,
  #[serde(default)] pub riddle: Option<String>,
  #[serde(default)] pub answer: Option<String>,
  #[serde(default)] pub difficulty: Option<Difficulty>,
  #[serde(default)] pub category: Option<String>,
  #[serde(default)] pub hints: Option<Vec<String>>,
  #[serde(default)] pub points: Option<i64>,
  #[serde(default)] pub alternative_answers: Option<Vec<String>>,
  #[serde(default)] pub explanation: Option<String>,
}

impl RiddlePatch {
  /// Store field names touched by this patch, in declaration order.
  pub fn field_paths(&self) -> Vec<&'static str> {
    let mut out = Vec::new();
    if self.title.is_some() { out.push("title"); }
    if self.riddle.is_some() { out.push("riddle"); }
    if self.answer.is_some() { out.push("answer"); }
    if self.difficulty.is_some() { out.push("difficulty"); }
    if self.category.is_some() { out.push("category"); }
    if self.hints.is_some() { out.push("hints"); }
    if self.points.is_some() { out.push("points"); }
    if self.alternative_answers.is_some() { out.push("alternativeAnswers"); }
    if self.explanation.is_some() { out.push("explanation"); }
    out
  }

  pub fn is_empty(&self) -> bool {
    self.field_paths().is_empty()
  }
}

/// The locally persisted "Riddle of the Day" record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailySelection {
  /// Calendar day, `YYYY-MM-DD`.
  pub date: String,
  pub riddle_id: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

/// One message of a chat completion request. Never persisted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
  pub role: Role,
  pub content: String,
}

impl ChatMessage {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn riddle_uses_camel_case_and_lowercase_difficulty() {
    let json = serde_json::json!({
      "id": "9",
      "title": "T",
      "riddle": "R",
      "answer": "A",
      "difficulty": "medium",
      "category": "logic",
      "points": 15,
      "alternativeAnswers": ["a"]
    });
    let r: Riddle = serde_json::from_value(json).unwrap();
    assert_eq!(r.difficulty, Difficulty::Medium);
    assert!(r.hints.is_empty());
    assert_eq!(r.alternative_answers, Some(vec!["a".to_string()]));

    let out = serde_json::to_value(&r).unwrap();
    assert_eq!(out["alternativeAnswers"][0], "a");
    assert!(out.get("explanation").is_none());
  }

  #[test]
  fn patch_merges_only_set_fields() {
    let mut r = NewRiddle {
      title: "Old".into(),
      riddle: "text".into(),
      answer: "x".into(),
      difficulty: Difficulty::Easy,
      category: "logic".into(),
      hints: vec![],
      points: 10,
      alternative_answers: None,
      explanation: None,
    }
    .with_id("1");

    let patch = RiddlePatch { title: Some("New".into()), points: Some(20), ..Default::default() };
    assert_eq!(patch.field_paths(), vec!["title", "points"]);
    r.apply(patch);

    assert_eq!(r.id, "1");
    assert_eq!(r.title, "New");
    assert_eq!(r.points, 20);
    assert_eq!(r.riddle, "text");
  }

  #[test]
  fn difficulty_filter_treats_all_as_unset() {
    assert_eq!(Difficulty::parse_filter("Hard"), Some(Difficulty::Hard));
    assert_eq!(Difficulty::parse_filter("all"), None);
    assert_eq!(Difficulty::parse_filter(""), None);
  }
}
