//! Loading riddle configuration (prompts + optional seed bank) from TOML.
//!
//! See `RiddleConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{info, error};

use crate::domain::Riddle;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct RiddleConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Replaces the built-in seed riddles when non-empty. Ids are preserved on seeding.
  #[serde(default)]
  pub riddles: Vec<Riddle>,
}

/// Prompts used by the chat bridge.
/// Placeholders: `{riddle}`, `{hints_used}`, `{difficulty}`, `{category}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub hint_system: String,
  pub hint_user_template: String,
  pub discussion_system: String,
  pub generate_system: String,
  pub generate_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      hint_system: "I am a riddle assistant. I will provide hints for the following riddle without revealing the answer. The riddle is: \"{riddle}\"".into(),
      hint_user_template: "The user has already used {hints_used} hints. Please provide a new hint that helps them solve the riddle without giving away the answer.".into(),
      discussion_system: "I am a riddle assistant. I will help discuss the following riddle without revealing the answer. The riddle is: \"{riddle}\"".into(),
      generate_system: "You are a riddle writer. Respond ONLY with strict JSON.".into(),
      generate_user_template: "Write one original {difficulty} riddle in the '{category}' category. Return JSON with fields: title, riddle, answer, hints (array of 3 strings), points (integer), explanation.".into(),
    }
  }
}

/// Attempt to load `RiddleConfig` from RIDDLE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_riddle_config_from_env() -> Option<RiddleConfig> {
  let path = std::env::var("RIDDLE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "riddle_backend", %path, riddles = cfg.riddles.len(), "Loaded riddle config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "riddle_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "riddle_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_config(raw: &str) -> Result<RiddleConfig, toml::de::Error> {
  toml::from_str::<RiddleConfig>(raw)
}
