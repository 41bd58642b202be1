//! Free-text answer evaluation.
//!
//! The rule is deliberately lenient: the input is trimmed, then input and
//! candidates are lower-cased, and the answer is correct when it equals a
//! candidate, is contained in it, or contains it. A one-letter canonical answer
//! therefore matches almost any input holding that letter. Candidates are the
//! canonical answer plus any alternatives; an empty candidate matches nothing.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::domain::Riddle;

/// How long the correct/incorrect feedback stays visible.
pub const FEEDBACK_TTL: Duration = Duration::from_secs(3);

/// `None` when the input is blank (no submission), otherwise whether it matches.
pub fn evaluate_answer(input: &str, riddle: &Riddle) -> Option<bool> {
  let guess = input.trim();
  if guess.is_empty() {
    return None;
  }
  let guess = guess.to_lowercase();

  let alternatives = riddle.alternative_answers.iter().flatten();
  let correct = std::iter::once(&riddle.answer)
    .chain(alternatives)
    .any(|candidate| matches_candidate(&guess, candidate));
  Some(correct)
}

fn matches_candidate(guess: &str, candidate: &str) -> bool {
  let candidate = candidate.to_lowercase();
  if candidate.is_empty() {
    return false;
  }
  candidate == guess || candidate.contains(guess) || guess.contains(&candidate)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
  Correct,
  Incorrect,
}

/// Transient feedback shown after a submission; clears itself after `FEEDBACK_TTL`.
#[derive(Debug, Default)]
pub struct AnswerFeedback {
  state: Option<(Feedback, Instant)>,
}

impl AnswerFeedback {
  pub fn new() -> Self {
    Self::default()
  }

  /// Evaluate and, if something was submitted, replace the feedback state.
  pub fn submit(&mut self, input: &str, riddle: &Riddle, now: Instant) -> Option<bool> {
    let result = evaluate_answer(input, riddle)?;
    let fb = if result { Feedback::Correct } else { Feedback::Incorrect };
    self.state = Some((fb, now + FEEDBACK_TTL));
    Some(result)
  }

  pub fn current(&self, now: Instant) -> Option<Feedback> {
    match self.state {
      Some((fb, expires)) if now < expires => Some(fb),
      _ => None,
    }
  }
}
