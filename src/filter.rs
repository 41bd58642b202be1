//! Search and filter over an already-listed riddle collection.

use std::collections::BTreeSet;

use crate::domain::{Difficulty, Riddle};

#[derive(Clone, Debug, Default)]
pub struct RiddleFilter {
  /// Case-insensitive substring of the riddle text. Empty matches everything.
  pub search: String,
  pub difficulty: Option<Difficulty>,
  pub category: Option<String>,
}

impl RiddleFilter {
  /// Build from raw query values where `"all"` (or empty) means unset.
  pub fn from_query(search: Option<&str>, difficulty: Option<&str>, category: Option<&str>) -> Self {
    let category = category
      .map(str::trim)
      .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
      .map(str::to_string);
    Self {
      search: search.unwrap_or_default().to_string(),
      difficulty: difficulty.and_then(Difficulty::parse_filter),
      category,
    }
  }

  pub fn matches(&self, riddle: &Riddle) -> bool {
    let matches_search =
      self.search.is_empty() || riddle.riddle.to_lowercase().contains(&self.search.to_lowercase());
    let matches_difficulty = self.difficulty.map_or(true, |d| riddle.difficulty == d);
    let matches_category = self.category.as_ref().map_or(true, |c| &riddle.category == c);
    matches_search && matches_difficulty && matches_category
  }

  pub fn apply(&self, riddles: Vec<Riddle>) -> Vec<Riddle> {
    riddles.into_iter().filter(|r| self.matches(r)).collect()
  }
}

/// Distinct categories, sorted, for the UI dropdown.
pub fn categories(riddles: &[Riddle]) -> Vec<String> {
  riddles
    .iter()
    .map(|r| r.category.clone())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}
