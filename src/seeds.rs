//! Built-in seed riddles inserted into an empty store at startup.

use crate::domain::{Difficulty, Riddle};

#[allow(clippy::too_many_arguments)]
fn riddle(
  id: &str,
  title: &str,
  text: &str,
  answer: &str,
  difficulty: Difficulty,
  category: &str,
  hints: &[&str],
  points: i64,
  explanation: &str,
) -> Riddle {
  Riddle {
    id: id.into(),
    title: title.into(),
    riddle: text.into(),
    answer: answer.into(),
    difficulty,
    category: category.into(),
    hints: hints.iter().map(|h| h.to_string()).collect(),
    points,
    alternative_answers: None,
    explanation: Some(explanation.into()),
  }
}

/// Minimal set of built-in riddles that guarantee the app
/// is useful even without external config or a remote store.
pub fn seed_riddles() -> Vec<Riddle> {
  vec![
    riddle(
      "1",
      "The Missing Letter",
      "An ancient cipher sequence is missing one crucial character. Can you identify which letter is needed to complete the standard English alphabet sequence?",
      "L",
      Difficulty::Easy,
      "logic",
      &["Look at the sequence carefully", "Count the letters", "The answer is a single letter"],
      10,
      "The letter \"L\" is missing from the sequence. The sequence should be A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z.",
    ),
    riddle(
      "2",
      "The Silent Word",
      "I am a word. Add two letters to me, and I become shorter. What word am I?",
      "short",
      Difficulty::Medium,
      "wordplay",
      &[
        "Think about the word itself",
        "The answer is a word that describes its own property",
        "The word becomes shorter when you add \"er\" to it",
      ],
      15,
      "The word \"short\" becomes \"shorter\" when you add \"er\" to it, making it longer in terms of letters but shorter in terms of meaning.",
    ),
    riddle(
      "3",
      "Interstellar Pursuit",
      "You are commanding a patrol ship in a distant star system with seven interconnected planets. A rogue vessel is hiding on one of them. Your ship can jump to any planet in an hour, but their ship can only move to an adjacent planet in the same time. They will always move if possible. You have 10 hours before the rogue fleet arrives. Find a sequence of planet checks to guarantee you intercept the rogue vessel in 10 jumps or less, regardless of their starting planet.",
      "2, 3, 4, 3, 6, 2, 3, 4, 3, 6",
      Difficulty::Hard,
      "logic",
      &[
        "Try simplifying the problem to a smaller number of planets.",
        "Consider the planet that is adjacent to all others.",
        "Think about how the rebels' location alternates between odd and even numbered planets each hour.",
      ],
      25,
      "The rebels alternate between odd and even numbered planets each hour. By searching the sequence 2, 3, 4, 3, 6 for the first five hours, you can guarantee they are on an even planet if they weren't caught. Repeating the same sequence for the next five hours will then guarantee capture within 10 warps.",
    ),
    riddle(
      "4",
      "The Pirate's Booty",
      "Captain Redbeard and his four most trusted crew members have just unearthed a treasure chest containing 100 gold coins. According to the Pirate Code, the captain proposes a way to share the gold. All five pirates vote. If the proposal passes (or is a tie), the gold is divided. If the majority votes against it, the captain is thrown overboard, and the next in rank becomes captain. Pirates value their lives and gold, but will vote against the captain if their gold amount is the same either way, just for sport. They are all exceptionally logical. As Captain Redbeard, what distribution should you propose to ensure your survival?",
      "98:0:1:0:1",
      Difficulty::Hard,
      "logic",
      &[
        "Start by analyzing the last possible scenario (with only two pirates left).",
        "Work backward from the simplest scenarios to the initial one.",
        "Remember that a pirate will vote Nay if their outcome is the same whether the current proposal passes or fails.",
      ],
      25,
      "By working backward from the last pirates, each pirate can deduce the outcome of any future scenario. Knowing this, the captain only needs to bribe the minimum number of pirates necessary to get at least 50% of the votes (including their own), leveraging the fact that the other pirates will vote Yarr if the alternative is worse for them (even if they get only one coin).",
    ),
    riddle(
      "5",
      "Escape the Gorge",
      "You and three companions, each with a different speed (taking 1, 2, 5, and 10 minutes to cross), are trapped on one side of a deep gorge with a single, unstable rope bridge. A swarm of creatures is approaching and will reach the bridge in 17 minutes. The bridge can only support two people at a time, and you only have one lamp to light the way, which must be carried during every crossing. How can all four of you cross the gorge safely to cut the bridge before the creatures arrive?",
      "1&2 across (2 min), 1 returns (1 min), 5&10 across (10 min), 2 returns (2 min), 1&2 across (2 min). Total = 17 minutes.",
      Difficulty::Hard,
      "logic",
      &[
        "The bridge can only hold two people at a time.",
        "The lantern must cross with people.",
        "Think about minimizing the time the slowest people spend waiting or returning.",
        "Consider who should carry the lantern on return trips.",
      ],
      30,
      "The key is to have the two slowest people (5 and 10 minutes) cross together to minimize the total time. The fastest people (1 and 2 minutes) are used for the return trips with the lantern.",
    ),
    riddle(
      "6",
      "The Inheritance Lockers",
      "In a bizarre inheritance challenge, you and 99 other beneficiaries must interact with 100 numbered lockers containing clues. Beneficiary #1 opens all lockers. #2 flips the state of every 2nd locker. #3 flips every 3rd locker, and so on, up to #100. Lockers remaining open at the end contain the clues. Which lockers will remain open?",
      "The lockers that are perfect squares (1, 4, 9, 16, 25, 36, 49, 64, 81, 100).",
      Difficulty::Medium,
      "logic",
      &[
        "Think about how many times each locker is touched.",
        "Relate the number of touches to the factors of the locker number.",
        "Which numbers have an odd number of factors?",
      ],
      20,
      "A locker's final state depends on whether it's touched an odd or even number of times. A locker is touched by every beneficiary whose number is a factor of the locker number. Numbers with an odd number of factors are perfect squares.",
    ),
    riddle(
      "7",
      "The Precise Escape",
      "You have escaped confinement and need to time precisely 45 seconds to slip past a security measure. Your watch is broken, but you have two fuses and a lighter. Each fuse burns for exactly one minute from end to end, but they burn unevenly. How can you use the fuses and lighter to time exactly 45 seconds?",
      "Light three ends of the two fuses simultaneously. When the first fuse finishes burning, immediately light the remaining unlit end of the second fuse. When the second fuse finishes burning, exactly 45 seconds will have passed.",
      Difficulty::Hard,
      "logic",
      &[
        "Consider what happens if you light a fuse from both ends at once.",
        "Think about how you can use the first fuse to measure a specific amount of time on the second fuse.",
        "You need to use the lighter multiple times.",
      ],
      30,
      "Lighting a fuse from both ends makes it burn out in half its total time (30 seconds), regardless of uneven burning. At that moment the second fuse has 30 seconds left; lighting its other end makes it finish in 15 more seconds, totaling 45 seconds.",
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn seed_ids_are_unique() {
    let seeds = seed_riddles();
    let ids: HashSet<_> = seeds.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), seeds.len());
  }
}
