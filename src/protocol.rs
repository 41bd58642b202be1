//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::answer::Feedback;
use crate::domain::{Difficulty, Riddle};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    GetRiddle {
        #[serde(rename = "riddleId")]
        riddle_id: String,
    },
    Daily,
    SubmitAnswer {
        #[serde(rename = "riddleId")]
        riddle_id: String,
        answer: String,
    },
    Hint {
        #[serde(rename = "riddleId")]
        riddle_id: String,
        #[serde(rename = "hintsUsed", default)]
        hints_used: usize,
    },
    Chat {
        #[serde(rename = "riddleId")]
        riddle_id: String,
        message: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Riddle {
        riddle: Option<RiddleOut>,
    },
    AnswerResult {
        #[serde(flatten)]
        result: AnswerOut,
    },
    Hint {
        text: String,
    },
    ChatReply {
        text: String,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for riddle delivery. The answer and the
/// explanation stay server-side until solved.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiddleOut {
    pub id: String,
    pub title: String,
    pub riddle: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub hints: Vec<String>,
    pub points: i64,
}

/// Convert full `Riddle` (internal) to the public DTO.
pub fn to_out(r: &Riddle) -> RiddleOut {
    RiddleOut {
        id: r.id.clone(),
        title: r.title.clone(),
        riddle: r.riddle.clone(),
        difficulty: r.difficulty,
        category: r.category.clone(),
        hints: r.hints.clone(),
        points: r.points,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize, Default)]
pub struct RiddleListQuery {
    pub search: Option<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct IdOut {
    pub id: String,
}

#[derive(Serialize, Deserialize)]
pub struct OptionalRiddleOut {
    pub riddle: Option<RiddleOut>,
}

#[derive(Serialize, Deserialize)]
pub struct CategoriesOut {
    pub categories: Vec<String>,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    /// False for blank submissions; nothing else is set then.
    pub evaluated: bool,
    pub correct: Option<bool>,
    pub feedback: Option<Feedback>,
    /// How long the UI should show `feedback`.
    pub feedback_ms: u64,
    pub points: Option<i64>,
    pub answer: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HintIn {
    #[serde(default)]
    pub hints_used: usize,
}

#[derive(Deserialize)]
pub struct ChatIn {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct TextOut {
    pub text: String,
}

#[derive(Deserialize)]
pub struct GenerateIn {
    pub difficulty: Difficulty,
    pub category: String,
}

#[derive(Deserialize)]
pub struct CalcIn {
    pub expression: String,
}

#[derive(Serialize, Deserialize)]
pub struct CalcOut {
    pub result: f64,
    pub display: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub ok: bool,
    pub store: String,
    pub ai_enabled: bool,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
}
