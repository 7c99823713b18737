use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Selected option index per question id.
pub type Answers = BTreeMap<u32, usize>;

/// Read-only catalog quiz, keyed by course id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Percentage, 0 to 100.
    pub passing_score: u32,
    /// Minutes.
    pub time_limit: u32,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
}

/// Outcome of scoring an attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub passed: bool,
}

/// Stored outcome of the latest attempt for a course.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub passed: bool,
    /// Seconds.
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub answers: Answers,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
}
