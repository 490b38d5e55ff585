//! Persisted transcript records

use serde::{Deserialize, Serialize};

/// One persisted question/answer pair, oldest first on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub question: String,
    pub answer: String,
}

impl HistoryTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}
