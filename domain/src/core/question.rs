//! Question value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A question to be answered against the document corpus (Value Object)
///
/// Blank input never becomes a `Question`; the original text is kept
/// as typed (no trimming) so the transcript shows exactly what was asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Question {
    content: String,
}

impl Question {
    /// Try to create a new question, returning None if it trims to empty
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for Question {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Question::try_new(s).ok_or(DomainError::EmptyQuestion)
    }
}

impl TryFrom<&str> for Question {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Question::try_new(s).ok_or(DomainError::EmptyQuestion)
    }
}

impl From<Question> for String {
    fn from(q: Question) -> Self {
        q.content
    }
}
