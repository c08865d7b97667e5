//! Error types for storage and input validation.
//!
//! Storage errors are never fatal: the state store logs them and keeps the
//! in-memory state as the source of truth. Validation errors are raised by the
//! helpers in [`crate::validate`] before a command is issued.

use thiserror::Error;

use crate::model::QuestionType;

/// Errors that can occur when reading or writing a persisted collection.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend failed to read or write the entry.
    #[error("storage I/O error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The value could not be converted to or from JSON.
    #[error("failed to (de)serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend is not available at all (e.g. quota exceeded, read-only).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// The collection key this error relates to, if known.
    pub fn key(&self) -> Option<&str> {
        match self {
            StorageError::Io { key, .. } | StorageError::Serialize { key, .. } => Some(key),
            StorageError::Unavailable(_) => None,
        }
    }

    /// Returns `true` if the stored bytes exist but are not valid for the
    /// requested type. Loads treat this the same as a missing entry.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StorageError::Serialize { .. })
    }
}

/// Reasons a form or a submission is rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("form title must not be empty")]
    EmptyTitle,

    #[error("form must contain at least one question")]
    NoQuestions,

    #[error("a {0} form must reference a target id")]
    MissingTarget(String),

    #[error("question {0} has no text")]
    EmptyQuestionText(String),

    #[error("multiple choice question {0} has no options")]
    NoOptions(String),

    #[error("invalid rating scale: {0}")]
    InvalidScale(String),

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(String),

    #[error("required question {0} was not answered")]
    MissingRequiredAnswer(String),

    #[error("answer given for unknown question {0}")]
    UnknownQuestion(String),

    #[error("question {question} expects a {expected} answer, got {value}")]
    WrongAnswerType {
        question: String,
        expected: QuestionType,
        value: String,
    },

    #[error("rating {value} for question {question} is outside {min}..={max}")]
    OutOfScale {
        question: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{value:?} is not an option of question {question}")]
    UnknownOption { question: String, value: String },
}
