use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have at least one option")]
    NoOptions,

    #[error("correct answer {answer:?} is not one of the options")]
    AnswerNotAnOption { answer: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One multiple-choice quiz question.
///
/// The correct answer is stored as the literal option text and compared with
/// exact string equality (case and whitespace sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank,
    /// `QuestionError::NoOptions` if no options are given, and
    /// `QuestionError::AnswerNotAnOption` if the correct answer does not match
    /// any option exactly.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let correct_answer = correct_answer.into();

        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if !options.iter().any(|o| *o == correct_answer) {
            return Err(QuestionError::AnswerNotAnOption {
                answer: correct_answer,
            });
        }

        Ok(Self {
            id,
            prompt,
            options,
            correct_answer,
        })
    }

    /// Rehydrate a question from stored content without validation.
    ///
    /// Stored content may have been entered by hand; a question whose answer
    /// is not among its options loads fine but can never be answered
    /// correctly. See [`Question::is_scoreable`].
    #[must_use]
    pub fn from_persisted(
        id: QuestionId,
        prompt: String,
        options: Vec<String>,
        correct_answer: String,
    ) -> Self {
        Self {
            id,
            prompt,
            options,
            correct_answer,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// True when `option` is one of the declared options.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// True when `answer` is exactly the correct answer.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    /// False when the correct answer is missing from the options.
    #[must_use]
    pub fn is_scoreable(&self) -> bool {
        self.has_option(&self.correct_answer)
    }
}
