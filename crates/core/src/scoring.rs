//! Quiz scoring.
//!
//! A question counts as correct only when the recorded answer is exactly its
//! correct-answer string. Unanswered questions count as wrong. No partial
//! credit and no weighting.

use std::collections::BTreeMap;

use crate::model::{Question, QuizScore};

/// Number of questions whose recorded answer matches exactly.
///
/// `answers` is keyed by question index; indices with no entry are unanswered.
#[must_use]
pub fn count_correct(questions: &[Question], answers: &BTreeMap<usize, String>) -> usize {
    questions
        .iter()
        .enumerate()
        .filter(|(idx, q)| answers.get(idx).is_some_and(|a| q.is_correct(a)))
        .count()
}

/// `round(correct / total * 100)` for the given answers.
///
/// Returns `None` for an empty question list.
#[must_use]
pub fn score_answers(questions: &[Question], answers: &BTreeMap<usize, String>) -> Option<QuizScore> {
    QuizScore::from_ratio(count_correct(questions, answers), questions.len())
}
