use std::collections::BTreeMap;
use std::fmt;

use course_core::model::{Question, QuizId, QuizScore, round_percent};
use course_core::scoring;

use crate::error::QuizError;
use crate::fallback::ContentSource;

//
// ─── PHASE / OUTCOMES ──────────────────────────────────────────────────────────
//

/// Macro-state of a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    InProgress { index: usize },
    Submitted { score: QuizScore },
}

/// Result of `QuizSession::advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the question at `index`.
    Moved { index: usize },
    /// The last question was passed and the quiz was scored just now.
    Submitted { score: QuizScore },
    /// The quiz was already submitted; the stored score is unchanged.
    AlreadySubmitted { score: QuizScore },
}

impl AdvanceOutcome {
    /// True only for the transition that produced the score.
    #[must_use]
    pub fn newly_submitted(self) -> Option<QuizScore> {
        match self {
            Self::Submitted { score } => Some(score),
            _ => None,
        }
    }
}

/// "Question N of M" position for a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizPosition {
    /// 1-based question number.
    pub number: usize,
    pub total: usize,
    pub percent: u8,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory attempt at one quiz.
///
/// Owns navigation, answer capture and scoring. Has no persistence of its own;
/// `QuizLoopService` hands the score to the completion recorder.
pub struct QuizSession {
    quiz_id: QuizId,
    questions: Vec<Question>,
    source: ContentSource,
    current: usize,
    answers: BTreeMap<usize, String>,
    score: Option<QuizScore>,
    strict_options: bool,
}

impl QuizSession {
    /// Start an attempt at the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotFound` if `questions` is empty.
    pub fn new(
        quiz_id: QuizId,
        questions: Vec<Question>,
        source: ContentSource,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NotFound { quiz_id });
        }

        Ok(Self {
            quiz_id,
            questions,
            source,
            current: 0,
            answers: BTreeMap::new(),
            score: None,
            strict_options: false,
        })
    }

    /// Reject answers that are not one of the current question's options.
    ///
    /// Off by default: any string is recorded as-is.
    #[must_use]
    pub fn with_strict_options(mut self, strict: bool) -> Self {
        self.strict_options = strict;
        self
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn source(&self) -> ContentSource {
        self.source
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match self.score {
            Some(score) => QuizPhase::Submitted { score },
            None => QuizPhase::InProgress {
                index: self.current,
            },
        }
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.score.is_some()
    }

    #[must_use]
    pub fn score(&self) -> Option<QuizScore> {
        self.score
    }

    /// Recorded answers keyed by question index.
    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question being answered; `None` once submitted.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_submitted() {
            return None;
        }
        self.questions.get(self.current)
    }

    /// The option chosen for the current question, if any.
    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.answers.get(&self.current).map(String::as_str)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn position(&self) -> QuizPosition {
        let number = self.current + 1;
        let total = self.questions.len();
        let percent = u8::try_from(round_percent(number as u128, total as u128)).unwrap_or(100);
        QuizPosition {
            number,
            total,
            percent,
        }
    }

    /// Record `option` for the current question, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Submitted` after submission, and
    /// `QuizError::InvalidOption` in strict mode when `option` is not offered.
    pub fn select_answer(&mut self, option: impl Into<String>) -> Result<(), QuizError> {
        if self.is_submitted() {
            return Err(QuizError::Submitted);
        }
        let option = option.into();
        if self.strict_options && !self.questions[self.current].has_option(&option) {
            return Err(QuizError::InvalidOption { option });
        }
        self.answers.insert(self.current, option);
        Ok(())
    }

    /// Move to the next question, or score the quiz when on the last one.
    ///
    /// Once submitted this is a no-op that reports the stored score.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if let Some(score) = self.score {
            return AdvanceOutcome::AlreadySubmitted { score };
        }

        if !self.is_last_question() {
            self.current += 1;
            return AdvanceOutcome::Moved {
                index: self.current,
            };
        }

        // `questions` is non-empty, so a score always exists.
        let score = scoring::score_answers(&self.questions, &self.answers).unwrap_or(QuizScore::MIN);
        self.score = Some(score);
        AdvanceOutcome::Submitted { score }
    }

    /// Step back one question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Submitted` after submission and
    /// `QuizError::AtFirstQuestion` on the first question.
    pub fn retreat(&mut self) -> Result<usize, QuizError> {
        if self.is_submitted() {
            return Err(QuizError::Submitted);
        }
        if self.current == 0 {
            return Err(QuizError::AtFirstQuestion);
        }
        self.current -= 1;
        Ok(self.current)
    }

    /// Start a retake: clear answers and score, go back to the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitted` while the attempt is still in progress.
    pub fn reset(&mut self) -> Result<(), QuizError> {
        if !self.is_submitted() {
            return Err(QuizError::NotSubmitted);
        }
        self.answers.clear();
        self.current = 0;
        self.score = None;
        Ok(())
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz_id)
            .field("questions_len", &self.questions.len())
            .field("source", &self.source)
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::QuestionId;

    fn build_question(id: usize, correct: &str) -> Question {
        Question::new(
            QuestionId::new(id.to_string()).unwrap(),
            format!("Q{id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
        )
        .unwrap()
    }

    fn build_session(n: usize) -> QuizSession {
        let questions = (0..n).map(|i| build_question(i, "a")).collect();
        QuizSession::new(QuizId::new("q1").unwrap(), questions, ContentSource::Stored).unwrap()
    }

    fn answer_all(session: &mut QuizSession, picks: &[&str]) -> AdvanceOutcome {
        let mut last = None;
        for pick in picks {
            session.select_answer(*pick).unwrap();
            last = Some(session.advance());
        }
        last.unwrap()
    }

    #[test]
    fn empty_session_is_not_found() {
        let err = QuizSession::new(QuizId::new("q1").unwrap(), Vec::new(), ContentSource::Stored)
            .unwrap_err();
        assert!(matches!(err, QuizError::NotFound { .. }));
    }

    #[test]
    fn two_of_four_correct_scores_fifty() {
        let mut session = build_session(4);
        let outcome = answer_all(&mut session, &["a", "b", "a", "c"]);
        assert_eq!(outcome, AdvanceOutcome::Submitted {
            score: QuizScore::new(50).unwrap()
        });
        assert_eq!(session.phase(), QuizPhase::Submitted {
            score: QuizScore::new(50).unwrap()
        });
        assert!(session.current_question().is_none());
    }

    #[test]
    fn advance_after_submit_keeps_score() {
        let mut session = build_session(2);
        answer_all(&mut session, &["a", "a"]);
        let score = session.score().unwrap();
        assert_eq!(session.advance(), AdvanceOutcome::AlreadySubmitted { score });
        assert_eq!(session.advance().newly_submitted(), None);
        assert_eq!(session.score(), Some(score));
    }

    #[test]
    fn selecting_again_overwrites_previous_choice() {
        let mut session = build_session(1);
        session.select_answer("b").unwrap();
        session.select_answer("a").unwrap();
        assert_eq!(session.selected_answer(), Some("a"));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.advance().newly_submitted(), Some(QuizScore::MAX));
    }

    #[test]
    fn unanswered_questions_are_wrong() {
        let mut session = build_session(3);
        session.advance();
        session.select_answer("a").unwrap();
        session.advance();
        let outcome = session.advance();
        assert_eq!(outcome.newly_submitted(), Some(QuizScore::new(33).unwrap()));
    }

    #[test]
    fn retreat_is_rejected_on_first_question() {
        let mut session = build_session(3);
        assert!(matches!(session.retreat(), Err(QuizError::AtFirstQuestion)));
        session.advance();
        session.advance();
        assert_eq!(session.retreat().unwrap(), 1);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn navigation_keeps_answers_per_question() {
        let mut session = build_session(2);
        session.select_answer("c").unwrap();
        session.advance();
        assert_eq!(session.selected_answer(), None);
        session.retreat().unwrap();
        assert_eq!(session.selected_answer(), Some("c"));
    }

    #[test]
    fn reset_returns_to_first_question_with_no_answers() {
        let mut session = build_session(3);
        answer_all(&mut session, &["a", "a", "a"]);
        session.reset().unwrap();

        assert_eq!(session.phase(), QuizPhase::InProgress { index: 0 });
        assert!(session.answers().is_empty());
        assert_eq!(session.score(), None);
    }

    #[test]
    fn reset_requires_submission() {
        let mut session = build_session(2);
        assert!(matches!(session.reset(), Err(QuizError::NotSubmitted)));
    }

    #[test]
    fn submitted_session_rejects_edits() {
        let mut session = build_session(1);
        session.advance();
        assert!(matches!(session.select_answer("a"), Err(QuizError::Submitted)));
        assert!(matches!(session.retreat(), Err(QuizError::Submitted)));
    }

    #[test]
    fn permissive_mode_records_unknown_options() {
        let mut session = build_session(1);
        session.select_answer("not offered").unwrap();
        assert_eq!(session.selected_answer(), Some("not offered"));
    }

    #[test]
    fn strict_mode_rejects_unknown_options() {
        let mut session = build_session(1).with_strict_options(true);
        let err = session.select_answer("A").unwrap_err();
        assert!(matches!(err, QuizError::InvalidOption { option } if option == "A"));
        assert!(session.answers().is_empty());
        session.select_answer("a").unwrap();
    }

    #[test]
    fn position_reports_percent_complete() {
        let mut session = build_session(3);
        assert_eq!(session.position(), QuizPosition {
            number: 1,
            total: 3,
            percent: 33
        });
        session.advance();
        assert_eq!(session.position().percent, 67);
        session.advance();
        assert!(session.is_last_question());
        assert_eq!(session.position().percent, 100);
    }
}
