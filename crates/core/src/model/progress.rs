use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::{LessonId, QuizId, UserId};
use crate::model::score::{QuizScore, round_percent};

//
// ─── USER PROGRESS ─────────────────────────────────────────────────────────────
//

/// Durable per-user learning record.
///
/// Lessons map to the time they were first completed; quizzes map to the most
/// recent score only (a retake overwrites the previous one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    user_id: UserId,
    completed_lessons: BTreeMap<LessonId, DateTime<Utc>>,
    quiz_scores: BTreeMap<QuizId, QuizScore>,
    streak_days: u32,
    last_updated: DateTime<Utc>,
}

impl UserProgress {
    /// An empty record, as created lazily by the first completion event.
    #[must_use]
    pub fn new(user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            completed_lessons: BTreeMap::new(),
            quiz_scores: BTreeMap::new(),
            streak_days: 0,
            last_updated: created_at,
        }
    }

    /// Rehydrate a record from persisted storage.
    #[must_use]
    pub fn from_persisted(
        user_id: UserId,
        completed_lessons: BTreeMap<LessonId, DateTime<Utc>>,
        quiz_scores: BTreeMap<QuizId, QuizScore>,
        streak_days: u32,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            completed_lessons,
            quiz_scores,
            streak_days,
            last_updated,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &BTreeMap<LessonId, DateTime<Utc>> {
        &self.completed_lessons
    }

    #[must_use]
    pub fn quiz_scores(&self) -> &BTreeMap<QuizId, QuizScore> {
        &self.quiz_scores
    }

    #[must_use]
    pub fn streak_days(&self) -> u32 {
        self.streak_days
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    #[must_use]
    pub fn is_lesson_complete(&self, lesson_id: &LessonId) -> bool {
        self.completed_lessons.contains_key(lesson_id)
    }

    #[must_use]
    pub fn quiz_score(&self, quiz_id: &QuizId) -> Option<QuizScore> {
        self.quiz_scores.get(quiz_id).copied()
    }

    /// Marks a lesson complete. Repeat calls keep the first completion time
    /// and only refresh `last_updated`.
    pub fn mark_lesson_complete(&mut self, lesson_id: LessonId, at: DateTime<Utc>) {
        self.completed_lessons.entry(lesson_id).or_insert(at);
        self.last_updated = at;
    }

    /// Stores `score` for the quiz, replacing any earlier score.
    pub fn record_quiz_score(&mut self, quiz_id: QuizId, score: QuizScore, at: DateTime<Utc>) {
        self.quiz_scores.insert(quiz_id, score);
        self.last_updated = at;
    }

    pub fn set_streak_days(&mut self, days: u32, at: DateTime<Utc>) {
        self.streak_days = days;
        self.last_updated = at;
    }

    /// Derived statistics for display.
    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        compute_summary(self)
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Display statistics derived from a `UserProgress`. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSummary {
    pub completed_lesson_count: usize,
    pub average_quiz_score: u8,
    pub quizzes_taken: usize,
    pub streak_days: u32,
}

impl ProgressSummary {
    /// Average score for display; `None` when no quiz has a positive average.
    #[must_use]
    pub fn average_quiz_score_display(&self) -> Option<QuizScore> {
        if self.average_quiz_score == 0 {
            return None;
        }
        QuizScore::new(self.average_quiz_score).ok()
    }

    /// Completed lessons measured against a fixed course catalogue size.
    #[must_use]
    pub fn course_completion(&self, total_courses: usize) -> CourseCompletion {
        CourseCompletion::new(self.completed_lesson_count, total_courses)
    }
}

/// Pure aggregation of a progress record.
///
/// The average is the rounded mean of all stored quiz scores, or 0 when the
/// user has not taken any quiz.
#[must_use]
pub fn compute_summary(progress: &UserProgress) -> ProgressSummary {
    let quizzes_taken = progress.quiz_scores.len();
    let average_quiz_score = if quizzes_taken == 0 {
        0
    } else {
        let sum: u128 = progress
            .quiz_scores
            .values()
            .map(|s| u128::from(s.value()))
            .sum();
        let count = quizzes_taken as u128;
        // Mean of values in 0..=100 stays in 0..=100.
        u8::try_from((sum * 2 + count) / (count * 2)).unwrap_or(100)
    };

    ProgressSummary {
        completed_lesson_count: progress.completed_lessons.len(),
        average_quiz_score,
        quizzes_taken,
        streak_days: progress.streak_days,
    }
}

/// "N of M courses" progress bar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseCompletion {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl CourseCompletion {
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            let capped = completed.min(total) as u128;
            u8::try_from(round_percent(capped, total as u128)).unwrap_or(100)
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}
