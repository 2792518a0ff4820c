//! Built-in content substituted when a quiz or lesson cannot be loaded.
//!
//! Whether this is intended demo behaviour or leftover scaffolding is still
//! open, so it is an explicit strategy that callers can switch off with
//! [`DefaultContentFallback::Propagate`].

use course_core::model::{Lesson, LessonId, Question, QuestionId, QuizId};
use storage::repository::StorageError;

use crate::error::{LessonServiceError, QuizError};

const SAMPLE_VIDEO_URL: &str = "https://www.youtube.com/embed/BXqUH86F-kA";

/// What to do when stored content is missing or unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultContentFallback {
    /// Substitute built-in sample content.
    #[default]
    SampleContent,
    /// Surface `NotFound` and storage errors to the caller.
    Propagate,
}

/// Where loaded content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Stored,
    /// The store had nothing under the requested id.
    SampleFallback,
    /// The store could not be reached.
    OfflineFallback,
}

impl ContentSource {
    #[must_use]
    pub fn is_fallback(self) -> bool {
        !matches!(self, Self::Stored)
    }
}

impl DefaultContentFallback {
    /// Turn a question fetch into the list a session starts with.
    ///
    /// # Errors
    ///
    /// With `Propagate`, returns `QuizError::NotFound` for an empty quiz and
    /// `QuizError::Storage` when the fetch failed. `SampleContent` never fails.
    pub fn resolve_questions(
        self,
        quiz_id: &QuizId,
        fetched: Result<Vec<Question>, StorageError>,
    ) -> Result<(Vec<Question>, ContentSource), QuizError> {
        match (fetched, self) {
            (Ok(questions), _) if !questions.is_empty() => Ok((questions, ContentSource::Stored)),
            (Ok(_), Self::SampleContent) => {
                tracing::info!(%quiz_id, "quiz has no questions; using sample questions");
                Ok((sample_questions(), ContentSource::SampleFallback))
            }
            (Ok(_), Self::Propagate) => Err(QuizError::NotFound {
                quiz_id: quiz_id.clone(),
            }),
            (Err(error), Self::SampleContent) => {
                tracing::warn!(%quiz_id, %error, "failed to fetch quiz; using offline sample");
                Ok((offline_questions(), ContentSource::OfflineFallback))
            }
            (Err(error), Self::Propagate) => Err(error.into()),
        }
    }

    /// Turn a catalogue fetch into the lessons to list.
    ///
    /// An empty store lists the sample catalogue, mirroring the empty-quiz
    /// case; with `Propagate` it lists nothing.
    ///
    /// # Errors
    ///
    /// With `Propagate`, returns `LessonServiceError::Storage` when the fetch
    /// failed.
    pub fn resolve_catalogue(
        self,
        fetched: Result<Vec<Lesson>, StorageError>,
    ) -> Result<(Vec<Lesson>, ContentSource), LessonServiceError> {
        match (fetched, self) {
            (Ok(lessons), _) if !lessons.is_empty() => Ok((lessons, ContentSource::Stored)),
            (Ok(_), Self::SampleContent) => {
                tracing::info!("no lessons stored; using sample catalogue");
                Ok((sample_catalogue(), ContentSource::SampleFallback))
            }
            (Ok(lessons), Self::Propagate) => Ok((lessons, ContentSource::Stored)),
            (Err(error), Self::SampleContent) => {
                tracing::warn!(%error, "failed to fetch lessons; using sample catalogue");
                Ok((sample_catalogue(), ContentSource::OfflineFallback))
            }
            (Err(error), Self::Propagate) => Err(error.into()),
        }
    }

    /// Turn a lesson fetch into the lesson to display.
    ///
    /// # Errors
    ///
    /// With `Propagate`, returns `LessonServiceError::NotFound` for a missing
    /// lesson and `LessonServiceError::Storage` when the fetch failed.
    pub fn resolve_lesson(
        self,
        lesson_id: &LessonId,
        fetched: Result<Option<Lesson>, StorageError>,
    ) -> Result<(Lesson, ContentSource), LessonServiceError> {
        match (fetched, self) {
            (Ok(Some(lesson)), _) => Ok((lesson, ContentSource::Stored)),
            (Ok(None), Self::SampleContent) => {
                tracing::info!(%lesson_id, "lesson not found; using sample lesson");
                Ok((sample_lesson(lesson_id, true), ContentSource::SampleFallback))
            }
            (Ok(None), Self::Propagate) => Err(LessonServiceError::NotFound {
                lesson_id: lesson_id.clone(),
            }),
            (Err(error), Self::SampleContent) => {
                tracing::warn!(%lesson_id, %error, "failed to fetch lesson; using offline sample");
                Ok((sample_lesson(lesson_id, false), ContentSource::OfflineFallback))
            }
            (Err(error), Self::Propagate) => Err(error.into()),
        }
    }
}

fn sample(id: &str, prompt: &str, options: [&str; 4], correct: &str) -> Question {
    Question::from_persisted(
        QuestionId::new(id).expect("sample question ids are non-empty"),
        prompt.to_owned(),
        options.iter().map(|o| (*o).to_owned()).collect(),
        correct.to_owned(),
    )
}

/// The four-question JavaScript sample used when a quiz has no questions.
///
/// # Panics
///
/// Panics only if the built-in ids were blank.
#[must_use]
pub fn sample_questions() -> Vec<Question> {
    vec![
        sample(
            "1",
            "What is the correct way to declare a variable in JavaScript?",
            ["var x = 5;", "variable x = 5;", "x := 5;", "x = 5"],
            "var x = 5;",
        ),
        sample(
            "2",
            "Which of the following is NOT a JavaScript data type?",
            ["Number", "String", "Boolean", "Float"],
            "Float",
        ),
        sample(
            "3",
            "What does DOM stand for?",
            [
                "Document Object Model",
                "Data Object Model",
                "Digital Object Model",
                "Document Oriented Model",
            ],
            "Document Object Model",
        ),
        sample(
            "4",
            "What is the purpose of the console.log() function?",
            [
                "To create a log file",
                "To display output in the browser console",
                "To log server errors",
                "To create console logs for debugging",
            ],
            "To display output in the browser console",
        ),
    ]
}

/// Single-question set used when the store cannot be reached.
///
/// # Panics
///
/// Panics only if the built-in id were blank.
#[must_use]
pub fn offline_questions() -> Vec<Question> {
    vec![sample(
        "1",
        "What is JavaScript?",
        [
            "A coffee brand",
            "A programming language",
            "A markup language",
            "A database",
        ],
        "A programming language",
    )]
}

/// "Introduction to JavaScript" presented under the requested id.
///
/// # Panics
///
/// Panics only if the built-in video URL failed to parse.
#[must_use]
pub fn sample_lesson(lesson_id: &LessonId, with_content: bool) -> Lesson {
    let (description, content) = if with_content {
        (
            "Learn the basics of JavaScript programming language including syntax, variables, and basic operations.",
            Some(
                "JavaScript is a high-level, interpreted programming language. In this lesson, you will learn the fundamentals."
                    .to_owned(),
            ),
        )
    } else {
        ("Learn the basics of JavaScript programming language.", None)
    };

    Lesson::new(
        lesson_id.clone(),
        "Introduction to JavaScript",
        description,
        SAMPLE_VIDEO_URL,
        1,
        content,
    )
    .expect("sample lesson is valid")
}

/// The six-lesson JavaScript course listed when the catalogue is unavailable.
///
/// # Panics
///
/// Panics only if the built-in ids or video URL were invalid.
#[must_use]
pub fn sample_catalogue() -> Vec<Lesson> {
    [
        (
            "Introduction to JavaScript",
            "Learn the basics of JavaScript programming language",
        ),
        (
            "Variables and Data Types",
            "Understand how to declare variables and work with different data types",
        ),
        (
            "Functions in JavaScript",
            "Master function declarations, expressions, and arrow functions",
        ),
        (
            "DOM Manipulation",
            "Learn how to interact with HTML elements using JavaScript",
        ),
        (
            "Async Programming",
            "Understand promises, async/await, and asynchronous operations",
        ),
        (
            "Modern ES6+ Features",
            "Explore destructuring, spread operator, and other ES6+ features",
        ),
    ]
    .into_iter()
    .zip(1_u32..)
    .map(|((title, description), order)| {
        Lesson::new(
            LessonId::new(order.to_string()).expect("catalogue ids are non-empty"),
            title,
            description,
            SAMPLE_VIDEO_URL,
            order,
            None,
        )
        .expect("sample catalogue lessons are valid")
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> QuizId {
        QuizId::new("missing").unwrap()
    }

    #[test]
    fn samples_are_scoreable() {
        assert_eq!(sample_questions().len(), 4);
        assert!(sample_questions().iter().all(Question::is_scoreable));
        assert!(offline_questions().iter().all(Question::is_scoreable));
    }

    #[test]
    fn empty_quiz_falls_back_to_sample_set() {
        let (questions, source) = DefaultContentFallback::SampleContent
            .resolve_questions(&quiz(), Ok(Vec::new()))
            .unwrap();
        assert_eq!(questions, sample_questions());
        assert_eq!(source, ContentSource::SampleFallback);
        assert!(source.is_fallback());
    }

    #[test]
    fn fetch_failure_falls_back_to_offline_set() {
        let (questions, source) = DefaultContentFallback::SampleContent
            .resolve_questions(&quiz(), Err(StorageError::Connection("down".into())))
            .unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(source, ContentSource::OfflineFallback);
    }

    #[test]
    fn propagate_surfaces_not_found_and_storage_errors() {
        let err = DefaultContentFallback::Propagate
            .resolve_questions(&quiz(), Ok(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, QuizError::NotFound { .. }));

        let err = DefaultContentFallback::Propagate
            .resolve_questions(&quiz(), Err(StorageError::Connection("down".into())))
            .unwrap_err();
        assert!(matches!(err, QuizError::Storage(_)));
    }

    #[test]
    fn stored_questions_pass_through() {
        let stored = offline_questions();
        let (questions, source) = DefaultContentFallback::Propagate
            .resolve_questions(&quiz(), Ok(stored.clone()))
            .unwrap();
        assert_eq!(questions, stored);
        assert_eq!(source, ContentSource::Stored);
    }

    #[test]
    fn missing_lesson_uses_requested_id() {
        let id = LessonId::new("42").unwrap();
        let (lesson, source) = DefaultContentFallback::SampleContent
            .resolve_lesson(&id, Ok(None))
            .unwrap();
        assert_eq!(lesson.id(), &id);
        assert_eq!(lesson.title(), "Introduction to JavaScript");
        assert!(lesson.content().is_some());
        assert_eq!(source, ContentSource::SampleFallback);

        let (offline, source) = DefaultContentFallback::SampleContent
            .resolve_lesson(&id, Err(StorageError::Connection("down".into())))
            .unwrap();
        assert!(offline.content().is_none());
        assert_eq!(source, ContentSource::OfflineFallback);
    }

    #[test]
    fn sample_catalogue_is_six_ordered_lessons() {
        let lessons = sample_catalogue();
        let orders: Vec<_> = lessons.iter().map(Lesson::order).collect();
        assert_eq!(orders, [1, 2, 3, 4, 5, 6]);
        assert_eq!(lessons[0].title(), sample_lesson(lessons[0].id(), false).title());
    }

    #[test]
    fn catalogue_fetch_failure_lists_samples_or_propagates() {
        let (lessons, source) = DefaultContentFallback::SampleContent
            .resolve_catalogue(Err(StorageError::Connection("down".into())))
            .unwrap();
        assert_eq!(lessons.len(), 6);
        assert_eq!(source, ContentSource::OfflineFallback);

        let err = DefaultContentFallback::Propagate
            .resolve_catalogue(Err(StorageError::Connection("down".into())))
            .unwrap_err();
        assert!(matches!(err, LessonServiceError::Storage(_)));
    }

    #[test]
    fn empty_catalogue_only_falls_back_with_sample_content() {
        let (lessons, source) = DefaultContentFallback::SampleContent
            .resolve_catalogue(Ok(Vec::new()))
            .unwrap();
        assert_eq!(lessons, sample_catalogue());
        assert_eq!(source, ContentSource::SampleFallback);

        let (lessons, source) = DefaultContentFallback::Propagate
            .resolve_catalogue(Ok(Vec::new()))
            .unwrap();
        assert!(lessons.is_empty());
        assert_eq!(source, ContentSource::Stored);
    }

    #[test]
    fn propagate_reports_missing_lesson() {
        let id = LessonId::new("42").unwrap();
        let err = DefaultContentFallback::Propagate
            .resolve_lesson(&id, Ok(None))
            .unwrap_err();
        assert!(matches!(err, LessonServiceError::NotFound { .. }));
    }
}
