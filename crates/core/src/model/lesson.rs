use thiserror::Error;
use url::Url;

use crate::model::ids::LessonId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("invalid video url: {0}")]
    InvalidVideoUrl(String),
}

/// A video lesson with optional body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: String,
    video_url: Url,
    order: u32,
    content: Option<String>,
    level: Option<String>,
}

impl Lesson {
    /// Creates a lesson, parsing the video URL.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` for a blank title and
    /// `LessonError::InvalidVideoUrl` when the URL does not parse.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        description: impl Into<String>,
        video_url: &str,
        order: u32,
        content: Option<String>,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        let video_url = Url::parse(video_url.trim())
            .map_err(|e| LessonError::InvalidVideoUrl(e.to_string()))?;

        Ok(Self {
            id,
            title,
            description: description.into(),
            video_url,
            order,
            content: content.filter(|c| !c.trim().is_empty()),
            level: None,
        })
    }

    /// Tag the lesson with a difficulty level for catalogue filtering.
    /// A blank level clears it.
    #[must_use]
    pub fn with_level(mut self, level: Option<String>) -> Self {
        self.level = level
            .map(|l| l.trim().to_owned())
            .filter(|l| !l.is_empty());
        self
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn video_url(&self) -> &Url {
        &self.video_url
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_parses_video_url() {
        let lesson = Lesson::new(
            LessonId::new("1").unwrap(),
            "Intro",
            "Basics",
            "https://www.youtube.com/embed/BXqUH86F-kA",
            1,
            Some("   ".into()),
        )
        .unwrap();

        assert_eq!(lesson.video_url().host_str(), Some("www.youtube.com"));
        assert_eq!(lesson.content(), None);
    }

    #[test]
    fn level_is_trimmed_and_blank_clears_it() {
        let lesson = Lesson::new(
            LessonId::new("2").unwrap(),
            "Variables",
            "",
            "https://example.com/v",
            2,
            None,
        )
        .unwrap();
        assert_eq!(lesson.level(), None);

        let tagged = lesson.with_level(Some(" beginner ".into()));
        assert_eq!(tagged.level(), Some("beginner"));
        assert_eq!(tagged.with_level(Some("  ".into())).level(), None);
    }

    #[test]
    fn lesson_rejects_bad_url_and_blank_title() {
        let id = LessonId::new("1").unwrap();
        assert!(matches!(
            Lesson::new(id.clone(), "Intro", "", "not a url", 1, None),
            Err(LessonError::InvalidVideoUrl(_))
        ));
        assert_eq!(
            Lesson::new(id, " ", "", "https://example.com", 1, None).unwrap_err(),
            LessonError::EmptyTitle
        );
    }
}
