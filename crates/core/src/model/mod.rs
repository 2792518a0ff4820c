mod ids;
mod lesson;
mod progress;
mod question;
mod score;

pub use ids::{LessonId, ParseIdError, QuestionId, QuizId, UserId};

pub use lesson::{Lesson, LessonError};
pub use progress::{CourseCompletion, ProgressSummary, UserProgress, compute_summary};
pub use question::{Question, QuestionError};
pub use score::{QuizScore, ResultTier, ScoreError, round_percent};
