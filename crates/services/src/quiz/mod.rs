mod session;
mod workflow;

pub use session::{AdvanceOutcome, QuizPhase, QuizPosition, QuizSession};
pub use workflow::{QuizLoopService, QuizStep, RecordingHandle};
