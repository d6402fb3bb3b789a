pub mod session_ctx;
pub mod study_flow;

pub use session_ctx::{Achievement, AnswerOutcome, Rank, Session, XP_REWARD};
pub use study_flow::{QuizResult, StudyFlow, DEFAULT_TOPIC};
