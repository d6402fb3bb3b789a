pub mod difficulty;
pub mod document;
pub mod loaders;
pub mod quiz;

pub use difficulty::Difficulty;
pub use document::Document;
pub use loaders::{extract_text, read_document_bytes};
pub use quiz::{option_label, Quiz, QuizDefect};
