pub mod backend;
pub mod llm_service;
pub mod tutor_backend;

pub use backend::TutoringBackend;
pub use llm_service::LlmService;
pub use tutor_backend::OpenAiTutor;
