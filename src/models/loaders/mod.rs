pub mod document_loader;

pub use document_loader::{display_name, extract_text, read_document_bytes};
