pub mod answer_service;
pub mod document_processor;
pub mod error;
pub mod gemini_service;
pub mod pdf_source;
pub mod session;

pub use answer_service::AnswerService;
pub use document_processor::{derive_title, ExtractedDocument, PdfTextExtractor, TextExtractor};
pub use error::{DocmuseError, Result};
pub use gemini_service::{build_prompt, ChatCompleter, GeminiService};
pub use pdf_source::{validate_pdf_url, DocumentFetcher, HttpFetcher};
pub use session::{SessionStore, DEFAULT_SESSION};
