//! Rulebook ingestion: loaded documents and PDF text extraction.

pub mod document;
pub mod pdf_extractor;

pub use document::{is_pdf_path, Document, DocumentKey};
pub use pdf_extractor::{extract, extract_cached, ExtractedText};
