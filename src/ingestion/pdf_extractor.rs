//! PDF Text Extraction Module
//!
//! Turns the raw bytes of an uploaded rulebook into plain text using `lopdf`.
//!
//! # Behaviour
//! - Pages are visited in page order; each page's text is followed by a newline
//! - Encrypted, malformed or page-less documents yield *absent* text
//! - A panic inside the PDF library is contained and also yields absent text
//!
//! Absent text is distinct from empty text: downstream stages treat it as
//! "no usable text" and the rulebook check rejects the document.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document as PdfDocument;

use crate::core::error::{OracleError, Result};
use crate::core::session::DocumentCache;
use crate::ingestion::document::{Document, DocumentKey};

/// Text extracted from one document, or the absence marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub key: DocumentKey,
    pub text: Option<String>,
}

impl ExtractedText {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_absent(&self) -> bool {
        self.text.is_none()
    }
}

/// Extract the full text of `document`.
///
/// Never fails: every error is logged and reported as absent text.
pub fn extract(document: &Document) -> ExtractedText {
    let key = document.key();
    let bytes = document.bytes();
    let file_name = document.file_name();

    let text = match panic::catch_unwind(AssertUnwindSafe(|| extract_pages(file_name, bytes))) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(err)) => {
            log::error!("[{}] {}", err.kind(), err);
            None
        }
        Err(_) => {
            let err = OracleError::extraction(file_name, "PDF parser panicked");
            log::error!("[{}] {}", err.kind(), err);
            None
        }
    };

    if let Some(text) = &text {
        log::debug!(
            "Extracted {} chars from {}",
            text.chars().count(),
            file_name
        );
    }

    ExtractedText { key, text }
}

/// Extract through the session cache: parse only when `document`'s key is
/// not cached yet.
pub fn extract_cached<'a>(
    cache: &'a mut DocumentCache<ExtractedText>,
    document: &Document,
) -> &'a ExtractedText {
    cache.get_or_insert_with(document.key(), || extract(document))
}

fn extract_pages(file_name: &str, bytes: &[u8]) -> Result<String> {
    let pdf = PdfDocument::load_mem(bytes)
        .map_err(|e| OracleError::extraction(file_name, e.to_string()))?;

    if pdf.is_encrypted() {
        return Err(OracleError::extraction(file_name, "document is encrypted"));
    }

    let pages = pdf.get_pages();
    if pages.is_empty() {
        return Err(OracleError::extraction(file_name, "document has no pages"));
    }

    let mut text = String::new();
    for page_number in pages.keys() {
        let page_text = pdf
            .extract_text(&[*page_number])
            .map_err(|e| OracleError::extraction(file_name, format!("page {page_number}: {e}")))?;
        text.push_str(&page_text);
        text.push('\n');
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::fixtures::rulebook_pdf;

    #[test]
    fn test_extracts_every_page_in_order() {
        let bytes = rulebook_pdf(&["Setup: shuffle the deck", "Victory conditions: 10 points"]);
        let doc = Document::new("catan.pdf", bytes);

        let extracted = extract(&doc);
        let text = extracted.text().expect("text should be present");
        let setup = text.find("Setup").unwrap();
        let victory = text.find("Victory conditions").unwrap();
        assert!(setup < victory);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_garbage_bytes_are_absent() {
        let doc = Document::new("broken.pdf", b"this is not a pdf".to_vec());
        let extracted = extract(&doc);
        assert!(extracted.is_absent());
        assert_eq!(extracted.key, doc.key());
    }

    #[test]
    fn test_empty_bytes_are_absent() {
        let doc = Document::new("empty.pdf", Vec::new());
        assert!(extract(&doc).is_absent());
    }

    #[test]
    fn test_truncated_pdf_is_absent() {
        let mut bytes = rulebook_pdf(&["Turn order: clockwise"]);
        bytes.truncate(bytes.len() / 3);
        let doc = Document::new("truncated.pdf", bytes);
        assert!(extract(&doc).is_absent());
    }

    #[test]
    fn test_cached_extraction_parses_once() {
        let doc = Document::new("rules.pdf", rulebook_pdf(&["Components: 1 board"]));
        let mut cache = DocumentCache::new();

        let first = extract_cached(&mut cache, &doc).clone();
        assert_eq!(cache.len(), 1);
        let second = extract_cached(&mut cache, &doc).clone();
        assert_eq!(cache.len(), 1);
        assert_eq!(first, second);
    }
}
