//! Session State
//!
//! Everything that lives for one run of the assistant: the loaded tomes, the
//! extraction and validation memo tables, and the RuleMaster question log.
//! Nothing here is persisted.

pub mod cache;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::validation::ValidationResult;
use crate::ingestion::{Document, DocumentKey, ExtractedText};

pub use cache::DocumentCache;

/// One answered RuleMaster question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaExchange {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

impl QaExchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    documents: Vec<Document>,
    pub extractions: DocumentCache<ExtractedText>,
    pub validations: DocumentCache<ValidationResult>,
    qa_log: Vec<QaExchange>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. Returns `false` when a document with the same key is
    /// already loaded.
    pub fn add_document(&mut self, document: Document) -> bool {
        let key = document.key();
        if self.documents.iter().any(|d| d.key() == key) {
            log::debug!("Tome {key} already loaded");
            return false;
        }
        log::info!("Loaded tome {key}");
        self.documents.push(document);
        true
    }

    /// Unload a document and forget its cached results.
    pub fn remove_document(&mut self, key: &DocumentKey) -> Option<Document> {
        let index = self.documents.iter().position(|d| &d.key() == key)?;
        self.extractions.remove(key);
        self.validations.remove(key);
        Some(self.documents.remove(index))
    }

    /// Loaded documents, in load order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The loaded documents alongside mutable access to both caches.
    pub fn documents_and_caches(
        &mut self,
    ) -> (
        &[Document],
        &mut DocumentCache<ExtractedText>,
        &mut DocumentCache<ValidationResult>,
    ) {
        (&self.documents, &mut self.extractions, &mut self.validations)
    }

    /// Documents whose cached validation result is valid, in load order.
    pub fn admitted_documents(&self) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| {
                self.validations
                    .get(&d.key())
                    .map(|v| v.is_valid)
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn qa_log(&self) -> &[QaExchange] {
        &self.qa_log
    }

    pub fn record_exchange(&mut self, exchange: QaExchange) {
        self.qa_log.push(exchange);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_documents_are_ignored() {
        let mut session = Session::new();
        assert!(session.add_document(Document::new("a.pdf", vec![1, 2])));
        assert!(!session.add_document(Document::new("a.pdf", vec![3, 4])));
        assert!(session.add_document(Document::new("a.pdf", vec![1, 2, 3])));
        assert_eq!(session.documents().len(), 2);
    }

    #[test]
    fn test_admitted_documents_follow_validation_cache() {
        let mut session = Session::new();
        let good = Document::new("good.pdf", vec![1]);
        let bad = Document::new("bad.pdf", vec![2]);
        let unchecked = Document::new("unchecked.pdf", vec![3]);
        session.validations.insert(good.key(), ValidationResult::valid("ok"));
        session.validations.insert(bad.key(), ValidationResult::invalid("nope"));
        session.add_document(good);
        session.add_document(bad);
        session.add_document(unchecked);

        let admitted: Vec<&str> = session
            .admitted_documents()
            .iter()
            .map(|d| d.file_name())
            .collect();
        assert_eq!(admitted, vec!["good.pdf"]);
    }

    #[test]
    fn test_remove_document_drops_cache_entries() {
        let mut session = Session::new();
        let doc = Document::new("a.pdf", vec![1]);
        let key = doc.key();
        session.validations.insert(key.clone(), ValidationResult::valid("ok"));
        session.add_document(doc);

        assert!(session.remove_document(&key).is_some());
        assert!(session.documents().is_empty());
        assert!(!session.validations.contains(&key));
    }

    #[test]
    fn test_qa_log_is_append_only_in_order() {
        let mut session = Session::new();
        session.record_exchange(QaExchange::new("Q1", "A1"));
        session.record_exchange(QaExchange::new("Q2", "A2"));
        let questions: Vec<&str> = session.qa_log().iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["Q1", "Q2"]);
    }
}
