//! Loaded rulebook documents ("tomes").

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Identity of a loaded document: file name plus byte size.
///
/// Two uploads with the same name and size are treated as the same tome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    pub file_name: String,
    pub byte_size: u64,
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bytes)", self.file_name, self.byte_size)
    }
}

/// An uploaded PDF. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    bytes: Vec<u8>,
    file_name: String,
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
        }
    }

    /// Read a document from disk, keeping only the file name component.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey {
            file_name: self.file_name.clone(),
            byte_size: self.byte_size(),
        }
    }
}

/// Whether `path` names a PDF file, judged by extension.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
