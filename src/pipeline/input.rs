//! Input resolution: read a transcript file and decide how to parse it.
//!
//! The whole file is read into memory once; every later stage works on the
//! byte slice. Kind detection trusts the extension first and falls back to
//! the leading magic bytes, so a transcript saved without an extension
//! still works.

use crate::error::TranscriptError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Leading bytes of every PDF.
pub const PDF_MAGIC: &[u8] = b"%PDF";
/// Leading bytes of a zip archive (and so of every `.docx`).
pub const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// How a document's tables are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Ruled-line tables through pdfium, with the OCR fallback.
    Pdf,
    /// A word-processor (`.docx`) document with native tables.
    TableDocument,
}

impl DocumentKind {
    /// Kind from a file extension, case-insensitive.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::TableDocument),
            _ => None,
        }
    }

    /// Kind from the first bytes of the content.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PDF_MAGIC) {
            Some(DocumentKind::Pdf)
        } else if bytes.starts_with(ZIP_MAGIC) {
            Some(DocumentKind::TableDocument)
        } else {
            None
        }
    }

    /// Extension first, then content.
    pub fn detect(path: &Path, bytes: &[u8]) -> Option<Self> {
        Self::from_extension(path).or_else(|| Self::sniff(bytes))
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "pdf"),
            DocumentKind::TableDocument => write!(f, "docx"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" | "table-document" | "table_document" => Ok(DocumentKind::TableDocument),
            other => Err(format!("unknown document kind '{other}' (expected pdf or docx)")),
        }
    }
}

/// Read a transcript file fully into memory.
pub fn read_document(path: &Path) -> Result<Vec<u8>, TranscriptError> {
    let path_buf = || PathBuf::from(path);

    if !path.exists() {
        return Err(TranscriptError::FileNotFound { path: path_buf() });
    }

    match std::fs::read(path) {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(TranscriptError::PermissionDenied { path: path_buf() })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TranscriptError::FileNotFound { path: path_buf() })
        }
        Err(source) => Err(TranscriptError::ReadFailed {
            path: path_buf(),
            source,
        }),
    }
}

/// Read a file and decide its kind, unless the caller already knows it.
pub fn resolve_input(
    path: &Path,
    kind: Option<DocumentKind>,
) -> Result<(Vec<u8>, DocumentKind), TranscriptError> {
    let bytes = read_document(path)?;
    let kind = match kind.or_else(|| DocumentKind::detect(path, &bytes)) {
        Some(kind) => kind,
        None => {
            return Err(TranscriptError::UnsupportedDocument {
                path: path.to_path_buf(),
            })
        }
    };
    debug!("Resolved {} as {}", path.display(), kind);
    Ok((bytes, kind))
}
