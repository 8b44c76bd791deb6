use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Resolves a bare extension (`"pdf"`, `".DOCX"`). Legacy `.doc` is routed
    /// to the DOCX parser.
    pub fn from_extension(ext: &str) -> AppResult<Self> {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" | "doc" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            "" => Err(AppError::UnsupportedFormat(
                "file has no extension; expected .pdf, .docx or .txt".to_string(),
            )),
            other => Err(AppError::UnsupportedFormat(format!(
                ".{other} is not supported; expected .pdf, .docx or .txt"
            ))),
        }
    }

    pub fn from_filename(filename: &str) -> AppResult<Self> {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }
}

/// How errors name a document: `document 2 (b.txt)`. `index` is 1-based.
pub fn document_label(index: usize, filename: &str) -> String {
    format!("document {index} ({filename})")
}

/// An uploaded document, as received.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub raw_bytes: Vec<u8>,
    pub format: DocumentFormat,
}

impl Document {
    pub fn new(filename: impl Into<String>, raw_bytes: Vec<u8>) -> AppResult<Self> {
        let filename = filename.into();
        let format = DocumentFormat::from_filename(&filename)?;
        Ok(Self {
            filename,
            raw_bytes,
            format,
        })
    }
}

/// Document text with `\n`-only line endings and no outer whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
        Self(unified.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn line_count(&self) -> usize {
        if self.0.is_empty() {
            0
        } else {
            self.0.lines().count()
        }
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_line_endings_and_trims() {
        let text = NormalizedText::new("  \r\nfirst\r\nsecond\rthird\n\n ");
        assert_eq!(text.as_str(), "first\nsecond\nthird");
        assert_eq!(text.line_count(), 3);
    }

    #[test]
    fn resolves_extensions_case_insensitively() {
        assert_eq!(DocumentFormat::from_filename("Report.PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_filename("memo.doc").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_extension(".txt").unwrap(), DocumentFormat::Txt);
    }

    #[test]
    fn rejects_unknown_and_missing_extensions() {
        let err = DocumentFormat::from_filename("table.csv").unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_FORMAT");
        let err = DocumentFormat::from_filename("README").unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_FORMAT");
    }
}
