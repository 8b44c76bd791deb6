use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Addition,
    Removal,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addition => "Addition",
            Self::Removal => "Removal",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Self::Addition => "Added",
            Self::Removal => "Removed",
        }
    }
}

/// One added or removed line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub text: String,
    pub description: String,
}

pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

impl Change {
    /// Builds a change from a raw diff line. Returns `None` for lines that are
    /// blank once trimmed.
    pub fn from_line(kind: ChangeKind, line: &str) -> Option<Self> {
        let text = line.trim();
        if text.is_empty() {
            return None;
        }
        let description = format!(
            "{}: {}...",
            kind.verb(),
            truncate_chars(text, DESCRIPTION_PREVIEW_CHARS)
        );
        Some(Self {
            kind,
            text: text.to_string(),
            description,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub narrative: String,
    pub changes: Vec<Change>,
    /// Number of changes before the response cap was applied.
    pub total_changes: usize,
    /// False when the size guard replaced the structural diff.
    pub precise: bool,
    pub source_ids: (String, String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareDocumentsResponse {
    pub comparison_summary: String,
    pub changes: Vec<Change>,
    pub document1_content: String,
    pub document2_content: String,
    pub document1_id: String,
    pub document2_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocumentResponse {
    pub document_id: String,
    pub filename: String,
    pub characters: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub document_id: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    pub document_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub text: String,
    #[serde(default)]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// First `max` characters of `text` (by `char`, not byte).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_description_truncates_to_preview_length() {
        let long = "x".repeat(250);
        let change = Change::from_line(ChangeKind::Addition, &format!("+{long}\n")[1..])
            .expect("non-empty line");
        assert_eq!(change.text.len(), 250);
        assert_eq!(change.description, format!("Added: {}...", "x".repeat(100)));
    }

    #[test]
    fn blank_lines_produce_no_change() {
        assert!(Change::from_line(ChangeKind::Removal, "   \n").is_none());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn change_serializes_kind_as_type() {
        let change = Change::from_line(ChangeKind::Removal, "line2").expect("change");
        let value = serde_json::to_value(&change).expect("serialize");
        assert_eq!(value["type"], "Removal");
        assert_eq!(value["text"], "line2");
        assert_eq!(value["description"], "Removed: line2...");
    }
}
