use std::sync::Arc;

use tracing::info;

use crate::compare::summarizer::{NarrativeSummarizer, SummaryRequest};
use crate::core::errors::{AppError, AppResult};
use crate::core::types::ComparisonResult;
use crate::diff::{self, DiffOptions, DiffReport};
use crate::parser::{document_label, native_parser, Document, NormalizedText};
use crate::session::{DocumentRecord, SessionStore};

pub const IDENTICAL_NARRATIVE: &str = "The two documents are identical - no differences found.";
pub const COARSE_DIFF_NOTE: &str =
    "Documents too large to diff precisely; showing a coarse line comparison.";

/// A comparison plus the extracted texts it was computed from.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub result: ComparisonResult,
    pub text_a: NormalizedText,
    pub text_b: NormalizedText,
}

/// An extracted document ready to be compared.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub id: String,
    pub filename: String,
    pub text: NormalizedText,
}

#[derive(Clone)]
pub struct ComparisonOrchestrator {
    summarizer: NarrativeSummarizer,
    sessions: Arc<dyn SessionStore>,
    diff_options: DiffOptions,
}

impl ComparisonOrchestrator {
    pub fn new(
        summarizer: NarrativeSummarizer,
        sessions: Arc<dyn SessionStore>,
        diff_options: DiffOptions,
    ) -> Self {
        Self {
            summarizer,
            sessions,
            diff_options,
        }
    }

    /// Extracts both documents, stores their text for follow-up requests and
    /// compares them. Extraction errors name the failing document.
    pub async fn compare(&self, document_a: Document, document_b: Document) -> AppResult<ComparisonOutcome> {
        let (extracted_a, extracted_b) =
            tokio::join!(extract_blocking(document_a), extract_blocking(document_b));
        let (document_a, text_a) = extracted_a.map_err(|(name, err)| err.for_document(&document_label(1, &name)))?;
        let (document_b, text_b) = extracted_b.map_err(|(name, err)| err.for_document(&document_label(2, &name)))?;

        let a = ExtractedDocument {
            id: self.register(&document_a, &text_a),
            filename: document_a.filename,
            text: text_a,
        };
        let b = ExtractedDocument {
            id: self.register(&document_b, &text_b),
            filename: document_b.filename,
            text: text_b,
        };
        self.compare_extracted(a, b).await
    }

    /// Diff and narrative for two already-extracted texts.
    pub async fn compare_extracted(
        &self,
        a: ExtractedDocument,
        b: ExtractedDocument,
    ) -> AppResult<ComparisonOutcome> {
        let source_ids = (a.id.clone(), b.id.clone());

        if a.text == b.text {
            info!(document1 = %a.filename, document2 = %b.filename, "documents are identical");
            return Ok(identical(source_ids, a.text, b.text));
        }

        let report = {
            let text_a = a.text.clone();
            let text_b = b.text.clone();
            let options = DiffOptions {
                from_label: a.filename.clone(),
                to_label: b.filename.clone(),
                ..self.diff_options.clone()
            };
            tokio::task::spawn_blocking(move || diff::diff_with_options(&text_a, &text_b, &options)).await?
        };
        let DiffReport { changes, precise } = report;

        if changes.is_empty() {
            info!(
                document1 = %a.filename,
                document2 = %b.filename,
                "documents differ only in whitespace"
            );
            return Ok(identical(source_ids, a.text, b.text));
        }

        let narrative = self
            .summarizer
            .summarize(&SummaryRequest {
                text_a: a.text.as_str(),
                text_b: b.text.as_str(),
                filename_a: &a.filename,
                filename_b: &b.filename,
                changes: &changes,
            })
            .await;
        let narrative = if precise {
            narrative
        } else {
            format!("{COARSE_DIFF_NOTE}\n\n{narrative}")
        };

        let total_changes = changes.len();
        info!(
            document1 = %a.filename,
            document2 = %b.filename,
            total_changes,
            precise,
            "comparison complete"
        );
        Ok(ComparisonOutcome {
            result: ComparisonResult {
                narrative,
                changes: diff::cap_changes(changes),
                total_changes,
                precise,
                source_ids,
            },
            text_a: a.text,
            text_b: b.text,
        })
    }

    /// Stores the text, reusing the id of an earlier upload of the same bytes.
    pub fn register(&self, document: &Document, text: &NormalizedText) -> String {
        let record = DocumentRecord::new(document.filename.clone(), &document.raw_bytes, text.clone());
        if let Some(existing) = self.sessions.find_by_checksum(&record.checksum) {
            return existing.id;
        }
        let id = record.id.clone();
        self.sessions.put(record);
        id
    }
}

fn identical(source_ids: (String, String), text_a: NormalizedText, text_b: NormalizedText) -> ComparisonOutcome {
    ComparisonOutcome {
        result: ComparisonResult {
            narrative: IDENTICAL_NARRATIVE.to_string(),
            changes: Vec::new(),
            total_changes: 0,
            precise: true,
            source_ids,
        },
        text_a,
        text_b,
    }
}

type Extracted = Result<(Document, NormalizedText), (String, AppError)>;

/// Runs extraction on the blocking pool; errors carry the filename.
async fn extract_blocking(document: Document) -> Extracted {
    let filename = document.filename.clone();
    let joined = tokio::task::spawn_blocking(move || {
        native_parser::extract_document(&document).map(|text| (document, text))
    })
    .await;
    match joined {
        Ok(Ok(extracted)) => Ok(extracted),
        Ok(Err(err)) => Err((filename, err)),
        Err(join_err) => Err((filename, AppError::from(join_err))),
    }
}
