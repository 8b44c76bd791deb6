//! Document comparison: extraction, line diff and narrative.

pub mod orchestrator;
pub mod summarizer;

pub use orchestrator::{ComparisonOrchestrator, ComparisonOutcome, ExtractedDocument, IDENTICAL_NARRATIVE};
pub use summarizer::{fallback_narrative, NarrativeSummarizer, SummaryRequest};
