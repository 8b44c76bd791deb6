use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::assistant::prompts::comparison_prompt;
use crate::core::errors::{AppError, AppResult};
use crate::core::types::Change;
use crate::providers::LlmProvider;

const MAX_OUTPUT_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.3;
/// Changes listed individually in the offline narrative.
const FALLBACK_LISTED: usize = 5;

/// Inputs for one narrative. `changes` is the full, uncapped list.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub text_a: &'a str,
    pub text_b: &'a str,
    pub filename_a: &'a str,
    pub filename_b: &'a str,
    pub changes: &'a [Change],
}

/// Asks the provider for a comparison narrative and falls back to a
/// mechanical one when it cannot.
#[derive(Clone)]
pub struct NarrativeSummarizer {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl NarrativeSummarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Never fails: provider errors and timeouts produce the fallback text.
    pub async fn summarize(&self, request: &SummaryRequest<'_>) -> String {
        let change_count = request.changes.len();
        match self.request_narrative(request).await {
            Ok(text) if !text.trim().is_empty() => {
                info!(
                    provider = self.provider.name(),
                    changes = change_count,
                    "comparison narrative generated"
                );
                text.trim().to_string()
            }
            Ok(_) => format!("Found {change_count} differences between the documents."),
            Err(err) => {
                warn!(
                    provider = self.provider.name(),
                    code = err.code(),
                    retryable = err.retryable(),
                    error = %err,
                    "narrative provider failed, using fallback summary"
                );
                fallback_narrative(request.changes)
            }
        }
    }

    async fn request_narrative(&self, request: &SummaryRequest<'_>) -> AppResult<String> {
        let prompt = comparison_prompt(
            request.text_a,
            request.text_b,
            request.filename_a,
            request.filename_b,
            request.changes.len(),
        );
        tokio::time::timeout(
            self.timeout,
            self.provider.generate(&prompt, MAX_OUTPUT_TOKENS, TEMPERATURE),
        )
        .await
        .map_err(|_| AppError::ProviderTimeout)?
    }
}

/// Mechanical narrative built only from the change list.
pub fn fallback_narrative(changes: &[Change]) -> String {
    let mut summary = format!("Found {} differences:\n", changes.len());
    for change in changes.iter().take(FALLBACK_LISTED) {
        summary.push_str(&format!("• {}: {}\n", change.kind.as_str(), change.description));
    }
    if changes.len() > FALLBACK_LISTED {
        summary.push_str(&format!(
            "... and {} more changes",
            changes.len() - FALLBACK_LISTED
        ));
    }
    summary
}
