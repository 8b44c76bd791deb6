//! Single-document operations over stored text: ask, summarize, suggest, explain.

pub mod prompts;

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::core::errors::{AppError, AppResult};
use crate::providers::LlmProvider;
use crate::session::{DocumentRecord, SessionStore};

const DEFAULT_SUGGESTIONS: [&str; 3] = [
    "What are the main topics?",
    "Any important dates?",
    "What are the key requirements?",
];
const MAX_SUGGESTIONS: usize = 3;

#[derive(Clone)]
pub struct DocumentAssistant {
    provider: Arc<dyn LlmProvider>,
    sessions: Arc<dyn SessionStore>,
    timeout: Duration,
}

impl DocumentAssistant {
    pub fn new(provider: Arc<dyn LlmProvider>, sessions: Arc<dyn SessionStore>, timeout: Duration) -> Self {
        Self {
            provider,
            sessions,
            timeout,
        }
    }

    pub fn document(&self, document_id: &str) -> AppResult<DocumentRecord> {
        self.sessions.get(document_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "document {document_id}; upload it before asking about it"
            ))
        })
    }

    pub async fn ask(&self, document_id: &str, question: &str) -> AppResult<String> {
        if question.trim().is_empty() {
            return Err(AppError::InvalidInput("question cannot be empty".to_string()));
        }
        let record = self.document(document_id)?;
        let prompt = prompts::ask_prompt(question.trim(), record.text.as_str());
        Ok(match self.generate(&prompt, 512, 0.7).await {
            Ok(answer) => answer,
            Err(err) => {
                warn!(code = err.code(), error = %err, "ask fell back to error text");
                format!("[Gemini error] {err}")
            }
        })
    }

    pub async fn summarize(&self, document_id: &str) -> AppResult<String> {
        let record = self.document(document_id)?;
        let prompt = prompts::summary_prompt(record.text.as_str());
        Ok(match self.generate(&prompt, 256, 0.3).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(code = err.code(), error = %err, "summary fell back to error text");
                format!("[Gemini error] {err}")
            }
        })
    }

    pub async fn suggest_questions(&self, document_id: &str) -> AppResult<Vec<String>> {
        let record = self.document(document_id)?;
        let prompt = prompts::suggestions_prompt(record.text.as_str());
        let suggestions = match self.generate(&prompt, 200, 0.5).await {
            Ok(text) => parse_suggestions(&text),
            Err(err) => {
                warn!(code = err.code(), error = %err, "suggestions fell back to defaults");
                Vec::new()
            }
        };
        if suggestions.is_empty() {
            return Ok(DEFAULT_SUGGESTIONS.iter().map(ToString::to_string).collect());
        }
        Ok(suggestions)
    }

    pub async fn explain(&self, selection: &str, document_id: Option<&str>) -> AppResult<String> {
        if selection.trim().is_empty() {
            return Err(AppError::InvalidInput("text to explain cannot be empty".to_string()));
        }
        let context = match document_id {
            Some(id) => Some(self.document(id)?),
            None => None,
        };
        let prompt = prompts::explain_prompt(
            selection.trim(),
            context.as_ref().map(|record| record.text.as_str()),
        );
        Ok(match self.generate(&prompt, 300, 0.3).await {
            Ok(explanation) => explanation,
            Err(err) => {
                warn!(code = err.code(), error = %err, "explain fell back to error text");
                format!("Explanation unavailable - {err}")
            }
        })
    }

    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> AppResult<String> {
        let text = tokio::time::timeout(
            self.timeout,
            self.provider.generate(prompt, max_tokens, temperature),
        )
        .await
        .map_err(|_| AppError::ProviderTimeout)??;
        Ok(text.trim().to_string())
    }
}

/// One question per non-blank line, at most three.
fn parse_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::NormalizedText;
    use crate::providers::mock::{MockFailure, MockProvider};
    use crate::session::InMemorySessionStore;

    fn assistant_with(provider: MockProvider) -> (DocumentAssistant, String, Arc<MockProvider>) {
        let sessions = Arc::new(InMemorySessionStore::default());
        let record = DocumentRecord::new(
            "policy.txt",
            b"Deadline is Friday.",
            NormalizedText::new("Deadline is Friday."),
        );
        let id = record.id.clone();
        sessions.put(record);
        let provider = Arc::new(provider);
        (
            DocumentAssistant::new(provider.clone(), sessions, Duration::from_secs(5)),
            id,
            provider,
        )
    }

    #[tokio::test]
    async fn ask_includes_document_context() {
        let (assistant, id, provider) = assistant_with(MockProvider::text(" Friday. "));
        let answer = assistant.ask(&id, "When is the deadline?").await.expect("answer");
        assert_eq!(answer, "Friday.");
        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("Deadline is Friday."));
        assert!(prompt.contains("Question: When is the deadline?"));
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let (assistant, _, _) = assistant_with(MockProvider::text("unused"));
        let err = assistant.summarize("missing").await.expect_err("not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn provider_errors_become_text() {
        let (assistant, id, _) = assistant_with(MockProvider::failing(MockFailure::Auth));
        let answer = assistant.ask(&id, "Anything?").await.expect("answer");
        assert_eq!(answer, "[Gemini error] provider auth failed");
        let explanation = assistant.explain("SLA", None).await.expect("explanation");
        assert!(explanation.starts_with("Explanation unavailable - "));
    }

    #[tokio::test]
    async fn suggestions_are_parsed_and_capped() {
        let (assistant, id, _) =
            assistant_with(MockProvider::text("Q1?\n\n  Q2?\nQ3?\nQ4?"));
        let suggestions = assistant.suggest_questions(&id).await.expect("suggestions");
        assert_eq!(suggestions, vec!["Q1?", "Q2?", "Q3?"]);
    }

    #[tokio::test]
    async fn suggestions_default_when_provider_fails() {
        let (assistant, id, _) = assistant_with(MockProvider::failing(MockFailure::Timeout));
        let suggestions = assistant.suggest_questions(&id).await.expect("suggestions");
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0], DEFAULT_SUGGESTIONS[0]);
    }

    #[tokio::test]
    async fn blank_question_is_invalid() {
        let (assistant, id, _) = assistant_with(MockProvider::text("unused"));
        let err = assistant.ask(&id, "   ").await.expect_err("invalid");
        assert_eq!(err.code(), "INVALID_INPUT");
    }
}
