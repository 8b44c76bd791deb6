//! LLM provider trait and implementations.

pub mod gemini;
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use crate::core::errors::AppResult;

pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = AppResult<String>> + Send + 'a>>;

/// A text-generation backend.
pub trait LlmProvider: Send + Sync {
    /// Short name used in logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`. Any transport, auth or quota
    /// problem is reported as one of the provider error variants.
    fn generate<'a>(&'a self, prompt: &'a str, max_tokens: u32, temperature: f32) -> GenerateFuture<'a>;
}
