//! Mock provider for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::core::errors::AppError;
use crate::providers::{GenerateFuture, LlmProvider};

/// A configurable response for [`MockProvider`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this text.
    Text(String),
    /// Fail with a provider error.
    Fail(MockFailure),
}

#[derive(Clone, Copy, Debug)]
pub enum MockFailure {
    Auth,
    RateLimited,
    Timeout,
    Unavailable,
}

impl MockFailure {
    fn to_error(self) -> AppError {
        match self {
            Self::Auth => AppError::ProviderAuth,
            Self::RateLimited => AppError::ProviderRateLimited,
            Self::Timeout => AppError::ProviderTimeout,
            Self::Unavailable => AppError::ProviderUnavailable("mock provider offline".to_string()),
        }
    }
}

/// Returns a fixed response, optionally after a delay, and records prompts.
pub struct MockProvider {
    response: MockResponse,
    delay: Option<Duration>,
    call_count: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(response: MockResponse) -> Self {
        Self {
            response,
            delay: None,
            call_count: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(MockResponse::Text(text.into()))
    }

    pub fn failing(failure: MockFailure) -> Self {
        Self::new(MockResponse::Fail(failure))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn record(&self, prompt: &str) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn generate<'a>(&'a self, prompt: &'a str, _max_tokens: u32, _temperature: f32) -> GenerateFuture<'a> {
        Box::pin(async move {
            self.record(prompt);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.response {
                MockResponse::Text(text) => Ok(text.clone()),
                MockResponse::Fail(failure) => Err(failure.to_error()),
            }
        })
    }
}
