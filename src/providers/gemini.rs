use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::core::errors::{AppError, AppResult};
use crate::providers::{GenerateFuture, LlmProvider};

const ENDPOINT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    api_key: Option<String>,
    endpoint_base: String,
}

impl GeminiClient {
    pub fn new(model: impl Into<String>, api_key: Option<String>, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;
        Ok(Self {
            http,
            model: model.into(),
            api_key,
            endpoint_base: ENDPOINT_BASE.to_string(),
        })
    }

    /// Points the client at a different host, e.g. a local stub server.
    pub fn with_endpoint_base(mut self, base: impl Into<String>) -> Self {
        self.endpoint_base = base.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn generate_text(&self, prompt: &str, max_tokens: u32, temperature: f32) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ProviderUnavailable("GEMINI_API_KEY is not configured".to_string()))?;
        let endpoint = format!(
            "{}/{}:generateContent?key={}",
            self.endpoint_base.trim_end_matches('/'),
            self.model,
            api_key
        );
        let payload = serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": prompt}]
                }
            ],
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_tokens
            }
        });

        let response = self
            .http
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AppError::ProviderTimeout
                } else {
                    AppError::Network(err.without_url().to_string())
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AppError::ProviderAuth),
            StatusCode::TOO_MANY_REQUESTS => return Err(AppError::ProviderRateLimited),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::ProviderInvalidResponse(format!(
                    "status {status} body {body}"
                )));
            }
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        candidate_text(&body)
    }
}

impl LlmProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate<'a>(&'a self, prompt: &'a str, max_tokens: u32, temperature: f32) -> GenerateFuture<'a> {
        Box::pin(self.generate_text(prompt, max_tokens, temperature))
    }
}

/// Concatenated text parts of the first candidate, trimmed. A candidate with
/// no text parts yields an empty string.
pub fn candidate_text(body: &Value) -> AppResult<String> {
    let parts = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|items: &Vec<Value>| items.first())
        .and_then(|item: &Value| item.get("content"))
        .and_then(|content: &Value| content.get("parts"))
        .and_then(Value::as_array);

    match parts {
        Some(parts) => Ok(parts
            .iter()
            .filter_map(|part: &Value| part.get("text").and_then(Value::as_str))
            .collect::<String>()
            .trim()
            .to_string()),
        None if body.get("candidates").is_some() => Ok(String::new()),
        None => Err(AppError::ProviderInvalidResponse(
            "missing candidates in response".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_joined_candidate_text() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "  First part. "}, {"text": "Second."}]}
            }]
        });
        assert_eq!(candidate_text(&body).unwrap(), "First part. Second.");
    }

    #[test]
    fn candidate_without_parts_is_empty_text() {
        let body = serde_json::json!({"candidates": [{"finishReason": "SAFETY"}]});
        assert_eq!(candidate_text(&body).unwrap(), "");
    }

    #[test]
    fn missing_candidates_is_invalid_response() {
        let body = serde_json::json!({"error": {"message": "nope"}});
        let err = candidate_text(&body).unwrap_err();
        assert_eq!(err.code(), "PROVIDER_INVALID_RESPONSE");
    }

    use axum::http::{StatusCode as HttpStatus, Uri};
    use axum::response::{IntoResponse, Response};

    /// Answers by model name: `/{model}:generateContent`.
    async fn stub_gemini(uri: Uri) -> Response {
        let model = uri
            .path()
            .trim_start_matches('/')
            .split(':')
            .next()
            .unwrap_or_default()
            .to_string();
        match model.as_str() {
            "auth" => HttpStatus::UNAUTHORIZED.into_response(),
            "forbidden" => HttpStatus::FORBIDDEN.into_response(),
            "limited" => HttpStatus::TOO_MANY_REQUESTS.into_response(),
            "broken" => (HttpStatus::INTERNAL_SERVER_ERROR, "boom").into_response(),
            "garbled" => "not json".into_response(),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                HttpStatus::OK.into_response()
            }
            _ => axum::Json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "stub answer"}]}}]
            }))
            .into_response(),
        }
    }

    async fn stub_base() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let app = axum::Router::new().fallback(stub_gemini);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn client(base: &str, model: &str) -> GeminiClient {
        GeminiClient::new(model, Some("test-key".to_string()), Duration::from_millis(500))
            .expect("client")
            .with_endpoint_base(base)
    }

    #[tokio::test]
    async fn http_statuses_map_to_provider_errors() {
        let base = stub_base().await;
        for (model, code) in [
            ("auth", "PROVIDER_AUTH"),
            ("forbidden", "PROVIDER_AUTH"),
            ("limited", "PROVIDER_RATE_LIMITED"),
            ("broken", "PROVIDER_INVALID_RESPONSE"),
            ("garbled", "PROVIDER_INVALID_RESPONSE"),
            ("slow", "PROVIDER_TIMEOUT"),
        ] {
            let err = client(&base, model)
                .generate("hi", 10, 0.3)
                .await
                .expect_err(model);
            assert_eq!(err.code(), code, "model {model}");
        }
    }

    #[tokio::test]
    async fn successful_response_returns_candidate_text() {
        let base = stub_base().await;
        let text = client(&base, "ok").generate("hi", 10, 0.3).await.expect("text");
        assert_eq!(text, "stub answer");
    }

    #[tokio::test]
    async fn missing_key_is_provider_unavailable() {
        let client = GeminiClient::new("gemini-2.0-flash", None, Duration::from_secs(1)).unwrap();
        assert!(!client.has_credentials());
        let err = client.generate("hi", 10, 0.3).await.unwrap_err();
        assert_eq!(err.code(), "PROVIDER_UNAVAILABLE");
        assert!(!err.retryable());
    }
}
