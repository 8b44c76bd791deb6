use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use crate::core::errors::{AppError, AppResult};
use crate::AppState;

/// Bearer-token check. With no configured token every request passes.
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    token: Option<String>,
}

impl Authorizer {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    pub fn authorize(&self, headers: &HeaderMap) -> AppResult<()> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;
        if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(AppError::Unauthorized("invalid bearer token".to_string()))
        }
    }
}

/// Token from an `Authorization` value; the scheme is matched
/// case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state.authorizer.authorize(request.headers())?;
    Ok(next.run(request).await)
}
