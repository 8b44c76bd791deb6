use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::ser::SerializeStruct;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("empty document: {0}")]
    EmptyDocument(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("provider auth failed")]
    ProviderAuth,
    #[error("provider rate limited")]
    ProviderRateLimited,
    #[error("provider timeout")]
    ProviderTimeout,
    #[error("provider invalid response: {0}")]
    ProviderInvalidResponse(String),
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ExtractionFailed(_) => "EXTRACTION_FAILED",
            Self::EmptyDocument(_) => "EMPTY_DOCUMENT",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::ProviderAuth => "PROVIDER_AUTH",
            Self::ProviderRateLimited => "PROVIDER_RATE_LIMITED",
            Self::ProviderTimeout => "PROVIDER_TIMEOUT",
            Self::ProviderInvalidResponse(_) => "PROVIDER_INVALID_RESPONSE",
            Self::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderRateLimited | Self::ProviderTimeout | Self::Network(_)
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedFormat(_)
            | Self::ExtractionFailed(_)
            | Self::EmptyDocument(_)
            | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Prefix the message with the document it concerns, keeping the variant.
    pub fn for_document(self, label: &str) -> Self {
        match self {
            Self::UnsupportedFormat(msg) => Self::UnsupportedFormat(format!("{label}: {msg}")),
            Self::ExtractionFailed(msg) => Self::ExtractionFailed(format!("{label}: {msg}")),
            Self::EmptyDocument(msg) => Self::EmptyDocument(format!("{label}: {msg}")),
            Self::InvalidInput(msg) => Self::InvalidInput(format!("{label}: {msg}")),
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), axum::Json(self)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(value: axum::extract::multipart::MultipartError) -> Self {
        Self::InvalidInput(format!("multipart: {}", value.body_text()))
    }
}

impl From<axum::extract::multipart::MultipartRejection> for AppError {
    fn from(value: axum::extract::multipart::MultipartRejection) -> Self {
        Self::InvalidInput(format!("multipart: {}", value.body_text()))
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(value: axum::extract::rejection::JsonRejection) -> Self {
        Self::InvalidInput(format!("json body: {}", value.body_text()))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {value}"))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(
            AppError::UnsupportedFormat("csv".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::EmptyDocument("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::ProviderAuth.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn document_label_is_prefixed() {
        let err = AppError::ExtractionFailed("bad bytes".into()).for_document("document 2 (b.txt)");
        assert_eq!(err.code(), "EXTRACTION_FAILED");
        assert_eq!(err.to_string(), "extraction failed: document 2 (b.txt): bad bytes");
    }

    #[test]
    fn serializes_code_and_message() {
        let value = serde_json::to_value(AppError::NotFound("doc".into())).expect("serialize");
        assert_eq!(value["code"], "NOT_FOUND");
        assert_eq!(value["message"], "not found: doc");
    }
}
