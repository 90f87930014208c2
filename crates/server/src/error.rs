use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures a handler can end in. Storage errors are logged here and
/// reach the client only as a bare 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error: {0}")]
    BadRequest(String),
    #[error("Invalid CSRF Token")]
    InvalidCsrfToken,
    #[error("Permission denied")]
    Forbidden,
    #[error("Error: redirect target not allowed")]
    RedirectRejected,
    #[error("{context}")]
    Internal {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(context: impl Into<String>, source: anyhow::Error) -> Self {
        AppError::Internal {
            context: context.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::InvalidCsrfToken | AppError::RedirectRejected => {
                StatusCode::BAD_REQUEST
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Internal { context, source } => {
                tracing::error!("Error {}: {:?}", context, source);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

/// Attaches handler context to storage failures.
pub trait ResultExt<T> {
    fn or_internal(self, context: &str) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for anyhow::Result<T> {
    fn or_internal(self, context: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::internal(context, e))
    }
}
