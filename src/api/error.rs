use thiserror::Error;

/// Maximum number of error body characters shown in messages.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("unable to reach the server: {0}")]
    Network(#[source] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    /// Non-success HTTP status; `body` is kept exactly as received.
    #[error("request failed ({status}): {}", sanitize_body(.body))]
    Http { status: u16, body: String },
    /// The backend answered with a failure envelope, e.g. a validation message.
    #[error("{message}")]
    Rejected { code: i64, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }
}

/// Trims and truncates an error body for display.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
