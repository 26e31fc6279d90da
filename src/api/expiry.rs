//! Detection of the backend's "session invalid" failure.
//!
//! The backend does not send a dedicated error code when a token is missing or
//! expired: its auth interceptor throws, and the server answers with a 5xx error
//! page that names the exception. We recognise that page by substring. This is a
//! known weak point: a renamed exception class or reworded message on the server
//! silently turns forced logouts into ordinary `ApiError::Http` failures.

use reqwest::StatusCode;

/// Fragments identifying a rejected session in an error body.
pub const SESSION_INVALID_SIGNATURES: &[&str] = &[
    "cn.dev33.satoken.exception.NotLoginException",
    "token 无效",
];

/// True when a failed response means the session is no longer valid.
#[must_use]
pub fn is_session_invalid(status: StatusCode, body: &str) -> bool {
    status.is_server_error()
        && SESSION_INVALID_SIGNATURES
            .iter()
            .any(|signature| body.contains(signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERROR_PAGE: &str = "<html><body><h1>Whitelabel Error Page</h1>\
        <div>There was an unexpected error (type=Internal Server Error, status=500).</div>\
        <div>cn.dev33.satoken.exception.NotLoginException: 未能读取到有效 token</div></body></html>";

    #[test]
    fn matches_exception_class_on_server_error() {
        assert!(is_session_invalid(StatusCode::INTERNAL_SERVER_ERROR, ERROR_PAGE));
    }

    #[test]
    fn matches_message_fragment() {
        assert!(is_session_invalid(
            StatusCode::INTERNAL_SERVER_ERROR,
            "token 无效：4f1c"
        ));
    }

    #[test]
    fn ignores_unrelated_server_errors() {
        assert!(!is_session_invalid(
            StatusCode::INTERNAL_SERVER_ERROR,
            "java.lang.NullPointerException"
        ));
    }

    #[test]
    fn ignores_signature_on_non_server_errors() {
        assert!(!is_session_invalid(StatusCode::UNAUTHORIZED, ERROR_PAGE));
        assert!(!is_session_invalid(StatusCode::OK, ERROR_PAGE));
    }
}
