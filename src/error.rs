// File: ./src/error.rs
// Failures surfaced by the API client.
use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, TLS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// 401. The session has already been cleared by the time the caller sees this.
    #[error("Session expired. Please log in again.")]
    Unauthorized { message: Option<String> },

    /// Any other 4xx.
    #[error("{}", describe(.status, .message))]
    Rejected { status: u16, message: Option<String> },

    /// 5xx.
    #[error("{}", describe(.status, .message))]
    Server { status: u16, message: Option<String> },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The token could not be written to or removed from disk.
    #[error("Session storage failed: {0}")]
    Session(String),
}

fn describe(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(m) => m.clone(),
        None => format!("Request failed with status {}", status),
    }
}

// Error bodies look like `{ "message": "Email already in use" }`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Classifies a non-success status. `body` is the raw response body.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized { message };
        }
        let status = status.as_u16();
        if status >= 500 {
            ApiError::Server { status, message }
        } else {
            ApiError::Rejected { status, message }
        }
    }

    /// The message the server attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::Rejected { message, .. }
            | ApiError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Server message when present, otherwise `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

impl From<hyper_util::client::legacy::Error> for ApiError {
    fn from(e: hyper_util::client::legacy::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

impl From<hyper::Error> for ApiError {
    fn from(e: hyper::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses() {
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, b""),
            ApiError::Unauthorized { message: None }
        );
        let bad_login =
            ApiError::from_status(StatusCode::UNAUTHORIZED, br#"{"message":"Invalid credentials"}"#);
        assert!(bad_login.is_unauthorized());
        assert_eq!(bad_login.message_or("Login failed"), "Invalid credentials");
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_REQUEST, br#"{"message":"Bad title"}"#),
            ApiError::Rejected {
                status: 400,
                message: Some("Bad title".to_string())
            }
        );
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, b"<html>oops</html>"),
            ApiError::Server {
                status: 502,
                message: None
            }
        );
    }

    #[test]
    fn message_or_prefers_server_message() {
        let with = ApiError::Rejected {
            status: 409,
            message: Some("Email already in use".to_string()),
        };
        let without = ApiError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(with.message_or("Registration failed"), "Email already in use");
        assert_eq!(without.message_or("Registration failed"), "Registration failed");
        assert_eq!(
            ApiError::Network("refused".into()).message_or("Login failed"),
            "Login failed"
        );
        assert_eq!(without.to_string(), "Request failed with status 500");
    }
}
