use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A single failed form field, reported before anything is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// Non-2xx response. `body` is the parsed JSON error body (or `Null`) so
    /// callers can read domain metadata that rides along with the failure.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not authenticated: {0}")]
    Unauthorized(String),
}

impl DomainError {
    /// Build an `Api` error from a status and whatever body came back.
    /// The backend uses `error` on most routes and `message` on auth routes.
    pub fn from_response(status: u16, body: Value) -> Self {
        let message = error_message(&body).unwrap_or_else(|| format!("HTTP error! status: {status}"));
        DomainError::Api {
            status,
            message,
            body,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DomainError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            DomainError::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_)) || self.status() == Some(404)
    }
}

/// Pull the human-readable message out of an error body, if there is one.
pub fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(String::from)
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::InvalidInput(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_prefers_error_field() {
        let err = DomainError::from_response(400, json!({"success": false, "error": "Trade not found"}));
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("Trade not found"));
    }

    #[test]
    fn api_error_falls_back_to_message_then_status() {
        let err = DomainError::from_response(401, json!({"message": "Invalid email or password"}));
        assert!(err.to_string().contains("Invalid email or password"));

        let err = DomainError::from_response(502, Value::Null);
        assert!(err.to_string().contains("HTTP error! status: 502"));
    }

    #[test]
    fn validation_lists_every_field() {
        let err = DomainError::Validation(vec![
            FieldError::new("date", "Date is required"),
            FieldError::new("ticker_symbol", "Ticker symbol is required"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("date: Date is required"));
        assert!(msg.contains("ticker_symbol"));
    }
}
