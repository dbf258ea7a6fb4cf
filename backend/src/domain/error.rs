//! Transport-agnostic error payload.
//!
//! Inbound adapters decide the HTTP status from the code; the wire body is
//! always just `{"message": ...}`, matching the public contract.

use serde::Serialize;
use utoipa::ToSchema;

/// Stable machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The requested resource does not exist.
    NotFound,
    /// A storage backend failed.
    InternalError,
}

/// Error payload returned to clients.
///
/// The code never reaches the wire; it only drives status mapping in the
/// HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Error {
    #[serde(skip)]
    code: ErrorCode,
    #[schema(example = "User not found")]
    message: String,
}

impl Error {
    /// Create a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to clients.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_stays_off_the_wire() {
        let err = Error::not_found("User not found");
        let value = serde_json::to_value(&err).expect("serialisable");
        assert_eq!(value, serde_json::json!({ "message": "User not found" }));
    }

    #[test]
    fn constructors_tag_the_code() {
        assert_eq!(Error::invalid_request("x").code(), ErrorCode::InvalidRequest);
        assert_eq!(Error::not_found("x").code(), ErrorCode::NotFound);
        assert_eq!(Error::internal("x").code(), ErrorCode::InternalError);
    }
}
