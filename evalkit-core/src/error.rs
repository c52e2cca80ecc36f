use crate::Error;

/// Unique constraint failed.
pub const UNIQUE_CONSTRAINT_FAILED: &str = "P2002";
/// Foreign key constraint failed.
pub const FOREIGN_KEY_CONSTRAINT_FAILED: &str = "P2003";
/// Null constraint violation.
pub const NULL_CONSTRAINT_VIOLATION: &str = "P2011";
/// An operation failed because it depends on a record that was not found.
pub const RECORD_NOT_FOUND: &str = "P2025";
/// Transaction API error, for example an expired interactive transaction.
pub const TRANSACTION_API_ERROR: &str = "P2028";

/// Error taxonomy of the client.
///
/// Carried inside [`anyhow::Error`] like every other failure of the crate,
/// [`ClientError::of`] recovers it even after context was attached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The engine rejected the request for a known reason.
    #[error("{message} (code {code})")]
    KnownRequest { code: &'static str, message: String },
    /// The engine rejected the request for a reason without a code.
    #[error("{0}")]
    UnknownRequest(String),
    /// The engine failed and cannot serve further requests.
    #[error("Engine panic: {0}")]
    EnginePanic(String),
    /// The engine could not be reached or opened.
    #[error("Initialization failed: {0}")]
    Initialization(String),
    /// The request was rejected by the client before reaching the engine.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl ClientError {
    pub fn known(code: &'static str, message: impl Into<String>) -> Self {
        ClientError::KnownRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(model: &str) -> Self {
        Self::known(
            RECORD_NOT_FOUND,
            format!("No `{}` record was found for the operation", model),
        )
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            ClientError::KnownRequest { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The taxonomy entry carried by `error`, if any.
    pub fn of(error: &Error) -> Option<&ClientError> {
        error.downcast_ref::<ClientError>()
    }
}

/// Known request code carried by `error`, if any.
pub fn error_code(error: &Error) -> Option<&'static str> {
    ClientError::of(error).and_then(ClientError::code)
}
