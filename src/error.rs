//! Error types for ColKV
//!
//! Provides a unified error type for all client, transport and store operations.

use thiserror::Error;

/// Result type alias using ColError
pub type Result<T> = std::result::Result<T, ColError>;

/// Unified error type for ColKV operations
#[derive(Debug, Error)]
pub enum ColError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// Transport unreachable or handle no longer open. Never retried here.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Error reported by the remote store node
    #[error("Remote error: {0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Mapping Errors
    // -------------------------------------------------------------------------
    #[error("Unknown serializer: {0:?}")]
    UnknownSerializer(String),

    #[error("Invalid range in {operation} on {column_family}: {reason}")]
    InvalidRange {
        operation: &'static str,
        column_family: String,
        reason: String,
    },

    #[error("Unsupported {operation} on {column_family}: {reason}")]
    Unsupported {
        operation: &'static str,
        column_family: String,
        reason: String,
    },

    #[error("Encode error in {operation} on {column_family}: {reason}")]
    Encode {
        operation: &'static str,
        column_family: String,
        reason: String,
    },

    #[error("Decode error in {operation} on {column_family}, row {key}, column {column}: {reason}")]
    Decode {
        operation: &'static str,
        column_family: String,
        key: String,
        column: String,
        reason: String,
    },

    #[error("Mutation batch for keyspace {keyspace:?} already committed")]
    BatchClosed { keyspace: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for ColError {
    fn from(e: bincode::Error) -> Self {
        ColError::Serialization(e.to_string())
    }
}

/// Codec-level failure before operation context is attached.
///
/// Serializers know nothing about column families or rows; the request
/// builder and response decoder wrap this into a [`ColError`] that does.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("{tag} serializer cannot encode {found} value")]
    TypeMismatch { tag: &'static str, found: &'static str },

    #[error("{tag} serializer expects {expected} bytes, got {actual}")]
    Width {
        tag: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{tag} serializer: {reason}")]
    Invalid { tag: &'static str, reason: String },

    #[error("infer serializer cannot decode; resolve a concrete serializer for reads")]
    InferOnRead,
}

/// Operation and column family a failure belongs to
///
/// Carried through request building and response decoding so every error
/// names where it happened.
#[derive(Debug, Clone, Copy)]
pub struct OpContext<'a> {
    pub operation: &'static str,
    pub column_family: &'a str,
}

impl<'a> OpContext<'a> {
    pub fn new(operation: &'static str, column_family: &'a str) -> Self {
        Self {
            operation,
            column_family,
        }
    }

    pub fn invalid_range(&self, reason: impl Into<String>) -> ColError {
        ColError::InvalidRange {
            operation: self.operation,
            column_family: self.column_family.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(&self, reason: impl Into<String>) -> ColError {
        ColError::Unsupported {
            operation: self.operation,
            column_family: self.column_family.to_string(),
            reason: reason.into(),
        }
    }

    pub fn encode(&self, what: &str, e: CodecError) -> ColError {
        ColError::Encode {
            operation: self.operation,
            column_family: self.column_family.to_string(),
            reason: format!("{}: {}", what, e),
        }
    }

    /// Prefix a transport failure with the operation and column family
    pub fn wrap(&self, e: ColError) -> ColError {
        let prefix = |msg: String| format!("{} on {}: {}", self.operation, self.column_family, msg);
        match e {
            ColError::Connection(msg) => ColError::Connection(prefix(msg)),
            ColError::Remote(msg) => ColError::Remote(prefix(msg)),
            ColError::Protocol(msg) => ColError::Protocol(prefix(msg)),
            other => other,
        }
    }

    pub fn decode(&self, key: impl Into<String>, column: impl Into<String>, e: CodecError) -> ColError {
        if e == CodecError::InferOnRead {
            return self.unsupported(e.to_string());
        }
        ColError::Decode {
            operation: self.operation,
            column_family: self.column_family.to_string(),
            key: key.into(),
            column: column.into(),
            reason: e.to_string(),
        }
    }
}
