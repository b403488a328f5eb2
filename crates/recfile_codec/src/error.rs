//! Error types for the codec crate.

use crate::schema::FieldType;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while building schemas or encoding/decoding records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The schema description is malformed or invalid.
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// Description of the problem.
        message: String,
    },

    /// A record or projection does not match the schema it is used with.
    #[error("schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the mismatch.
        message: String,
    },

    /// A field name is not part of the record's schema.
    #[error("unknown field: {name}")]
    UnknownField {
        /// The requested field name.
        name: String,
    },

    /// A value's type does not match the declared field type.
    #[error("type mismatch on field `{field}`: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The field being accessed.
        field: String,
        /// The declared field type.
        expected: FieldType,
        /// The type that was supplied or requested.
        actual: FieldType,
    },

    /// Failed to serialize a schema description.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Invalid UTF-8 in a string field.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// A varint ran past five bytes or out of the `u32` range.
    #[error("varint overflow")]
    VarintOverflow,

    /// A length prefix exceeds the configured limit.
    #[error("size limit exceeded: claimed {claimed} bytes, max allowed {max_allowed}")]
    SizeLimitExceeded {
        /// The length claimed by the input.
        claimed: u64,
        /// The configured maximum.
        max_allowed: u64,
    },

    /// Bytes remained after the last field was decoded.
    #[error("{count} trailing bytes after record")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        count: usize,
    },
}

impl CodecError {
    /// Create an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create an unknown field error.
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField { name: name.into() }
    }

    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }
}
