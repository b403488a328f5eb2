//! Error types for RecFile containers.

use recfile_codec::CodecError;
use thiserror::Error;

/// Result type for container operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while writing or reading a container.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] recfile_storage::StorageError),

    /// Record codec error.
    ///
    /// Schema errors raised by the codec are lifted to
    /// [`CoreError::InvalidSchema`] and [`CoreError::SchemaMismatch`].
    #[error("codec error: {0}")]
    Codec(CodecError),

    /// A schema description is malformed.
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// Description of the problem.
        message: String,
    },

    /// A record or projection does not fit the container schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the mismatch.
        message: String,
    },

    /// The reader has no more records.
    #[error("end of stream")]
    EndOfStream,

    /// The writer was already closed.
    #[error("writer is closed")]
    WriterClosed,

    /// A storage error interrupted an earlier write, so the container
    /// cannot be completed.
    #[error("writer failed after a storage error")]
    WriterFailed,

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },

    /// The bytes are not a valid container.
    #[error("invalid container format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// Checksum mismatch detected.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the container.
        expected: u32,
        /// Checksum computed over the bytes read.
        actual: u32,
    },

    /// The container has no valid end frame.
    #[error("truncated container: {message}")]
    Truncated {
        /// Description of what is missing.
        message: String,
    },

    /// An encoded record exceeds the configured maximum.
    #[error("record of {size} bytes exceeds the maximum of {max} bytes")]
    RecordTooLarge {
        /// Encoded payload size.
        size: u64,
        /// Configured maximum.
        max: u64,
    },
}

impl CoreError {
    /// Creates a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a truncation error.
    pub fn truncated(message: impl Into<String>) -> Self {
        Self::Truncated {
            message: message.into(),
        }
    }

    /// Returns `true` for [`CoreError::SchemaMismatch`].
    #[must_use]
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }

    /// Returns `true` for [`CoreError::EndOfStream`].
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    /// Returns `true` if the error indicates a damaged container.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. } | Self::ChecksumMismatch { .. } | Self::Truncated { .. }
        )
    }
}

impl From<CodecError> for CoreError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidSchema { message } => Self::InvalidSchema { message },
            CodecError::SchemaMismatch { message } => Self::SchemaMismatch { message },
            other => Self::Codec(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_schema_errors_are_lifted() {
        let err = CoreError::from(CodecError::schema_mismatch("missing `x`"));
        assert!(err.is_schema_mismatch());
        assert_eq!(err.to_string(), "schema mismatch: missing `x`");

        let err = CoreError::from(CodecError::invalid_schema("no name"));
        assert!(matches!(err, CoreError::InvalidSchema { .. }));
    }

    #[test]
    fn other_codec_errors_are_wrapped() {
        let err = CoreError::from(CodecError::UnexpectedEof);
        assert!(matches!(err, CoreError::Codec(CodecError::UnexpectedEof)));
        assert!(!err.is_corruption());
    }

    #[test]
    fn error_display() {
        let err = CoreError::ChecksumMismatch {
            expected: 0x1234_5678,
            actual: 0xabcd_ef00,
        };
        assert_eq!(err.to_string(), "checksum mismatch: expected 12345678, got abcdef00");
        assert!(err.is_corruption());
        assert!(CoreError::EndOfStream.is_end_of_stream());
    }
}
