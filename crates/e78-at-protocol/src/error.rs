//! Error types for the AT protocol.

use thiserror::Error;

/// Errors that can occur when building commands or parsing replies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// EUI string has the wrong length.
    #[error("invalid EUI: expected {expected} hex characters, got {actual}")]
    InvalidEuiLength {
        /// Required number of hex characters.
        expected: usize,
        /// Actual number of characters received.
        actual: usize,
    },

    /// Application key string has the wrong length.
    #[error("invalid application key: expected {expected} hex characters, got {actual}")]
    InvalidKeyLength {
        /// Required number of hex characters.
        expected: usize,
        /// Actual number of characters received.
        actual: usize,
    },

    /// A hex-string field contains a non-hex character.
    #[error("invalid hex digit in {field}")]
    InvalidHexDigit {
        /// Which field was malformed.
        field: &'static str,
    },

    /// Upstream application port outside the valid range.
    #[error("invalid application port {0}: must be 0-223")]
    PortOutOfRange(u8),

    /// Confirmed-uplink trial count outside the valid range.
    #[error("invalid trial count {0}: must be 0-15")]
    TrialCountOutOfRange(u8),

    /// A reply line did not have the expected shape.
    #[error("malformed {expected} reply: {line:?}")]
    MalformedReply {
        /// What kind of reply was being parsed.
        expected: &'static str,
        /// The offending line.
        line: String,
    },

    /// The modem reported a status code outside the documented set.
    #[error("unknown device status code {0}")]
    UnknownStatusCode(u8),
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
