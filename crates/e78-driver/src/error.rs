//! Error types for the driver.

use std::io;

use e78_at_protocol::ProtocolError;
use thiserror::Error;

/// Errors reported by driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    /// UART pin numbers outside the supported range.
    #[error("invalid pin configuration: tx={tx} rx={rx} (supported range 0-34)")]
    InvalidPinConfiguration {
        /// Requested TX pin.
        tx: i32,
        /// Requested RX pin.
        rx: i32,
    },

    /// A configuration-mutating operation was attempted after joining.
    #[error("device already joined the network")]
    AlreadyJoined,

    /// A data send was attempted before joining.
    #[error("device not joined the network")]
    NotJoined,

    /// No reply matched the expected pattern within the attempt budget.
    /// The command may still have reached the modem; treat this as an
    /// unknown outcome, not a rejection.
    #[error("no matching reply within the attempt budget")]
    ResponseTimeout,

    /// The modem explicitly reported a failed join handshake.
    #[error("network join failed")]
    JoinFailed,

    /// The latest reply was requested but nothing has been received.
    #[error("no replies received")]
    EmptyInbox,

    /// The transport could not be configured or the receiver thread could
    /// not be started.
    #[error("failed to initialize transport")]
    TransportInit(#[source] io::Error),

    /// Serial I/O failed while a command was being written.
    #[error("serial I/O error")]
    Io(#[from] io::Error),

    /// Invalid argument or malformed reply at the protocol layer.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
