//! Protocol constants
//!
//! These constants define the command strings, reply markers, and timing
//! defaults used by the E78 AT protocol.

use std::time::Duration;

// ============================================================================
// Fixed command lines (host → modem)
// ============================================================================

/// Line terminator appended to every outbound command.
pub const COMMAND_TERMINATOR: &str = "\r\n";
/// Join request: OTAA join with auto-retry parameters.
pub const CMD_JOIN: &str = "AT+CJOIN=1,0,8,8";
/// Device status query.
pub const CMD_STATUS_QUERY: &str = "AT+CSTATUS?";
/// Serial number query.
pub const CMD_SERIAL_QUERY: &str = "AT+CGSN?";
/// Persist current configuration to the modem's non-volatile storage.
pub const CMD_SAVE: &str = "AT+CSAVE";
/// Reboot the modem (mode 0).
pub const CMD_REBOOT: &str = "AT+IREBOOT=0";

// ============================================================================
// Reply markers (modem → host)
// ============================================================================

/// Join handshake completed successfully.
pub const MARKER_JOIN_OK: &str = "+CJOIN:OK";
/// Join handshake rejected or timed out on the air.
pub const MARKER_JOIN_FAIL: &str = "+CJOIN:FAIL";
/// Confirmed uplink was acknowledged by the network.
pub const MARKER_DELIVERY_ACK: &str = "OK+RECV:02";
/// Device status reply prefix; the status code follows the colon.
pub const MARKER_STATUS: &str = "+CSTATUS:";
/// Serial number reply prefix; the serial follows the equals sign.
pub const MARKER_SERIAL: &str = "+CGSN=";
/// Unsolicited downlink notification; the payload follows the colon.
pub const MARKER_DOWNLINK: &str = "+DRX:";

/// Width of the numeric status code that follows [`MARKER_STATUS`].
pub const STATUS_CODE_WIDTH: usize = 2;

// ============================================================================
// Timing defaults
// ============================================================================

/// UART baud rate the modem ships with.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// How many times a reply lookup is retried before timing out.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 250;
/// Pause between reply lookup attempts (and the receiver's idle cadence).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Pause after writing a command before the caller continues.
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(100);
/// How long the receiver stays suspended around a save-and-reboot cycle.
pub const DEFAULT_REBOOT_PAUSE: Duration = Duration::from_millis(1000);
