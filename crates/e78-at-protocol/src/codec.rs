//! Line-level encoding for the AT protocol.
//!
//! Commands are ASCII lines terminated with `\r\n`. The modem emits one
//! reply per read window, so inbound framing is a matter of stripping the
//! line terminators from a received byte window rather than reassembling
//! lines across windows.

use crate::constants::COMMAND_TERMINATOR;

/// Encode a command line for transmission, appending the `\r\n` terminator.
pub fn encode_command(cmd: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(cmd.len() + COMMAND_TERMINATOR.len());
    buf.extend_from_slice(cmd.as_bytes());
    buf.extend_from_slice(COMMAND_TERMINATOR.as_bytes());
    buf
}

/// Turn one received byte window into a reply line.
///
/// Strips every `\r` and `\n`, decodes the rest lossily as UTF-8, and
/// returns `None` if nothing is left (a bare terminator window).
pub fn clean_line(window: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(window);
    let line: String = text.chars().filter(|&c| c != '\r' && c != '\n').collect();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}
