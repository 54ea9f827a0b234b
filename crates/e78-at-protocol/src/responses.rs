//! Reply classification and parsing.
//!
//! The modem answers with ASCII lines identified by fixed marker substrings.
//! Matching is substring containment, never exact-line equality: a reply
//! carrying extra trailing fields still matches its marker. Values (status
//! code, serial number, downlink payload) sit at fixed offsets after the
//! marker.

use crate::constants::{
    MARKER_DELIVERY_ACK, MARKER_DOWNLINK, MARKER_JOIN_FAIL, MARKER_JOIN_OK, MARKER_SERIAL,
    MARKER_STATUS, STATUS_CODE_WIDTH,
};
use crate::error::{ProtocolError, ProtocolResult};

/// The closed set of reply kinds a command can wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPattern {
    /// Join handshake succeeded (`+CJOIN:OK`).
    JoinOk,
    /// Join handshake failed (`+CJOIN:FAIL`).
    JoinFail,
    /// Confirmed uplink acknowledged (`OK+RECV:02`).
    DeliveryAck,
    /// Device status reply (`+CSTATUS:`).
    Status,
    /// Serial number reply (`+CGSN=`).
    SerialNumber,
    /// Unsolicited downlink notification (`+DRX:`).
    Downlink,
}

impl ReplyPattern {
    /// The marker substring that identifies this reply kind.
    pub fn marker(self) -> &'static str {
        match self {
            ReplyPattern::JoinOk => MARKER_JOIN_OK,
            ReplyPattern::JoinFail => MARKER_JOIN_FAIL,
            ReplyPattern::DeliveryAck => MARKER_DELIVERY_ACK,
            ReplyPattern::Status => MARKER_STATUS,
            ReplyPattern::SerialNumber => MARKER_SERIAL,
            ReplyPattern::Downlink => MARKER_DOWNLINK,
        }
    }

    /// Whether the given line answers this reply kind.
    pub fn matches(self, line: &str) -> bool {
        line.contains(self.marker())
    }
}

/// Device status word reported by `AT+CSTATUS?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeviceStatus {
    /// No data operation performed yet.
    NoDataOperation = 0,
    /// Data transmission in progress.
    DataSent = 1,
    /// Data delivery failed.
    DataDeliveryFailed = 2,
    /// Data was sent and delivered successfully.
    DataSentSuccessfully = 3,
    /// Network join succeeded.
    JoinSuccessful = 4,
    /// Network join failed.
    JoinFailed = 5,
    /// A network issue was detected.
    NetworkIssueDetected = 6,
    /// Unconfirmed uplink sent (no acknowledgement requested).
    SendOkNoAck = 7,
    /// Confirmed uplink sent and acknowledged.
    SendOkAck = 8,
}

impl DeviceStatus {
    /// Map a numeric status code to its variant.
    pub fn from_code(code: u8) -> Option<DeviceStatus> {
        match code {
            0 => Some(DeviceStatus::NoDataOperation),
            1 => Some(DeviceStatus::DataSent),
            2 => Some(DeviceStatus::DataDeliveryFailed),
            3 => Some(DeviceStatus::DataSentSuccessfully),
            4 => Some(DeviceStatus::JoinSuccessful),
            5 => Some(DeviceStatus::JoinFailed),
            6 => Some(DeviceStatus::NetworkIssueDetected),
            7 => Some(DeviceStatus::SendOkNoAck),
            8 => Some(DeviceStatus::SendOkAck),
            _ => None,
        }
    }
}

fn malformed(expected: &'static str, line: &str) -> ProtocolError {
    ProtocolError::MalformedReply { expected, line: line.to_string() }
}

/// Parse the status code out of a `+CSTATUS:` reply line.
///
/// The two-digit code sits directly after the marker.
pub fn parse_status(line: &str) -> ProtocolResult<DeviceStatus> {
    let start = line
        .find(MARKER_STATUS)
        .ok_or_else(|| malformed("status", line))?
        + MARKER_STATUS.len();
    let digits = line
        .get(start..start + STATUS_CODE_WIDTH)
        .ok_or_else(|| malformed("status", line))?;
    let code: u8 = digits.parse().map_err(|_| malformed("status", line))?;
    DeviceStatus::from_code(code).ok_or_else(|| {
        log::warn!("modem reported undocumented status code {code}");
        ProtocolError::UnknownStatusCode(code)
    })
}

/// Parse the serial number out of a `+CGSN=` reply line.
///
/// The serial is everything after the marker.
pub fn parse_serial(line: &str) -> ProtocolResult<String> {
    let start = line
        .find(MARKER_SERIAL)
        .ok_or_else(|| malformed("serial number", line))?
        + MARKER_SERIAL.len();
    let serial = &line[start..];
    if serial.is_empty() {
        return Err(malformed("serial number", line));
    }
    Ok(serial.to_string())
}

/// Extract the payload from an unsolicited `+DRX:` downlink line.
///
/// Returns `None` if the line is not a downlink notification.
pub fn parse_downlink(line: &str) -> Option<String> {
    let start = line.find(MARKER_DOWNLINK)? + MARKER_DOWNLINK.len();
    Some(line[start..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matches_substring() {
        assert!(ReplyPattern::JoinOk.matches("+CJOIN:OK"));
        // Matching is containment: trailing fields do not break it.
        assert!(ReplyPattern::JoinOk.matches("+CJOIN:OK,extra"));
        assert!(!ReplyPattern::JoinOk.matches("+CJOIN:FAIL"));
        assert!(ReplyPattern::JoinFail.matches("noise+CJOIN:FAILnoise"));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("+CSTATUS:03"), Ok(DeviceStatus::DataSentSuccessfully));
        assert_eq!(parse_status("+CSTATUS:08"), Ok(DeviceStatus::SendOkAck));
        assert_eq!(parse_status("+CSTATUS:04,trailing"), Ok(DeviceStatus::JoinSuccessful));
    }

    #[test]
    fn test_parse_status_rejects_garbage() {
        assert!(matches!(
            parse_status("noise"),
            Err(ProtocolError::MalformedReply { .. })
        ));
        assert!(matches!(
            parse_status("+CSTATUS:"),
            Err(ProtocolError::MalformedReply { .. })
        ));
        assert_eq!(parse_status("+CSTATUS:99"), Err(ProtocolError::UnknownStatusCode(99)));
    }

    #[test]
    fn test_parse_serial() {
        assert_eq!(parse_serial("+CGSN=E78ABC123"), Ok("E78ABC123".to_string()));
        assert!(matches!(
            parse_serial("+CGSN="),
            Err(ProtocolError::MalformedReply { .. })
        ));
        assert!(parse_serial("unrelated").is_err());
    }

    #[test]
    fn test_parse_downlink() {
        assert_eq!(parse_downlink("+DRX:48656c6c6f"), Some("48656c6c6f".to_string()));
        assert_eq!(parse_downlink("OK+RECV:02"), None);
    }

    #[test]
    fn test_status_code_round_trip() {
        for code in 0..=8u8 {
            let status = DeviceStatus::from_code(code).expect("documented code");
            assert_eq!(status as u8, code);
        }
        assert_eq!(DeviceStatus::from_code(9), None);
    }
}
