//! Validated parameter types for configuration commands.
//!
//! Every parameter that crosses the wire is either a closed enum (so an
//! out-of-range value is unrepresentable) or a newtype with a validating
//! constructor. Validation happens before any bytes are written to the
//! modem.

use crate::error::{ProtocolError, ProtocolResult};

/// LoRaWAN data rate (spreading factor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataRate {
    /// SF12, slowest and longest range.
    Sf12 = 0,
    /// SF11.
    Sf11 = 1,
    /// SF10.
    Sf10 = 2,
    /// SF9.
    Sf9 = 3,
    /// SF8.
    Sf8 = 4,
    /// SF7, fastest and shortest range.
    Sf7 = 5,
}

impl DataRate {
    /// The numeric code used in `AT+CDATARATE`.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Transmit power level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TxPower {
    /// 17 dBm.
    Dbm17 = 0,
    /// 15 dBm.
    Dbm15 = 1,
    /// 13 dBm.
    Dbm13 = 2,
    /// 11 dBm.
    Dbm11 = 3,
    /// 9 dBm.
    Dbm9 = 4,
    /// 7 dBm.
    Dbm7 = 5,
    /// 5 dBm.
    Dbm5 = 6,
    /// 3 dBm.
    Dbm3 = 7,
}

impl TxPower {
    /// The numeric code used in `AT+CTXP`.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// LoRaWAN device class supported by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeviceClass {
    /// Class A: downlink windows only after an uplink.
    ClassA = 0,
    /// Class C: continuous downlink listening.
    ClassC = 2,
}

impl DeviceClass {
    /// The numeric code used in `AT+CCLASS`.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// An 8-byte EUI as a 16-character hex string (device EUI or application EUI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eui(String);

impl Eui {
    /// Number of hex characters in an EUI.
    pub const HEX_LEN: usize = 16;

    /// Validate and wrap an EUI hex string.
    pub fn new(hex: &str) -> ProtocolResult<Eui> {
        if hex.len() != Self::HEX_LEN {
            return Err(ProtocolError::InvalidEuiLength {
                expected: Self::HEX_LEN,
                actual: hex.len(),
            });
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ProtocolError::InvalidHexDigit { field: "EUI" });
        }
        Ok(Eui(hex.to_string()))
    }

    /// The hex string as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A 16-byte application key as a 32-character hex string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppKey(String);

impl AppKey {
    /// Number of hex characters in an application key.
    pub const HEX_LEN: usize = 32;

    /// Validate and wrap an application key hex string.
    pub fn new(hex: &str) -> ProtocolResult<AppKey> {
        if hex.len() != Self::HEX_LEN {
            return Err(ProtocolError::InvalidKeyLength {
                expected: Self::HEX_LEN,
                actual: hex.len(),
            });
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ProtocolError::InvalidHexDigit { field: "application key" });
        }
        Ok(AppKey(hex.to_string()))
    }

    /// The hex string as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Upstream application port (FPort), 0-223.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppPort(u8);

impl AppPort {
    /// Highest valid application port.
    pub const MAX: u8 = 223;

    /// Validate and wrap an application port number.
    pub fn new(port: u8) -> ProtocolResult<AppPort> {
        if port > Self::MAX {
            return Err(ProtocolError::PortOutOfRange(port));
        }
        Ok(AppPort(port))
    }

    /// The port number.
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Number of confirmed-uplink retransmission trials, 0-15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialCount(u8);

impl TrialCount {
    /// Highest valid trial count.
    pub const MAX: u8 = 15;

    /// Validate and wrap a trial count.
    pub fn new(trials: u8) -> ProtocolResult<TrialCount> {
        if trials > Self::MAX {
            return Err(ProtocolError::TrialCountOutOfRange(trials));
        }
        Ok(TrialCount(trials))
    }

    /// The trial count.
    pub fn value(self) -> u8 {
        self.0
    }
}
