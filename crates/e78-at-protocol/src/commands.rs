//! Commands that can be sent to the E78 modem.
//!
//! Each variant corresponds to one AT command line. Parameter-carrying
//! variants hold already-validated types from [`crate::types`], so encoding
//! never fails.

use crate::codec::encode_command;
use crate::constants::{CMD_JOIN, CMD_REBOOT, CMD_SAVE, CMD_SERIAL_QUERY, CMD_STATUS_QUERY};
use crate::types::{AppKey, AppPort, DataRate, DeviceClass, Eui, TrialCount, TxPower};

/// Commands understood by the modem.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the OTAA join handshake.
    Join,

    /// Transmit a confirmed uplink carrying a hex-encoded payload.
    SendData {
        /// Payload bytes, hex-encoded two characters per byte.
        hex_payload: String,
    },

    /// Query the device status word.
    QueryStatus,

    /// Query the modem serial number.
    QuerySerialNumber,

    /// Set the upstream application port.
    SetUpstreamPort {
        /// Validated port number.
        port: AppPort,
    },

    /// Set the LoRaWAN data rate.
    SetDataRate {
        /// Spreading-factor data rate.
        rate: DataRate,
    },

    /// Set the device class.
    SetClass {
        /// Class A or Class C.
        class: DeviceClass,
    },

    /// Set the transmit power.
    SetTxPower {
        /// Power level code.
        power: TxPower,
    },

    /// Set the confirmed-uplink trial count.
    SetTrialCount {
        /// Validated trial count.
        trials: TrialCount,
    },

    /// Enable or disable uplink confirmation.
    SetConfirmation {
        /// Whether uplinks request a network acknowledgement.
        enabled: bool,
    },

    /// Set the application EUI.
    SetAppEui {
        /// Validated 16-hex-character EUI.
        eui: Eui,
    },

    /// Set the application key.
    SetAppKey {
        /// Validated 32-hex-character key.
        key: AppKey,
    },

    /// Set the device EUI.
    SetDevEui {
        /// Validated 16-hex-character EUI.
        eui: Eui,
    },

    /// Persist configuration to non-volatile storage.
    Save,

    /// Reboot the modem.
    Reboot,
}

impl Command {
    /// Build a [`Command::SendData`] from raw payload bytes.
    pub fn send_data(payload: &[u8]) -> Command {
        Command::SendData { hex_payload: hex::encode(payload) }
    }

    /// Get the command line without the terminator.
    pub fn to_command_string(&self) -> String {
        match self {
            Command::Join => CMD_JOIN.to_string(),
            Command::SendData { hex_payload } => {
                format!("AT+DTRX=1,3,{},{}", hex_payload.len(), hex_payload)
            }
            Command::QueryStatus => CMD_STATUS_QUERY.to_string(),
            Command::QuerySerialNumber => CMD_SERIAL_QUERY.to_string(),
            Command::SetUpstreamPort { port } => format!("AT+CAPPPORT={}", port.value()),
            Command::SetDataRate { rate } => format!("AT+CDATARATE={}", rate.code()),
            Command::SetClass { class } => format!("AT+CCLASS={}", class.code()),
            Command::SetTxPower { power } => format!("AT+CTXP={}", power.code()),
            Command::SetTrialCount { trials } => format!("AT+CFREQTRIALS=1,{}", trials.value()),
            Command::SetConfirmation { enabled } => {
                format!("AT+CCONFIRM={}", u8::from(*enabled))
            }
            Command::SetAppEui { eui } => format!("AT+CAPPEUI={}", eui.as_str()),
            Command::SetAppKey { key } => format!("AT+CAPPKEY={}", key.as_str()),
            Command::SetDevEui { eui } => format!("AT+CDEVEUI={}", eui.as_str()),
            Command::Save => CMD_SAVE.to_string(),
            Command::Reboot => CMD_REBOOT.to_string(),
        }
    }

    /// Encode the command as the bytes to write, including the terminator.
    pub fn encode(&self) -> Vec<u8> {
        encode_command(&self.to_command_string())
    }
}
