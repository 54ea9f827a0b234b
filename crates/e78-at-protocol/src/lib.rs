//! Ebyte E78 LoRaWAN AT Protocol
//!
//! This crate provides types and utilities for talking to the Ebyte E78
//! LoRaWAN modem over its UART AT-command interface. The protocol is a
//! simple line-based text protocol:
//!
//! - **Commands** (host → modem): ASCII `AT+...` lines terminated with `\r\n`
//! - **Replies** (modem → host): ASCII lines identified by fixed marker
//!   substrings (e.g. `+CJOIN:OK`, `+CSTATUS:`)
//! - **Downlink notifications** (modem → host): unsolicited `+DRX:` lines
//!   carrying network-to-device payloads
//!
//! Uplink payload bytes are hex-encoded (two hex characters per byte) before
//! transmission.
//!
//! # Example
//!
//! ```rust,ignore
//! use e78_at_protocol::{Command, ReplyPattern, DataRate};
//!
//! // Build a command
//! let cmd = Command::SetDataRate { rate: DataRate::Sf9 };
//! let bytes = cmd.encode();
//!
//! // Classify a reply line
//! assert!(ReplyPattern::JoinOk.matches("+CJOIN:OK"));
//! ```

mod codec;
mod commands;
mod constants;
mod error;
mod responses;
mod types;

pub use codec::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use responses::*;
pub use types::*;
