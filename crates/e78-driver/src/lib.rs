//! E78 LoRaWAN modem driver
//!
//! This crate drives an Ebyte E78 LoRaWAN modem attached over a serial
//! UART, turning its asynchronous AT-reply stream into synchronous
//! request/response calls.
//!
//! # Architecture
//!
//! Two threads share one session:
//!
//! - A dedicated **line framer** thread drains the serial transport,
//!   reassembles reply lines, hands unsolicited `+DRX:` downlink
//!   notifications to the registered callback, and appends everything else
//!   to the shared [`ResponseInbox`].
//! - The **caller's** thread issues commands and blocks on the inbox until
//!   the expected reply marker appears or the attempt budget runs out.
//!
//! # Key Types
//!
//! - [`E78Session`]: the session state machine (join, send, status, config)
//! - [`ResponseInbox`]: order-preserving shared buffer of reply lines
//! - [`SerialTransport`]: the seam over the physical serial port
//!
//! # Example
//!
//! ```rust,ignore
//! use e78_driver::{E78Session, SerialConfig};
//!
//! let config = SerialConfig::new(17, 16)?;
//! let mut session = E78Session::open(port, config)?;
//! session.set_dev_eui("0011223344556677")?;
//! session.join()?;
//! session.send(b"hello")?;
//! ```

mod downlink;
mod error;
mod framer;
mod inbox;
mod session;
mod transport;

pub use downlink::*;
pub use error::*;
pub use framer::*;
pub use inbox::*;
pub use session::*;
pub use transport::*;

pub use e78_at_protocol as protocol;
