//! Serial transport seam.
//!
//! The driver talks to the modem through the [`SerialTransport`] trait so
//! that tests can substitute a scripted in-memory port. A real
//! `serialport`-backed implementation is available behind the `serialport`
//! feature.

use std::io;

use e78_at_protocol::DEFAULT_BAUD_RATE;

use crate::error::{DriverError, DriverResult};

/// Highest UART pin number the target board supports.
pub const MAX_UART_PIN: i32 = 34;

/// Parity setting for the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit.
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

/// Flow control setting for the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    /// No flow control.
    None,
    /// RTS/CTS hardware flow control.
    Hardware,
}

/// Serial link parameters. The modem expects 9600 baud, 8 data bits,
/// no parity, 1 stop bit, no flow control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate.
    pub baud_rate: u32,
    /// Data bits per character.
    pub data_bits: u8,
    /// Parity setting.
    pub parity: Parity,
    /// Stop bits.
    pub stop_bits: u8,
    /// Flow control setting.
    pub flow_control: FlowControl,
    /// UART TX pin number.
    pub tx_pin: i32,
    /// UART RX pin number.
    pub rx_pin: i32,
}

impl SerialConfig {
    /// Build the modem's default configuration for the given pins.
    ///
    /// Pin numbers outside `0..=34` fail with
    /// [`DriverError::InvalidPinConfiguration`].
    pub fn new(tx_pin: i32, rx_pin: i32) -> DriverResult<SerialConfig> {
        let config = SerialConfig {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            flow_control: FlowControl::None,
            tx_pin,
            rx_pin,
        };
        config.validate()?;
        Ok(config)
    }

    /// Re-check the pin assignment. Called again at session open since the
    /// fields are public.
    pub fn validate(&self) -> DriverResult<()> {
        if self.tx_pin < 0 || self.rx_pin < 0 || self.tx_pin > MAX_UART_PIN || self.rx_pin > MAX_UART_PIN {
            return Err(DriverError::InvalidPinConfiguration { tx: self.tx_pin, rx: self.rx_pin });
        }
        Ok(())
    }
}

/// Byte-oriented serial channel to the modem.
///
/// The framer thread reads through this trait while the caller's thread
/// writes through it, so implementations are shared behind a mutex by the
/// session.
pub trait SerialTransport {
    /// Apply serial parameters and select the UART pins.
    fn configure(&mut self, config: &SerialConfig) -> io::Result<()>;

    /// Write all bytes to the modem.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Number of bytes currently buffered and readable.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

#[cfg(feature = "serialport")]
pub use system::SystemSerial;

#[cfg(feature = "serialport")]
mod system {
    use std::io::{self, Read, Write};
    use std::time::Duration;

    use super::{FlowControl, Parity, SerialConfig, SerialTransport};
    use crate::error::{DriverError, DriverResult};

    fn to_io(e: serialport::Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, e)
    }

    fn data_bits(bits: u8) -> serialport::DataBits {
        match bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            _ => serialport::DataBits::Eight,
        }
    }

    fn parity(p: Parity) -> serialport::Parity {
        match p {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }

    fn stop_bits(bits: u8) -> serialport::StopBits {
        match bits {
            2 => serialport::StopBits::Two,
            _ => serialport::StopBits::One,
        }
    }

    fn flow_control(fc: FlowControl) -> serialport::FlowControl {
        match fc {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
        }
    }

    /// A [`SerialTransport`] over an operating-system serial port.
    pub struct SystemSerial {
        port: Box<dyn serialport::SerialPort>,
    }

    impl SystemSerial {
        /// Open the named port with the given configuration.
        pub fn open(path: &str, config: &SerialConfig) -> DriverResult<SystemSerial> {
            config.validate()?;
            let port = serialport::new(path, config.baud_rate)
                .data_bits(data_bits(config.data_bits))
                .parity(parity(config.parity))
                .stop_bits(stop_bits(config.stop_bits))
                .flow_control(flow_control(config.flow_control))
                .timeout(Duration::from_millis(100))
                .open()
                .map_err(|e| DriverError::TransportInit(to_io(e)))?;
            Ok(SystemSerial { port })
        }
    }

    impl SerialTransport for SystemSerial {
        fn configure(&mut self, config: &SerialConfig) -> io::Result<()> {
            self.port.set_baud_rate(config.baud_rate).map_err(to_io)?;
            self.port.set_data_bits(data_bits(config.data_bits)).map_err(to_io)?;
            self.port.set_parity(parity(config.parity)).map_err(to_io)?;
            self.port.set_stop_bits(stop_bits(config.stop_bits)).map_err(to_io)?;
            self.port.set_flow_control(flow_control(config.flow_control)).map_err(to_io)?;
            Ok(())
        }

        fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            self.port.write_all(data)?;
            self.port.flush()
        }

        fn bytes_available(&mut self) -> io::Result<usize> {
            self.port.bytes_to_read().map(|n| n as usize).map_err(to_io)
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.port.read(buf)
        }
    }
}
