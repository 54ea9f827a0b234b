//! Device session state machine.
//!
//! A session owns the transport, the framer thread, and the join state.
//! It moves from `NotJoined` to `Joined` exactly once, on a successful join
//! handshake, and never transitions back. Configuration commands are legal
//! only before the join; sending data is legal only after it; the status
//! and serial-number queries are read-only and legal in either state.
//!
//! Every stateful operation follows the same shape: write one AT command,
//! then wait for its reply marker in the shared inbox. A timeout does not
//! mean the modem never received the command, only that no matching reply
//! appeared in time.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use e78_at_protocol::{
    parse_serial, parse_status, AppKey, AppPort, Command, DataRate, DeviceClass, DeviceStatus,
    Eui, ReplyPattern, TrialCount, TxPower, DEFAULT_POLL_INTERVAL, DEFAULT_REBOOT_PAUSE,
    DEFAULT_SETTLE_INTERVAL,
};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::downlink::DownlinkDispatcher;
use crate::error::{DriverError, DriverResult};
use crate::framer::{spawn_framer, FramerHandle};
use crate::inbox::{PollPolicy, ResponseInbox};
use crate::transport::{SerialConfig, SerialTransport};

/// Timing knobs for a session. Defaults match the modem's reference
/// cadence; tests shrink them to run in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Retry budget for one reply wait.
    pub poll: PollPolicy,
    /// Pause after every command write.
    pub settle: Duration,
    /// Framer read cadence while the line is idle.
    pub framer_interval: Duration,
    /// Pause between join outcome probes.
    pub join_interval: Duration,
    /// How long the framer stays suspended around save-and-reboot.
    pub reboot_pause: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            poll: PollPolicy::default(),
            settle: DEFAULT_SETTLE_INTERVAL,
            framer_interval: DEFAULT_POLL_INTERVAL,
            join_interval: DEFAULT_POLL_INTERVAL,
            reboot_pause: DEFAULT_REBOOT_PAUSE,
        }
    }
}

/// A session with one physical E78 modem.
pub struct E78Session<T: SerialTransport + Send + 'static> {
    transport: Arc<Mutex<T>>,
    inbox: Arc<ResponseInbox>,
    downlink: Arc<DownlinkDispatcher>,
    framer: FramerHandle,
    timing: Timing,
    joined: bool,
}

impl<T: SerialTransport + Send + 'static> E78Session<T> {
    /// Configure the transport and start the receiver thread.
    ///
    /// Fails with [`DriverError::InvalidPinConfiguration`] before touching
    /// the transport if the pin assignment is out of range, and with
    /// [`DriverError::TransportInit`] if the transport rejects the serial
    /// parameters or the receiver thread cannot be started.
    pub fn open(transport: T, config: SerialConfig) -> DriverResult<E78Session<T>> {
        Self::open_with_timing(transport, config, Timing::default())
    }

    /// [`E78Session::open`] with explicit timing knobs.
    pub fn open_with_timing(
        mut transport: T,
        config: SerialConfig,
        timing: Timing,
    ) -> DriverResult<E78Session<T>> {
        config.validate()?;
        transport.configure(&config).map_err(DriverError::TransportInit)?;

        let transport = Arc::new(Mutex::new(transport));
        let inbox = Arc::new(ResponseInbox::new());
        let downlink = Arc::new(DownlinkDispatcher::new());
        let framer = spawn_framer(
            transport.clone(),
            inbox.clone(),
            downlink.clone(),
            timing.framer_interval,
        )?;

        info!(baud = config.baud_rate, "session opened");
        Ok(E78Session { transport, inbox, downlink, framer, timing, joined: false })
    }

    /// Whether the join handshake has completed.
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// The shared reply inbox, exposed for diagnostics.
    pub fn inbox(&self) -> &ResponseInbox {
        &self.inbox
    }

    /// Write one command and wait the settle interval. Fire-and-forget:
    /// no reply is awaited here.
    fn write_command(&self, command: &Command) -> DriverResult<()> {
        self.transport.lock().write_all(&command.encode())?;
        thread::sleep(self.timing.settle);
        Ok(())
    }

    fn ensure_not_joined(&self) -> DriverResult<()> {
        if self.joined {
            return Err(DriverError::AlreadyJoined);
        }
        Ok(())
    }

    /// Run the OTAA join handshake.
    ///
    /// Probes the inbox for the two terminal outcomes indefinitely; each
    /// probe is cheap and the loop parks between probes until new lines
    /// arrive. On success the inbox is cleared, so join-phase chatter can
    /// never be mistaken for a reply to a later command.
    pub fn join(&mut self) -> DriverResult<()> {
        self.ensure_not_joined()?;
        self.write_command(&Command::Join)?;
        loop {
            if self.inbox.find(ReplyPattern::JoinOk.marker(), true).is_some() {
                info!("network join successful");
                self.inbox.clear();
                self.joined = true;
                return Ok(());
            }
            if self.inbox.find(ReplyPattern::JoinFail.marker(), true).is_some() {
                error!("network join failed");
                return Err(DriverError::JoinFailed);
            }
            self.inbox.wait_arrival(self.timing.join_interval);
        }
    }

    /// Transmit a confirmed uplink and wait for the network
    /// acknowledgement.
    ///
    /// Fails with [`DriverError::NotJoined`] (writing nothing) before the
    /// join, and with [`DriverError::ResponseTimeout`] if no
    /// acknowledgement marker appears within the attempt budget.
    pub fn send(&self, payload: &[u8]) -> DriverResult<()> {
        if !self.joined {
            return Err(DriverError::NotJoined);
        }
        self.write_command(&Command::send_data(payload))?;
        self.inbox
            .await_match(ReplyPattern::DeliveryAck.marker(), true, &self.timing.poll)?;
        debug!(len = payload.len(), "uplink delivered");
        Ok(())
    }

    /// Query the device status word. Legal in any state.
    pub fn status(&self) -> DriverResult<DeviceStatus> {
        self.write_command(&Command::QueryStatus)?;
        // Two-step read-then-discard: the matched line must be parsed
        // before it is safe to drop.
        let line = self
            .inbox
            .await_match(ReplyPattern::Status.marker(), false, &self.timing.poll)?;
        self.inbox.remove_line(&line);
        Ok(parse_status(&line)?)
    }

    /// Query the modem serial number. Legal in any state.
    pub fn serial_number(&self) -> DriverResult<String> {
        self.write_command(&Command::QuerySerialNumber)?;
        let line = self
            .inbox
            .await_match(ReplyPattern::SerialNumber.marker(), false, &self.timing.poll)?;
        self.inbox.remove_line(&line);
        Ok(parse_serial(&line)?)
    }

    /// Register the downlink callback. Must happen before the join.
    pub fn set_downlink_callback<F>(&mut self, callback: F) -> DriverResult<()>
    where
        F: Fn(&str) + Send + 'static,
    {
        self.ensure_not_joined()?;
        self.downlink.register(Box::new(callback));
        Ok(())
    }

    /// Set the upstream application port (0-223).
    pub fn set_upstream_port(&self, port: u8) -> DriverResult<()> {
        self.ensure_not_joined()?;
        let port = AppPort::new(port)?;
        self.write_command(&Command::SetUpstreamPort { port })
    }

    /// Set the data rate.
    pub fn set_data_rate(&self, rate: DataRate) -> DriverResult<()> {
        self.ensure_not_joined()?;
        self.write_command(&Command::SetDataRate { rate })
    }

    /// Set the device class.
    pub fn set_class(&self, class: DeviceClass) -> DriverResult<()> {
        self.ensure_not_joined()?;
        self.write_command(&Command::SetClass { class })
    }

    /// Set the transmit power.
    pub fn set_tx_power(&self, power: TxPower) -> DriverResult<()> {
        self.ensure_not_joined()?;
        self.write_command(&Command::SetTxPower { power })
    }

    /// Set the confirmed-uplink trial count (0-15).
    pub fn set_trial_count(&self, trials: u8) -> DriverResult<()> {
        self.ensure_not_joined()?;
        let trials = TrialCount::new(trials)?;
        self.write_command(&Command::SetTrialCount { trials })
    }

    /// Enable or disable uplink confirmation.
    pub fn set_confirmation(&self, enabled: bool) -> DriverResult<()> {
        self.ensure_not_joined()?;
        self.write_command(&Command::SetConfirmation { enabled })
    }

    /// Set the application EUI (16 hex characters).
    pub fn set_app_eui(&self, eui: &str) -> DriverResult<()> {
        self.ensure_not_joined()?;
        let eui = Eui::new(eui)?;
        self.write_command(&Command::SetAppEui { eui })
    }

    /// Set the application key (32 hex characters).
    pub fn set_app_key(&self, key: &str) -> DriverResult<()> {
        self.ensure_not_joined()?;
        let key = AppKey::new(key)?;
        self.write_command(&Command::SetAppKey { key })
    }

    /// Set the device EUI (16 hex characters).
    pub fn set_dev_eui(&self, eui: &str) -> DriverResult<()> {
        self.ensure_not_joined()?;
        let eui = Eui::new(eui)?;
        self.write_command(&Command::SetDevEui { eui })
    }

    /// Persist configuration and reboot the modem.
    ///
    /// The framer is suspended for the reboot pause so it does not read the
    /// modem's reboot-time serial noise, then resumed.
    pub fn save(&self) -> DriverResult<()> {
        self.ensure_not_joined()?;
        self.write_command(&Command::Save)?;
        self.write_command(&Command::Reboot)?;
        self.framer.suspend();
        thread::sleep(self.timing.reboot_pause);
        self.framer.resume();
        info!("configuration saved, modem rebooted");
        Ok(())
    }
}
