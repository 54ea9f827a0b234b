//! Line framer thread.
//!
//! A dedicated thread drains the serial transport: each cycle it reads the
//! bytes currently available, strips the line terminators, and classifies
//! the resulting line. Downlink notifications go to the registered callback;
//! everything else is appended to the shared inbox. The modem emits one
//! reply per read window, so no cross-window reassembly is attempted.
//!
//! The thread is controlled over a channel: `Suspend` parks it (used while
//! the modem reboots after a save, so reboot-time serial noise is not read),
//! `Resume` wakes it, `Shutdown` ends it. The loop itself never terminates
//! on malformed input.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use e78_at_protocol::{clean_line, parse_downlink};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::downlink::DownlinkDispatcher;
use crate::error::{DriverError, DriverResult};
use crate::inbox::ResponseInbox;
use crate::transport::SerialTransport;

/// Commands sent to the framer thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerCommand {
    /// Park the thread until `Resume` arrives.
    Suspend,
    /// Wake a suspended thread.
    Resume,
    /// Stop the thread.
    Shutdown,
}

/// Handle to a running framer thread.
///
/// Dropping the handle shuts the thread down and joins it.
pub struct FramerHandle {
    control: Sender<FramerCommand>,
    thread: Option<JoinHandle<()>>,
}

impl FramerHandle {
    /// Park the framer thread.
    pub fn suspend(&self) {
        let _ = self.control.send(FramerCommand::Suspend);
    }

    /// Wake the framer thread.
    pub fn resume(&self) {
        let _ = self.control.send(FramerCommand::Resume);
    }

    /// Stop the framer thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        let _ = self.control.send(FramerCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FramerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn the framer thread.
pub fn spawn_framer<T>(
    transport: Arc<Mutex<T>>,
    inbox: Arc<ResponseInbox>,
    downlink: Arc<DownlinkDispatcher>,
    poll_interval: Duration,
) -> DriverResult<FramerHandle>
where
    T: SerialTransport + Send + 'static,
{
    let (control, commands) = crossbeam_channel::unbounded();
    let thread = thread::Builder::new()
        .name("e78-framer".to_string())
        .spawn(move || framer_loop(transport, inbox, downlink, poll_interval, commands))
        .map_err(DriverError::TransportInit)?;
    Ok(FramerHandle { control, thread: Some(thread) })
}

fn framer_loop<T: SerialTransport>(
    transport: Arc<Mutex<T>>,
    inbox: Arc<ResponseInbox>,
    downlink: Arc<DownlinkDispatcher>,
    poll_interval: Duration,
    commands: Receiver<FramerCommand>,
) {
    loop {
        if let Err(e) = drain_window(&transport, &inbox, &downlink) {
            // Transient serial errors must not kill the receiver.
            warn!(error = %e, "serial read failed");
        }

        // The timed receive doubles as the poll cadence: control commands
        // wake the loop immediately, otherwise it re-polls after the
        // interval.
        match commands.recv_timeout(poll_interval) {
            Ok(FramerCommand::Shutdown) => return,
            Ok(FramerCommand::Suspend) => {
                debug!("framer suspended");
                if !wait_for_resume(&commands) {
                    return;
                }
                debug!("framer resumed");
            }
            // A stray resume with nothing suspended is a no-op.
            Ok(FramerCommand::Resume) => {}
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Block until `Resume` arrives. Returns false on `Shutdown` or when the
/// control channel is gone.
fn wait_for_resume(commands: &Receiver<FramerCommand>) -> bool {
    loop {
        match commands.recv() {
            Ok(FramerCommand::Resume) => return true,
            Ok(FramerCommand::Suspend) => {}
            Ok(FramerCommand::Shutdown) | Err(_) => return false,
        }
    }
}

/// Read one window of available bytes and classify the resulting line.
fn drain_window<T: SerialTransport>(
    transport: &Arc<Mutex<T>>,
    inbox: &Arc<ResponseInbox>,
    downlink: &Arc<DownlinkDispatcher>,
) -> io::Result<()> {
    let window = {
        let mut port = transport.lock();
        let available = port.bytes_available()?;
        if available == 0 {
            return Ok(());
        }
        let mut buf = vec![0u8; available];
        let n = port.read(&mut buf)?;
        buf.truncate(n);
        buf
    };

    let Some(line) = clean_line(&window) else {
        return Ok(());
    };

    // Downlink notifications go exclusively to the callback so that no
    // command wait can ever consume them.
    if let Some(payload) = parse_downlink(&line) {
        debug!(payload = %payload, "downlink notification");
        downlink.dispatch(&payload);
    } else {
        trace!(line = %line, "reply line");
        inbox.append(line);
    }
    Ok(())
}
