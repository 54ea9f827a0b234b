//! Downlink notification dispatch.
//!
//! The network can push data to the device at any time; the modem surfaces
//! it as an unsolicited `+DRX:` line. The framer thread recognizes those
//! lines and hands the payload to the one registered callback instead of
//! the inbox, so a command waiting on a reply never sees downlink traffic.

use parking_lot::Mutex;
use tracing::warn;

/// Application callback invoked with each downlink payload.
///
/// Runs on the framer thread; it must return quickly or hand the work off
/// elsewhere, since the serial stream is not drained while it runs.
pub type DownlinkCallback = Box<dyn Fn(&str) + Send>;

/// Holds the registered downlink callback.
#[derive(Default)]
pub struct DownlinkDispatcher {
    callback: Mutex<Option<DownlinkCallback>>,
}

impl DownlinkDispatcher {
    /// Create a dispatcher with no callback registered.
    pub fn new() -> DownlinkDispatcher {
        DownlinkDispatcher { callback: Mutex::new(None) }
    }

    /// Register (or replace) the callback.
    pub fn register(&self, callback: DownlinkCallback) {
        *self.callback.lock() = Some(callback);
    }

    /// Whether a callback has been registered.
    pub fn is_registered(&self) -> bool {
        self.callback.lock().is_some()
    }

    /// Invoke the callback with a downlink payload.
    pub fn dispatch(&self, payload: &str) {
        let callback = self.callback.lock();
        match callback.as_ref() {
            Some(cb) => cb(payload),
            None => warn!(payload, "downlink dropped: no callback registered"),
        }
    }
}
