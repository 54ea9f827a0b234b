//! Shared buffer of not-yet-consumed reply lines.
//!
//! The framer thread is the sole writer; command issuers read, selectively
//! remove, and clear. Both sides go through one mutex, and a condvar lets
//! waiters park between lookup attempts instead of free-running sleeps.
//! Arrival order is preserved: lines are never reordered or duplicated, and
//! removal keeps the relative order of the remainder.

use std::collections::VecDeque;
use std::time::Duration;

use e78_at_protocol::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use parking_lot::{Condvar, Mutex};

use crate::error::{DriverError, DriverResult};

/// Retry budget for one reply wait: `attempts` lookups with an `interval`
/// pause between them (about 25 seconds at the defaults).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of inbox scans before giving up.
    pub attempts: u32,
    /// Pause between scans.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Order-preserving, thread-safe collection of received reply lines.
#[derive(Debug, Default)]
pub struct ResponseInbox {
    lines: Mutex<VecDeque<String>>,
    arrived: Condvar,
}

impl ResponseInbox {
    /// Create an empty inbox.
    pub fn new() -> ResponseInbox {
        ResponseInbox {
            lines: Mutex::new(VecDeque::new()),
            arrived: Condvar::new(),
        }
    }

    /// Append a line at the end and wake any waiters.
    pub fn append(&self, line: String) {
        self.lines.lock().push_back(line);
        self.arrived.notify_all();
    }

    /// Scan in arrival order for the first line containing `pattern`.
    ///
    /// With `consume` set, the matched line is removed; later lines keep
    /// their relative order.
    pub fn find(&self, pattern: &str, consume: bool) -> Option<String> {
        let mut lines = self.lines.lock();
        Self::find_locked(&mut lines, pattern, consume)
    }

    fn find_locked(lines: &mut VecDeque<String>, pattern: &str, consume: bool) -> Option<String> {
        let pos = lines.iter().position(|l| l.contains(pattern))?;
        if consume {
            lines.remove(pos)
        } else {
            lines.get(pos).cloned()
        }
    }

    /// The most recently appended line, without removing it.
    pub fn latest(&self) -> DriverResult<String> {
        self.lines.lock().back().cloned().ok_or(DriverError::EmptyInbox)
    }

    /// Remove the first line exactly equal to `line` (at most one).
    /// Returns whether anything was removed.
    pub fn remove_line(&self, line: &str) -> bool {
        let mut lines = self.lines.lock();
        match lines.iter().position(|l| l == line) {
            Some(pos) => {
                lines.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Discard all buffered lines.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether the inbox holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Snapshot of the buffered lines in arrival order.
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }

    /// Wait for a line containing `pattern`, scanning up to
    /// `policy.attempts` times with a timed condvar wait between scans.
    ///
    /// Fails with [`DriverError::ResponseTimeout`] once the budget is
    /// exhausted, never earlier. The timeout says nothing about why the
    /// reply is missing; callers must treat it as an unknown outcome.
    pub fn await_match(&self, pattern: &str, consume: bool, policy: &PollPolicy) -> DriverResult<String> {
        let mut lines = self.lines.lock();
        for _ in 0..policy.attempts {
            if let Some(line) = Self::find_locked(&mut lines, pattern, consume) {
                return Ok(line);
            }
            self.arrived.wait_for(&mut lines, policy.interval);
        }
        Err(DriverError::ResponseTimeout)
    }

    /// Block until a new line arrives or `timeout` elapses.
    pub fn wait_arrival(&self, timeout: Duration) {
        let mut lines = self.lines.lock();
        self.arrived.wait_for(&mut lines, timeout);
    }
}
