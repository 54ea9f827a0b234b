//! End-to-end session tests over a scripted in-memory serial transport.
//!
//! The mock answers written command lines with canned reply windows, one
//! reply per read window, the way the modem behaves on the wire.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use e78_driver::protocol::{DataRate, DeviceStatus};
use e78_driver::{DriverError, E78Session, PollPolicy, SerialConfig, SerialTransport, Timing};
use parking_lot::Mutex;

#[derive(Default)]
struct MockState {
    /// Pending read windows, front first. One reply per window.
    windows: VecDeque<Vec<u8>>,
    /// Command lines written by the session, terminators stripped.
    written: Vec<String>,
    /// Reply rules: when a written line contains the needle, the reply
    /// windows are queued.
    script: Vec<(String, Vec<Vec<u8>>)>,
}

/// Test-side handle onto the mock's shared state.
#[derive(Clone, Default)]
struct MockHandle(Arc<Mutex<MockState>>);

impl MockHandle {
    fn new() -> MockHandle {
        MockHandle::default()
    }

    fn transport(&self) -> MockTransport {
        MockTransport(self.0.clone())
    }

    fn reply_when(&self, needle: &str, replies: &[&[u8]]) {
        self.0
            .lock()
            .script
            .push((needle.to_string(), replies.iter().map(|r| r.to_vec()).collect()));
    }

    fn push_window(&self, window: &[u8]) {
        self.0.lock().windows.push_back(window.to_vec());
    }

    fn written(&self) -> Vec<String> {
        self.0.lock().written.clone()
    }

    fn wrote_containing(&self, needle: &str) -> bool {
        self.0.lock().written.iter().any(|l| l.contains(needle))
    }
}

struct MockTransport(Arc<Mutex<MockState>>);

impl SerialTransport for MockTransport {
    fn configure(&mut self, _config: &SerialConfig) -> io::Result<()> {
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let line = String::from_utf8_lossy(data)
            .trim_end_matches(|c| c == '\r' || c == '\n')
            .to_string();
        let mut state = self.0.lock();
        let mut queued = Vec::new();
        for (needle, replies) in &state.script {
            if line.contains(needle.as_str()) {
                queued.extend(replies.iter().cloned());
            }
        }
        state.windows.extend(queued);
        state.written.push(line);
        Ok(())
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.0.lock().windows.front().map_or(0, Vec::len))
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.lock().windows.pop_front() {
            Some(window) => {
                let n = window.len().min(buf.len());
                buf[..n].copy_from_slice(&window[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }
}

fn fast_timing() -> Timing {
    Timing {
        poll: PollPolicy { attempts: 500, interval: Duration::from_millis(1) },
        settle: Duration::from_millis(1),
        framer_interval: Duration::from_millis(1),
        join_interval: Duration::from_millis(1),
        reboot_pause: Duration::from_millis(5),
    }
}

fn open(mock: &MockHandle) -> E78Session<MockTransport> {
    let config = SerialConfig::new(17, 16).expect("valid pins");
    E78Session::open_with_timing(mock.transport(), config, fast_timing()).expect("session opens")
}

fn join(session: &mut E78Session<MockTransport>, mock: &MockHandle) {
    mock.reply_when("AT+CJOIN", &[b"+CJOIN:OK\r\n"]);
    session.join().expect("join succeeds");
}

fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) {
    let start = Instant::now();
    while !done() {
        assert!(start.elapsed() < deadline, "condition not reached in time");
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_join_success_clears_inbox() {
    let mock = MockHandle::new();
    mock.reply_when("AT+CJOIN", &[b"join chatter\r\n", b"+CJOIN:OK\r\n"]);

    let mut session = open(&mock);
    assert!(!session.is_joined());
    session.join().expect("join succeeds");

    assert!(session.is_joined());
    // Join-phase chatter must not survive into later lookups.
    assert!(session.inbox().is_empty());
    assert!(mock.wrote_containing("AT+CJOIN=1,0,8,8"));
}

#[test]
fn test_join_failure_keeps_state_and_inbox() {
    let mock = MockHandle::new();
    mock.reply_when("AT+CJOIN", &[b"join chatter\r\n", b"+CJOIN:FAIL\r\n"]);

    let mut session = open(&mock);
    let result = session.join();

    assert!(matches!(result, Err(DriverError::JoinFailed)));
    assert!(!session.is_joined());
    // Only the failure line was consumed; the rest is untouched.
    assert_eq!(session.inbox().snapshot(), vec!["join chatter"]);
}

#[test]
fn test_join_twice_rejected() {
    let mock = MockHandle::new();
    let mut session = open(&mock);
    join(&mut session, &mock);

    assert!(matches!(session.join(), Err(DriverError::AlreadyJoined)));
}

#[test]
fn test_send_before_join_writes_nothing() {
    let mock = MockHandle::new();
    let session = open(&mock);

    assert!(matches!(session.send(b"hi"), Err(DriverError::NotJoined)));
    assert!(!mock.wrote_containing("AT+DTRX"));
}

#[test]
fn test_send_writes_one_transmit_command() {
    let mock = MockHandle::new();
    let mut session = open(&mock);
    join(&mut session, &mock);

    mock.reply_when("AT+DTRX", &[b"OK+RECV:02\r\n"]);
    session.send(b"hi").expect("uplink acknowledged");

    let transmit_lines: Vec<String> = mock
        .written()
        .into_iter()
        .filter(|l| l.contains("AT+DTRX"))
        .collect();
    assert_eq!(transmit_lines, vec![format!("AT+DTRX=1,3,4,{}", hex::encode(b"hi"))]);
    // The acknowledgement was consumed.
    assert!(session.inbox().is_empty());
}

#[test]
fn test_send_timeout_is_unknown_outcome() {
    let mock = MockHandle::new();
    let mut session = open(&mock);
    join(&mut session, &mock);

    // No acknowledgement scripted: the command is written, then the wait
    // exhausts its budget.
    assert!(matches!(session.send(b"hi"), Err(DriverError::ResponseTimeout)));
    assert!(mock.wrote_containing("AT+DTRX"));
}

#[test]
fn test_status_consumes_only_the_matched_line() {
    let mock = MockHandle::new();
    mock.reply_when("AT+CSTATUS?", &[b"+CSTATUS:03\r\n", b"noise\r\n"]);

    let session = open(&mock);
    let status = session.status().expect("status reply");

    assert_eq!(status, DeviceStatus::DataSentSuccessfully);
    wait_until(Duration::from_secs(1), || {
        session.inbox().snapshot() == vec!["noise".to_string()]
    });
}

#[test]
fn test_status_timeout() {
    let mock = MockHandle::new();
    let session = open(&mock);

    assert!(matches!(session.status(), Err(DriverError::ResponseTimeout)));
}

#[test]
fn test_serial_number_round_trip() {
    let mock = MockHandle::new();
    mock.reply_when("AT+CGSN?", &[b"+CGSN=E78-0042\r\n"]);

    let session = open(&mock);
    assert_eq!(session.serial_number().expect("serial reply"), "E78-0042");
    wait_until(Duration::from_secs(1), || session.inbox().is_empty());
}

#[test]
fn test_config_setters_write_expected_lines() {
    let mock = MockHandle::new();
    let session = open(&mock);

    session.set_data_rate(DataRate::Sf9).expect("data rate accepted");
    session.set_upstream_port(10).expect("port accepted");
    session.set_confirmation(true).expect("confirmation accepted");
    session.set_dev_eui("0011223344556677").expect("dev EUI accepted");

    let written = mock.written();
    assert!(written.contains(&"AT+CDATARATE=3".to_string()));
    assert!(written.contains(&"AT+CAPPPORT=10".to_string()));
    assert!(written.contains(&"AT+CCONFIRM=1".to_string()));
    assert!(written.contains(&"AT+CDEVEUI=0011223344556677".to_string()));
}

#[test]
fn test_invalid_arguments_fail_before_any_write() {
    let mock = MockHandle::new();
    let session = open(&mock);

    assert!(session.set_dev_eui("1234").is_err());
    assert!(session.set_app_eui("00112233445566778899").is_err());
    assert!(session.set_app_key("deadbeef").is_err());
    assert!(session.set_upstream_port(224).is_err());
    assert!(session.set_trial_count(16).is_err());

    assert!(mock.written().is_empty());
}

#[test]
fn test_setters_rejected_after_join() {
    let mock = MockHandle::new();
    let mut session = open(&mock);
    join(&mut session, &mock);

    assert!(matches!(session.set_data_rate(DataRate::Sf7), Err(DriverError::AlreadyJoined)));
    assert!(matches!(session.set_dev_eui("0011223344556677"), Err(DriverError::AlreadyJoined)));
    assert!(matches!(
        session.set_downlink_callback(|_| {}),
        Err(DriverError::AlreadyJoined)
    ));
    assert!(!mock.wrote_containing("AT+CDATARATE"));
    assert!(!mock.wrote_containing("AT+CDEVEUI"));
}

#[test]
fn test_save_writes_pair_and_receiver_survives() {
    let mock = MockHandle::new();
    let session = open(&mock);

    session.save().expect("save succeeds");
    assert!(mock.wrote_containing("AT+CSAVE"));
    assert!(mock.wrote_containing("AT+IREBOOT=0"));

    // The framer was suspended around the reboot and must be reading again.
    mock.push_window(b"+CGSN=after-reboot\r\n");
    wait_until(Duration::from_secs(1), || {
        session.inbox().snapshot() == vec!["+CGSN=after-reboot".to_string()]
    });
}

#[test]
fn test_downlink_reaches_callback_not_inbox() {
    let mock = MockHandle::new();
    let mut session = open(&mock);

    let payloads = Arc::new(Mutex::new(Vec::new()));
    {
        let payloads = payloads.clone();
        session
            .set_downlink_callback(move |p| payloads.lock().push(p.to_string()))
            .expect("callback registered");
    }

    mock.push_window(b"+DRX:beef\r\n");
    wait_until(Duration::from_secs(1), || !payloads.lock().is_empty());

    assert_eq!(payloads.lock().clone(), vec!["beef".to_string()]);
    assert!(session.inbox().is_empty());
}
