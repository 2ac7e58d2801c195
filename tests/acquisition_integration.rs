//! Integration tests for the acquisition backend
//!
//! These tests drive the real backend thread with the mock instrument:
//! - Run start/stop and the session lifecycle
//! - Data-file contents after a run
//! - Graceful handling of a closed display sink
//! - Clean shutdown

use std::thread;
use std::time::{Duration, Instant};
use thermovis_rs::backend::{AcquisitionBackend, BackendMessage, FrontendLink};
use thermovis_rs::config::AppConfig;
use thermovis_rs::session::log_writer::HEADER;
use thermovis_rs::types::{RunOutcome, SessionState, StopReason};

/// Configuration for fast test runs on the mock instrument
fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.instrument.use_mock = true;
    config.acquisition.poll_interval_ms = 5;
    config.acquisition.heating_rate_window = 3;
    config
}

/// Collect messages until the predicate matches one, or panic on timeout
fn wait_for<F>(link: &FrontendLink, timeout: Duration, mut predicate: F) -> Vec<BackendMessage>
where
    F: FnMut(&BackendMessage) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();
    let mut done = false;
    while Instant::now() < deadline {
        for msg in link.drain() {
            done |= predicate(&msg);
            seen.push(msg);
        }
        if done {
            return seen;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!("timed out waiting for a backend message; saw {:?}", seen);
}

#[test]
fn test_backend_shutdown_joins() {
    let (backend, link) = AcquisitionBackend::new(test_config());
    let handle = thread::spawn(move || backend.run());

    link.shutdown();
    assert!(handle.join().is_ok(), "backend thread should exit cleanly");
}

#[test]
fn test_full_run_writes_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.dat");

    let config = test_config();
    let (backend, link) = AcquisitionBackend::new(config.clone());
    let handle = thread::spawn(move || backend.run());

    link.start(Some(path.clone()), config.instrument.clone());
    wait_for(&link, Duration::from_secs(5), |msg| {
        matches!(msg, BackendMessage::SessionState(SessionState::Running))
    });

    // Let a handful of samples come in, then stop
    let messages = wait_for(&link, Duration::from_secs(5), {
        let mut samples = 0;
        move |msg| {
            if matches!(msg, BackendMessage::Sample(_)) {
                samples += 1;
            }
            samples >= 5
        }
    });
    let samples: Vec<_> = messages
        .iter()
        .filter_map(|msg| match msg {
            BackendMessage::Sample(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    for pair in samples.windows(2) {
        assert!(pair[1].elapsed >= pair[0].elapsed, "elapsed must be monotonic");
    }

    link.stop(StopReason::Manual);
    wait_for(&link, Duration::from_secs(5), |msg| {
        matches!(msg, BackendMessage::RunFinished(RunOutcome::Stopped))
    });

    link.shutdown();
    handle.join().unwrap();

    // The file holds the header plus one row per sample
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], HEADER);
    assert!(lines.len() >= 6, "expected at least five data rows");
    for line in &lines[1..] {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 4, "row {:?}", line);
        fields[1].parse::<f64>().unwrap();
        fields[2].parse::<f64>().unwrap();
        fields[3].parse::<f64>().unwrap();
    }
}

#[test]
fn test_heating_rate_appears_after_window() {
    let config = test_config();
    let (backend, link) = AcquisitionBackend::new(config.clone());
    let handle = thread::spawn(move || backend.run());

    link.start(None, config.instrument.clone());
    wait_for(&link, Duration::from_secs(5), |msg| {
        matches!(msg, BackendMessage::HeatingRate(_))
    });

    link.stop(StopReason::Manual);
    link.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_display_closed_outcome_is_distinct() {
    let config = test_config();
    let (backend, link) = AcquisitionBackend::new(config.clone());
    let handle = thread::spawn(move || backend.run());

    link.start(None, config.instrument.clone());
    wait_for(&link, Duration::from_secs(5), |msg| {
        matches!(msg, BackendMessage::Sample(_))
    });

    link.stop(StopReason::DisplayClosed);
    let messages = wait_for(&link, Duration::from_secs(5), |msg| {
        matches!(msg, BackendMessage::RunFinished(_))
    });
    let outcome = messages
        .iter()
        .find_map(|msg| match msg {
            BackendMessage::RunFinished(o) => Some(o.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(outcome, RunOutcome::DisplayClosed);
    assert_ne!(outcome.status_message(), RunOutcome::Stopped.status_message());

    link.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_refresh_instruments_reports_mock() {
    let config = test_config();
    let (backend, link) = AcquisitionBackend::new(config);
    let handle = thread::spawn(move || backend.run());

    link.refresh_instruments();
    let messages = wait_for(&link, Duration::from_secs(5), |msg| {
        matches!(msg, BackendMessage::InstrumentList(_))
    });
    let list = messages
        .iter()
        .find_map(|msg| match msg {
            BackendMessage::InstrumentList(l) => Some(l.clone()),
            _ => None,
        })
        .unwrap();
    assert!(!list.is_empty());

    link.shutdown();
    handle.join().unwrap();
}
