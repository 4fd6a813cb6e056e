//! Tests for `src/logging.rs`.

use huddle::config::LoggingConfig;
use huddle::logging::{LoggingGuard, LOG_FILE_PREFIX};

#[test]
fn logging_guard_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<LoggingGuard>();
}

#[test]
fn log_file_prefix_names_the_crate() {
    assert!(LOG_FILE_PREFIX.starts_with("huddle"));
}

#[test]
fn init_file_creates_logs_dir() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let logs_dir = tmp.path().join("logs");
    assert!(!logs_dir.exists());

    // Only one global subscriber can be installed per process, so the
    // result may be an error; the directory is created either way.
    let _result = huddle::logging::init_file(&logs_dir, "info");
    assert!(logs_dir.exists(), "logs directory should be created");
}

#[test]
fn console_mode_returns_no_guard() {
    let config = LoggingConfig::default();
    let guard = huddle::logging::init_from_config(&config).expect("console logging never fails");
    assert!(guard.is_none());
}
