//! Logging utilities
//!
//! The library logs through the `log` facade; binaries call [`init`] once.

pub use log::{debug, error, info, trace, warn};

/// Initialize env_logger with `default_level` unless `RUST_LOG` overrides it
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    // A second init (tests, embedding) keeps the first logger
    let _ = env_logger::Builder::from_env(env).format_timestamp_millis().try_init();
}

/// Log an unrecoverable error
pub fn fatal(message: &str) {
    log::error!("FATAL: {}", message);
}
