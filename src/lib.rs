pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mapping;
pub mod request;

use log::{LevelFilter, Metadata, Record};

/// Minimal stderr logger that honors SPEECH_PROVIDER_LOG_LEVEL.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level().to_level_filter() <= log::max_level()
    }
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }
    fn flush(&self) {}
}

/// Initialize logging once based on the provided level string.
pub fn init_logging(level: Option<&str>) {
    let level = level.unwrap_or("info").to_ascii_lowercase();
    let filter = match level.as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(filter);
    }
}
