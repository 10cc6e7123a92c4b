//! Stderr logger for binaries and tests.
//!
//! Records are printed as `[elapsed LEVEL target] message`. Install it once
//! at startup with [`init_with_level`]; with the `tracing` feature,
//! [`init_tracing`] sets up a `tracing-subscriber` instead and forwards `log`
//! records into it.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn format(&self, record: &Record) -> String {
        format!(
            "[{:7.3}s {:>5} {}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = writeln!(std::io::stderr().lock(), "{}", self.format(record));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<&'static StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calls after the first successful one leave the logger untouched. While
/// another logger holds the `log` slot, every call fails.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    install(&LOGGER, level, |logger| {
        log::set_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    })
}

/// Record `slot` only once `register` accepted the logger.
fn install<E>(
    slot: &OnceLock<&'static StderrLogger>,
    level: LevelFilter,
    register: impl FnOnce(&'static StderrLogger) -> Result<(), E>,
) -> Result<(), E> {
    if slot.get().is_some() {
        return Ok(());
    }
    let logger: &'static StderrLogger = Box::leak(Box::new(StderrLogger {
        level,
        started: Instant::now(),
    }));
    register(logger)?;
    let _ = slot.set(logger);
    Ok(())
}

/// Install a global `tracing` subscriber filtered by `RUST_LOG` (default
/// `info`) and route `log` records through it.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let _ = tracing_log::LogTracer::init();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    if json {
        let _ = tracing::subscriber::set_global_default(
            builder.json().flatten_event(true).finish(),
        );
    } else {
        let _ = tracing::subscriber::set_global_default(
            builder.with_timer(fmt::time::Uptime::default()).finish(),
        );
    }
}
