use std::io::{self, IsTerminal};

use anyhow::Result;
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    registry::LookupSpan,
};

/// Default directive when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Local timestamp, colored level, `file:line`, then the event fields.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        let timestamp = Local::now().format("%H:%M:%S%.3f");
        if ansi {
            write!(writer, "\x1b[2m{timestamp}\x1b[0m ")?;
        } else {
            write!(writer, "{timestamp} ")?;
        }

        let color = match *meta.level() {
            Level::ERROR => "\x1b[1;31m",
            Level::WARN => "\x1b[1;33m",
            Level::INFO => "\x1b[1;32m",
            Level::DEBUG => "\x1b[1;34m",
            Level::TRACE => "\x1b[1;35m",
        };
        if ansi {
            write!(writer, "{color}{:>5}\x1b[0m ", meta.level())?;
        } else {
            write!(writer, "{:>5} ", meta.level())?;
        }

        if *meta.level() >= Level::DEBUG {
            if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
                let file = file.strip_prefix("src/").unwrap_or(file);
                write!(writer, "{file}:{line} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Builds the filter from an explicit directive, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`].
///
/// Accepts a bare level ("warn") or any `EnvFilter` directive.
pub fn make_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("invalid log level '{level}': {e}")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs the global subscriber. Log lines go to stderr so command
/// output on stdout stays clean for piping.
///
/// Calling it twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = make_filter(level)?;

    let _ = tracing_subscriber::fmt()
        .with_ansi(io::stderr().is_terminal())
        .event_format(LocalFmt)
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_is_accepted() {
        assert!(make_filter(Some("debug")).is_ok());
        assert!(make_filter(Some("dealer_core=trace,sqlx=warn")).is_ok());
    }

    #[test]
    fn malformed_level_is_rejected() {
        let err = make_filter(Some("dealer_core=loud")).expect_err("Should reject directive");

        assert!(err.to_string().starts_with("invalid log level 'dealer_core=loud'"));
    }

    #[test]
    fn init_twice_is_harmless() {
        assert!(init_logging(Some("warn")).is_ok());
        assert!(init_logging(Some("warn")).is_ok());
    }
}
