//! Logger setup.

use std::io::Write;

use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Record};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependencies whose debug output drowns the service's own logs.
const NOISY_TARGETS: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("reqwest", LevelFilter::Info),
];

/// Installs the global `env_logger` backend.
///
/// `RUST_LOG` is read first; `level` is then applied to this crate and as the
/// default, so `LOG_LEVEL` always decides the service's own verbosity.
/// `LogFormat::Json` writes one JSON object per line for log shippers.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=reqwest=debug LOG_LEVEL=debug page_analyzer
/// LOG_FORMAT=json page_analyzer
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (target, filter) in NOISY_TARGETS {
        builder.filter_module(target, *filter);
    }
    builder.filter_module(env!("CARGO_CRATE_NAME"), level);

    match format {
        LogFormat::Json => builder.format(|buf, record| writeln!(buf, "{}", json_line(record))),
        LogFormat::Plain => builder.format(|buf, record| writeln!(buf, "{}", plain_line(record))),
    };

    builder.try_init()?;
    Ok(())
}

/// `{"ts":..,"level":..,"target":..,"msg":..}` with a millisecond timestamp.
fn json_line(record: &Record<'_>) -> String {
    serde_json::json!({
        "ts": chrono::Utc::now().timestamp_millis(),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
    .to_string()
}

fn plain_line(record: &Record<'_>) -> String {
    format!(
        "{} {:>5} {} {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        paint(record.level()),
        record.target().dimmed(),
        record.args()
    )
}

fn paint(level: Level) -> ColoredString {
    let label = level.as_str();
    match level {
        Level::Error => label.red().bold(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_escapes_message() {
        let line = json_line(
            &Record::builder()
                .args(format_args!("fetch \"{}\" failed", "x"))
                .level(Level::Warn)
                .target("page_analyzer::fetch")
                .build(),
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "page_analyzer::fetch");
        assert_eq!(value["msg"], "fetch \"x\" failed");
        assert!(value["ts"].is_i64());
    }

    #[test]
    fn test_plain_line_contains_message() {
        let line = plain_line(
            &Record::builder()
                .args(format_args!("listening"))
                .level(Level::Info)
                .target("page_analyzer::server")
                .build(),
        );
        assert!(line.contains("listening"));
        assert!(line.contains("page_analyzer::server"));
    }

    #[test]
    fn test_second_init_is_an_error() {
        let _ = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let second = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(matches!(second, Err(InitializationError::LoggerError(_))));
    }
}
