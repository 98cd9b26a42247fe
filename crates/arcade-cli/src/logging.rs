//! Logging configuration with rolling file appender
//!
//! Console output goes to stderr so command output on stdout stays clean.
//! Log files are stored under the platform data dir in `arcade/logs/`.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "info,arcade_core=debug,arcade_cli=debug";

pub fn logs_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.data_dir().join("arcade").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Console plus daily rolling file output. `RUST_LOG` overrides the filter;
/// `verbose` lowers the console threshold to debug.
pub fn init_logging(verbose: bool) -> tracing_appender::non_blocking::WorkerGuard {
    let logs_dir = logs_dir();

    if let Err(e) = std::fs::create_dir_all(&logs_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "arcade-cli.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr.with_max_level(console_level))
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_targets_workspace_crates() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        let targets: Vec<&str> = DEFAULT_FILTER
            .split(',')
            .filter_map(|directive| directive.split_once('=').map(|(target, _)| target))
            .collect();
        assert_eq!(targets, vec!["arcade_core", "arcade_cli"]);
        assert!(targets.contains(&module_path!().split("::").next().unwrap_or_default()));
    }
}
