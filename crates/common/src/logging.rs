//! Tracing setup for Viewfinder binaries.
//!
//! Console output follows the configured level filter (overridable via
//! `RUST_LOG`). When `LoggingConfig.file` is set, log lines go to that
//! file instead, appended across runs so a crash does not erase the
//! previous session's trail.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber from `config`.
///
/// Repeated calls keep the first subscriber; later ones are ignored.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let log_file = config.file.as_ref().and_then(|path| match open_log_file(path) {
        Ok(file) => Some(Arc::new(file)),
        Err(e) => {
            eprintln!("viewfinder: cannot open log file {}: {e}", path.display());
            None
        }
    });

    match (config.json, log_file) {
        (true, Some(file)) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .with_writer(file)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (true, None) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (false, Some(file)) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (false, None) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
    }
}

/// Open the log file in append mode, creating parent directories.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_file_is_created_then_appended_across_opens() {
        let path = std::env::temp_dir().join(format!(
            "viewfinder-logs-{}/session.log",
            std::process::id()
        ));
        std::fs::remove_file(&path).ok();

        {
            let mut file = open_log_file(&path).unwrap();
            writeln!(file, "first run").unwrap();
        }
        {
            let mut file = open_log_file(&path).unwrap();
            writeln!(file, "second run").unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first run\nsecond run\n");

        std::fs::remove_file(&path).ok();
        if let Some(parent) = path.parent() {
            std::fs::remove_dir(parent).ok();
        }
    }
}
