//! Logging setup for bq-agent.
//!
//! One-shot runs (`--sql`, a single question) log to stderr so the JSON or
//! answer on stdout stays clean for piping. The stdin REPL logs to a file,
//! since its prompt and answers share the terminal with stderr.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: our own events at info, dependencies
/// (reqwest, hyper, rustls) only when they warn.
const DEFAULT_FILTER: &str = "warn,bq_agent=info";

const LOG_DIR_NAME: &str = "bq-agent";
const LOG_FILE_NAME: &str = "bq-agent.log";

/// Where log events are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Truncated at startup, one session per file.
    File(PathBuf),
}

impl LogSink {
    /// Picks the sink for a session.
    pub fn for_session(interactive: bool) -> Self {
        if interactive {
            Self::File(log_path())
        } else {
            Self::Stderr
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber for `sink`.
///
/// If the log file cannot be created, events go to stderr instead and a
/// warning records why.
pub fn init(sink: LogSink) {
    let path = match sink {
        LogSink::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();
            return;
        }
        LogSink::File(path) => path,
    };

    match open_log_file(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(file)
                .with_ansi(false)
                .init();
        }
        Err(e) => {
            init(LogSink::Stderr);
            tracing::warn!(path = %path.display(), error = %e, "Could not open log file");
        }
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// Log file location: the platform state dir, then the config dir, then temp.
pub fn log_path() -> PathBuf {
    log_path_from(dirs::state_dir(), dirs::config_dir())
}

fn log_path_from(state_dir: Option<PathBuf>, config_dir: Option<PathBuf>) -> PathBuf {
    match state_dir.or(config_dir) {
        Some(base) => base.join(LOG_DIR_NAME).join(LOG_FILE_NAME),
        None => std::env::temp_dir().join(LOG_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_runs_log_to_stderr() {
        assert_eq!(LogSink::for_session(false), LogSink::Stderr);
    }

    #[test]
    fn test_repl_logs_to_file() {
        match LogSink::for_session(true) {
            LogSink::File(path) => assert!(path.ends_with(LOG_FILE_NAME)),
            other => panic!("expected a file sink, got {:?}", other),
        }
    }

    #[test]
    fn test_state_dir_preferred_over_config_dir() {
        let path = log_path_from(
            Some(PathBuf::from("/state")),
            Some(PathBuf::from("/config")),
        );
        assert_eq!(path, PathBuf::from("/state/bq-agent/bq-agent.log"));

        let path = log_path_from(None, Some(PathBuf::from("/config")));
        assert_eq!(path, PathBuf::from("/config/bq-agent/bq-agent.log"));
    }

    #[test]
    fn test_temp_dir_fallback() {
        let path = log_path_from(None, None);
        assert_eq!(path, std::env::temp_dir().join("bq-agent.log"));
    }

    #[test]
    fn test_open_log_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(LOG_FILE_NAME);

        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
