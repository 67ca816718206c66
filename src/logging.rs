//! Tracing configuration and log routing.
//!
//! Every event goes to stdout through a compact formatter and is mirrored, without ANSI colors,
//! to an append-only log file. The file path comes from [`Config::log_file`] and falls back to
//! `logs/students.log`; missing parent directories are created. The file writer is non‑blocking
//! so request handlers never wait on disk I/O.
//!
//! [`Config::log_file`]: crate::config::Config::log_file
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_PATH: &str = "logs/students.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` controls filtering (default `info`).
///
/// Must run after `.env` has been loaded, otherwise `RUST_LOG` from that file is not seen. When
/// the log file cannot be opened the service keeps running with stdout logging only.
pub fn init_tracing(log_file: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let path = log_path(log_file);
    let file_layer = match open_log_file(&path) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(non_blocking(file))
                .with_target(true)
                .with_ansi(false)
                .compact(),
        ),
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

fn log_path(log_file: Option<&str>) -> PathBuf {
    log_file
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH))
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

// The guard flushes buffered lines on drop, so it lives for the whole process.
fn non_blocking(file: File) -> NonBlocking {
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    writer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn configured_path_overrides_default() {
        assert_eq!(log_path(None), PathBuf::from("logs/students.log"));
        assert_eq!(
            log_path(Some("/tmp/registry/custom.log")),
            PathBuf::from("/tmp/registry/custom.log")
        );
    }

    #[test]
    fn log_file_is_created_with_missing_parents_and_appended() {
        let dir = std::env::temp_dir().join(format!("student-registry-log-{}", std::process::id()));
        let path = dir.join("nested").join("custom.log");
        let _ = std::fs::remove_dir_all(&dir);

        let mut file = open_log_file(&path).expect("open new log file");
        writeln!(file, "first").expect("write");
        drop(file);
        let mut file = open_log_file(&path).expect("reopen log file");
        writeln!(file, "second").expect("write");
        drop(file);

        let contents = std::fs::read_to_string(&path).expect("read log file");
        assert_eq!(contents, "first\nsecond\n");
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }
}
