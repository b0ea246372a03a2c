//! Logging setup for the CLI
//!
//! In MCP mode stdout carries the protocol, so logs go to a file under
//! `~/.firedocs`. Everywhere else they go to stderr.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = ".firedocs";
const DEFAULT_LOG_FILE: &str = "mcp.log";

/// A thread-safe writer that flushes and syncs every write
///
/// MCP servers are usually launched by a client that discards stderr, so the
/// log file is the only trace of what happened. Syncing on every write keeps
/// it complete even if the process is killed.
pub struct FileWriterGuard {
    file: Arc<Mutex<File>>,
}

impl FileWriterGuard {
    /// Creates a new `FileWriterGuard` wrapping the given file
    pub fn new(file: Arc<Mutex<File>>) -> Self {
        Self { file }
    }

    fn file(&self) -> MutexGuard<'_, File> {
        self.file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Write for FileWriterGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut file = self.file();
        let written = file.write(buf)?;
        file.flush()?;
        file.sync_all()?;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut file = self.file();
        file.flush()?;
        file.sync_all()
    }
}

/// Path of the MCP-mode log file, honoring `FIREDOCS_LOG_FILE`
pub fn mcp_log_path() -> PathBuf {
    let log_dir = dirs::home_dir()
        .map(|home| home.join(LOG_DIR))
        .unwrap_or_else(|| PathBuf::from(LOG_DIR));
    let file_name =
        std::env::var("FIREDOCS_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    log_dir.join(file_name)
}

/// `RUST_LOG` when set, otherwise everything at `level` and above
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
    })
}

fn open_log_file(path: &PathBuf) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber
pub fn init(level: Level, is_mcp_mode: bool) {
    if is_mcp_mode {
        let log_file = mcp_log_path();
        match open_log_file(&log_file) {
            Ok(file) => {
                let shared = Arc::new(Mutex::new(file));
                tracing_subscriber::fmt()
                    .with_writer(move || FileWriterGuard::new(shared.clone()))
                    .with_env_filter(env_filter(level))
                    .with_ansi(false)
                    .init();
                return;
            }
            Err(e) => {
                eprintln!(
                    "Failed to open log file {}, logging to stderr: {}",
                    log_file.display(),
                    e
                );
            }
        }
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(level))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_writer_guard_appends_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.log");
        let file = open_log_file(&path).unwrap();
        let shared = Arc::new(Mutex::new(file));

        let mut first = FileWriterGuard::new(shared.clone());
        let mut second = FileWriterGuard::new(shared);
        first.write_all(b"one\n").unwrap();
        second.write_all(b"two\n").unwrap();
        second.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("mcp.log");
        open_log_file(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    #[serial]
    fn test_log_file_name_override() {
        std::env::set_var("FIREDOCS_LOG_FILE", "custom.log");
        let path = mcp_log_path();
        std::env::remove_var("FIREDOCS_LOG_FILE");
        assert_eq!(path.file_name().unwrap(), "custom.log");
        assert_eq!(
            path.parent().unwrap().file_name().unwrap(),
            LOG_DIR
        );
    }
}
