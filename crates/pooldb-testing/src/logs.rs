//! Captured log output.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use pooldb_client::logging::BracketFormat;
use tracing::dispatcher::DefaultGuard;
use tracing::level_filters::LevelFilter;

/// Collects log records emitted on the current thread.
///
/// Records are formatted exactly as the application writes them. Capture
/// stops when the value is dropped. Async tests must run on the
/// current-thread runtime so every record is emitted on the installing
/// thread.
pub struct LogCapture {
    buffer: Buffer,
    _guard: DefaultGuard,
}

impl LogCapture {
    /// Capture everything from `TRACE` up.
    #[must_use]
    pub fn install() -> Self {
        Self::with_level(LevelFilter::TRACE)
    }

    /// Capture records at `level` and above.
    #[must_use]
    pub fn with_level(level: LevelFilter) -> Self {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(BracketFormat::new())
            .with_writer(move || writer.clone())
            .with_max_level(level)
            .finish();

        Self {
            buffer,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    /// Everything captured so far.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.0.lock()).into_owned()
    }

    /// Captured lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Whether any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }

    /// Lines containing both `[LEVEL]` and `needle`.
    #[must_use]
    pub fn count(&self, level: &str, needle: &str) -> usize {
        let tag = format!("[{level}]");
        self.lines()
            .iter()
            .filter(|line| line.contains(&tag) && line.contains(needle))
            .count()
    }
}

impl std::fmt::Debug for LogCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogCapture")
            .field("lines", &self.lines().len())
            .finish()
    }
}

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_formatted_records() {
        let logs = LogCapture::install();
        tracing::error!(alias = "default", "no active connection pool");

        assert_eq!(logs.count("ERROR", "no active connection pool"), 1);
        assert!(logs.contains("alias=\"default\""));
    }

    #[test]
    fn test_level_threshold() {
        let logs = LogCapture::with_level(LevelFilter::WARN);
        tracing::info!("connection pool created");
        tracing::warn!("no open connection pools to close");

        assert_eq!(logs.lines().len(), 1);
    }
}
