/// Test helpers shared by the unit tests (log capture, mock native objects)

use crate::log::{LogEntry, LogSeverity, Logger, StateCacheLog};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Logger that stores every entry it receives
#[derive(Clone, Default)]
pub(crate) struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    /// Install a fresh capture logger globally and open the severity filter
    pub(crate) fn install() -> Self {
        let capture = Self::default();
        StateCacheLog::set_logger(capture.clone());
        StateCacheLog::set_min_severity(LogSeverity::Trace);
        capture
    }

    pub(crate) fn uninstall() {
        StateCacheLog::reset_logger();
        StateCacheLog::set_min_severity(LogSeverity::Info);
    }

    pub(crate) fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub(crate) fn count(&self, severity: LogSeverity) -> usize {
        self.entries().iter().filter(|e| e.severity == severity).count()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

/// Stand-in for a native object; counts how many instances were destroyed
#[derive(Debug)]
pub(crate) struct MockNative {
    pub(crate) id: u32,
    destroyed: Arc<AtomicUsize>,
}

impl Drop for MockNative {
    fn drop(&mut self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory producing `MockNative` objects with increasing ids
#[derive(Default)]
pub(crate) struct MockFactory {
    next_id: AtomicU32,
    created: AtomicUsize,
    destroyed: Arc<AtomicUsize>,
}

impl MockFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn create(&self) -> MockNative {
        self.created.fetch_add(1, Ordering::SeqCst);
        MockNative {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            destroyed: Arc::clone(&self.destroyed),
        }
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub(crate) fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}
