//! Observable reports about degraded upstream data.

use std::collections::VecDeque;

use parking_lot::Mutex;
pub use tirtha_boundary::{Diagnostic, Issue, RecordKind};

pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Writes every diagnostic to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        log_diagnostic(&diagnostic);
    }
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    if diagnostic.is_fallback() {
        log::warn!("Degraded {diagnostic}");
    } else {
        log::debug!("Incomplete {diagnostic}");
    }
}

/// Logs diagnostics and keeps the most recent ones for inspection.
#[derive(Debug)]
pub struct RecordingSink {
    capacity: usize,
    recent: Mutex<VecDeque<Diagnostic>>,
}

impl RecordingSink {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            recent: Mutex::new(VecDeque::new()),
        }
    }

    pub fn recent(&self) -> Vec<Diagnostic> {
        self.recent.lock().iter().cloned().collect()
    }

    pub fn filter_by_record(&self, record: RecordKind) -> Vec<Diagnostic> {
        self.recent
            .lock()
            .iter()
            .filter(|d| d.record == record)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.recent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.lock().is_empty()
    }

    pub fn clear(&self) {
        self.recent.lock().clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl DiagnosticsSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        log_diagnostic(&diagnostic);
        let mut recent = self.recent.lock();
        while recent.len() >= self.capacity {
            recent.pop_front();
        }
        recent.push_back(diagnostic);
    }
}
