use crate::config::{DisplayLogEntry, RunToken};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("entry belongs to run {stale:?}, buffer is on run {current:?}")]
    StaleRun { stale: RunToken, current: RunToken },
}

/// Append-only log for the current run. `reset` starts a new generation and
/// invalidates every token handed out before it.
#[derive(Debug, Default)]
pub struct LogBuffer {
    generation: u64,
    entries: Vec<DisplayLogEntry>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> RunToken {
        RunToken(self.generation)
    }

    pub fn reset(&mut self) -> RunToken {
        self.entries.clear();
        self.generation += 1;
        self.current()
    }

    pub fn append(&mut self, run: RunToken, entry: DisplayLogEntry) -> Result<(), BufferError> {
        if run != self.current() {
            return Err(BufferError::StaleRun {
                stale: run,
                current: self.current(),
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn last(&self) -> Option<&DisplayLogEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[DisplayLogEntry] {
        &self.entries
    }
}
