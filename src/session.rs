//! Host side of a run: owns the buffer, stamps entries, and turns run
//! outcomes into the notices the user sees at the end of a run.

use crate::buffer::LogBuffer;
use crate::config::{DisplayLogEntry, RunKind, RunToken};
use crate::normalizer::{Clock, SystemClock, ingest};
use chrono::{DateTime, Local};
use crossbeam::channel::Receiver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed(String),
    /// The engine could not be driven at all (spawn failure, broken pipe).
    Crashed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Line(String),
    Finished(RunOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub run: RunToken,
    pub kind: EventKind,
}

impl EngineEvent {
    pub fn line(run: RunToken, raw: impl Into<String>) -> Self {
        Self {
            run,
            kind: EventKind::Line(raw.into()),
        }
    }

    pub fn finished(run: RunToken, outcome: RunOutcome) -> Self {
        Self {
            run,
            kind: EventKind::Finished(outcome),
        }
    }
}

pub struct Session<C: Clock = SystemClock> {
    buffer: LogBuffer,
    clock: C,
    kind: RunKind,
    last_instant: Option<DateTime<Local>>,
}

impl Session<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            buffer: LogBuffer::new(),
            clock,
            kind: RunKind::Generate,
            last_instant: None,
        }
    }

    /// Clears the log and starts a new run. Events carrying an older token
    /// are ignored from here on.
    pub fn begin_run(&mut self, kind: RunKind) -> RunToken {
        let run = self.buffer.reset();
        self.kind = kind;
        self.last_instant = None;
        tracing::info!(?run, ?kind, "run started");
        if kind == RunKind::Verify {
            self.push("Starting...");
        }
        run
    }

    pub fn handle(&mut self, event: EngineEvent) -> Option<&DisplayLogEntry> {
        let current = self.buffer.current();
        if event.run != current {
            tracing::debug!(stale = ?event.run, ?current, "discarding event from finished run");
            return None;
        }
        match event.kind {
            EventKind::Line(raw) => self.push(&raw),
            EventKind::Finished(outcome) => {
                tracing::info!(run = ?current, ?outcome, "run finished");
                let notice = self.outcome_notice(&outcome)?;
                self.push(&notice)
            }
        }
    }

    /// Handles events until every sender is gone, passing each new entry to
    /// `sink`. Returns how many entries were produced.
    pub fn pump<F>(&mut self, rx: &Receiver<EngineEvent>, mut sink: F) -> anyhow::Result<usize>
    where
        F: FnMut(&DisplayLogEntry) -> anyhow::Result<()>,
    {
        let mut produced = 0;
        for event in rx.iter() {
            if let Some(entry) = self.handle(event) {
                sink(entry)?;
                produced += 1;
            }
        }
        Ok(produced)
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    // A successful generate run ends silently; its last engine line says
    // what was saved.
    fn outcome_notice(&self, outcome: &RunOutcome) -> Option<String> {
        match (outcome, self.kind) {
            (RunOutcome::Succeeded, RunKind::Verify) => Some("SUCCESS! Verif Pending.".to_string()),
            (RunOutcome::Succeeded, RunKind::Generate) => None,
            (RunOutcome::Failed(message), RunKind::Verify) => Some(format!("FAILED: {message}")),
            (RunOutcome::Failed(message), RunKind::Generate) => Some(format!("Failed: {message}")),
            (RunOutcome::Crashed(err), RunKind::Verify) => Some(format!("SYS ERROR: {err}")),
            (RunOutcome::Crashed(err), RunKind::Generate) => Some(format!("Error: {err}")),
        }
    }

    fn push(&mut self, raw: &str) -> Option<&DisplayLogEntry> {
        let run = self.buffer.current();
        let now = self.monotonic_now();
        let entry = ingest(raw, self.buffer.last(), now)?;
        if let Err(err) = self.buffer.append(run, entry) {
            tracing::debug!(%err, "entry not appended");
            return None;
        }
        self.last_instant = Some(now);
        self.buffer.last()
    }

    // Wall clock can step backwards; entries within a run never do.
    fn monotonic_now(&self) -> DateTime<Local> {
        let now = self.clock.now();
        match self.last_instant {
            Some(prev) if now < prev => prev,
            _ => now,
        }
    }
}

impl Default for Session<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}
