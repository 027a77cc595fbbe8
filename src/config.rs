use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One line of the visible log: when it was normalized and what it says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLogEntry {
    pub timestamp: String,
    pub text: String,
}

impl DisplayLogEntry {
    pub fn render(&self) -> String {
        format!("[{}] {}", self.timestamp, self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunKind {
    Verify,
    Generate,
}

/// Identity of one run. Tokens from before a reset no longer match the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunToken(pub(crate) u64);
