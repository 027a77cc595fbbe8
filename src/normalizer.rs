use crate::config::DisplayLogEntry;
use crate::{parsers, rules};
use chrono::{DateTime, Local};

pub const TIME_FORMAT: &str = "%H:%M:%S";

pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Decodes, filters and rewrites one raw line. `None` means the line is noise.
pub fn normalize_text(raw: &str) -> Option<String> {
    let decoded = parsers::decode(raw);
    let text = rules::fix_glyphs(&decoded);
    if rules::should_drop(&text) {
        tracing::trace!(raw, "dropped");
        return None;
    }
    Some(rules::rewrite(&text).into_owned())
}

/// Maps one raw engine line to at most one display entry. Repeats of the
/// previous entry's text are suppressed.
pub fn ingest(
    raw: &str,
    last: Option<&DisplayLogEntry>,
    now: DateTime<Local>,
) -> Option<DisplayLogEntry> {
    let text = normalize_text(raw)?;
    if last.is_some_and(|prev| prev.text == text) {
        return None;
    }
    Some(DisplayLogEntry {
        timestamp: now.format(TIME_FORMAT).to_string(),
        text,
    })
}
