//! Wall-clock parsing and ordering of time-slot labels.
//!
//! A slot label has the form `"HH:MM-HH:MM"`. Slots are ordered by their start
//! time in minutes since midnight. A start time that cannot be parsed sorts as
//! `00:00`; such slots stay in the universe but report `is_well_formed() == false`
//! so callers can reject or surface them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Digits only; `str::parse` alone would accept a leading `+`.
fn clock_field(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Parses `H:MM`, `HH:MM` or `HH:MM:SS` into minutes since midnight.
pub fn parse_clock(time: &str) -> Option<u32> {
    let mut parts = time.trim().split(':');
    let hours = clock_field(parts.next()?)?;
    let minutes_str = parts.next()?;
    if minutes_str.len() != 2 {
        return None;
    }
    let minutes = clock_field(minutes_str)?;
    if let Some(seconds) = parts.next() {
        clock_field(seconds).filter(|s| *s < 60)?;
    }
    if parts.next().is_some() || hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Minutes since midnight, with missing or malformed input mapped to `0`.
pub fn to_minutes(time: &str) -> u32 {
    parse_clock(time).unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct TimeSlot {
    start: String,
    end: String,
    start_minutes: Option<u32>,
}

impl TimeSlot {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        let start = start.into();
        let start_minutes = parse_clock(&start);
        Self {
            start,
            end: end.into(),
            start_minutes,
        }
    }

    /// Splits a `"start-end"` label at the first dash. A label without a dash
    /// becomes a slot with an empty end.
    pub fn parse(label: &str) -> Self {
        match label.split_once('-') {
            Some((start, end)) => Self::new(start, end),
            None => Self::new(label, ""),
        }
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Ordering key; malformed starts sort at the start of the day.
    pub fn start_minutes(&self) -> u32 {
        self.start_minutes.unwrap_or(0)
    }

    pub fn end_minutes(&self) -> Option<u32> {
        parse_clock(&self.end)
    }

    pub fn is_well_formed(&self) -> bool {
        self.start_minutes.is_some() && self.end_minutes().is_some()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl From<String> for TimeSlot {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for TimeSlot {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<TimeSlot> for String {
    fn from(value: TimeSlot) -> Self {
        value.label()
    }
}

/// Deduplicates by label, keeping the first occurrence, then sorts ascending by
/// start minute. The sort is stable, so slots sharing a start keep their order.
pub fn normalize_slots<I>(slots: I) -> Vec<TimeSlot>
where
    I: IntoIterator<Item = TimeSlot>,
{
    let mut seen = HashSet::new();
    let mut unique: Vec<TimeSlot> = slots
        .into_iter()
        .filter(|slot| seen.insert(slot.label()))
        .collect();
    unique.sort_by_key(TimeSlot::start_minutes);
    unique
}

/// String-label convenience over [`normalize_slots`].
pub fn normalize<I, S>(labels: I) -> Vec<TimeSlot>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    normalize_slots(labels.into_iter().map(|label| TimeSlot::parse(label.as_ref())))
}

/// Labels of the slots whose start or end could not be parsed.
pub fn malformed_labels(slots: &[TimeSlot]) -> Vec<String> {
    slots
        .iter()
        .filter(|slot| !slot.is_well_formed())
        .map(TimeSlot::label)
        .collect()
}
