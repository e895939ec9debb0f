use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::time_slot::parse_clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Held,
    Cancelled,
    NoEntry,
}

impl SessionStatus {
    /// Unknown codes count as "no entry".
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "held" => SessionStatus::Held,
            "cancelled" => SessionStatus::Cancelled,
            _ => SessionStatus::NoEntry,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SessionStatus::Held => "held",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoEntry => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Held => "Class Taken",
            SessionStatus::Cancelled => "Class Missed",
            SessionStatus::NoEntry => "No Entry",
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            SessionStatus::Held => "#28a745",
            SessionStatus::Cancelled => "#dc3545",
            SessionStatus::NoEntry => "#6c757d",
        }
    }
}

/// Per-day attendance counts. Absent fields read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCounts {
    #[serde(default, rename = "total_held", alias = "held")]
    pub held: u32,
    #[serde(default, rename = "total_cancelled", alias = "cancelled")]
    pub cancelled: u32,
    #[serde(default, alias = "noData")]
    pub no_data: u32,
}

impl AttendanceCounts {
    pub fn new(held: u32, cancelled: u32, no_data: u32) -> Self {
        Self {
            held,
            cancelled,
            no_data,
        }
    }

    pub fn record(&mut self, status: SessionStatus) {
        match status {
            SessionStatus::Held => self.held += 1,
            SessionStatus::Cancelled => self.cancelled += 1,
            SessionStatus::NoEntry => self.no_data += 1,
        }
    }

    pub fn from_details(details: &[LectureDetail]) -> Self {
        let mut counts = Self::default();
        for detail in details {
            counts.record(detail.status());
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub held: u32,
    pub cancelled: u32,
    pub no_data: u32,
    pub total: u32,
}

impl ReportTotals {
    /// `(label, value)` rows of the summary table.
    pub fn summary_rows(&self) -> [(&'static str, u32); 4] {
        [
            ("Total Classes Held", self.held),
            ("Total Classes Cancelled", self.cancelled),
            ("Total No Data", self.no_data),
            ("Total Classes", self.total),
        ]
    }
}

pub fn aggregate<'a, I>(records: I) -> ReportTotals
where
    I: IntoIterator<Item = &'a AttendanceCounts>,
{
    let mut totals = records
        .into_iter()
        .fold(ReportTotals::default(), |mut acc, counts| {
            acc.held += counts.held;
            acc.cancelled += counts.cancelled;
            acc.no_data += counts.no_data;
            acc
        });
    totals.total = totals.held + totals.cancelled + totals.no_data;
    totals
}

/// One scheduled lecture on a concrete date, joined with its session status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecture_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u32>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub semester: Option<u32>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub batch_year: Option<i32>,
    #[serde(default)]
    pub batch_section: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl LectureDetail {
    pub fn status(&self) -> SessionStatus {
        SessionStatus::from_code(&self.status)
    }

    /// `"9:00am - 10:30am"`.
    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            format_time_12h(self.start_time.as_deref().unwrap_or_default()),
            format_time_12h(self.end_time.as_deref().unwrap_or_default())
        )
    }

    pub fn batch_label(&self) -> Option<String> {
        let year = self.batch_year.map(|y| y.to_string()).unwrap_or_default();
        let label = format!(
            "{} {} {}",
            self.course_name.as_deref().unwrap_or_default(),
            year,
            self.batch_section.as_deref().unwrap_or_default()
        );
        let label = label.trim();
        (!label.is_empty()).then(|| label.to_string())
    }
}

/// Optional filters of an attendance query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceFilters {
    #[serde(default)]
    pub course_id: Option<u32>,
    #[serde(default)]
    pub faculty_id: Option<u32>,
    #[serde(default)]
    pub semester: Option<u32>,
}

/// Attendance of one date within a range query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub details: Vec<LectureDetail>,
    #[serde(flatten)]
    pub counts: AttendanceCounts,
}

impl DayRecord {
    pub fn from_details(date: NaiveDate, details: Vec<LectureDetail>) -> Self {
        let counts = AttendanceCounts::from_details(&details);
        Self {
            date,
            details,
            counts,
        }
    }
}

pub fn range_totals(records: &[DayRecord]) -> ReportTotals {
    aggregate(records.iter().map(|record| &record.counts))
}

/// Counts statuses per date; dates without sessions are absent.
pub fn summarize_statuses<'a, I>(sessions: I) -> BTreeMap<NaiveDate, AttendanceCounts>
where
    I: IntoIterator<Item = (NaiveDate, &'a str)>,
{
    let mut summary: BTreeMap<NaiveDate, AttendanceCounts> = BTreeMap::new();
    for (date, status) in sessions {
        summary
            .entry(date)
            .or_default()
            .record(SessionStatus::from_code(status));
    }
    summary
}

/// `"14:05"` → `"2:05pm"`. Empty input stays empty; unparseable input is
/// returned trimmed.
pub fn format_time_12h(time: &str) -> String {
    let trimmed = time.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match parse_clock(trimmed) {
        Some(minutes) => {
            let hours = minutes / 60;
            let suffix = if hours >= 12 { "pm" } else { "am" };
            let display_hour = match hours % 12 {
                0 => 12,
                h => h,
            };
            format!("{}:{:02}{}", display_hour, minutes % 60, suffix)
        }
        None => trimmed.to_string(),
    }
}
