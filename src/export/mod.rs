//! Export tables and attendance report documents.
//!
//! A report is a list of titled tables plus header and footer lines. Layout and
//! emission belong to a [`ReportRenderer`]; the bundled renderers produce boxed
//! text and CSV, and a PDF engine can be plugged in behind the same trait.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

use crate::config::Semester;
use crate::error::TimetableResult;
use crate::merge::{MergedTimetable, RowCell};
use crate::reference::{PLACEHOLDER, ReferenceIndices};
use crate::report::{
    AttendanceFilters, DayRecord, LectureDetail, ReportTotals, SessionStatus, range_totals,
};

pub mod delimited;
pub mod text;

pub use delimited::CsvRenderer;
pub use text::{TextRenderer, render_dataframe};

pub const DETAIL_HEADERS: [&str; 8] = [
    "Subject", "Faculty", "Time", "Course", "Semester", "Room", "Batch", "Status",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Column holding raw status codes, if any.
    pub status_column: Option<usize>,
}

impl ExportTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            status_column: None,
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn lecture_details(details: &[LectureDetail]) -> Self {
        let mut table = Self::new(DETAIL_HEADERS);
        table.status_column = Some(DETAIL_HEADERS.len() - 1);
        for detail in details {
            table.push_row(detail_row(detail));
        }
        table
    }

    /// Detail rows of every day, each prefixed with its date.
    pub fn daily_details(records: &[DayRecord]) -> Self {
        let mut table = Self::new(std::iter::once("Date").chain(DETAIL_HEADERS));
        table.status_column = Some(DETAIL_HEADERS.len());
        for record in records {
            for detail in &record.details {
                let mut row = Vec::with_capacity(DETAIL_HEADERS.len() + 1);
                row.push(record.date.format("%Y-%m-%d").to_string());
                row.extend(detail_row(detail));
                table.push_row(row);
            }
        }
        table
    }

    pub fn summary(totals: &ReportTotals) -> Self {
        let mut table = Self::new(["Metric", "Count"]);
        for (label, value) in totals.summary_rows() {
            table.push_row(vec![label.to_string(), value.to_string()]);
        }
        table
    }

    /// Flattens a merged timetable: one row per day, one column per slot. A run
    /// head carries the lecture text; columns it spans over stay empty.
    pub fn timetable(merged: &MergedTimetable) -> Self {
        let mut table = Self::new(
            std::iter::once("Day / Time".to_string()).chain(merged.slots.iter().map(|s| s.label())),
        );
        for day in &merged.days {
            let mut row = Vec::with_capacity(merged.slots.len() + 1);
            row.push(day.to_string());
            for cell in merged.row(*day) {
                match cell {
                    RowCell::Lecture { span, run } => {
                        let mut text = format!(
                            "{} ({}) / {} / {}",
                            run.cell.subject, run.cell.code, run.cell.faculty, run.cell.room
                        );
                        if span > 1 {
                            text.push_str(&format!(" [{}]", run.time_range()));
                        }
                        row.push(text);
                        row.extend(std::iter::repeat_n(String::new(), span - 1));
                    }
                    RowCell::Free { .. } => row.push("No class".to_string()),
                }
            }
            table.push_row(row);
        }
        table
    }

    pub fn status_at(&self, row_idx: usize) -> Option<SessionStatus> {
        let column = self.status_column?;
        let row = self.rows.get(row_idx)?;
        Some(SessionStatus::from_code(row.get(column).map(String::as_str).unwrap_or("")))
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.headers.len());
        for (col_idx, header) in self.headers.iter().enumerate() {
            let values: Vec<&str> = self
                .rows
                .iter()
                .map(|row| row.get(col_idx).map(String::as_str).unwrap_or(""))
                .collect();
            columns.push(Series::new(header.as_str().into(), values).into_column());
        }
        DataFrame::new(columns)
    }
}

/// `(subject, faculty, time, course, semester, room, batch, raw status)`.
pub fn detail_row(detail: &LectureDetail) -> Vec<String> {
    let or_placeholder =
        |value: Option<&str>| value.filter(|v| !v.is_empty()).unwrap_or(PLACEHOLDER).to_string();
    vec![
        or_placeholder(detail.subject.as_deref()),
        or_placeholder(detail.faculty.as_deref()),
        detail.time_range(),
        or_placeholder(detail.course_name.as_deref()),
        detail
            .semester
            .map(|s| format!("Semester {s}"))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        or_placeholder(detail.room.as_deref()),
        detail
            .batch_label()
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        detail.status.clone(),
    ]
}

/// Lookups used to turn filter ids into readable labels.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub references: &'a ReferenceIndices,
    pub semesters: &'a [Semester],
}

impl ReportContext<'_> {
    /// `"Filters: Course: X, Faculty: Y"`; `None` when no filter is set.
    pub fn filters_line(&self, filters: &AttendanceFilters) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(id) = filters.course_id {
            let name = self
                .references
                .courses
                .get(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string());
            parts.push(format!("Course: {name}"));
        }
        if let Some(id) = filters.faculty_id {
            let name = self
                .references
                .faculties
                .get(id)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| id.to_string());
            parts.push(format!("Faculty: {name}"));
        }
        if let Some(number) = filters.semester {
            let name = self
                .semesters
                .iter()
                .find(|s| s.number == number)
                .map(Semester::label)
                .unwrap_or_else(|| number.to_string());
            parts.push(format!("Semester: {name}"));
        }
        (!parts.is_empty()).then(|| format!("Filters: {}", parts.join(", ")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub heading: String,
    pub table: ExportTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceReport {
    pub title: String,
    pub period: String,
    pub filters: Option<String>,
    pub sections: Vec<ReportSection>,
    pub footer: String,
    pub file_name: String,
}

const REPORT_TITLE: &str = "Attendance Calendar Report";

fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn footer(generated_on: NaiveDate) -> String {
    format!("Report generated on {}", generated_on.format("%-m/%-d/%Y"))
}

impl AttendanceReport {
    pub fn for_day(
        date: NaiveDate,
        details: &[LectureDetail],
        filters: &AttendanceFilters,
        context: &ReportContext<'_>,
        generated_on: NaiveDate,
    ) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            period: format!("Date: {}", long_date(date)),
            filters: context.filters_line(filters),
            sections: vec![ReportSection {
                heading: "Class Details".to_string(),
                table: ExportTable::lecture_details(details),
            }],
            footer: footer(generated_on),
            file_name: format!("Attendance_Report_{}.pdf", date.format("%Y-%m-%d")),
        }
    }

    pub fn for_range(
        start: NaiveDate,
        end: NaiveDate,
        records: &[DayRecord],
        filters: &AttendanceFilters,
        context: &ReportContext<'_>,
        generated_on: NaiveDate,
    ) -> Self {
        let totals = range_totals(records);
        Self {
            title: REPORT_TITLE.to_string(),
            period: format!("Date Range: {} to {}", long_date(start), long_date(end)),
            filters: context.filters_line(filters),
            sections: vec![
                ReportSection {
                    heading: "Summary".to_string(),
                    table: ExportTable::summary(&totals),
                },
                ReportSection {
                    heading: "Daily Details".to_string(),
                    table: ExportTable::daily_details(records),
                },
            ],
            footer: footer(generated_on),
            file_name: format!(
                "Attendance_Report_{}_to_{}.pdf",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
        }
    }
}

/// Adapter in front of a document engine.
pub trait ReportRenderer {
    type Output;

    fn render(&self, report: &AttendanceReport) -> TimetableResult<Self::Output>;
}
