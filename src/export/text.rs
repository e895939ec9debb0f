use polars::prelude::{AnyValue, DataFrame};

use super::{AttendanceReport, ExportTable, ReportRenderer};
use crate::error::TimetableResult;

/// Renders reports as boxed plain-text tables.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    /// Replace raw status codes with their display labels.
    pub status_labels: bool,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self {
            status_labels: true,
        }
    }

    fn display_table(&self, table: &ExportTable) -> ExportTable {
        let mut display = table.clone();
        if let (true, Some(column)) = (self.status_labels, table.status_column) {
            for (row_idx, row) in display.rows.iter_mut().enumerate() {
                if let (Some(cell), Some(status)) = (row.get_mut(column), table.status_at(row_idx))
                {
                    *cell = status.label().to_string();
                }
            }
        }
        display
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer for TextRenderer {
    type Output = String;

    fn render(&self, report: &AttendanceReport) -> TimetableResult<String> {
        let mut out = String::new();
        out.push_str(&report.title);
        out.push('\n');
        out.push_str(&report.period);
        out.push('\n');
        if let Some(filters) = &report.filters {
            out.push_str(filters);
            out.push('\n');
        }
        for section in &report.sections {
            out.push('\n');
            out.push_str(&section.heading);
            out.push('\n');
            let df = self.display_table(&section.table).to_dataframe()?;
            out.push_str(&render_dataframe(&df));
        }
        out.push('\n');
        out.push_str(&report.footer);
        out.push('\n');
        Ok(out)
    }
}

fn cell_text(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

pub fn render_dataframe(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_line(&mut out, &col_names, &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_line(out: &mut String, values: &[String], widths: &[usize]) {
    out.push('|');
    for (value, width) in values.iter().zip(widths) {
        out.push(' ');
        out.push_str(value);
        let pad = width.saturating_sub(value.chars().count());
        out.push_str(&" ".repeat(pad));
        out.push_str(" |");
    }
    out.push('\n');
}
