use std::fs::File;
use std::path::Path;
use tracing::info;

use super::{AttendanceReport, ExportTable, ReportRenderer};
use crate::error::TimetableResult;

/// Renders reports as CSV. Sections are written one after another, each as a
/// heading record, a header record and its rows, separated by an empty record.
/// Tables with a status column get an extra `Status Color` column.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    pub fn write_to_path<P: AsRef<Path>>(
        &self,
        report: &AttendanceReport,
        path: P,
    ) -> TimetableResult<()> {
        let bytes = self.render(report)?;
        std::fs::write(path.as_ref(), bytes)?;
        info!(path = %path.as_ref().display(), "wrote attendance report");
        Ok(())
    }
}

impl ReportRenderer for CsvRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &AttendanceReport) -> TimetableResult<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record([report.title.as_str()])?;
        writer.write_record([report.period.as_str()])?;
        if let Some(filters) = &report.filters {
            writer.write_record([filters.as_str()])?;
        }
        for section in &report.sections {
            writer.write_record([""])?;
            writer.write_record([section.heading.as_str()])?;
            write_table(&mut writer, &section.table)?;
        }
        writer.write_record([""])?;
        writer.write_record([report.footer.as_str()])?;
        Ok(writer.into_inner()?)
    }
}

fn write_table<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    table: &ExportTable,
) -> TimetableResult<()> {
    let mut header = table.headers.clone();
    if table.status_column.is_some() {
        header.push("Status Color".to_string());
    }
    writer.write_record(&header)?;
    for (row_idx, row) in table.rows.iter().enumerate() {
        let mut record = row.clone();
        if let Some(status) = table.status_at(row_idx) {
            record.push(status.color_hex().to_string());
        }
        writer.write_record(&record)?;
    }
    Ok(())
}

/// Writes a single table, e.g. a flattened timetable, as plain CSV.
pub fn write_table_csv<P: AsRef<Path>>(table: &ExportTable, path: P) -> TimetableResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), rows = table.rows.len(), "wrote export table");
    Ok(())
}
