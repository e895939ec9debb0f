//! Session state of the timetable page.
//!
//! The view owns the reference data, the current selection and the compiled
//! timetable of the last successful query. Failures are recorded as messages
//! for display; they never leave a half-built grid behind.

use chrono::Weekday;
use tracing::{info, warn};

use crate::config::AcademicConfig;
use crate::error::{TimetableError, TimetableResult};
use crate::export::{AttendanceReport, ExportTable, ReportContext, ReportRenderer};
use crate::filters::SelectionFilters;
use crate::lecture::Lecture;
use crate::merge::{CompiledTimetable, compile_timetable};
use crate::reference::{ReferenceData, ReferenceIndices, batches_for_course};
use crate::source::TimetableSource;
use crate::time_slot::TimeSlot;

#[derive(Debug, Clone)]
pub struct TimetableView {
    config: AcademicConfig,
    references: ReferenceData,
    indices: ReferenceIndices,
    filters: SelectionFilters,
    lectures: Vec<Lecture>,
    compiled: CompiledTimetable,
    slots: Vec<TimeSlot>,
    fetch_errors: Vec<String>,
    last_error: Option<String>,
}

fn load_dataset<T>(
    dataset: &str,
    result: TimetableResult<Vec<T>>,
    errors: &mut Vec<String>,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            warn!(dataset, error = %err, "reference fetch failed");
            errors.push(err.to_string());
            Vec::new()
        }
    }
}

impl TimetableView {
    pub fn new(config: AcademicConfig) -> Self {
        let slots = config.canonical_slots();
        Self {
            config,
            references: ReferenceData::default(),
            indices: ReferenceIndices::default(),
            filters: SelectionFilters::default(),
            lectures: Vec::new(),
            compiled: CompiledTimetable::default(),
            slots,
            fetch_errors: Vec::new(),
            last_error: None,
        }
    }

    pub fn config(&self) -> &AcademicConfig {
        &self.config
    }

    pub fn references(&self) -> &ReferenceData {
        &self.references
    }

    pub fn indices(&self) -> &ReferenceIndices {
        &self.indices
    }

    pub fn filters(&self) -> &SelectionFilters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut SelectionFilters {
        &mut self.filters
    }

    pub fn lectures(&self) -> &[Lecture] {
        &self.lectures
    }

    pub fn compiled(&self) -> &CompiledTimetable {
        &self.compiled
    }

    /// Current slot universe: canonical slots, extended by the last query.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn fetch_errors(&self) -> &[String] {
        &self.fetch_errors
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetches every reference dataset independently. A failed dataset is left
    /// empty and its message recorded; the others still load.
    pub fn load_reference<S: TimetableSource + ?Sized>(&mut self, source: &S) {
        let mut errors = Vec::new();
        self.references = ReferenceData {
            courses: load_dataset("courses", source.fetch_courses(), &mut errors),
            batches: load_dataset("batches", source.fetch_batches(), &mut errors),
            subjects: load_dataset("subjects", source.fetch_subjects(), &mut errors),
            faculties: load_dataset("faculties", source.fetch_faculties(), &mut errors),
            rooms: load_dataset("rooms", source.fetch_rooms(), &mut errors),
        };
        self.indices = self.references.index();
        info!(
            courses = self.references.courses.len(),
            subjects = self.references.subjects.len(),
            faculties = self.references.faculties.len(),
            rooms = self.references.rooms.len(),
            failures = errors.len(),
            "reference data loaded"
        );
        self.fetch_errors = errors;
    }

    fn clear_results(&mut self) {
        self.lectures.clear();
        self.compiled = CompiledTimetable::default();
        self.slots = self.config.canonical_slots();
        self.last_error = None;
    }

    /// Runs the lecture query for the current selection and compiles the grid.
    /// Previous results are cleared before anything is fetched; an incomplete
    /// selection sends no query. Returns the number of lectures received.
    pub fn generate<S: TimetableSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> TimetableResult<usize> {
        self.clear_results();
        let outcome = self
            .filters
            .resolve()
            .and_then(|mode| source.query_lectures(&mode));
        let lectures = match outcome {
            Ok(lectures) => lectures,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        let compiled = compile_timetable(
            &lectures,
            &self.indices,
            &self.config.days,
            &self.config.canonical_slots(),
        );
        if !compiled.malformed_slots.is_empty() {
            warn!(slots = ?compiled.malformed_slots, "malformed time slots sorted first");
        }
        let off_days: Vec<u32> = lectures
            .iter()
            .filter(|lecture| !self.config.days.contains(&lecture.day_of_week))
            .map(|lecture| lecture.id)
            .collect();
        if !off_days.is_empty() {
            warn!(lectures = ?off_days, "lectures on days outside the timetable");
        }
        self.slots = compiled.merged.slots.clone();
        self.compiled = compiled;
        self.lectures = lectures;
        info!(
            lectures = self.lectures.len(),
            runs = self.compiled.merged.runs.len(),
            "timetable generated"
        );
        Ok(self.lectures.len())
    }

    pub fn reset(&mut self) {
        self.filters.reset();
        self.clear_results();
    }

    /// Lectures of one day in the order they were received.
    pub fn day_lectures(&self, day: Weekday) -> Vec<&Lecture> {
        self.lectures
            .iter()
            .filter(|lecture| lecture.day_of_week == day)
            .collect()
    }

    /// `(batch id, label)` for the batches of the selected course.
    pub fn batch_options(&self) -> Vec<(u32, String)> {
        batches_for_course(&self.references.batches, self.filters.course())
            .into_iter()
            .map(|batch| (batch.id, batch.label()))
            .collect()
    }

    pub fn report_context(&self) -> ReportContext<'_> {
        ReportContext {
            references: &self.indices,
            semesters: &self.config.semesters,
        }
    }

    pub fn timetable_table(&self) -> TimetableResult<ExportTable> {
        if self.lectures.is_empty() {
            return Err(TimetableError::Export("no timetable has been generated".to_string()));
        }
        Ok(ExportTable::timetable(&self.compiled.merged))
    }

    /// Renders a report. A failure is recorded and `None` returned; the
    /// compiled timetable is left untouched.
    pub fn export<R: ReportRenderer>(
        &mut self,
        renderer: &R,
        report: &AttendanceReport,
    ) -> Option<R::Output> {
        match renderer.render(report) {
            Ok(output) => {
                info!(file = %report.file_name, "report rendered");
                Some(output)
            }
            Err(err) => {
                warn!(file = %report.file_name, error = %err, "report export failed");
                self.last_error = Some(err.to_string());
                None
            }
        }
    }
}

impl Default for TimetableView {
    fn default() -> Self {
        Self::new(AcademicConfig::default())
    }
}
