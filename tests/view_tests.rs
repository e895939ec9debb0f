use chrono::{NaiveDate, Weekday};
use std::cell::Cell;
use timetable_tool::reference::{Batch, ReferenceEntity};
use timetable_tool::{
    AcademicConfig, AttendanceFilters, AttendanceReport, Catalog, DayRecord, FilterMode, Lecture,
    RangeQuery, ReportRenderer, TextRenderer, TimetableError, TimetableResult, TimetableSource,
    TimetableView,
};

fn fixture() -> Catalog {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/catalog.json");
    Catalog::from_json_file(path).expect("load catalog fixture")
}

/// Wraps the fixture catalog, counting queries and optionally failing datasets.
struct RecordingSource {
    catalog: Catalog,
    fail_subjects: bool,
    fail_query: bool,
    queries: Cell<usize>,
}

impl RecordingSource {
    fn new() -> Self {
        Self {
            catalog: fixture(),
            fail_subjects: false,
            fail_query: false,
            queries: Cell::new(0),
        }
    }
}

impl TimetableSource for RecordingSource {
    fn fetch_courses(&self) -> TimetableResult<Vec<ReferenceEntity>> {
        self.catalog.fetch_courses()
    }

    fn fetch_batches(&self) -> TimetableResult<Vec<Batch>> {
        self.catalog.fetch_batches()
    }

    fn fetch_subjects(&self) -> TimetableResult<Vec<ReferenceEntity>> {
        if self.fail_subjects {
            return Err(TimetableError::fetch_failure("subjects", "connection refused"));
        }
        self.catalog.fetch_subjects()
    }

    fn fetch_faculties(&self) -> TimetableResult<Vec<ReferenceEntity>> {
        self.catalog.fetch_faculties()
    }

    fn fetch_rooms(&self) -> TimetableResult<Vec<ReferenceEntity>> {
        self.catalog.fetch_rooms()
    }

    fn query_lectures(&self, mode: &FilterMode) -> TimetableResult<Vec<Lecture>> {
        self.queries.set(self.queries.get() + 1);
        if self.fail_query {
            return Err(TimetableError::fetch_failure("lectures", "timeout"));
        }
        self.catalog.query_lectures(mode)
    }

    fn fetch_range(&self, query: &RangeQuery) -> TimetableResult<Vec<DayRecord>> {
        self.catalog.fetch_range(query)
    }
}

struct FailingRenderer;

impl ReportRenderer for FailingRenderer {
    type Output = Vec<u8>;

    fn render(&self, _report: &AttendanceReport) -> TimetableResult<Vec<u8>> {
        Err(TimetableError::Export("layout engine unavailable".into()))
    }
}

fn loaded_view(source: &RecordingSource) -> TimetableView {
    let mut view = TimetableView::new(AcademicConfig::default());
    view.load_reference(source);
    view
}

fn select_batch_10(view: &mut TimetableView) {
    let filters = view.filters_mut();
    filters.select_course(Some(1));
    filters.select_batch(Some(10));
    filters.select_semester(Some(3));
}

#[test]
fn failed_reference_fetch_empties_only_that_dataset() {
    let mut source = RecordingSource::new();
    source.fail_subjects = true;
    let view = loaded_view(&source);

    assert!(view.references().subjects.is_empty());
    assert_eq!(view.references().courses.len(), 2);
    assert_eq!(view.references().faculties.len(), 2);
    assert_eq!(view.fetch_errors().len(), 1);
    assert!(view.fetch_errors()[0].contains("subjects"));
}

#[test]
fn generate_builds_the_merged_timetable() {
    let source = RecordingSource::new();
    let mut view = loaded_view(&source);
    select_batch_10(&mut view);

    assert_eq!(view.generate(&source).unwrap(), 4);
    assert_eq!(view.compiled().merged.runs.len(), 3);
    assert_eq!(view.slots().len(), 8);
    assert!(view.last_error().is_none());
    let table = view.timetable_table().unwrap();
    assert_eq!(table.rows[0][1], "Data Structures (CS201) / Dr. Rao / Lab 1 [09:00 to 11:00]");
}

#[test]
fn incomplete_selection_sends_no_query() {
    let source = RecordingSource::new();
    let mut view = loaded_view(&source);
    view.filters_mut().select_course(Some(1));
    view.filters_mut().select_batch(Some(10));

    let result = view.generate(&source);
    assert!(matches!(result, Err(TimetableError::IncompleteSelection)));
    assert_eq!(source.queries.get(), 0);
    assert!(view.last_error().is_some());
    assert!(view.compiled().merged.is_empty());
}

#[test]
fn generate_clears_previous_results_before_querying() {
    let mut source = RecordingSource::new();
    let mut view = loaded_view(&source);
    select_batch_10(&mut view);
    view.generate(&source).unwrap();
    assert!(!view.lectures().is_empty());

    source.fail_query = true;
    assert!(view.generate(&source).is_err());
    assert!(view.lectures().is_empty());
    assert!(view.compiled().merged.is_empty());
    assert_eq!(view.last_error(), Some("failed to fetch lectures: timeout"));
}

#[test]
fn discovered_slots_survive_until_reset() {
    let mut source = RecordingSource::new();
    source
        .catalog
        .lectures
        .push(Lecture::new(9, Weekday::Sat, "08:00", "09:00", 100, 7, 3));
    let mut view = loaded_view(&source);
    view.filters_mut().select_faculty(Some(7));

    view.generate(&source).unwrap();
    assert_eq!(view.slots().len(), 9);
    assert_eq!(view.slots()[0].label(), "08:00-09:00");

    view.reset();
    assert_eq!(view.slots().len(), 8);
    assert!(view.filters().is_empty());
    assert!(view.lectures().is_empty());
}

#[test]
fn day_lectures_keep_input_order() {
    let source = RecordingSource::new();
    let mut view = loaded_view(&source);
    select_batch_10(&mut view);
    view.generate(&source).unwrap();

    let monday: Vec<u32> = view
        .day_lectures(Weekday::Mon)
        .iter()
        .map(|lecture| lecture.id)
        .collect();
    assert_eq!(monday, vec![1, 2, 3]);
    assert!(view.day_lectures(Weekday::Sun).is_empty());
}

#[test]
fn batch_options_follow_selected_course() {
    let source = RecordingSource::new();
    let mut view = loaded_view(&source);
    assert_eq!(view.batch_options().len(), 3);

    view.filters_mut().select_course(Some(1));
    assert_eq!(
        view.batch_options(),
        vec![
            (10, "Batch 2023 - Section A".to_string()),
            (11, "Batch 2023 - Section B".to_string())
        ]
    );
}

#[test]
fn export_failure_is_recorded_without_touching_the_grid() {
    let source = RecordingSource::new();
    let mut view = loaded_view(&source);
    select_batch_10(&mut view);
    view.generate(&source).unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let filters = AttendanceFilters::default();
    let details = source.catalog.lecture_details(date, &filters);
    let report = AttendanceReport::for_day(date, &details, &filters, &view.report_context(), date);

    assert!(view.export(&FailingRenderer, &report).is_none());
    assert_eq!(
        view.last_error(),
        Some("export failed: layout engine unavailable")
    );
    assert_eq!(view.compiled().merged.runs.len(), 3);

    let text = view.export(&TextRenderer::new(), &report).unwrap();
    assert!(text.contains("Class Missed"));
}

#[test]
fn lectures_on_unlisted_days_still_count_as_generated() {
    let mut source = RecordingSource::new();
    source.catalog.lectures = vec![Lecture::new(9, Weekday::Sun, "09:00", "10:00", 100, 7, 3)];
    let mut view = loaded_view(&source);
    view.filters_mut().select_faculty(Some(7));

    assert_eq!(view.generate(&source).unwrap(), 1);
    assert!(view.compiled().merged.is_empty());
    let table = view.timetable_table().unwrap();
    assert_eq!(table.rows.len(), 6);
    assert!(table.rows[0][1..].iter().all(|cell| cell == "No class"));
}
