pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod grid;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod lecture;
pub mod merge;
pub mod reference;
pub mod report;
pub mod source;
pub mod time_slot;
pub mod view;

pub use catalog::{Catalog, SessionRecord};
pub use config::{AcademicConfig, Semester};
pub use error::{TimetableError, TimetableResult};
pub use export::{
    AttendanceReport, CsvRenderer, ExportTable, ReportContext, ReportRenderer, TextRenderer,
};
pub use filters::{FilterMode, SelectionFilters};
pub use grid::{GridBuild, GridCell, GridKey, TimetableGrid, build_grid};
pub use lecture::Lecture;
pub use merge::{
    CompiledTimetable, MergedTimetable, RowCell, Run, SlotState, compile_timetable,
    merge_consecutive,
};
pub use reference::{Batch, ReferenceData, ReferenceEntity, ReferenceIndex, ReferenceIndices};
pub use report::{
    AttendanceCounts, AttendanceFilters, DayRecord, LectureDetail, ReportTotals, SessionStatus,
    aggregate,
};
pub use source::{RangeQuery, TimetableSource};
pub use time_slot::{TimeSlot, normalize, to_minutes};
pub use view::TimetableView;
