use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};
use crate::filters::FilterMode;
use crate::lecture::Lecture;
use crate::reference::{Batch, ReferenceEntity};
use crate::report::{AttendanceFilters, DayRecord};

/// Inclusive date range of an attendance query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub filters: AttendanceFilters,
}

impl RangeQuery {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            filters: AttendanceFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: AttendanceFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn validate(&self) -> TimetableResult<()> {
        if self.start_date > self.end_date {
            return Err(TimetableError::InvalidData(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |date| *date <= self.end_date)
    }
}

/// Where reference data, lectures and attendance come from.
///
/// A query that matches nothing returns an empty list, never an error.
pub trait TimetableSource {
    fn fetch_courses(&self) -> TimetableResult<Vec<ReferenceEntity>>;
    fn fetch_batches(&self) -> TimetableResult<Vec<Batch>>;
    fn fetch_subjects(&self) -> TimetableResult<Vec<ReferenceEntity>>;
    fn fetch_faculties(&self) -> TimetableResult<Vec<ReferenceEntity>>;
    fn fetch_rooms(&self) -> TimetableResult<Vec<ReferenceEntity>>;
    fn query_lectures(&self, mode: &FilterMode) -> TimetableResult<Vec<Lecture>>;
    fn fetch_range(&self, query: &RangeQuery) -> TimetableResult<Vec<DayRecord>>;
}
