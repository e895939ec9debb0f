//! File-backed timetable source.
//!
//! A catalog is a single JSON document holding the reference datasets, the
//! weekly lectures and the recorded sessions. It is read once and queried in
//! memory.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{TimetableError, TimetableResult};
use crate::filters::FilterMode;
use crate::lecture::Lecture;
use crate::reference::{Batch, ReferenceData, ReferenceEntity, ReferenceIndices};
use crate::report::{
    AttendanceCounts, AttendanceFilters, DayRecord, LectureDetail, summarize_statuses,
};
use crate::source::{RangeQuery, TimetableSource};
use crate::time_slot::to_minutes;

/// One recorded occurrence of a lecture on a concrete date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(alias = "ID")]
    pub id: u32,
    #[serde(alias = "LectureID")]
    pub lecture_id: u32,
    #[serde(alias = "Date")]
    pub date: NaiveDate,
    #[serde(default, alias = "Status")]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(flatten)]
    pub references: ReferenceData,
    #[serde(default)]
    pub lectures: Vec<Lecture>,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

/// Maps shared by every date of a detail query, built once per query.
struct DetailLookup<'a> {
    indices: ReferenceIndices,
    batches: HashMap<u32, &'a Batch>,
    sessions: HashMap<(NaiveDate, u32), &'a SessionRecord>,
}

fn matches_attendance(lecture: &Lecture, filters: &AttendanceFilters) -> bool {
    filters.faculty_id.is_none_or(|id| lecture.faculty_id == id)
        && filters.course_id.is_none_or(|id| lecture.course_id == Some(id))
        && filters.semester.is_none_or(|n| lecture.semester == Some(n))
}

impl Catalog {
    pub fn new(references: ReferenceData) -> Self {
        Self {
            references,
            ..Self::default()
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> TimetableResult<Self> {
        let file = File::open(path.as_ref())?;
        let catalog: Catalog = serde_json::from_reader(file)?;
        catalog.validate()?;
        info!(
            path = %path.as_ref().display(),
            lectures = catalog.lectures.len(),
            sessions = catalog.sessions.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Lecture ids must be unique; sessions must point at a known lecture.
    pub fn validate(&self) -> TimetableResult<()> {
        let mut ids = HashSet::with_capacity(self.lectures.len());
        for lecture in &self.lectures {
            if !ids.insert(lecture.id) {
                return Err(TimetableError::InvalidData(format!(
                    "lecture {} listed more than once",
                    lecture.id
                )));
            }
        }
        if let Some(orphan) = self
            .sessions
            .iter()
            .find(|session| !ids.contains(&session.lecture_id))
        {
            return Err(TimetableError::InvalidData(format!(
                "session {} references unknown lecture {}",
                orphan.id, orphan.lecture_id
            )));
        }
        Ok(())
    }

    pub fn batch(&self, id: u32) -> Option<&Batch> {
        self.references.batches.iter().find(|batch| batch.id == id)
    }

    pub fn query(&self, mode: &FilterMode) -> Vec<Lecture> {
        let lectures: Vec<Lecture> = self
            .lectures
            .iter()
            .filter(|lecture| match mode {
                FilterMode::FacultyOnly { faculty_id } => lecture.faculty_id == *faculty_id,
                FilterMode::RoomOnly { room_id } => lecture.room_id == *room_id,
                FilterMode::CourseBatchSemester {
                    batch_id, semester, ..
                } => lecture.batch_id == Some(*batch_id) && lecture.semester == Some(*semester),
            })
            .cloned()
            .collect();
        info!(query = %mode.query_string(), matched = lectures.len(), "lecture query");
        lectures
    }

    fn detail_lookup(&self, dates: impl Fn(NaiveDate) -> bool) -> DetailLookup<'_> {
        DetailLookup {
            indices: self.references.index(),
            batches: self
                .references
                .batches
                .iter()
                .map(|batch| (batch.id, batch))
                .collect(),
            sessions: self
                .sessions
                .iter()
                .filter(|session| dates(session.date))
                .map(|session| ((session.date, session.lecture_id), session))
                .collect(),
        }
    }

    /// Lectures scheduled on the weekday of `date`, joined with the session
    /// recorded for that date. Lectures without a session carry an empty status.
    pub fn lecture_details(
        &self,
        date: NaiveDate,
        filters: &AttendanceFilters,
    ) -> Vec<LectureDetail> {
        let lookup = self.detail_lookup(|day| day == date);
        self.details_on(date, filters, &lookup)
    }

    fn details_on(
        &self,
        date: NaiveDate,
        filters: &AttendanceFilters,
        lookup: &DetailLookup<'_>,
    ) -> Vec<LectureDetail> {
        let mut scheduled: Vec<&Lecture> = self
            .lectures
            .iter()
            .filter(|lecture| lecture.day_of_week == date.weekday())
            .filter(|lecture| matches_attendance(lecture, filters))
            .collect();
        scheduled.sort_by_key(|lecture| to_minutes(&lecture.start_time));

        scheduled
            .into_iter()
            .map(|lecture| {
                let session = lookup.sessions.get(&(date, lecture.id));
                let batch = lecture
                    .batch_id
                    .and_then(|id| lookup.batches.get(&id).copied());
                let names = lookup.indices.resolve(lecture);
                LectureDetail {
                    lecture_id: Some(lecture.id),
                    session_id: session.map(|s| s.id),
                    subject: Some(names.subject),
                    faculty: Some(names.faculty),
                    start_time: Some(lecture.start_time.clone()),
                    end_time: Some(lecture.end_time.clone()),
                    course_name: lecture
                        .course_id
                        .and_then(|id| lookup.indices.courses.get(id))
                        .map(|course| course.name.clone()),
                    semester: lecture.semester,
                    room: Some(names.room),
                    batch_year: batch.map(|b| b.year),
                    batch_section: batch.map(|b| b.section.clone()),
                    status: session.map(|s| s.status.clone()).unwrap_or_default(),
                }
            })
            .collect()
    }

    /// Status counts per date of the month. Dates without sessions are absent.
    pub fn month_summary(
        &self,
        year: i32,
        month: u32,
        filters: &AttendanceFilters,
    ) -> TimetableResult<BTreeMap<NaiveDate, AttendanceCounts>> {
        if !(1..=12).contains(&month) {
            return Err(TimetableError::InvalidData(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        let lectures: HashMap<u32, &Lecture> =
            self.lectures.iter().map(|lecture| (lecture.id, lecture)).collect();
        let summary = summarize_statuses(
            self.sessions
                .iter()
                .filter(|session| session.date.year() == year && session.date.month() == month)
                .filter(|session| {
                    lectures
                        .get(&session.lecture_id)
                        .is_some_and(|lecture| matches_attendance(lecture, filters))
                })
                .map(|session| (session.date, session.status.as_str())),
        );
        debug!(year, month, days = summary.len(), "month summary");
        Ok(summary)
    }

    /// One record per date of the range, days without lectures included.
    pub fn range(&self, query: &RangeQuery) -> TimetableResult<Vec<DayRecord>> {
        query.validate()?;
        let lookup = self.detail_lookup(|day| query.start_date <= day && day <= query.end_date);
        let records: Vec<DayRecord> = query
            .dates()
            .map(|date| {
                DayRecord::from_details(date, self.details_on(date, &query.filters, &lookup))
            })
            .collect();
        debug!(
            start = %query.start_date,
            end = %query.end_date,
            days = records.len(),
            "range query"
        );
        Ok(records)
    }
}

impl TimetableSource for Catalog {
    fn fetch_courses(&self) -> TimetableResult<Vec<ReferenceEntity>> {
        Ok(self.references.courses.clone())
    }

    fn fetch_batches(&self) -> TimetableResult<Vec<Batch>> {
        Ok(self.references.batches.clone())
    }

    fn fetch_subjects(&self) -> TimetableResult<Vec<ReferenceEntity>> {
        Ok(self.references.subjects.clone())
    }

    fn fetch_faculties(&self) -> TimetableResult<Vec<ReferenceEntity>> {
        Ok(self.references.faculties.clone())
    }

    fn fetch_rooms(&self) -> TimetableResult<Vec<ReferenceEntity>> {
        Ok(self.references.rooms.clone())
    }

    fn query_lectures(&self, mode: &FilterMode) -> TimetableResult<Vec<Lecture>> {
        Ok(self.query(mode))
    }

    fn fetch_range(&self, query: &RangeQuery) -> TimetableResult<Vec<DayRecord>> {
        self.range(query)
    }
}
