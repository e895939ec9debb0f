//! Selection state for timetable queries.
//!
//! Exactly one of three modes may be active: a faculty member, a room, or a
//! complete course + batch + semester combination. Every setter clears the
//! fields that belong to other modes, so the state can never mix them.

use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FilterMode {
    FacultyOnly {
        faculty_id: u32,
    },
    RoomOnly {
        room_id: u32,
    },
    CourseBatchSemester {
        course_id: u32,
        batch_id: u32,
        semester: u32,
    },
}

impl FilterMode {
    /// Query parameters sent to the lecture endpoint. The course is implied by
    /// the batch and is not sent.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            FilterMode::FacultyOnly { faculty_id } => vec![("faculty_id", faculty_id.to_string())],
            FilterMode::RoomOnly { room_id } => vec![("room_id", room_id.to_string())],
            FilterMode::CourseBatchSemester {
                batch_id, semester, ..
            } => vec![
                ("batch_id", batch_id.to_string()),
                ("semester", semester.to_string()),
            ],
        }
    }

    pub fn query_string(&self) -> String {
        self.query_params()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionFilters {
    course: Option<u32>,
    batch: Option<u32>,
    semester: Option<u32>,
    faculty: Option<u32>,
    room: Option<u32>,
}

impl SelectionFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn course(&self) -> Option<u32> {
        self.course
    }

    pub fn batch(&self) -> Option<u32> {
        self.batch
    }

    pub fn semester(&self) -> Option<u32> {
        self.semester
    }

    pub fn faculty(&self) -> Option<u32> {
        self.faculty
    }

    pub fn room(&self) -> Option<u32> {
        self.room
    }

    /// Starts a new course selection; everything else is cleared.
    pub fn select_course(&mut self, course: Option<u32>) {
        *self = Self {
            course,
            ..Self::default()
        };
    }

    pub fn select_batch(&mut self, batch: Option<u32>) {
        self.batch = batch;
        self.semester = None;
        self.faculty = None;
        self.room = None;
    }

    pub fn select_semester(&mut self, semester: Option<u32>) {
        self.semester = semester;
        self.faculty = None;
        self.room = None;
    }

    pub fn select_faculty(&mut self, faculty: Option<u32>) {
        *self = Self {
            faculty,
            ..Self::default()
        };
    }

    pub fn select_room(&mut self, room: Option<u32>) {
        *self = Self {
            room,
            ..Self::default()
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Faculty wins over room, room over course + batch + semester.
    pub fn resolve(&self) -> TimetableResult<FilterMode> {
        if let Some(faculty_id) = self.faculty {
            return Ok(FilterMode::FacultyOnly { faculty_id });
        }
        if let Some(room_id) = self.room {
            return Ok(FilterMode::RoomOnly { room_id });
        }
        match (self.course, self.batch, self.semester) {
            (Some(course_id), Some(batch_id), Some(semester)) => {
                Ok(FilterMode::CourseBatchSemester {
                    course_id,
                    batch_id,
                    semester,
                })
            }
            _ => Err(TimetableError::IncompleteSelection),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.resolve().is_ok()
    }
}
