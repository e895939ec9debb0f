use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::time_slot::TimeSlot;

/// One scheduled occurrence of a subject in a weekly slot.
///
/// Field aliases accept PascalCase payloads (`DayOfWeek`, `StartTime`, ...)
/// from the lecture endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    #[serde(alias = "ID")]
    pub id: u32,
    #[serde(alias = "DayOfWeek")]
    pub day_of_week: Weekday,
    #[serde(alias = "StartTime")]
    pub start_time: String,
    #[serde(alias = "EndTime")]
    pub end_time: String,
    #[serde(alias = "SubjectID")]
    pub subject_id: u32,
    #[serde(alias = "FacultyID")]
    pub faculty_id: u32,
    #[serde(alias = "RoomID")]
    pub room_id: u32,
    #[serde(default, alias = "CourseID", skip_serializing_if = "Option::is_none")]
    pub course_id: Option<u32>,
    #[serde(default, alias = "BatchID", skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<u32>,
    #[serde(default, alias = "Semester", skip_serializing_if = "Option::is_none")]
    pub semester: Option<u32>,
}

impl Lecture {
    pub fn new(
        id: u32,
        day_of_week: Weekday,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        subject_id: u32,
        faculty_id: u32,
        room_id: u32,
    ) -> Self {
        Self {
            id,
            day_of_week,
            start_time: start_time.into(),
            end_time: end_time.into(),
            subject_id,
            faculty_id,
            room_id,
            course_id: None,
            batch_id: None,
            semester: None,
        }
    }

    /// Attaches the timetable context used by course + batch + semester queries.
    pub fn with_timetable(mut self, course_id: u32, batch_id: u32, semester: u32) -> Self {
        self.course_id = Some(course_id);
        self.batch_id = Some(batch_id);
        self.semester = Some(semester);
        self
    }

    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_time.clone(), self.end_time.clone())
    }

    pub fn slot_label(&self) -> String {
        format!("{}-{}", self.start_time, self.end_time)
    }
}
