//! Reference entities and their id lookups.
//!
//! Entities are fetched once per session. [`ReferenceIndex`] turns each list into a
//! hash map so resolving the names of a lecture costs O(1) per field. Lookups
//! that miss resolve to [`PLACEHOLDER`] instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::lecture::Lecture;

pub const PLACEHOLDER: &str = "N/A";

/// Subject, faculty member, room or course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    #[serde(alias = "ID")]
    pub id: u32,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Code", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ReferenceEntity {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// A student cohort of a course: entry year plus section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(alias = "ID")]
    pub id: u32,
    #[serde(alias = "CourseID")]
    pub course_id: u32,
    #[serde(alias = "Year", alias = "EntryYear")]
    pub year: i32,
    #[serde(default, alias = "Section")]
    pub section: String,
}

impl Batch {
    pub fn new(id: u32, course_id: u32, year: i32, section: impl Into<String>) -> Self {
        Self {
            id,
            course_id,
            year,
            section: section.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("Batch {} - Section {}", self.year, self.section)
    }
}

/// Batches selectable under the given course; every batch when no course is set.
pub fn batches_for_course(batches: &[Batch], course_id: Option<u32>) -> Vec<&Batch> {
    batches
        .iter()
        .filter(|batch| course_id.is_none_or(|id| batch.course_id == id))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    entries: HashMap<u32, ReferenceEntity>,
}

impl ReferenceIndex {
    /// Later duplicates of an id replace earlier ones.
    pub fn build(entities: &[ReferenceEntity]) -> Self {
        entities.iter().cloned().collect()
    }

    pub fn get(&self, id: u32) -> Option<&ReferenceEntity> {
        self.entries.get(&id)
    }

    pub fn name_of(&self, id: u32) -> &str {
        self.get(id)
            .map(|entity| entity.name.as_str())
            .unwrap_or(PLACEHOLDER)
    }

    pub fn code_of(&self, id: u32) -> &str {
        self.get(id)
            .and_then(|entity| entity.code.as_deref())
            .unwrap_or(PLACEHOLDER)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ReferenceEntity> for ReferenceIndex {
    fn from_iter<T: IntoIterator<Item = ReferenceEntity>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|entity| (entity.id, entity)).collect(),
        }
    }
}

/// The reference datasets of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub courses: Vec<ReferenceEntity>,
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub subjects: Vec<ReferenceEntity>,
    #[serde(default)]
    pub faculties: Vec<ReferenceEntity>,
    #[serde(default)]
    pub rooms: Vec<ReferenceEntity>,
}

impl ReferenceData {
    pub fn index(&self) -> ReferenceIndices {
        ReferenceIndices {
            courses: ReferenceIndex::build(&self.courses),
            subjects: ReferenceIndex::build(&self.subjects),
            faculties: ReferenceIndex::build(&self.faculties),
            rooms: ReferenceIndex::build(&self.rooms),
        }
    }
}

/// Display names of a lecture after reference resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedNames {
    pub subject: String,
    pub code: String,
    pub faculty: String,
    pub room: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndices {
    pub courses: ReferenceIndex,
    pub subjects: ReferenceIndex,
    pub faculties: ReferenceIndex,
    pub rooms: ReferenceIndex,
}

impl ReferenceIndices {
    pub fn resolve(&self, lecture: &Lecture) -> ResolvedNames {
        ResolvedNames {
            subject: self.subjects.name_of(lecture.subject_id).to_string(),
            code: self.subjects.code_of(lecture.subject_id).to_string(),
            faculty: self.faculties.name_of(lecture.faculty_id).to_string(),
            room: self.rooms.name_of(lecture.room_id).to_string(),
        }
    }
}
