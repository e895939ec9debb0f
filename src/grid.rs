use chrono::Weekday;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

use crate::lecture::Lecture;
use crate::reference::ReferenceIndices;
use crate::time_slot::{TimeSlot, normalize_slots};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GridKey {
    pub day: Weekday,
    pub slot: String,
}

impl GridKey {
    pub fn new(day: Weekday, slot: impl Into<String>) -> Self {
        Self {
            day,
            slot: slot.into(),
        }
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.slot)
    }
}

/// Identity under which adjacent cells of one day are merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupKey {
    pub day: Weekday,
    pub subject: String,
    pub faculty: String,
}

/// A lecture with its reference ids resolved to display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub lecture_id: u32,
    pub subject: String,
    pub code: String,
    pub faculty: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
}

impl GridCell {
    pub fn from_lecture(lecture: &Lecture, references: &ReferenceIndices) -> Self {
        let names = references.resolve(lecture);
        Self {
            lecture_id: lecture.id,
            subject: names.subject,
            code: names.code,
            faculty: names.faculty,
            room: names.room,
            start_time: lecture.start_time.clone(),
            end_time: lecture.end_time.clone(),
        }
    }

    pub fn group_key(&self, day: Weekday) -> GroupKey {
        GroupKey {
            day,
            subject: self.subject.clone(),
            faculty: self.faculty.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimetableGrid {
    cells: HashMap<GridKey, GridCell>,
}

impl TimetableGrid {
    pub fn get(&self, day: Weekday, slot: &str) -> Option<&GridCell> {
        self.cells.get(&GridKey::new(day, slot))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GridKey, &GridCell)> {
        self.cells.iter()
    }

    fn insert(&mut self, key: GridKey, cell: GridCell) -> Option<GridCell> {
        self.cells.insert(key, cell)
    }
}

/// Two lectures mapped to the same day and slot; the later one was kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCollision {
    pub key: GridKey,
    pub replaced_lecture: u32,
    pub kept_lecture: u32,
}

#[derive(Debug, Clone, Default)]
pub struct GridBuild {
    pub grid: TimetableGrid,
    /// Canonical slots followed by any slot first seen in a lecture. Unsorted.
    pub slot_universe: Vec<TimeSlot>,
    pub collisions: Vec<SlotCollision>,
}

impl GridBuild {
    pub fn sorted_slots(&self) -> Vec<TimeSlot> {
        normalize_slots(self.slot_universe.iter().cloned())
    }

    /// Slots that only exist because a lecture used them.
    pub fn discovered_slots(&self, canonical_slots: &[TimeSlot]) -> Vec<TimeSlot> {
        let canonical: HashSet<String> = canonical_slots.iter().map(TimeSlot::label).collect();
        self.slot_universe
            .iter()
            .filter(|slot| !canonical.contains(&slot.label()))
            .cloned()
            .collect()
    }
}

/// Maps every lecture to its `(day, slot)` cell.
///
/// When two lectures share a key the one later in `lectures` wins; the displaced
/// one is listed in [`GridBuild::collisions`].
pub fn build_grid(
    lectures: &[Lecture],
    references: &ReferenceIndices,
    canonical_slots: &[TimeSlot],
) -> GridBuild {
    let mut grid = TimetableGrid::default();
    let mut collisions = Vec::new();
    let mut seen: HashSet<String> = canonical_slots.iter().map(TimeSlot::label).collect();
    let mut slot_universe: Vec<TimeSlot> = canonical_slots.to_vec();

    for lecture in lectures {
        let slot = lecture.time_slot();
        let label = slot.label();
        if seen.insert(label.clone()) {
            debug!(slot = %label, lecture = lecture.id, "discovered slot outside canonical set");
            slot_universe.push(slot);
        }

        let key = GridKey::new(lecture.day_of_week, label);
        let cell = GridCell::from_lecture(lecture, references);
        if let Some(previous) = grid.insert(key.clone(), cell) {
            warn!(
                key = %key,
                replaced = previous.lecture_id,
                kept = lecture.id,
                "overlapping lectures share a grid cell"
            );
            collisions.push(SlotCollision {
                key,
                replaced_lecture: previous.lecture_id,
                kept_lecture: lecture.id,
            });
        }
    }

    debug!(
        cells = grid.len(),
        slots = slot_universe.len(),
        collisions = collisions.len(),
        "built timetable grid"
    );

    GridBuild {
        grid,
        slot_universe,
        collisions,
    }
}
