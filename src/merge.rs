//! Merging of consecutive identical bookings into spanning runs.
//!
//! For each day the sorted slot sequence is walked once. A run stays open while
//! the next slot holds a cell with the same subject and faculty; an empty slot, a
//! different lecture or an index gap closes it. Only the first slot of a run is
//! its head: renderers draw the head with the run's span and skip the rest.

use chrono::Weekday;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::grid::{
    GridBuild, GridCell, GridKey, GroupKey, SlotCollision, TimetableGrid, build_grid,
};
use crate::lecture::Lecture;
use crate::reference::ReferenceIndices;
use crate::time_slot::{TimeSlot, malformed_labels, normalize_slots};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub group_key: GroupKey,
    /// Cell of the head slot.
    pub cell: GridCell,
    pub slots: Vec<String>,
    pub start_index: usize,
    pub end_index: usize,
}

impl Run {
    pub fn day(&self) -> Weekday {
        self.group_key.day
    }

    pub fn span(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    pub fn head_slot(&self) -> &str {
        self.slots.first().map(String::as_str).unwrap_or_default()
    }

    /// `"09:00 to 11:00"`: start of the head slot to end of the last slot.
    pub fn time_range(&self) -> String {
        let first = TimeSlot::parse(self.head_slot());
        let last = self
            .slots
            .last()
            .map(|label| TimeSlot::parse(label))
            .unwrap_or_else(|| first.clone());
        format!("{} to {}", first.start(), last.end())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState<'a> {
    Head(&'a Run),
    Continuation(&'a Run),
    Free,
}

/// One renderable cell of a day row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowCell {
    Lecture { span: usize, run: Run },
    Free { slot: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRow {
    pub day: Weekday,
    pub cells: Vec<RowCell>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergedTimetable {
    pub days: Vec<Weekday>,
    pub slots: Vec<TimeSlot>,
    pub runs: Vec<Run>,
    #[serde(skip)]
    index: HashMap<GridKey, usize>,
}

impl MergedTimetable {
    pub fn slot_state(&self, day: Weekday, slot: &str) -> SlotState<'_> {
        match self.index.get(&GridKey::new(day, slot)) {
            Some(&run_idx) => {
                let run = &self.runs[run_idx];
                if run.head_slot() == slot {
                    SlotState::Head(run)
                } else {
                    SlotState::Continuation(run)
                }
            }
            None => SlotState::Free,
        }
    }

    pub fn runs_for(&self, day: Weekday) -> impl Iterator<Item = &Run> {
        self.runs.iter().filter(move |run| run.day() == day)
    }

    /// Heads with their span and free slots, in slot order. Continuation slots
    /// are covered by their head and never yielded.
    pub fn row(&self, day: Weekday) -> Vec<RowCell> {
        let mut cells = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let label = slot.label();
            match self.slot_state(day, &label) {
                SlotState::Head(run) => cells.push(RowCell::Lecture {
                    span: run.span(),
                    run: run.clone(),
                }),
                SlotState::Continuation(_) => {}
                SlotState::Free => cells.push(RowCell::Free { slot: label }),
            }
        }
        cells
    }

    pub fn rows(&self) -> Vec<DayRow> {
        self.days
            .iter()
            .map(|day| DayRow {
                day: *day,
                cells: self.row(*day),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

pub fn merge_consecutive(
    grid: &TimetableGrid,
    days: &[Weekday],
    slots: &[TimeSlot],
) -> MergedTimetable {
    let mut runs: Vec<Run> = Vec::new();
    let mut index = HashMap::new();

    for day in days {
        let mut open: Option<usize> = None;
        for (slot_idx, slot) in slots.iter().enumerate() {
            let label = slot.label();
            let Some(cell) = grid.get(*day, &label) else {
                open = None;
                continue;
            };

            let group_key = cell.group_key(*day);
            let run_idx = match open {
                Some(run_idx)
                    if runs[run_idx].group_key == group_key
                        && runs[run_idx].end_index + 1 == slot_idx =>
                {
                    let run = &mut runs[run_idx];
                    run.slots.push(label.clone());
                    run.end_index = slot_idx;
                    run_idx
                }
                _ => {
                    runs.push(Run {
                        group_key,
                        cell: cell.clone(),
                        slots: vec![label.clone()],
                        start_index: slot_idx,
                        end_index: slot_idx,
                    });
                    runs.len() - 1
                }
            };
            open = Some(run_idx);
            index.insert(GridKey::new(*day, label), run_idx);
        }
    }

    debug!(runs = runs.len(), days = days.len(), "merged consecutive slots");

    MergedTimetable {
        days: days.to_vec(),
        slots: slots.to_vec(),
        runs,
        index,
    }
}

/// Result of the whole pipeline for one query.
#[derive(Debug, Clone, Default)]
pub struct CompiledTimetable {
    pub grid: TimetableGrid,
    pub merged: MergedTimetable,
    pub collisions: Vec<SlotCollision>,
    /// Slot labels whose times could not be parsed; they sort first.
    pub malformed_slots: Vec<String>,
}

/// Builds the grid, re-sorts the extended slot universe and merges runs.
pub fn compile_timetable(
    lectures: &[Lecture],
    references: &ReferenceIndices,
    days: &[Weekday],
    canonical_slots: &[TimeSlot],
) -> CompiledTimetable {
    let GridBuild {
        grid,
        slot_universe,
        collisions,
    } = build_grid(lectures, references, canonical_slots);
    let slots = normalize_slots(slot_universe);
    let malformed_slots = malformed_labels(&slots);
    let merged = merge_consecutive(&grid, days, &slots);
    CompiledTimetable {
        grid,
        merged,
        collisions,
        malformed_slots,
    }
}
