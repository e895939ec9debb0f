use chrono::Weekday;
use timetable_tool::reference::{ReferenceData, ReferenceEntity, ReferenceIndices};
use timetable_tool::time_slot::{TimeSlot, normalize};
use timetable_tool::{
    AcademicConfig, GridCell, Lecture, RowCell, Run, SlotState, build_grid, compile_timetable,
    merge_consecutive,
};

fn references() -> ReferenceIndices {
    ReferenceData {
        subjects: vec![
            ReferenceEntity::new(100, "Data Structures").with_code("CS201"),
            ReferenceEntity::new(101, "Databases").with_code("CS202"),
        ],
        faculties: vec![
            ReferenceEntity::new(7, "Dr. Rao"),
            ReferenceEntity::new(8, "Prof. Iyer"),
        ],
        rooms: vec![ReferenceEntity::new(3, "Lab 1")],
        ..ReferenceData::default()
    }
    .index()
}

fn slots() -> Vec<TimeSlot> {
    AcademicConfig::default().canonical_slots()
}

fn lecture(id: u32, day: Weekday, start: &str, end: &str, subject: u32, faculty: u32) -> Lecture {
    Lecture::new(id, day, start, end, subject, faculty, 3)
}

#[test]
fn three_identical_consecutive_lectures_form_one_run() {
    let lectures = vec![
        lecture(1, Weekday::Mon, "09:00", "10:00", 100, 7),
        lecture(2, Weekday::Mon, "10:00", "11:00", 100, 7),
        lecture(3, Weekday::Mon, "11:00", "12:00", 100, 7),
    ];
    let slots = slots();
    let build = build_grid(&lectures, &references(), &slots);
    let merged = merge_consecutive(&build.grid, &[Weekday::Mon], &slots);

    assert_eq!(merged.runs.len(), 1);
    let run = &merged.runs[0];
    assert_eq!(run.span(), 3);
    assert_eq!(run.start_index, 0);
    assert_eq!(run.end_index, 2);
    assert_eq!(run.cell.lecture_id, 1);
    assert_eq!(run.time_range(), "09:00 to 12:00");
}

#[test]
fn free_slot_between_identical_lectures_splits_runs() {
    let lectures = vec![
        lecture(1, Weekday::Tue, "09:00", "10:00", 100, 7),
        lecture(2, Weekday::Tue, "11:00", "12:00", 100, 7),
    ];
    let slots = slots();
    let build = build_grid(&lectures, &references(), &slots);
    let merged = merge_consecutive(&build.grid, &[Weekday::Tue], &slots);

    assert_eq!(merged.runs.len(), 2);
    assert!(merged.runs.iter().all(|run| run.span() == 1));
    assert!(matches!(
        merged.slot_state(Weekday::Tue, "10:00-11:00"),
        SlotState::Free
    ));
}

#[test]
fn different_faculty_starts_a_new_run() {
    let lectures = vec![
        lecture(1, Weekday::Wed, "09:00", "10:00", 100, 7),
        lecture(2, Weekday::Wed, "10:00", "11:00", 100, 8),
        lecture(3, Weekday::Wed, "11:00", "12:00", 101, 8),
    ];
    let slots = slots();
    let build = build_grid(&lectures, &references(), &slots);
    let merged = merge_consecutive(&build.grid, &[Weekday::Wed], &slots);

    let spans: Vec<usize> = merged.runs.iter().map(|run| run.span()).collect();
    assert_eq!(spans, vec![1, 1, 1]);
}

#[test]
fn runs_do_not_cross_days() {
    let lectures = vec![
        lecture(1, Weekday::Mon, "16:00", "17:00", 100, 7),
        lecture(2, Weekday::Tue, "09:00", "10:00", 100, 7),
    ];
    let slots = slots();
    let build = build_grid(&lectures, &references(), &slots);
    let merged = merge_consecutive(&build.grid, &[Weekday::Mon, Weekday::Tue], &slots);

    assert_eq!(merged.runs.len(), 2);
    assert_eq!(merged.runs_for(Weekday::Mon).count(), 1);
    assert_eq!(merged.runs_for(Weekday::Tue).count(), 1);
}

#[test]
fn each_run_has_exactly_one_head() {
    let lectures = vec![
        lecture(1, Weekday::Mon, "09:00", "10:00", 100, 7),
        lecture(2, Weekday::Mon, "10:00", "11:00", 100, 7),
        lecture(3, Weekday::Mon, "11:00", "12:00", 100, 7),
    ];
    let slots = slots();
    let build = build_grid(&lectures, &references(), &slots);
    let merged = merge_consecutive(&build.grid, &[Weekday::Mon], &slots);

    let heads = slots
        .iter()
        .filter(|slot| matches!(merged.slot_state(Weekday::Mon, &slot.label()), SlotState::Head(_)))
        .count();
    assert_eq!(heads, 1);
    assert!(matches!(
        merged.slot_state(Weekday::Mon, "09:00-10:00"),
        SlotState::Head(run) if run.span() == 3
    ));
    assert!(matches!(
        merged.slot_state(Weekday::Mon, "11:00-12:00"),
        SlotState::Continuation(_)
    ));
}

#[test]
fn row_never_yields_continuations() {
    let lectures = vec![
        lecture(1, Weekday::Mon, "09:00", "10:00", 100, 7),
        lecture(2, Weekday::Mon, "10:00", "11:00", 100, 7),
        lecture(3, Weekday::Mon, "11:00", "12:00", 100, 7),
    ];
    let slots = slots();
    let build = build_grid(&lectures, &references(), &slots);
    let merged = merge_consecutive(&build.grid, &[Weekday::Mon], &slots);

    let row = merged.row(Weekday::Mon);
    assert_eq!(row.len(), slots.len() - 2);
    match &row[0] {
        RowCell::Lecture { span, run } => {
            assert_eq!(*span, 3);
            assert_eq!(run.head_slot(), "09:00-10:00");
        }
        other => panic!("expected run head, got {other:?}"),
    }
    assert!(row[1..].iter().all(|cell| matches!(cell, RowCell::Free { .. })));
    let covered: usize = row
        .iter()
        .map(|cell| match cell {
            RowCell::Lecture { span, .. } => *span,
            RowCell::Free { .. } => 1,
        })
        .sum();
    assert_eq!(covered, slots.len());
}

#[test]
fn compile_resorts_discovered_slots_before_merging() {
    let lectures = vec![
        lecture(1, Weekday::Thu, "08:00", "09:00", 100, 7),
        lecture(2, Weekday::Thu, "09:00", "10:00", 100, 7),
    ];
    let config = AcademicConfig::default();
    let compiled = compile_timetable(
        &lectures,
        &references(),
        &config.days,
        &config.canonical_slots(),
    );

    assert_eq!(compiled.merged.slots[0].label(), "08:00-09:00");
    assert_eq!(compiled.merged.slots.len(), 9);
    assert!(compiled.malformed_slots.is_empty());
    let runs: Vec<_> = compiled.merged.runs_for(Weekday::Thu).collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].span(), 2);
}

#[test]
fn unresolved_cells_with_same_placeholder_merge() {
    let lectures = vec![
        lecture(1, Weekday::Fri, "09:00", "10:00", 500, 600),
        lecture(2, Weekday::Fri, "10:00", "11:00", 501, 601),
    ];
    let slots = normalize(["09:00-10:00", "10:00-11:00"]);
    let build = build_grid(&lectures, &references(), &slots);
    let merged = merge_consecutive(&build.grid, &[Weekday::Fri], &slots);

    assert_eq!(merged.runs.len(), 1);
    assert_eq!(merged.runs[0].cell.subject, "N/A");
}

#[test]
fn run_without_slots_has_empty_head() {
    let cell = GridCell::from_lecture(
        &lecture(1, Weekday::Mon, "09:00", "10:00", 100, 7),
        &references(),
    );
    let run = Run {
        group_key: cell.group_key(Weekday::Mon),
        cell,
        slots: Vec::new(),
        start_index: 0,
        end_index: 0,
    };
    assert_eq!(run.head_slot(), "");
    assert_eq!(run.time_range(), " to ");
}
