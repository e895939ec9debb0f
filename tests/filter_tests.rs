use timetable_tool::{FilterMode, SelectionFilters, TimetableError};

fn complete_course_selection() -> SelectionFilters {
    let mut filters = SelectionFilters::new();
    filters.select_course(Some(1));
    filters.select_batch(Some(10));
    filters.select_semester(Some(3));
    filters
}

#[test]
fn course_batch_semester_resolves_to_combined_mode() {
    let filters = complete_course_selection();
    assert_eq!(
        filters.resolve().unwrap(),
        FilterMode::CourseBatchSemester {
            course_id: 1,
            batch_id: 10,
            semester: 3
        }
    );
    assert!(filters.can_submit());
}

#[test]
fn selecting_faculty_clears_course_batch_and_semester() {
    let mut filters = complete_course_selection();
    filters.select_faculty(Some(7));

    assert_eq!(filters.course(), None);
    assert_eq!(filters.batch(), None);
    assert_eq!(filters.semester(), None);
    assert_eq!(filters.resolve().unwrap(), FilterMode::FacultyOnly { faculty_id: 7 });
}

#[test]
fn selecting_room_clears_faculty() {
    let mut filters = SelectionFilters::new();
    filters.select_faculty(Some(7));
    filters.select_room(Some(3));

    assert_eq!(filters.faculty(), None);
    assert_eq!(filters.resolve().unwrap(), FilterMode::RoomOnly { room_id: 3 });
}

#[test]
fn selecting_course_clears_everything_else() {
    let mut filters = SelectionFilters::new();
    filters.select_room(Some(3));
    filters.select_course(Some(2));

    assert_eq!(filters.room(), None);
    assert_eq!(filters.course(), Some(2));
    assert_eq!(filters.batch(), None);
}

#[test]
fn changing_batch_clears_semester() {
    let mut filters = complete_course_selection();
    filters.select_batch(Some(11));

    assert_eq!(filters.course(), Some(1));
    assert_eq!(filters.batch(), Some(11));
    assert_eq!(filters.semester(), None);
}

#[test]
fn course_and_batch_without_semester_is_incomplete() {
    let mut filters = SelectionFilters::new();
    filters.select_course(Some(1));
    filters.select_batch(Some(10));

    assert!(matches!(
        filters.resolve(),
        Err(TimetableError::IncompleteSelection)
    ));
    assert!(!filters.can_submit());
}

#[test]
fn empty_selection_is_incomplete() {
    let filters = SelectionFilters::new();
    assert!(filters.is_empty());
    assert!(matches!(
        filters.resolve(),
        Err(TimetableError::IncompleteSelection)
    ));
}

#[test]
fn reset_clears_all_fields() {
    let mut filters = complete_course_selection();
    filters.reset();
    assert!(filters.is_empty());
}

#[test]
fn query_params_follow_mode() {
    assert_eq!(
        FilterMode::FacultyOnly { faculty_id: 7 }.query_string(),
        "faculty_id=7"
    );
    assert_eq!(FilterMode::RoomOnly { room_id: 3 }.query_string(), "room_id=3");
    let combined = FilterMode::CourseBatchSemester {
        course_id: 1,
        batch_id: 10,
        semester: 3,
    };
    assert_eq!(
        combined.query_params(),
        vec![("batch_id", "10".to_string()), ("semester", "3".to_string())]
    );
    assert_eq!(combined.query_string(), "batch_id=10&semester=3");
}
