use chrono::NaiveDate;
use timetable_tool::report::{
    AttendanceCounts, LectureDetail, ReportTotals, SessionStatus, aggregate, format_time_12h,
    summarize_statuses,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn aggregate_sums_counts_and_total() {
    let records = [AttendanceCounts::new(3, 1, 0), AttendanceCounts::new(2, 0, 1)];
    assert_eq!(
        aggregate(&records),
        ReportTotals {
            held: 5,
            cancelled: 1,
            no_data: 1,
            total: 7
        }
    );
}

#[test]
fn aggregate_of_nothing_is_zero() {
    let records: [AttendanceCounts; 0] = [];
    assert_eq!(aggregate(&records), ReportTotals::default());
}

#[test]
fn missing_counts_deserialize_as_zero() {
    let counts: AttendanceCounts = serde_json::from_str(r#"{"total_held": 4}"#).unwrap();
    assert_eq!(counts, AttendanceCounts::new(4, 0, 0));

    let aliased: AttendanceCounts =
        serde_json::from_str(r#"{"held": 1, "cancelled": 2, "noData": 3}"#).unwrap();
    assert_eq!(aliased, AttendanceCounts::new(1, 2, 3));
}

#[test]
fn counts_serialize_with_wire_names() {
    let json = serde_json::to_value(AttendanceCounts::new(1, 2, 3)).unwrap();
    assert_eq!(json["total_held"], 1);
    assert_eq!(json["total_cancelled"], 2);
    assert_eq!(json["no_data"], 3);
}

#[test]
fn status_codes_map_to_labels_and_colors() {
    assert_eq!(SessionStatus::from_code("held").label(), "Class Taken");
    assert_eq!(SessionStatus::from_code("cancelled").color_hex(), "#dc3545");
    assert_eq!(SessionStatus::from_code("").label(), "No Entry");
    assert_eq!(SessionStatus::from_code("postponed"), SessionStatus::NoEntry);
    assert_eq!(SessionStatus::from_code("postponed").color_hex(), "#6c757d");
    assert_eq!(SessionStatus::Held.color_hex(), "#28a745");
}

#[test]
fn summarize_statuses_counts_per_date() {
    let summary = summarize_statuses([
        (d(2025, 1, 6), "held"),
        (d(2025, 1, 6), "cancelled"),
        (d(2025, 1, 6), "held"),
        (d(2025, 1, 7), "unknown"),
    ]);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[&d(2025, 1, 6)], AttendanceCounts::new(2, 1, 0));
    assert_eq!(summary[&d(2025, 1, 7)], AttendanceCounts::new(0, 0, 1));
}

#[test]
fn twelve_hour_formatting() {
    assert_eq!(format_time_12h("09:00"), "9:00am");
    assert_eq!(format_time_12h("12:30"), "12:30pm");
    assert_eq!(format_time_12h("00:15"), "12:15am");
    assert_eq!(format_time_12h("14:05:00"), "2:05pm");
    assert_eq!(format_time_12h(""), "");
    assert_eq!(format_time_12h(" TBA "), "TBA");
    assert_eq!(format_time_12h("+9:00"), "+9:00");
}

#[test]
fn lecture_detail_labels() {
    let detail = LectureDetail {
        start_time: Some("09:00".into()),
        end_time: Some("10:30".into()),
        course_name: Some("BCA".into()),
        batch_year: Some(2023),
        batch_section: Some("A".into()),
        status: "held".into(),
        ..LectureDetail::default()
    };
    assert_eq!(detail.time_range(), "9:00am - 10:30am");
    assert_eq!(detail.batch_label().as_deref(), Some("BCA 2023 A"));
    assert_eq!(detail.status(), SessionStatus::Held);
    assert_eq!(LectureDetail::default().batch_label(), None);
}
