use std::io::{self, Write};

use chrono::{Local, NaiveDate, Weekday};
use timetable_tool::export::delimited::write_table_csv;
use timetable_tool::export::render_dataframe;
use timetable_tool::{
    AcademicConfig, AttendanceFilters, AttendanceReport, Catalog, CsvRenderer, DayRecord,
    ExportTable, RangeQuery, TextRenderer, TimetableResult, TimetableView,
};
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  load <path>                        Load a catalog JSON file\n  course <id|all>                    Select a course (clears everything else)\n  batch <id|all>                     Select a batch of the course\n  semester <n|all>                   Select a semester\n  faculty <id|all>                   Select a faculty member (clears everything else)\n  room <id|all>                      Select a room (clears everything else)\n  filters                            Show the current selection\n  generate                           Query lectures and build the timetable\n  show                               Show the current timetable\n  day <Mon..Sun>                     List the lectures of one day\n  reset                              Clear the selection and the timetable\n  export timetable <path>            Write the timetable as CSV\n  report <start> <end> [path]        Attendance report (YYYY-MM-DD); CSV when a path is given\n  quit|exit                          Exit"
    );
}

fn print_table(table: &ExportTable) {
    match table.to_dataframe() {
        Ok(df) => println!("{}", render_dataframe(&df)),
        Err(e) => println!("Error: {}", e),
    }
}

/// `all` clears the field.
fn parse_choice(value: Option<&str>) -> Result<Option<u32>, String> {
    match value {
        None => Err("missing value".to_string()),
        Some("all") => Ok(None),
        Some(v) => v
            .parse::<u32>()
            .map(Some)
            .map_err(|_| format!("invalid id '{v}'")),
    }
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

fn load_catalog(path: &str, view: &mut TimetableView) -> TimetableResult<Catalog> {
    let catalog = Catalog::from_json_file(path)?;
    view.reset();
    view.load_reference(&catalog);
    Ok(catalog)
}

fn print_filters(view: &TimetableView) {
    let filters = view.filters();
    let show = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
    println!(
        "course={} batch={} semester={} faculty={} room={}",
        show(filters.course()),
        show(filters.batch()),
        show(filters.semester()),
        show(filters.faculty()),
        show(filters.room())
    );
    match filters.resolve() {
        Ok(mode) => println!("Query: {}", mode.query_string()),
        Err(e) => println!("Incomplete: {}", e),
    }
}

fn attendance_report(
    catalog: &Catalog,
    view: &TimetableView,
    start: NaiveDate,
    end: NaiveDate,
) -> TimetableResult<AttendanceReport> {
    let filters = AttendanceFilters {
        course_id: view.filters().course(),
        faculty_id: view.filters().faculty(),
        semester: view.filters().semester(),
    };
    let context = view.report_context();
    let today = Local::now().date_naive();
    if start == end {
        let details = catalog.lecture_details(start, &filters);
        return Ok(AttendanceReport::for_day(
            start, &details, &filters, &context, today,
        ));
    }
    let query = RangeQuery::new(start, end).with_filters(filters);
    let records: Vec<DayRecord> = catalog.range(&query)?;
    Ok(AttendanceReport::for_range(
        start, end, &records, &filters, &context, today,
    ))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match std::env::var("TIMETABLE_CONFIG") {
        Ok(path) => match AcademicConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                AcademicConfig::default()
            }
        },
        Err(_) => AcademicConfig::default(),
    };
    let mut view = TimetableView::new(config);
    let mut catalog = Catalog::default();
    if let Ok(path) = std::env::var("TIMETABLE_CATALOG") {
        match load_catalog(&path, &mut view) {
            Ok(loaded) => catalog = loaded,
            Err(e) => eprintln!("Failed to load catalog {}: {}", path, e),
        }
    }

    println!("Timetable Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "load" => match parts.next() {
                Some(path) => match load_catalog(path, &mut view) {
                    Ok(loaded) => {
                        catalog = loaded;
                        println!("Catalog loaded from {}", path);
                        for message in view.fetch_errors() {
                            println!("Warning: {}", message);
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: load <path>"),
            },
            "course" | "batch" | "semester" | "faculty" | "room" => {
                let value = match parse_choice(parts.next()) {
                    Ok(v) => v,
                    Err(e) => {
                        println!("Usage: {} <id|all> ({})", cmd, e);
                        continue;
                    }
                };
                let filters = view.filters_mut();
                match cmd {
                    "course" => filters.select_course(value),
                    "batch" => filters.select_batch(value),
                    "semester" => filters.select_semester(value),
                    "faculty" => filters.select_faculty(value),
                    _ => filters.select_room(value),
                }
                println!("{} set.", cmd);
                if cmd == "course" {
                    for (id, label) in view.batch_options() {
                        println!("  batch {}: {}", id, label);
                    }
                }
                if cmd == "batch" && value.is_some() {
                    for (number, label) in view.config().semester_options() {
                        println!("  semester {}: {}", number, label);
                    }
                }
                print_filters(&view);
            }
            "filters" => print_filters(&view),
            "generate" => match view.generate(&catalog) {
                Ok(0) => println!("No lectures found for the selected filters."),
                Ok(count) => {
                    println!("Generated timetable from {} lectures.", count);
                    for collision in &view.compiled().collisions {
                        println!(
                            "Warning: lecture {} replaced lecture {} at {}",
                            collision.kept_lecture, collision.replaced_lecture, collision.key
                        );
                    }
                    if let Ok(table) = view.timetable_table() {
                        print_table(&table);
                    }
                }
                Err(e) => println!("Error: {}", e),
            },
            "show" => match view.timetable_table() {
                Ok(table) => print_table(&table),
                Err(_) => println!("No timetable generated."),
            },
            "day" => {
                let Some(day) = parts.next().and_then(|d| d.parse::<Weekday>().ok()) else {
                    println!("Usage: day <Mon..Sun>");
                    continue;
                };
                let lectures = view.day_lectures(day);
                if lectures.is_empty() {
                    println!("No lectures on {}.", day);
                }
                for lecture in lectures {
                    let names = view.indices().resolve(lecture);
                    println!(
                        "{} {} ({}) / {} / {}",
                        lecture.slot_label(),
                        names.subject,
                        names.code,
                        names.faculty,
                        names.room
                    );
                }
            }
            "reset" => {
                view.reset();
                println!("Selection and timetable cleared.");
            }
            "export" => match (parts.next(), parts.next()) {
                (Some("timetable"), Some(path)) => {
                    match view
                        .timetable_table()
                        .and_then(|table| write_table_csv(&table, path))
                    {
                        Ok(()) => println!("Timetable exported to {}", path),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: export timetable <path>"),
            },
            "report" => {
                let (Some(start), Some(end)) =
                    (parse_date(parts.next()), parse_date(parts.next()))
                else {
                    println!("Usage: report <YYYY-MM-DD> <YYYY-MM-DD> [path]");
                    continue;
                };
                let report = match attendance_report(&catalog, &view, start, end) {
                    Ok(report) => report,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                match parts.next() {
                    Some(path) => match CsvRenderer.write_to_path(&report, path) {
                        Ok(()) => println!("Report written to {}", path),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => match view.export(&TextRenderer::new(), &report) {
                        Some(text) => print!("{}", text),
                        None => {
                            println!("Error: {}", view.last_error().unwrap_or("export failed"))
                        }
                    },
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
