use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::grid::SlotCollision;
use crate::merge::{DayRow, compile_timetable};
use crate::reference::batches_for_course;
use crate::report::range_totals;
use crate::{
    AcademicConfig, AttendanceCounts, AttendanceFilters, Batch, Catalog, DayRecord, FilterMode,
    Lecture, LectureDetail, RangeQuery, ReferenceEntity, ReportTotals, TimetableError,
};

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<RwLock<Catalog>>,
    config: Arc<AcademicConfig>,
}

impl AppState {
    pub fn new(catalog: Catalog, config: AcademicConfig) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            config: Arc::new(config),
        }
    }

    fn catalog(&self) -> Arc<RwLock<Catalog>> {
        self.catalog.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound,
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<TimetableError> for ApiError {
    fn from(value: TimetableError) -> Self {
        match value {
            TimetableError::IncompleteSelection | TimetableError::InvalidData(_) => {
                ApiError::Invalid(value.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/course", get(list_courses))
        .route("/batch", get(list_batches))
        .route("/subject", get(list_subjects))
        .route("/faculty", get(list_faculties))
        .route("/room", get(list_rooms))
        .route("/lecture/query", get(query_lectures))
        .route("/timetable", get(get_timetable))
        .route("/calendar", get(calendar_month))
        .route("/calendar/day", get(calendar_day))
        .route("/calendar/range", get(calendar_range))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    catalog: Catalog,
    config: AcademicConfig,
) -> std::io::Result<()> {
    let state = AppState::new(catalog, config);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "timetable HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_courses(State(state): State<AppState>) -> Json<Vec<ReferenceEntity>> {
    let catalog = state.catalog();
    let courses = catalog.read().references.courses.clone();
    Json(courses)
}

#[derive(Debug, Default, Deserialize)]
struct BatchParams {
    course_id: Option<u32>,
}

async fn list_batches(
    State(state): State<AppState>,
    Query(params): Query<BatchParams>,
) -> Json<Vec<Batch>> {
    let catalog = state.catalog();
    let batches = {
        let guard = catalog.read();
        batches_for_course(&guard.references.batches, params.course_id)
            .into_iter()
            .cloned()
            .collect()
    };
    Json(batches)
}

async fn list_subjects(State(state): State<AppState>) -> Json<Vec<ReferenceEntity>> {
    let catalog = state.catalog();
    let subjects = catalog.read().references.subjects.clone();
    Json(subjects)
}

async fn list_faculties(State(state): State<AppState>) -> Json<Vec<ReferenceEntity>> {
    let catalog = state.catalog();
    let faculties = catalog.read().references.faculties.clone();
    Json(faculties)
}

async fn list_rooms(State(state): State<AppState>) -> Json<Vec<ReferenceEntity>> {
    let catalog = state.catalog();
    let rooms = catalog.read().references.rooms.clone();
    Json(rooms)
}

#[derive(Debug, Default, Deserialize)]
struct LectureParams {
    faculty_id: Option<u32>,
    room_id: Option<u32>,
    course_id: Option<u32>,
    batch_id: Option<u32>,
    semester: Option<u32>,
}

impl LectureParams {
    /// Same precedence as the selection resolver. The course defaults to the
    /// batch's course when omitted.
    fn filter_mode(&self, catalog: &Catalog) -> Result<FilterMode, ApiError> {
        if let Some(faculty_id) = self.faculty_id {
            return Ok(FilterMode::FacultyOnly { faculty_id });
        }
        if let Some(room_id) = self.room_id {
            return Ok(FilterMode::RoomOnly { room_id });
        }
        match (self.batch_id, self.semester) {
            (Some(batch_id), Some(semester)) => {
                let course_id = self
                    .course_id
                    .or_else(|| catalog.batch(batch_id).map(|batch| batch.course_id))
                    .ok_or_else(|| ApiError::invalid(format!("batch {batch_id} not found")))?;
                Ok(FilterMode::CourseBatchSemester {
                    course_id,
                    batch_id,
                    semester,
                })
            }
            _ => Err(TimetableError::IncompleteSelection.into()),
        }
    }
}

async fn query_lectures(
    State(state): State<AppState>,
    Query(params): Query<LectureParams>,
) -> Result<Json<Vec<Lecture>>, ApiError> {
    let catalog = state.catalog();
    let lectures = {
        let guard = catalog.read();
        let mode = params.filter_mode(&guard)?;
        guard.query(&mode)
    };
    if lectures.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(lectures))
}

#[derive(Debug, Serialize)]
struct TimetableBody {
    days: Vec<chrono::Weekday>,
    slots: Vec<String>,
    rows: Vec<DayRow>,
    collisions: Vec<SlotCollision>,
    malformed_slots: Vec<String>,
}

async fn get_timetable(
    State(state): State<AppState>,
    Query(params): Query<LectureParams>,
) -> Result<Json<TimetableBody>, ApiError> {
    let catalog = state.catalog();
    let compiled = {
        let guard = catalog.read();
        let mode = params.filter_mode(&guard)?;
        let lectures = guard.query(&mode);
        compile_timetable(
            &lectures,
            &guard.references.index(),
            &state.config.days,
            &state.config.canonical_slots(),
        )
    };
    Ok(Json(TimetableBody {
        days: compiled.merged.days.clone(),
        slots: compiled.merged.slots.iter().map(|slot| slot.label()).collect(),
        rows: compiled.merged.rows(),
        collisions: compiled.collisions,
        malformed_slots: compiled.malformed_slots,
    }))
}

/// Query parameters shared by the calendar routes.
#[derive(Debug, Default, Deserialize)]
struct CalendarParams {
    month: Option<u32>,
    year: Option<i32>,
    date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    course_id: Option<u32>,
    faculty_id: Option<u32>,
    semester: Option<u32>,
}

impl CalendarParams {
    fn filters(&self) -> AttendanceFilters {
        AttendanceFilters {
            course_id: self.course_id,
            faculty_id: self.faculty_id,
            semester: self.semester,
        }
    }
}

fn parse_date(name: &str, value: Option<&str>) -> Result<NaiveDate, ApiError> {
    let value = value
        .ok_or_else(|| ApiError::invalid(format!("'{name}' is required in YYYY-MM-DD format")))?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::invalid(format!("invalid '{name}', use YYYY-MM-DD")))
}

#[derive(Debug, Serialize)]
struct DaySummary {
    date: NaiveDate,
    #[serde(flatten)]
    counts: AttendanceCounts,
}

async fn calendar_month(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(month), Some(year)) = (params.month, params.year) else {
        return Err(ApiError::invalid(
            "both 'month' and 'year' query parameters are required",
        ));
    };
    let catalog = state.catalog();
    let summary = catalog
        .read()
        .month_summary(year, month, &params.filters())?;
    let data: Vec<DaySummary> = summary
        .into_iter()
        .map(|(date, counts)| DaySummary { date, counts })
        .collect();
    Ok(Json(json!({ "data": data })))
}

#[derive(Debug, Serialize)]
struct DayBody {
    date: NaiveDate,
    data: Vec<LectureDetail>,
}

async fn calendar_day(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<DayBody>, ApiError> {
    let date = parse_date("date", params.date.as_deref())?;
    let catalog = state.catalog();
    let data = catalog
        .read()
        .lecture_details(date, &params.filters());
    Ok(Json(DayBody { date, data }))
}

#[derive(Debug, Serialize)]
struct RangeBody {
    records: Vec<DayRecord>,
    totals: ReportTotals,
}

async fn calendar_range(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<RangeBody>, ApiError> {
    let query = RangeQuery::new(
        parse_date("start_date", params.start_date.as_deref())?,
        parse_date("end_date", params.end_date.as_deref())?,
    )
    .with_filters(params.filters());
    let catalog = state.catalog();
    let records = catalog.read().range(&query)?;
    let totals = range_totals(&records);
    Ok(Json(RangeBody { records, totals }))
}
