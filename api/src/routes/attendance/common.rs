use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use db::attendance::AttendanceError;
use db::models::attendance_record::{AttendanceStatus, Transition};
use db::models::user::Role;

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: i64,
    pub person_id: String,
    pub role: Role,
    pub date: String,
    pub status: AttendanceStatus,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub note: Option<String>,
    pub recorded_by: String,
    pub session_id: Option<i64>,
    pub course_id: Option<String>,
}

impl From<db::models::attendance_record::Model> for RecordResponse {
    fn from(m: db::models::attendance_record::Model) -> Self {
        Self {
            id: m.id,
            person_id: m.person_id.to_string(),
            role: m.role,
            date: m.date.to_string(),
            status: m.status,
            entry_time: m.entry_time.map(|t| t.to_rfc3339()),
            exit_time: m.exit_time.map(|t| t.to_rfc3339()),
            note: m.note,
            recorded_by: m.recorded_by.to_string(),
            session_id: m.session_id,
            course_id: m.course_id.map(|c| c.to_string()),
        }
    }
}

#[derive(Deserialize)]
pub struct ScanReq {
    pub token: String,
    pub note: Option<String>,
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub transition: Transition,
    pub record: RecordResponse,
}

#[derive(Deserialize)]
pub struct ManualRecordReq {
    pub person_id: Uuid,
    /// Civil date of the record. Defaults to today in the configured
    /// timezone when omitted.
    pub date: Option<NaiveDate>,
    /// Defaults to `present`.
    pub status: Option<AttendanceStatus>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub person_id: Option<Uuid>,
    pub page: Option<i32>,
    pub per_page: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RecordsListResponse {
    pub records: Vec<RecordResponse>,
    pub page: i32,
    pub per_page: i32,
    pub total: i32,
}

/// Maps recording failures onto HTTP statuses. Token and lookup problems
/// keep their message; storage failures are logged and kept generic.
pub fn attendance_error_response(err: AttendanceError) -> Response {
    let (status, message) = match &err {
        AttendanceError::InvalidToken(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        AttendanceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        AttendanceError::SessionExpired => (StatusCode::GONE, err.to_string()),
        AttendanceError::Database(e) => {
            tracing::error!(error = %e, "database error while recording attendance");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record attendance".to_string(),
            )
        }
    };
    (status, Json(ApiResponse::<Empty>::error(message))).into_response()
}
