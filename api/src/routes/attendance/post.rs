use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use util::state::AppState;

use crate::auth::guards::{CurrentUser, Empty};
use crate::response::ApiResponse;

use super::common::{
    ManualRecordReq, RecordResponse, ScanReq, ScanResponse, attendance_error_response,
};
use db::attendance;
use db::models::attendance_record::{AttendanceStatus, Transition};
use db::token::{self, DecodedToken};

/// POST `/api/attendance/scan`
///
/// Record a scanned QR token. The token kind decides who gets registered:
/// person tokens register the person they name, course and session tokens
/// register the caller.
///
/// **Auth**: any active account. Person tokens additionally require a
/// registrar role, since they stamp somebody else's day.
///
/// **Body**:
/// - `token`: the raw scanned payload
/// - `note` *(optional)*: free-text note stored on the record
///
/// **Responses**:
/// - `200 OK` with the transition (`entry` or `departure`) and the record
/// - `400` malformed token
/// - `403` person token scanned without a registrar role
/// - `404` token points at nobody
/// - `410` session token past its validity window
pub async fn scan(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(body): Json<ScanReq>,
) -> Response {
    let db = state.db();

    // A person token names its subject, so whoever scans it writes a row
    // for someone else. Keep that to registrars.
    if let Ok(DecodedToken::Person { .. }) = token::decode(&body.token) {
        if !caller.role.is_registrar() {
            return (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::<Empty>::error(
                    "Scanning another person's token requires a registrar role",
                )),
            )
                .into_response();
        }
    }

    match attendance::register_scan(db, &body.token, &caller, Utc::now(), body.note.as_deref())
        .await
    {
        Ok(result) => {
            let message = match result.transition {
                Transition::Entry => "Attendance entry recorded",
                Transition::Departure => "Attendance departure recorded",
            };
            let resp = ScanResponse {
                transition: result.transition,
                record: RecordResponse::from(result.record),
            };
            (StatusCode::OK, Json(ApiResponse::success(resp, message))).into_response()
        }
        Err(err) => attendance_error_response(err),
    }
}

/// POST `/api/attendance/records`
///
/// Manually set a person's status for a date, without a scan. Creates the
/// day's record if none exists, otherwise amends its status and note while
/// leaving any scan timestamps alone.
///
/// **Auth**: registrar (admin, teacher or monitor), enforced by the router.
///
/// **Body**:
/// - `person_id`: who the record is for
/// - `date` *(optional)*: civil date, defaults to today
/// - `status` *(optional)*: defaults to `present`
/// - `note` *(optional)*
///
/// **Responses**:
/// - `201 Created` when a new record was written
/// - `200 OK` when an existing record was amended
/// - `404` unknown or inactive person
pub async fn create_record(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(body): Json<ManualRecordReq>,
) -> Response {
    let db = state.db();
    let now = Utc::now();

    let date = body.date.unwrap_or_else(|| attendance::civil_date(now));
    let status = body.status.unwrap_or(AttendanceStatus::Present);

    match attendance::register_manual(
        db,
        body.person_id,
        date,
        status,
        &caller,
        now,
        body.note.as_deref(),
    )
    .await
    {
        Ok((record, created)) => {
            let (code, message) = if created {
                (StatusCode::CREATED, "Attendance record created")
            } else {
                (StatusCode::OK, "Attendance record amended")
            };
            (
                code,
                Json(ApiResponse::success(RecordResponse::from(record), message)),
            )
                .into_response()
        }
        Err(err) => attendance_error_response(err),
    }
}
