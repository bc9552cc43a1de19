use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Duration;
use util::{config, state::AppState};
use uuid::Uuid;

use crate::{auth::guards::CurrentUser, response::ApiResponse};

use super::common::{CreateSessionReq, SessionResponse};
use db::models::attendance_session::Model as Session;

/// POST `/api/courses/{course_id}/attendance/sessions`
///
/// Issue a fresh QR session for the course. Any previously active session
/// for the same course is retired in the same transaction, so at most one
/// session token is scannable per course at a time.
///
/// **Auth**: staff (admin or teacher), enforced by the router.
///
/// **Body**:
/// - `validity_hours` *(optional)*: lifetime of the new code, clamped to
///   1..=720. Defaults to the configured session validity.
///
/// **Response**: `201 Created` with the new session, token included.
pub async fn create_session(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(body): Json<CreateSessionReq>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    let db = state.db();

    let validity_hours = body
        .validity_hours
        .unwrap_or_else(config::session_validity_hours)
        .clamp(1, 720);

    match Session::issue(db, course_id, caller.id, Duration::hours(validity_hours)).await {
        Ok(row) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                SessionResponse::from(row),
                "Attendance session created",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!(
                "Failed to create attendance session: {e}"
            ))),
        ),
    }
}
