//! Session group: read-only routes (list sessions, fetch the currently
//! scannable one).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use util::state::AppState;
use uuid::Uuid;

use crate::response::ApiResponse;

use super::common::{ListQuery, ListResponse, SessionResponse};
use db::models::attendance_session::{
    Column as SessionCol, Entity as SessionEntity, Model as Session,
};

/// GET `/api/courses/{course_id}/attendance/sessions`
///
/// List issued sessions for a course, newest first.
///
/// **Auth**: staff, enforced by the router.
///
/// **Query**:
/// - `active` *(optional bool)*
/// - `page` *(default 1)*
/// - `per_page` *(default 20, max 100)*
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Query(q): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<ListResponse>>) {
    let db = state.db();
    let page = q.page.unwrap_or(1).max(1) as u64;
    let per_page = q.per_page.unwrap_or(20).clamp(1, 100) as u64;

    let mut sel = SessionEntity::find().filter(SessionCol::CourseId.eq(course_id));
    if let Some(a) = q.active {
        sel = sel.filter(SessionCol::Active.eq(a));
    }
    let sel = sel.order_by_desc(SessionCol::CreatedAt);

    let paginator = sel.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0) as i32;
    let rows: Vec<Session> = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .unwrap_or_default();

    let resp = ListResponse {
        sessions: rows.into_iter().map(SessionResponse::from).collect(),
        page: page as i32,
        per_page: per_page as i32,
        total,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Attendance sessions retrieved")),
    )
}

/// GET `/api/courses/{course_id}/attendance/sessions/current`
///
/// Fetch the session whose token is scannable right now. A row that is
/// still flagged active but past its expiry is retired on read, so this
/// never hands out a dead code.
///
/// **Auth**: staff, enforced by the router.
///
/// **Response**: `200 OK` with the session, or `404` when nothing is live.
pub async fn current_session(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    let db = state.db();

    match Session::current_for_course(db, course_id, Utc::now()).await {
        Ok(Some(row)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SessionResponse::from(row),
                "Current attendance session retrieved",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("No active session for this course")),
        ),
        Err(e) => {
            tracing::error!(error = %e, course_id = %course_id, "failed to load current session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "Database error retrieving attendance session",
                )),
            )
        }
    }
}
