//! Reports group: aggregate read endpoints.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use util::state::AppState;

use crate::response::ApiResponse;

use db::attendance;
use db::models::user::Role;
use db::reports::{self, DaySummary, StatusReport};

/// Query params shared by the report endpoints.
#[derive(serde::Deserialize)]
pub struct ReportQuery {
    /// Start of the inclusive date range. Defaults to 30 days before `to`.
    pub from: Option<NaiveDate>,
    /// End of the inclusive date range. Defaults to today.
    pub to: Option<NaiveDate>,
    /// Restrict the population to one role, e.g. `student`.
    pub role: Option<String>,
}

fn range_or_default(from: Option<NaiveDate>, to: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    let to = to.unwrap_or_else(|| attendance::civil_date(Utc::now()));
    let from = from.unwrap_or_else(|| to - Duration::days(30));
    (from, to)
}

/// Parses the optional `role` query param, rejecting values that do not
/// name a role with a response in the caller's payload type.
fn parse_role_filter<T>(
    raw: Option<&str>,
) -> Result<Option<Role>, (StatusCode, Json<ApiResponse<T>>)>
where
    T: Serialize + Default,
{
    match raw {
        None => Ok(None),
        Some(s) => Role::from_str(s).map(Some).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!("Unknown role filter: '{s}'"))),
            )
        }),
    }
}

/// GET `/api/reports/attendance/status`
///
/// Status breakdown over a date range. Every status comes back with a
/// count and a whole-number percentage; an empty range is all zeros.
///
/// **Auth**: staff, enforced by the router.
///
/// **Query**:
/// - `from`, `to` *(optional dates)*: inclusive range, default last 30 days
/// - `role` *(optional)*: e.g. `student`; unknown values are a `400`
pub async fn status_report(
    State(state): State<AppState>,
    Query(q): Query<ReportQuery>,
) -> (StatusCode, Json<ApiResponse<StatusReport>>) {
    let db = state.db();
    let (from, to) = range_or_default(q.from, q.to);
    let role = match parse_role_filter(q.role.as_deref()) {
        Ok(role) => role,
        Err(resp) => return resp,
    };

    match reports::count_by_status(db, from, to, role).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ApiResponse::success(report, "Attendance status report")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to build status report");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to build attendance report")),
            )
        }
    }
}

/// GET `/api/reports/attendance/daily`
///
/// Per-day totals over a date range, ascending. Days without records are
/// omitted.
///
/// **Auth**: staff, enforced by the router.
///
/// **Query**: same as the status report.
pub async fn daily_report(
    State(state): State<AppState>,
    Query(q): Query<ReportQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<DaySummary>>>) {
    let db = state.db();
    let (from, to) = range_or_default(q.from, q.to);
    let role = match parse_role_filter(q.role.as_deref()) {
        Ok(role) => role,
        Err(resp) => return resp,
    };

    match reports::group_by_day(db, from, to, role).await {
        Ok(days) => (
            StatusCode::OK,
            Json(ApiResponse::success(days, "Attendance daily report")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to build daily report");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to build attendance report")),
            )
        }
    }
}
