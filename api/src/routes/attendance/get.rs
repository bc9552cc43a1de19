//! Attendance group: read-only routes (list recorded days).

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use util::state::AppState;

use crate::response::ApiResponse;

use super::common::{RecordResponse, RecordsListResponse, RecordsQuery};
use db::models::attendance_record::{Column as RecordCol, Entity as RecordEntity};

/// GET `/api/attendance/records`
///
/// List attendance records with pagination, newest day first. Within a
/// day, rows come back in entry order.
///
/// **Auth**: registrar, enforced by the router.
///
/// **Query**:
/// - `from`, `to` *(optional dates)*: inclusive civil-date range
/// - `person_id` *(optional)*: only this person's records
/// - `page` *(default 1)*
/// - `per_page` *(default 20, max 100)*
///
/// **Response**: `RecordsListResponse`
pub async fn list_records(
    State(state): State<AppState>,
    Query(q): Query<RecordsQuery>,
) -> (StatusCode, Json<ApiResponse<RecordsListResponse>>) {
    let db = state.db();
    let page = q.page.unwrap_or(1).max(1) as u64;
    let per_page = q.per_page.unwrap_or(20).clamp(1, 100) as u64;

    let mut sel = RecordEntity::find();
    if let Some(from) = q.from {
        sel = sel.filter(RecordCol::Date.gte(from));
    }
    if let Some(to) = q.to {
        sel = sel.filter(RecordCol::Date.lte(to));
    }
    if let Some(person_id) = q.person_id {
        sel = sel.filter(RecordCol::PersonId.eq(person_id));
    }
    let sel = sel
        .order_by_desc(RecordCol::Date)
        .order_by_asc(RecordCol::EntryTime);

    let paginator = sel.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0) as i32;
    let rows = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .unwrap_or_default();

    let resp = RecordsListResponse {
        records: rows.into_iter().map(RecordResponse::from).collect(),
        page: page as i32,
        per_page: per_page as i32,
        total,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Attendance records retrieved")),
    )
}
