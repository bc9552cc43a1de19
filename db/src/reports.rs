//! Read-only aggregations over attendance records. Queries group in the
//! store and return compact rows; shaping into response-ready structs
//! happens here, with every status present even when its count is zero.

use std::collections::{BTreeMap, HashMap};

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{DbErr, FromQueryResult, Iterable, QueryOrder, QuerySelect};
use serde::Serialize;

use crate::models::attendance_record::{AttendanceStatus, Column, Entity};
use crate::models::user::Role;

#[derive(Debug, Clone, Serialize)]
pub struct StatusBucket {
    pub status: AttendanceStatus,
    pub count: i64,
    /// Share of the range's records, rounded to the nearest whole percent.
    pub percent: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    pub total: i64,
    pub by_status: Vec<StatusBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayStatusCount {
    pub status: AttendanceStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: Date,
    pub total: i64,
    pub by_status: Vec<DayStatusCount>,
}

#[derive(FromQueryResult)]
struct StatusRow {
    status: AttendanceStatus,
    cnt: i64,
}

#[derive(FromQueryResult)]
struct DayRow {
    date: Date,
    status: AttendanceStatus,
    cnt: i64,
}

/// Status breakdown over a date range, optionally narrowed to one role.
///
/// Every status appears in the output. An empty range yields a report of
/// zeros, not an error.
pub async fn count_by_status(
    db: &DbConn,
    from: Date,
    to: Date,
    role: Option<Role>,
) -> Result<StatusReport, DbErr> {
    let mut query = Entity::find()
        .select_only()
        .column(Column::Status)
        .column_as(Expr::expr(Func::count(Expr::col(Column::Id))), "cnt")
        .filter(Column::Date.gte(from))
        .filter(Column::Date.lte(to));
    if let Some(role) = role {
        query = query.filter(Column::Role.eq(role));
    }

    let rows: Vec<StatusRow> = query
        .group_by(Column::Status)
        .into_model()
        .all(db)
        .await?;

    let counts: HashMap<AttendanceStatus, i64> =
        rows.into_iter().map(|r| (r.status, r.cnt)).collect();
    let total: i64 = counts.values().sum();

    let by_status = AttendanceStatus::iter()
        .map(|status| {
            let count = counts.get(&status).copied().unwrap_or(0);
            StatusBucket {
                status,
                count,
                percent: percent_of(count, total),
            }
        })
        .collect();

    Ok(StatusReport { total, by_status })
}

/// Per-day totals over a date range, ascending by date. Days with no
/// records are simply absent.
pub async fn group_by_day(
    db: &DbConn,
    from: Date,
    to: Date,
    role: Option<Role>,
) -> Result<Vec<DaySummary>, DbErr> {
    let mut query = Entity::find()
        .select_only()
        .column(Column::Date)
        .column(Column::Status)
        .column_as(Expr::expr(Func::count(Expr::col(Column::Id))), "cnt")
        .filter(Column::Date.gte(from))
        .filter(Column::Date.lte(to));
    if let Some(role) = role {
        query = query.filter(Column::Role.eq(role));
    }

    let rows: Vec<DayRow> = query
        .group_by(Column::Date)
        .group_by(Column::Status)
        .order_by_asc(Column::Date)
        .into_model()
        .all(db)
        .await?;

    let mut days: BTreeMap<Date, HashMap<AttendanceStatus, i64>> = BTreeMap::new();
    for row in rows {
        *days.entry(row.date).or_default().entry(row.status).or_insert(0) += row.cnt;
    }

    Ok(days
        .into_iter()
        .map(|(date, counts)| {
            let total = counts.values().sum();
            let by_status = AttendanceStatus::iter()
                .map(|status| DayStatusCount {
                    status,
                    count: counts.get(&status).copied().unwrap_or(0),
                })
                .collect();
            DaySummary {
                date,
                total,
                by_status,
            }
        })
        .collect())
}

fn percent_of(count: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as i64
}
