//! Scan handling: turns a decoded QR payload into the day's attendance
//! record. All date arithmetic goes through [`civil_date`] so every writer
//! agrees on which calendar day a timestamp belongs to.

use chrono::{DateTime, Duration, Utc};
use sea_orm::DbErr;
use sea_orm::entity::prelude::*;
use serde::Serialize;
use util::config;
use uuid::Uuid;

use crate::models::attendance_record::{self, AttendanceStatus, Transition};
use crate::models::user::Role;
use crate::models::{activity_log, attendance_session, course, user};
use crate::token::{self, DecodedToken, TokenError};

#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("attendance session has expired")]
    SessionExpired,
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// What a scan did to the day's record.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub transition: Transition,
    pub record: attendance_record::Model,
}

/// Calendar date of `now` in the deployment's timezone.
///
/// The `(person, date)` row key only works if every writer derives the
/// date the same way, so the offset comes from configuration and never
/// from the request.
pub fn civil_date(now: DateTime<Utc>) -> Date {
    let offset = Duration::minutes(i64::from(config::attendance_utc_offset_minutes()));
    (now + offset).date_naive()
}

/// Registers a scanned token on behalf of `recorder`.
///
/// Person tokens register the person named in the token; course and
/// session tokens register the recorder themselves, tagged with the
/// course context. Session tokens must still be within their validity
/// window. Role checks stay with the caller.
pub async fn register_scan(
    db: &DbConn,
    raw: &str,
    recorder: &user::Model,
    now: DateTime<Utc>,
    note: Option<&str>,
) -> Result<ScanResult, AttendanceError> {
    let (subject, session_id, course_id) = match token::decode(raw)? {
        DecodedToken::Person { id } => {
            let person_id = parse_id(&id).ok_or(AttendanceError::NotFound("Person"))?;
            let person = user::Model::find_active(db, person_id)
                .await?
                .ok_or(AttendanceError::NotFound("Person"))?;
            (person, None, None)
        }
        DecodedToken::Course { id } => {
            // Legacy poster: self check-in with course context, no
            // validity window to enforce.
            let course_id = parse_id(&id).ok_or(AttendanceError::NotFound("Course"))?;
            let course = course::Model::find_by_id(db, course_id)
                .await?
                .ok_or(AttendanceError::NotFound("Course"))?;
            (recorder.clone(), None, Some(course.id))
        }
        DecodedToken::Session { .. } => {
            // The stored row is authoritative; the whole token string is
            // its lookup key.
            let session = attendance_session::Model::find_by_token(db, raw.trim())
                .await?
                .ok_or(AttendanceError::NotFound("Attendance session"))?;
            if !session.is_valid(now) {
                return Err(AttendanceError::SessionExpired);
            }
            (recorder.clone(), Some(session.id), Some(session.course_id))
        }
    };

    let (record, transition) = attendance_record::Model::register(
        db,
        &subject,
        civil_date(now),
        now,
        AttendanceStatus::Present,
        recorder.id,
        session_id,
        course_id,
        note,
    )
    .await?;

    if recorder.role == Role::Monitor {
        audit(
            db,
            recorder,
            "attendance.scan",
            serde_json::json!({
                "person_id": record.person_id,
                "date": record.date,
                "transition": transition,
            }),
        )
        .await;
    }

    Ok(ScanResult { transition, record })
}

/// Administrative path: sets a person's status for a date without a scan.
///
/// Returns the record and whether a row was created rather than amended.
pub async fn register_manual(
    db: &DbConn,
    person_id: Uuid,
    date: Date,
    status: AttendanceStatus,
    recorder: &user::Model,
    now: DateTime<Utc>,
    note: Option<&str>,
) -> Result<(attendance_record::Model, bool), AttendanceError> {
    let person = user::Model::find_active(db, person_id)
        .await?
        .ok_or(AttendanceError::NotFound("Person"))?;

    let (record, created) = attendance_record::Model::override_status(
        db, &person, date, now, status, recorder.id, note,
    )
    .await?;

    if recorder.role == Role::Monitor {
        audit(
            db,
            recorder,
            "attendance.manual",
            serde_json::json!({
                "person_id": record.person_id,
                "date": record.date,
                "status": record.status,
                "created": created,
            }),
        )
        .await;
    }

    Ok((record, created))
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Best-effort trail for registrations performed by auxiliary staff. The
/// registration itself must never fail because the trail could not be
/// written.
async fn audit(db: &DbConn, actor: &user::Model, action: &str, detail: serde_json::Value) {
    if let Err(err) = activity_log::Model::append(db, actor.id, action, detail).await {
        tracing::warn!(actor = %actor.id, action, error = %err, "could not append activity log entry");
    }
}
