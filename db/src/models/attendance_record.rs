use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{DbErr, SqlErr};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::user;

/// One person's attendance for one calendar date. The `(person_id, date)`
/// pair is unique, so a day's comings and goings collapse onto a single
/// row: the first registration stamps `entry_time`, every later one moves
/// `exit_time`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub person_id: Uuid,
    pub role: user::Role,
    pub date: Date,
    pub status: AttendanceStatus,

    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub note: Option<String>,

    pub recorded_by: Uuid,
    pub session_id: Option<i64>,
    pub course_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enum representing the standing of a day's record.
/// Backed by an `attendance_status` enum in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Display, Deserialize,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,

    #[sea_orm(string_value = "absent")]
    Absent,

    #[sea_orm(string_value = "late")]
    Late,

    #[sea_orm(string_value = "excused")]
    Excused,
}

/// Which branch of the daily lifecycle a registration took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Entry,
    Departure,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PersonId",
        to = "super::user::Column::Id"
    )]
    Person,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecordedBy",
        to = "super::user::Column::Id"
    )]
    Recorder,

    #[sea_orm(
        belongs_to = "super::attendance_session::Entity",
        from = "Column::SessionId",
        to = "super::attendance_session::Column::Id"
    )]
    Session,

    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Person.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_for_day(
        db: &DbConn,
        person_id: Uuid,
        date: Date,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::PersonId.eq(person_id))
            .filter(Column::Date.eq(date))
            .one(db)
            .await
    }

    /// Records a scan for `person` on `date`.
    ///
    /// The insert is attempted unconditionally; the unique index on
    /// `(person_id, date)` turns a second registration into a departure
    /// update instead of a failure, which also makes two racing first
    /// scans converge on one row. Status and `entry_time` are immutable
    /// once written.
    #[allow(clippy::too_many_arguments)]
    pub async fn register(
        db: &DbConn,
        person: &user::Model,
        date: Date,
        now: DateTime<Utc>,
        status: AttendanceStatus,
        recorded_by: Uuid,
        session_id: Option<i64>,
        course_id: Option<Uuid>,
        note: Option<&str>,
    ) -> Result<(Model, Transition), DbErr> {
        let attempt = ActiveModel {
            person_id: Set(person.id),
            role: Set(person.role),
            date: Set(date),
            status: Set(status),
            entry_time: Set(Some(now)),
            exit_time: Set(None),
            note: Set(note.map(str::to_owned)),
            recorded_by: Set(recorded_by),
            session_id: Set(session_id),
            course_id: Set(course_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await;

        match attempt {
            Ok(record) => Ok((record, Transition::Entry)),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = Self::find_for_day(db, person.id, date).await?.ok_or_else(|| {
                    DbErr::RecordNotFound(format!(
                        "attendance record for {} on {date} vanished mid-registration",
                        person.id
                    ))
                })?;
                let updated = existing.record_departure(db, now, note).await?;
                Ok((updated, Transition::Departure))
            }
            Err(err) => Err(err),
        }
    }

    /// Moves the day's departure stamp forward. Later scans win; the note
    /// is only replaced when a new one arrives.
    pub async fn record_departure(
        self,
        db: &DbConn,
        now: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<Model, DbErr> {
        let mut record: ActiveModel = self.into();
        record.exit_time = Set(Some(now));
        if let Some(note) = note {
            record.note = Set(Some(note.to_owned()));
        }
        record.updated_at = Set(now);
        record.update(db).await
    }

    /// Administrative correction. Writes the day's status directly without
    /// touching the scan timestamps; creates the row with no `entry_time`
    /// when the person never scanned at all.
    ///
    /// Returns `true` when a new row was created.
    pub async fn override_status(
        db: &DbConn,
        person: &user::Model,
        date: Date,
        now: DateTime<Utc>,
        status: AttendanceStatus,
        recorded_by: Uuid,
        note: Option<&str>,
    ) -> Result<(Model, bool), DbErr> {
        let attempt = ActiveModel {
            person_id: Set(person.id),
            role: Set(person.role),
            date: Set(date),
            status: Set(status),
            entry_time: Set(None),
            exit_time: Set(None),
            note: Set(note.map(str::to_owned)),
            recorded_by: Set(recorded_by),
            session_id: Set(None),
            course_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await;

        match attempt {
            Ok(record) => Ok((record, true)),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = Self::find_for_day(db, person.id, date).await?.ok_or_else(|| {
                    DbErr::RecordNotFound(format!(
                        "attendance record for {} on {date} vanished mid-correction",
                        person.id
                    ))
                })?;
                let mut record: ActiveModel = existing.into();
                record.status = Set(status);
                if let Some(note) = note {
                    record.note = Set(Some(note.to_owned()));
                }
                record.recorded_by = Set(recorded_by);
                record.updated_at = Set(now);
                let updated = record.update(db).await?;
                Ok((updated, false))
            }
            Err(err) => Err(err),
        }
    }
}
