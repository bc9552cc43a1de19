use chrono::{DateTime, Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{DbErr, QueryOrder, TransactionTrait};
use serde::Serialize;

use crate::token;

/// One issued QR code for a course. At most one session per course is
/// active at a time; scans are accepted while `active` holds and the
/// expiry has not passed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub course_id: Uuid,
    pub created_by: Uuid,

    pub token: String,
    pub active: bool,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,

    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Issues a fresh session for a course and retires whatever was active.
    ///
    /// Deactivation and insertion run in one transaction so two overlapping
    /// issues can never both leave an active row behind.
    pub async fn issue(
        db: &DbConn,
        course_id: Uuid,
        created_by: Uuid,
        validity: Duration,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let txn = db.begin().await?;

        Entity::update_many()
            .col_expr(Column::Active, Expr::value(false))
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Active.eq(true))
            .exec(&txn)
            .await?;

        let session = ActiveModel {
            course_id: Set(course_id),
            created_by: Set(created_by),
            token: Set(token::encode_session(course_id, now, &token::nonce())),
            active: Set(true),
            created_at: Set(now),
            expires_at: Set(now + validity),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(session)
    }

    /// A session accepts scans only while flagged active and not yet expired.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }

    pub async fn find_by_token(db: &DbConn, token: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Token.eq(token))
            .one(db)
            .await
    }

    /// The currently scannable session for a course, if any.
    ///
    /// An active row whose expiry has passed is reported as absent and its
    /// flag is flipped opportunistically. Validity never depends on the
    /// flip having happened, so a failed update is only logged.
    pub async fn current_for_course(
        db: &DbConn,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Model>, DbErr> {
        let found = Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Active.eq(true))
            .order_by_desc(Column::CreatedAt)
            .one(db)
            .await?;

        match found {
            Some(session) if session.is_valid(now) => Ok(Some(session)),
            Some(expired) => {
                let id = expired.id;
                let mut stale: ActiveModel = expired.into();
                stale.active = Set(false);
                if let Err(err) = stale.update(db).await {
                    tracing::debug!(session_id = id, error = %err, "could not retire expired session");
                }
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
