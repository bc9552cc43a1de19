use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::DbErr;
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Append-only trail of registrations performed on someone's behalf.
/// Rows are written best-effort and never read back on the request path.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub actor_id: Uuid,
    pub action: String,
    pub detail: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorId",
        to = "super::user::Column::Id"
    )]
    Actor,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn append(
        db: &DbConn,
        actor_id: Uuid,
        action: &str,
        detail: serde_json::Value,
    ) -> Result<Model, DbErr> {
        let entry = ActiveModel {
            actor_id: Set(actor_id),
            action: Set(action.to_owned()),
            detail: Set(detail.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        entry.insert(db).await
    }

    pub async fn for_actor(db: &DbConn, actor_id: Uuid) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ActorId.eq(actor_id))
            .all(db)
            .await
    }
}
