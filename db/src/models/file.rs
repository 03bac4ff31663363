use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set};
use serde::Serialize;
use std::fmt;

/// An attachment owned by a comment/file event.
///
/// Several rows may point at the same stored `path`; path rewrites always
/// update all of them together.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_id: i64,
    /// Storage key: legacy media path, or the S3-prefixed key once migrated.
    pub path: String,
    /// Name shown to users.
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename)
    }
}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        event_id: i64,
        path: &str,
        filename: &str,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            event_id: Set(event_id),
            path: Set(path.to_owned()),
            filename: Set(filename.to_owned()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Every attachment, ordered by id.
    pub async fn all_ordered(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find().order_by_asc(Column::Id).all(db).await
    }

    pub async fn for_events<C: ConnectionTrait>(
        db: &C,
        event_ids: &[i64],
    ) -> Result<Vec<Model>, DbErr> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find()
            .filter(Column::EventId.is_in(event_ids.iter().copied()))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn find_by_path(db: &DbConn, path: &str) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::Path.eq(path))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// Points every row stored at `from` to `to`. Returns the number of rows changed.
    pub async fn rewrite_path<C: ConnectionTrait>(
        db: &C,
        from: &str,
        to: &str,
    ) -> Result<u64, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::Path, Expr::value(to))
            .filter(Column::Path.eq(from))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
