use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use serde::Serialize;

use super::{course_teacher, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::task::Entity")]
    Task,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(db: &DbConn, name: &str, year: i32) -> Result<Model, DbErr> {
        let now = Utc::now();

        ActiveModel {
            name: Set(name.to_owned()),
            year: Set(year),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn add_teacher(db: &DbConn, course_id: i64, user_id: i64) -> Result<(), DbErr> {
        if Self::is_teacher(db, course_id, user_id).await? {
            return Ok(());
        }

        course_teacher::ActiveModel {
            course_id: Set(course_id),
            user_id: Set(user_id),
        }
        .insert(db)
        .await?;
        Ok(())
    }

    pub async fn is_teacher<C: ConnectionTrait>(
        db: &C,
        course_id: i64,
        user_id: i64,
    ) -> Result<bool, DbErr> {
        Ok(course_teacher::Entity::find_by_id((course_id, user_id))
            .one(db)
            .await?
            .is_some())
    }

    /// Teachers of the course, ordered by last then first name.
    pub async fn teachers<C: ConnectionTrait>(
        db: &C,
        course_id: i64,
    ) -> Result<Vec<user::Model>, DbErr> {
        let ids: Vec<i64> = course_teacher::Entity::find()
            .filter(course_teacher::Column::CourseId.eq(course_id))
            .order_by_asc(course_teacher::Column::UserId)
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.user_id)
            .collect();

        user::Model::find_many(db, &ids).await
    }
}
