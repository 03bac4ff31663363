use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use serde::Serialize;

use super::{course, school_course};

/// A school groups courses. Inactive schools only appear in the archive.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "schools")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// URL slug, unique.
    pub link: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        name: &str,
        link: &str,
        is_active: bool,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            name: Set(name.to_owned()),
            link: Set(link.to_owned()),
            is_active: Set(is_active),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub fn url(&self) -> String {
        format!("/school/{}", self.link)
    }

    pub async fn add_course(db: &DbConn, school_id: i64, course_id: i64) -> Result<(), DbErr> {
        let exists = school_course::Entity::find_by_id((school_id, course_id))
            .one(db)
            .await?
            .is_some();
        if !exists {
            school_course::ActiveModel {
                school_id: Set(school_id),
                course_id: Set(course_id),
            }
            .insert(db)
            .await?;
        }
        Ok(())
    }

    /// Active schools ordered by name.
    pub async fn find_active(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Self::find_by_activity(db, true).await
    }

    /// Inactive schools ordered by name.
    pub async fn find_archived(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Self::find_by_activity(db, false).await
    }

    async fn find_by_activity(db: &DbConn, is_active: bool) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::IsActive.eq(is_active))
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn courses(&self, db: &DbConn) -> Result<Vec<course::Model>, DbErr> {
        let ids: Vec<i64> = school_course::Entity::find()
            .filter(school_course::Column::SchoolId.eq(self.id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.course_id)
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        course::Entity::find()
            .filter(course::Column::Id.is_in(ids))
            .order_by_asc(course::Column::Name)
            .all(db)
            .await
    }
}
