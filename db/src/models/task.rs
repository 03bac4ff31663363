use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    /// Upper bound for an issue mark.
    pub score_max: i64,
    pub deadline_time: Option<DateTime<Utc>>,
    /// Comments with attachments are forwarded to the review board.
    pub rb_integrated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        course_id: i64,
        title: &str,
        score_max: i64,
        deadline_time: Option<DateTime<Utc>>,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        ActiveModel {
            course_id: Set(course_id),
            title: Set(title.to_owned()),
            score_max: Set(score_max),
            deadline_time: Set(deadline_time),
            rb_integrated: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn set_deadline(
        db: &DbConn,
        task_id: i64,
        deadline_time: Option<DateTime<Utc>>,
    ) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.deadline_time = Set(deadline_time);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    pub async fn set_rb_integrated(
        db: &DbConn,
        task_id: i64,
        rb_integrated: bool,
    ) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.rb_integrated = Set(rb_integrated);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    /// Whether `at` falls after the deadline. Tasks without one never expire.
    pub fn is_past_deadline(&self, at: DateTime<Utc>) -> bool {
        self.deadline_time.is_some_and(|deadline| at > deadline)
    }
}
