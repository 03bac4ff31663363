use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DeriveActiveEnum, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use util::lang::Language;

use super::{issue_follower, user};

/// A student's submission record for one task.
///
/// There is at most one issue per `(student_id, task_id)`; use
/// [`Model::get_or_create`] rather than inserting directly.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub student_id: i64,
    pub task_id: i64,

    /// Grading teacher, if one has been assigned.
    pub responsible_id: Option<i64>,

    pub status: IssueStatus,

    /// Always within `0..=task.score_max`.
    pub mark: i64,

    /// Review request on the external review board.
    pub review_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle state of an issue.
///
/// Stored as a lowercase string. Each status also has a small integer code,
/// the value grading forms post.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "issue_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IssueStatus {
    #[sea_orm(string_value = "new")]
    New,

    #[sea_orm(string_value = "auto_verification")]
    AutoVerification,

    #[sea_orm(string_value = "verification")]
    Verification,

    #[sea_orm(string_value = "rework")]
    Rework,

    #[sea_orm(string_value = "accepted")]
    Accepted,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 5] = [
        IssueStatus::New,
        IssueStatus::AutoVerification,
        IssueStatus::Verification,
        IssueStatus::Rework,
        IssueStatus::Accepted,
    ];

    pub fn code(self) -> i64 {
        match self {
            IssueStatus::New => 1,
            IssueStatus::AutoVerification => 2,
            IssueStatus::Verification => 3,
            IssueStatus::Rework => 4,
            IssueStatus::Accepted => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (IssueStatus::New, Language::En) => "New",
            (IssueStatus::New, Language::Ru) => "Новый",
            (IssueStatus::AutoVerification, Language::En) => "Auto verification",
            (IssueStatus::AutoVerification, Language::Ru) => "На автоматической проверке",
            (IssueStatus::Verification, Language::En) => "On verification",
            (IssueStatus::Verification, Language::Ru) => "На проверке",
            (IssueStatus::Rework, Language::En) => "Needs rework",
            (IssueStatus::Rework, Language::Ru) => "На доработке",
            (IssueStatus::Accepted, Language::En) => "Accepted",
            (IssueStatus::Accepted, Language::Ru) => "Зачтено",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::task::Entity",
        from = "Column::TaskId",
        to = "super::task::Column::Id"
    )]
    Task,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,

    #[sea_orm(has_many = "super::event::Entity")]
    Event,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Returns the issue for `(student_id, task_id)`, creating it on first use.
    ///
    /// Concurrent callers race on the unique index; the loser's insert is a
    /// no-op and both read back the same row.
    pub async fn get_or_create(
        db: &DbConn,
        student_id: i64,
        task_id: i64,
    ) -> Result<Model, DbErr> {
        if let Some(existing) = Self::find_by_student_and_task(db, student_id, task_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let active_model = ActiveModel {
            student_id: Set(student_id),
            task_id: Set(task_id),
            responsible_id: Set(None),
            status: Set(IssueStatus::New),
            mark: Set(0),
            review_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([Column::StudentId, Column::TaskId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::find_by_student_and_task(db, student_id, task_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Issue not found".to_string()))
    }

    pub async fn find_by_student_and_task(
        db: &DbConn,
        student_id: i64,
        task_id: i64,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::TaskId.eq(task_id))
            .one(db)
            .await
    }

    pub async fn find_by_review_id(db: &DbConn, review_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::ReviewId.eq(review_id))
            .one(db)
            .await
    }

    async fn update_with<C, F>(db: &C, issue_id: i64, apply: F) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
        F: FnOnce(&mut ActiveModel),
    {
        let model = Entity::find_by_id(issue_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Issue not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        apply(&mut active_model);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    pub async fn set_status<C: ConnectionTrait>(
        db: &C,
        issue_id: i64,
        status: IssueStatus,
    ) -> Result<Model, DbErr> {
        Self::update_with(db, issue_id, |am| am.status = Set(status)).await
    }

    pub async fn set_mark<C: ConnectionTrait>(
        db: &C,
        issue_id: i64,
        mark: i64,
    ) -> Result<Model, DbErr> {
        Self::update_with(db, issue_id, |am| am.mark = Set(mark)).await
    }

    pub async fn set_responsible<C: ConnectionTrait>(
        db: &C,
        issue_id: i64,
        responsible_id: Option<i64>,
    ) -> Result<Model, DbErr> {
        Self::update_with(db, issue_id, |am| am.responsible_id = Set(responsible_id)).await
    }

    pub async fn set_review_id<C: ConnectionTrait>(
        db: &C,
        issue_id: i64,
        review_id: Option<i64>,
    ) -> Result<Model, DbErr> {
        Self::update_with(db, issue_id, |am| am.review_id = Set(review_id)).await
    }

    pub async fn follower_ids<C: ConnectionTrait>(db: &C, issue_id: i64) -> Result<Vec<i64>, DbErr> {
        Ok(issue_follower::Entity::find()
            .filter(issue_follower::Column::IssueId.eq(issue_id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.user_id)
            .collect())
    }

    /// Followers ordered by last then first name.
    pub async fn followers<C: ConnectionTrait>(
        db: &C,
        issue_id: i64,
    ) -> Result<Vec<user::Model>, DbErr> {
        let ids = Self::follower_ids(db, issue_id).await?;
        user::Model::find_many(db, &ids).await
    }

    /// Replaces the follower set.
    pub async fn set_followers<C: ConnectionTrait>(
        db: &C,
        issue_id: i64,
        user_ids: &[i64],
    ) -> Result<(), DbErr> {
        issue_follower::Entity::delete_many()
            .filter(issue_follower::Column::IssueId.eq(issue_id))
            .exec(db)
            .await?;

        let mut unique = user_ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        if unique.is_empty() {
            return Ok(());
        }

        issue_follower::Entity::insert_many(unique.into_iter().map(|user_id| {
            issue_follower::ActiveModel {
                issue_id: Set(issue_id),
                user_id: Set(user_id),
            }
        }))
        .exec_without_returning(db)
        .await?;

        Ok(())
    }
}
