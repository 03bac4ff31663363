use db::models::{course, issue, task};
use sea_orm::{DatabaseConnection, DbErr};

/// The user acting on an issue, as taken from the request's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub admin: bool,
}

/// How an actor relates to a particular issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueRole {
    /// Course teacher or admin: may use every form.
    Staff,
    /// The issue's own student: may only comment.
    Student,
    Outsider,
}

impl IssueRole {
    pub async fn resolve(
        db: &DatabaseConnection,
        actor: Actor,
        issue: &issue::Model,
        task: &task::Model,
    ) -> Result<Self, DbErr> {
        if actor.admin || course::Model::is_teacher(db, task.course_id, actor.user_id).await? {
            Ok(IssueRole::Staff)
        } else if actor.user_id == issue.student_id {
            Ok(IssueRole::Student)
        } else {
            Ok(IssueRole::Outsider)
        }
    }

    pub fn can_view(self) -> bool {
        !matches!(self, IssueRole::Outsider)
    }

    pub fn can_comment(self) -> bool {
        self.can_view()
    }

    pub fn can_grade(self) -> bool {
        matches!(self, IssueRole::Staff)
    }
}
