use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::issue::IssueStatus;

/// One immutable entry in an issue's history.
///
/// Rows are only ever inserted. The typed content lives in `payload`; `field`
/// duplicates its kind so history can be filtered in SQL.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub issue_id: i64,

    /// `None` for entries whose author could not be resolved (e.g. review board replies
    /// from unknown accounts).
    pub author_id: Option<i64>,

    pub field: EventField,

    pub payload: Json,

    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_field")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EventField {
    #[sea_orm(string_value = "status")]
    Status,

    #[sea_orm(string_value = "mark")]
    Mark,

    #[sea_orm(string_value = "responsible")]
    Responsible,

    #[sea_orm(string_value = "followers")]
    Followers,

    #[sea_orm(string_value = "file")]
    File,

    #[sea_orm(string_value = "comment")]
    Comment,
}

/// Outcome of forwarding attachments to the review board, kept on the
/// comment entry that carried them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReviewNote {
    Requested { review_id: i64 },
    Failed,
}

/// What changed, as stored in `events.payload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    Status {
        status: IssueStatus,
    },
    Mark {
        mark: i64,
    },
    Responsible {
        user_id: Option<i64>,
    },
    Followers {
        user_ids: Vec<i64>,
    },
    Comment {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        review: Option<ReviewNote>,
    },
    /// Attachments posted without comment text.
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        review: Option<ReviewNote>,
    },
}

impl EventPayload {
    pub fn field(&self) -> EventField {
        match self {
            EventPayload::Status { .. } => EventField::Status,
            EventPayload::Mark { .. } => EventField::Mark,
            EventPayload::Responsible { .. } => EventField::Responsible,
            EventPayload::Followers { .. } => EventField::Followers,
            EventPayload::Comment { .. } => EventField::Comment,
            EventPayload::File { .. } => EventField::File,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::issue::Entity",
        from = "Column::IssueId",
        to = "super::issue::Column::Id"
    )]
    Issue,

    #[sea_orm(has_many = "super::file::Entity")]
    File,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl Related<super::file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::File.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        issue_id: i64,
        author_id: Option<i64>,
        payload: &EventPayload,
    ) -> Result<Model, DbErr> {
        let json = serde_json::to_value(payload)
            .map_err(|e| DbErr::Custom(format!("Failed to encode event payload: {e}")))?;

        ActiveModel {
            issue_id: Set(issue_id),
            author_id: Set(author_id),
            field: Set(payload.field()),
            payload: Set(json),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Events of an issue, oldest first.
    pub async fn history<C: ConnectionTrait>(db: &C, issue_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::IssueId.eq(issue_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn count_for_issue<C: ConnectionTrait>(db: &C, issue_id: i64) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::IssueId.eq(issue_id))
            .count(db)
            .await
    }

    pub fn payload(&self) -> Result<EventPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_is_tagged_by_kind() {
        let payload = EventPayload::Status {
            status: IssueStatus::Rework,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "kind": "status", "status": "rework" })
        );
        assert_eq!(payload.field(), EventField::Status);
    }

    #[test]
    fn comment_without_review_note_omits_it() {
        let payload = EventPayload::Comment {
            text: "hi".into(),
            review: None,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "kind": "comment", "text": "hi" })
        );

        let failed: EventPayload = serde_json::from_value(json!({
            "kind": "comment",
            "text": "hi",
            "review": { "outcome": "failed" }
        }))
        .unwrap();
        assert_eq!(
            failed,
            EventPayload::Comment {
                text: "hi".into(),
                review: Some(ReviewNote::Failed)
            }
        );
    }
}
