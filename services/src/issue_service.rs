//! Write side of an issue: one form submission in, zero or more history
//! entries out.
//!
//! Every change to an issue goes through here and lands in the same database
//! transaction as the history entry describing it.

use db::models::{
    course,
    event::{self, EventPayload, ReviewNote},
    file,
    issue::{self, IssueStatus},
    task, user,
};
use sea_orm::{DatabaseConnection, DatabaseTransaction, EntityTrait, TransactionTrait};
use std::sync::Arc;
use storage::StorageBackend;
use tracing::{debug, info, warn};

use crate::access::{Actor, IssueRole};
use crate::issue_form::IssueAction;
use crate::review_board::{ReviewBoard, ReviewFile, ReviewUpload};
use crate::status_transitions::StatusTransitions;
use crate::ServiceError;

/// Collaborators the issue handlers need besides the database.
#[derive(Clone)]
pub struct IssueDeps {
    pub transitions: Arc<StatusTransitions>,
    pub review_board: Arc<dyn ReviewBoard>,
    /// Where new attachments are written (the legacy media root).
    pub storage: Arc<dyn StorageBackend>,
}

/// An uploaded attachment, not yet stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

struct Loaded {
    issue: issue::Model,
    task: task::Model,
    role: IssueRole,
}

async fn load(
    db: &DatabaseConnection,
    actor: Actor,
    issue_id: i64,
) -> Result<Loaded, ServiceError> {
    let issue = issue::Entity::find_by_id(issue_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Issue"))?;
    let task = task::Entity::find_by_id(issue.task_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;
    let role = IssueRole::resolve(db, actor, &issue, &task).await?;
    Ok(Loaded { issue, task, role })
}

/// Returns the issue for `(student_id, task_id)`, creating it on first access.
///
/// Students may only open their own issue; staff of the task's course may
/// open anyone's.
pub async fn get_or_create(
    db: &DatabaseConnection,
    actor: Actor,
    task_id: i64,
    student_id: i64,
) -> Result<issue::Model, ServiceError> {
    let task = task::Entity::find_by_id(task_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;
    user::Entity::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Student"))?;

    let is_staff =
        actor.admin || course::Model::is_teacher(db, task.course_id, actor.user_id).await?;
    if !is_staff && actor.user_id != student_id {
        return Err(ServiceError::Forbidden);
    }

    Ok(issue::Model::get_or_create(db, student_id, task_id).await?)
}

/// Applies one resolved form action.
///
/// Returns the history entries appended, oldest first. An empty vector means
/// the submission was valid but changed nothing (same value, out of range,
/// disallowed transition, blank comment).
pub async fn apply(
    db: &DatabaseConnection,
    deps: &IssueDeps,
    actor: Actor,
    issue_id: i64,
    action: IssueAction,
) -> Result<Vec<event::Model>, ServiceError> {
    if let IssueAction::Comment { text } = action {
        return post_comment(db, deps, actor, issue_id, &text, Vec::new()).await;
    }

    let Loaded { issue, task, role } = load(db, actor, issue_id).await?;
    if !role.can_grade() {
        return Err(ServiceError::Forbidden);
    }

    let txn = db.begin().await?;
    let events = match action {
        IssueAction::SetResponsible(user_id) => {
            set_responsible(&txn, &issue, &task, actor, user_id).await?
        }
        IssueAction::AddFollower(user_id) => {
            let mut ids = issue::Model::follower_ids(&txn, issue.id).await?;
            if ids.contains(&user_id) {
                Vec::new()
            } else {
                ids.push(user_id);
                replace_followers(&txn, &issue, actor, ids).await?
            }
        }
        IssueAction::SetFollowers(ids) => {
            let teachers: Vec<i64> = course::Model::teachers(&txn, task.course_id)
                .await?
                .into_iter()
                .map(|u| u.id)
                .collect();
            if ids.iter().all(|id| teachers.contains(id)) {
                replace_followers(&txn, &issue, actor, ids).await?
            } else {
                debug!(issue_id, "followers outside the course staff ignored");
                Vec::new()
            }
        }
        IssueAction::SetStatus(status) => {
            if status != issue.status && deps.transitions.allows(issue.status, status) {
                issue::Model::set_status(&txn, issue.id, status).await?;
                vec![record(&txn, &issue, actor, EventPayload::Status { status }).await?]
            } else {
                debug!(issue_id, from = %issue.status, to = %status, "status change ignored");
                Vec::new()
            }
        }
        IssueAction::SetMark { mark, accept } => {
            if !(0..=task.score_max).contains(&mark) {
                debug!(issue_id, mark, score_max = task.score_max, "mark out of range ignored");
                Vec::new()
            } else if accept {
                issue::Model::set_status(&txn, issue.id, IssueStatus::Accepted).await?;
                let status = record(
                    &txn,
                    &issue,
                    actor,
                    EventPayload::Status {
                        status: IssueStatus::Accepted,
                    },
                )
                .await?;
                issue::Model::set_mark(&txn, issue.id, mark).await?;
                let mark = record(&txn, &issue, actor, EventPayload::Mark { mark }).await?;
                vec![status, mark]
            } else if mark != issue.mark {
                issue::Model::set_mark(&txn, issue.id, mark).await?;
                vec![record(&txn, &issue, actor, EventPayload::Mark { mark }).await?]
            } else {
                Vec::new()
            }
        }
        IssueAction::Comment { .. } => Vec::new(),
    };
    txn.commit().await?;

    if !events.is_empty() {
        info!(issue_id, actor = actor.user_id, entries = events.len(), "issue updated");
    }
    Ok(events)
}

async fn record(
    txn: &DatabaseTransaction,
    issue: &issue::Model,
    actor: Actor,
    payload: EventPayload,
) -> Result<event::Model, ServiceError> {
    Ok(event::Model::create(txn, issue.id, Some(actor.user_id), &payload).await?)
}

async fn set_responsible(
    txn: &DatabaseTransaction,
    issue: &issue::Model,
    task: &task::Model,
    actor: Actor,
    user_id: i64,
) -> Result<Vec<event::Model>, ServiceError> {
    if issue.responsible_id == Some(user_id) {
        return Ok(Vec::new());
    }

    // The acting teacher may always take the issue; anyone else must be course staff.
    let eligible = user_id == actor.user_id
        || course::Model::is_teacher(txn, task.course_id, user_id).await?;
    if !eligible {
        debug!(issue_id = issue.id, user_id, "responsible outside the course staff ignored");
        return Ok(Vec::new());
    }

    issue::Model::set_responsible(txn, issue.id, Some(user_id)).await?;
    Ok(vec![
        record(
            txn,
            issue,
            actor,
            EventPayload::Responsible {
                user_id: Some(user_id),
            },
        )
        .await?,
    ])
}

async fn replace_followers(
    txn: &DatabaseTransaction,
    issue: &issue::Model,
    actor: Actor,
    mut ids: Vec<i64>,
) -> Result<Vec<event::Model>, ServiceError> {
    ids.sort_unstable();
    ids.dedup();

    let mut current = issue::Model::follower_ids(txn, issue.id).await?;
    current.sort_unstable();
    if current == ids {
        return Ok(Vec::new());
    }

    issue::Model::set_followers(txn, issue.id, &ids).await?;
    Ok(vec![
        record(txn, issue, actor, EventPayload::Followers { user_ids: ids }).await?,
    ])
}

/// Adds a comment and/or attachments.
///
/// A blank comment without files is a no-op. Files on review-board tasks are
/// forwarded first so the outcome can be recorded on the entry itself.
pub async fn post_comment(
    db: &DatabaseConnection,
    deps: &IssueDeps,
    actor: Actor,
    issue_id: i64,
    text: &str,
    uploads: Vec<Upload>,
) -> Result<Vec<event::Model>, ServiceError> {
    let text = text.trim();
    if text.is_empty() && uploads.is_empty() {
        return Ok(Vec::new());
    }

    let Loaded { issue, task, role } = load(db, actor, issue_id).await?;
    if !role.can_comment() {
        return Err(ServiceError::Forbidden);
    }

    let review_note = if task.rb_integrated && !uploads.is_empty() {
        Some(
            match send_to_review_board(db, deps, actor, &issue, &task, &uploads).await {
                Some(review_id) => ReviewNote::Requested { review_id },
                None => ReviewNote::Failed,
            },
        )
    } else {
        None
    };

    let payload = if text.is_empty() {
        EventPayload::File {
            review: review_note,
        }
    } else {
        EventPayload::Comment {
            text: text.to_string(),
            review: review_note,
        }
    };

    let txn = db.begin().await?;
    let entry = event::Model::create(&txn, issue.id, Some(actor.user_id), &payload).await?;
    if let Some(ReviewNote::Requested { review_id }) = review_note {
        if issue.review_id != Some(review_id) {
            issue::Model::set_review_id(&txn, issue.id, Some(review_id)).await?;
        }
    }

    let mut saved = Vec::with_capacity(uploads.len());
    if let Err(e) =
        attach_and_commit(txn, deps.storage.as_ref(), &entry, &uploads, &mut saved).await
    {
        discard_attachments(deps.storage.as_ref(), &saved).await;
        return Err(e);
    }

    info!(
        issue_id,
        actor = actor.user_id,
        files = uploads.len(),
        "comment added"
    );
    Ok(vec![entry])
}

/// Stores each upload under its own key and records it, then commits.
///
/// Keys written so far are pushed to `saved` so the caller can remove them if
/// anything fails before the commit lands.
async fn attach_and_commit(
    txn: DatabaseTransaction,
    storage: &dyn StorageBackend,
    entry: &event::Model,
    uploads: &[Upload],
    saved: &mut Vec<String>,
) -> Result<(), ServiceError> {
    let keys = util::paths::attachment_keys(
        entry.issue_id,
        entry.id,
        uploads.iter().map(|u| u.filename.as_str()),
    );
    for (upload, key) in uploads.iter().zip(&keys) {
        let stored = storage.save(key, &upload.content).await?;
        saved.push(stored.clone());
        file::Model::create(&txn, entry.id, &stored, &upload.filename).await?;
    }
    txn.commit().await?;
    Ok(())
}

async fn discard_attachments(storage: &dyn StorageBackend, keys: &[String]) {
    for key in keys {
        if let Err(e) = storage.delete(key).await {
            warn!(key = %key, error = %e, "could not remove orphaned attachment");
        }
    }
}

/// Forwards the uploads as a review request. `None` when the board is
/// unavailable or refuses them.
async fn send_to_review_board(
    db: &DatabaseConnection,
    deps: &IssueDeps,
    actor: Actor,
    issue: &issue::Model,
    task: &task::Model,
    uploads: &[Upload],
) -> Option<i64> {
    let submitter = match user::Entity::find_by_id(actor.user_id).one(db).await {
        Ok(Some(user)) => user.username,
        Ok(None) => return None,
        Err(e) => {
            warn!(issue_id = issue.id, error = %e, "could not load review submitter");
            return None;
        }
    };

    let files: Vec<ReviewFile<'_>> = uploads
        .iter()
        .map(|u| ReviewFile {
            filename: &u.filename,
            content: &u.content,
        })
        .collect();

    let upload = ReviewUpload {
        issue_id: issue.id,
        review_id: issue.review_id,
        summary: task.title.clone(),
        submitter: &submitter,
        files: &files,
    };

    match deps.review_board.upload_review(upload).await {
        Ok(review_id) => Some(review_id),
        Err(e) => {
            warn!(issue_id = issue.id, error = %e, "sending to review board failed");
            None
        }
    }
}

/// Records a reply posted on the review board against the issue that owns
/// `review_id`. Unknown authors are stored without one.
pub async fn record_review_reply(
    db: &DatabaseConnection,
    review_id: i64,
    author_username: Option<&str>,
) -> Result<event::Model, ServiceError> {
    let issue = issue::Model::find_by_review_id(db, review_id)
        .await?
        .ok_or(ServiceError::NotFound("Issue"))?;

    let author_id = match author_username {
        Some(username) => user::Model::find_by_username(db, username)
            .await?
            .map(|u| u.id),
        None => None,
    };

    let entry = event::Model::create(
        db,
        issue.id,
        author_id,
        &EventPayload::Comment {
            text: "New comment".to_string(),
            review: Some(ReviewNote::Requested { review_id }),
        },
    )
    .await?;

    info!(issue_id = issue.id, review_id, "review board reply recorded");
    Ok(entry)
}

/// Reads a legacy-stored attachment if `actor` may view the issue it belongs to.
///
/// Returns the original filename with the bytes.
pub async fn open_attachment(
    db: &DatabaseConnection,
    storage: &dyn StorageBackend,
    actor: Actor,
    path: &str,
) -> Result<(String, Vec<u8>), ServiceError> {
    let row = file::Model::find_by_path(db, path)
        .await?
        .into_iter()
        .next()
        .ok_or(ServiceError::NotFound("File"))?;
    let entry = event::Entity::find_by_id(row.event_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Event"))?;

    let Loaded { role, .. } = load(db, actor, entry.issue_id).await?;
    if !role.can_view() {
        return Err(ServiceError::Forbidden);
    }

    let content = storage.open(path).await?;
    Ok((row.filename, content))
}
