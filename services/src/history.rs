//! Read side of an issue: the detail document and its rendered history.

use chrono::{DateTime, Utc};
use db::models::{
    course,
    event::{self, EventField, EventPayload, ReviewNote},
    file,
    issue::{self, IssueStatus},
    task, user,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use storage::S3Overlay;
use tracing::warn;
use util::lang::Language;

use crate::access::{Actor, IssueRole};
use crate::status_transitions::StatusTransitions;
use crate::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
    pub name: String,
}

impl From<&user::Model> for UserRef {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            name: u.display_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRef {
    pub id: i64,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub field: EventField,
    pub author: Option<UserRef>,
    pub text: String,
    pub files: Vec<FileRef>,
    pub created_at: DateTime<Utc>,
    /// Posted by the student after the task deadline.
    pub after_deadline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryItem {
    Event(HistoryEntry),
    /// Marks where the task deadline falls within the history.
    DeadlineMarker { deadline: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub tag: IssueStatus,
    pub code: i64,
    pub label: &'static str,
}

impl StatusView {
    pub fn new(status: IssueStatus, lang: Language) -> Self {
        Self {
            tag: status,
            code: status.code(),
            label: status.label(lang),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskRef {
    pub id: i64,
    pub title: String,
    pub score_max: i64,
    pub deadline: Option<DateTime<Utc>>,
}

/// Everything an issue page shows.
#[derive(Debug, Clone, Serialize)]
pub struct IssueView {
    pub id: i64,
    pub course: CourseRef,
    pub task: TaskRef,
    pub student: UserRef,
    pub responsible: Option<UserRef>,
    pub followers: Vec<UserRef>,
    pub status: StatusView,
    pub mark: i64,
    /// e.g. `3 out of 10`
    pub mark_display: String,
    pub review_id: Option<i64>,
    /// Grading forms are offered to this viewer.
    pub can_grade: bool,
    /// Statuses the status form may move to. Empty unless `can_grade`.
    pub status_options: Vec<StatusView>,
    /// Candidates for responsible/followers. Empty unless `can_grade`.
    pub teachers: Vec<UserRef>,
    pub history: Vec<HistoryItem>,
}

/// Everything `render_history` needs, already loaded.
pub struct HistorySource<'a> {
    pub events: &'a [event::Model],
    pub files: &'a [file::Model],
    pub users: &'a HashMap<i64, user::Model>,
    pub student_id: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
    pub lang: Language,
    pub overlay: &'a S3Overlay,
}

fn user_name(users: &HashMap<i64, user::Model>, id: i64) -> String {
    users
        .get(&id)
        .map(|u| u.display_name())
        .unwrap_or_else(|| format!("#{id}"))
}

fn review_line(note: &ReviewNote) -> String {
    match note {
        ReviewNote::Requested { review_id } => format!("Review request {review_id}"),
        ReviewNote::Failed => "Sending to RB failed".to_string(),
    }
}

/// Human-readable text of one history entry.
pub fn event_text(
    payload: &EventPayload,
    users: &HashMap<i64, user::Model>,
    lang: Language,
) -> String {
    match payload {
        EventPayload::Status { status } => format!("Status updated: {}", status.label(lang)),
        EventPayload::Mark { mark } => format!("Grade mark changed to {mark}"),
        EventPayload::Responsible { user_id: Some(id) } => {
            format!("Task reviewer changed: {}", user_name(users, *id))
        }
        EventPayload::Responsible { user_id: None } => "Task reviewer removed".to_string(),
        EventPayload::Followers { user_ids } => {
            let mut names: Vec<String> = user_ids.iter().map(|id| user_name(users, *id)).collect();
            names.sort();
            format!("Viewers {}", names.join(", "))
        }
        EventPayload::Comment { text, review } => match review {
            Some(note) => format!("{text}\n{}", review_line(note)),
            None => text.clone(),
        },
        EventPayload::File { review } => review.as_ref().map(review_line).unwrap_or_default(),
    }
}

fn file_url(overlay: &S3Overlay, path: &str) -> String {
    overlay
        .public_url(path)
        .unwrap_or_else(|| format!("/api/media/{path}"))
}

/// Renders events oldest first, flagging late student entries and placing
/// the deadline marker.
///
/// The marker goes right before the first event newer than the deadline. If
/// the deadline has passed but nothing newer exists, it goes last. No marker
/// while the deadline is in the future or when there is none.
pub fn render_history(src: &HistorySource<'_>) -> Vec<HistoryItem> {
    let mut files_by_event: HashMap<i64, Vec<FileRef>> = HashMap::new();
    for f in src.files {
        files_by_event.entry(f.event_id).or_default().push(FileRef {
            id: f.id,
            filename: f.filename.clone(),
            url: file_url(src.overlay, &f.path),
        });
    }

    let mut items = Vec::with_capacity(src.events.len() + 1);
    let mut marker_placed = false;

    for ev in src.events {
        let text = match ev.payload() {
            Ok(payload) => event_text(&payload, src.users, src.lang),
            Err(err) => {
                warn!(event_id = ev.id, error = %err, "unreadable event payload");
                String::new()
            }
        };

        let late = src.deadline.is_some_and(|d| ev.created_at > d);

        if late && !marker_placed {
            if let Some(deadline) = src.deadline {
                items.push(HistoryItem::DeadlineMarker { deadline });
            }
            marker_placed = true;
        }

        items.push(HistoryItem::Event(HistoryEntry {
            id: ev.id,
            field: ev.field,
            author: ev
                .author_id
                .and_then(|id| src.users.get(&id))
                .map(UserRef::from),
            text,
            files: files_by_event.remove(&ev.id).unwrap_or_default(),
            created_at: ev.created_at,
            after_deadline: late && ev.author_id == Some(src.student_id),
        }));
    }

    if let Some(deadline) = src.deadline {
        if !marker_placed && deadline < src.now {
            items.push(HistoryItem::DeadlineMarker { deadline });
        }
    }

    items
}

fn referenced_user_ids(events: &[event::Model]) -> HashSet<i64> {
    let mut ids = HashSet::new();
    for ev in events {
        ids.extend(ev.author_id);
        match ev.payload() {
            Ok(EventPayload::Responsible { user_id }) => ids.extend(user_id),
            Ok(EventPayload::Followers { user_ids }) => ids.extend(user_ids),
            _ => {}
        }
    }
    ids
}

/// Loads and renders the history of `issue`.
pub async fn load_history(
    db: &DatabaseConnection,
    issue: &issue::Model,
    task: &task::Model,
    lang: Language,
    overlay: &S3Overlay,
) -> Result<Vec<HistoryItem>, ServiceError> {
    let events = event::Model::history(db, issue.id).await?;
    let event_ids: Vec<i64> = events.iter().map(|e| e.id).collect();
    let files = file::Model::for_events(db, &event_ids).await?;

    let ids: Vec<i64> = referenced_user_ids(&events).into_iter().collect();
    let users: HashMap<i64, user::Model> = user::Model::find_many(db, &ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(render_history(&HistorySource {
        events: &events,
        files: &files,
        users: &users,
        student_id: issue.student_id,
        deadline: task.deadline_time,
        now: Utc::now(),
        lang,
        overlay,
    }))
}

/// Builds the full issue document as seen by `actor`.
pub async fn issue_view(
    db: &DatabaseConnection,
    issue_id: i64,
    actor: Actor,
    transitions: &StatusTransitions,
    lang: Language,
    overlay: &S3Overlay,
) -> Result<IssueView, ServiceError> {
    let issue = issue::Entity::find_by_id(issue_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Issue"))?;
    let task = task::Entity::find_by_id(issue.task_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;
    let course = course::Entity::find_by_id(task.course_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Course"))?;

    let role = IssueRole::resolve(db, actor, &issue, &task).await?;
    if !role.can_view() {
        return Err(ServiceError::Forbidden);
    }

    let student = user::Entity::find_by_id(issue.student_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Student"))?;
    let responsible = match issue.responsible_id {
        Some(id) => user::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    let followers = issue::Model::followers(db, issue.id).await?;

    let (status_options, teachers) = if role.can_grade() {
        let options = transitions
            .allowed(issue.status)
            .iter()
            .map(|s| StatusView::new(*s, lang))
            .collect();
        let teachers = course::Model::teachers(db, course.id)
            .await?
            .iter()
            .map(UserRef::from)
            .collect();
        (options, teachers)
    } else {
        (Vec::new(), Vec::new())
    };

    let history = load_history(db, &issue, &task, lang, overlay).await?;

    Ok(IssueView {
        id: issue.id,
        course: CourseRef {
            id: course.id,
            name: course.name,
        },
        task: TaskRef {
            id: task.id,
            title: task.title.clone(),
            score_max: task.score_max,
            deadline: task.deadline_time,
        },
        student: UserRef::from(&student),
        responsible: responsible.as_ref().map(UserRef::from),
        followers: followers.iter().map(UserRef::from).collect(),
        status: StatusView::new(issue.status, lang),
        mark: issue.mark,
        mark_display: format!("{} out of {}", issue.mark, task.score_max),
        review_id: issue.review_id,
        can_grade: role.can_grade(),
        status_options,
        teachers,
        history,
    })
}
