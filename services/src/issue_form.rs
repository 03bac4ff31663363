//! Form submissions accepted on an issue page.
//!
//! A submission is a JSON object whose `form_name` selects the form. Button
//! fields such as `"Me"` or `"Accepted"` count as pressed whenever they are
//! present and not `null`/`false`. Values may arrive as numbers or as
//! strings, the way HTML forms post them.

use db::models::issue::IssueStatus;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "form_name")]
pub enum IssueForm {
    #[serde(rename = "responsible_name_form")]
    Responsible(ResponsibleForm),

    #[serde(rename = "followers_names_form")]
    Followers(FollowersForm),

    #[serde(rename = "status_form")]
    Status(StatusForm),

    #[serde(rename = "mark_form")]
    Mark(MarkForm),

    #[serde(rename = "comment_form")]
    Comment(CommentForm),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResponsibleForm {
    pub responsible_name: Option<Value>,
    #[serde(rename = "Me")]
    pub me: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FollowersForm {
    pub followers_names: Option<Value>,
    #[serde(rename = "Me")]
    pub me: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    pub status: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MarkForm {
    pub mark: Option<Value>,
    #[serde(rename = "Accepted")]
    pub accepted: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub comment: Option<String>,
}

/// A validated change, ready to be applied to an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueAction {
    SetResponsible(i64),
    AddFollower(i64),
    SetFollowers(Vec<i64>),
    SetStatus(IssueStatus),
    SetMark { mark: i64, accept: bool },
    Comment { text: String },
}

impl IssueForm {
    /// Parses a raw submission. Unknown forms and malformed bodies yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Turns the submission into an action on behalf of `actor_id`.
    ///
    /// Returns `None` when the form carries nothing usable.
    pub fn resolve(&self, actor_id: i64) -> Option<IssueAction> {
        match self {
            IssueForm::Responsible(form) => {
                if pressed(&form.me) {
                    return Some(IssueAction::SetResponsible(actor_id));
                }
                form.responsible_name
                    .as_ref()
                    .and_then(as_id)
                    .map(IssueAction::SetResponsible)
            }
            IssueForm::Followers(form) => {
                if pressed(&form.me) {
                    return Some(IssueAction::AddFollower(actor_id));
                }
                let ids = match form.followers_names.as_ref()? {
                    Value::Array(items) => items.iter().map(as_id).collect::<Option<Vec<_>>>()?,
                    single => vec![as_id(single)?],
                };
                (!ids.is_empty()).then_some(IssueAction::SetFollowers(ids))
            }
            IssueForm::Status(form) => form
                .status
                .as_ref()
                .and_then(as_status)
                .map(IssueAction::SetStatus),
            IssueForm::Mark(form) => {
                let mark = form.mark.as_ref().and_then(as_id)?;
                Some(IssueAction::SetMark {
                    mark,
                    accept: pressed(&form.accepted),
                })
            }
            IssueForm::Comment(form) => Some(IssueAction::Comment {
                text: form.comment.clone().unwrap_or_default(),
            }),
        }
    }
}

fn pressed(value: &Option<Value>) -> bool {
    !matches!(value, None | Some(Value::Null) | Some(Value::Bool(false)))
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_status(value: &Value) -> Option<IssueStatus> {
    if let Some(code) = as_id(value) {
        return IssueStatus::from_code(code);
    }
    value.as_str()?.trim().parse().ok()
}
