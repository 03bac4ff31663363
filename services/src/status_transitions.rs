use db::models::issue::IssueStatus;
use std::collections::HashMap;
use std::str::FromStr;

use crate::ServiceError;

/// Which statuses a teacher may move an issue to from a given status.
///
/// The built-in table lets any status move to verification, rework or
/// accepted. `STATUS_TRANSITIONS` replaces it entirely with a JSON object, e.g.
/// `{"new": ["verification"], "verification": ["rework", "accepted"]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransitions {
    table: HashMap<IssueStatus, Vec<IssueStatus>>,
}

const GRADING_TARGETS: [IssueStatus; 3] = [
    IssueStatus::Verification,
    IssueStatus::Rework,
    IssueStatus::Accepted,
];

impl Default for StatusTransitions {
    fn default() -> Self {
        let table = IssueStatus::ALL
            .into_iter()
            .map(|from| {
                let targets = GRADING_TARGETS
                    .into_iter()
                    .filter(|to| *to != from)
                    .collect();
                (from, targets)
            })
            .collect();
        Self { table }
    }
}

impl FromStr for StatusTransitions {
    type Err = ServiceError;

    /// Parses a JSON object mapping each status to the statuses it may move to.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: HashMap<IssueStatus, Vec<IssueStatus>> = serde_json::from_str(s)
            .map_err(|e| ServiceError::InvalidTransitionConfig(e.to_string()))?;

        let table: HashMap<IssueStatus, Vec<IssueStatus>> = raw
            .into_iter()
            .map(|(from, targets)| {
                let mut allowed = Vec::with_capacity(targets.len());
                for to in targets {
                    if to != from && !allowed.contains(&to) {
                        allowed.push(to);
                    }
                }
                (from, allowed)
            })
            .collect();

        if table.is_empty() {
            return Err(ServiceError::InvalidTransitionConfig(
                "no transitions defined".into(),
            ));
        }
        Ok(Self { table })
    }
}

impl StatusTransitions {
    /// The configured table, or the built-in one when `STATUS_TRANSITIONS` is unset.
    pub fn from_config() -> Result<Self, ServiceError> {
        match util::config::status_transitions() {
            Some(raw) => raw.parse(),
            None => Ok(Self::default()),
        }
    }

    pub fn allowed(&self, from: IssueStatus) -> &[IssueStatus] {
        self.table.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn allows(&self, from: IssueStatus, to: IssueStatus) -> bool {
        self.allowed(from).contains(&to)
    }
}
