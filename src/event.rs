use axum::body::Bytes;
use std::fmt::Display;

mod github;

use github::IssuePayload;

/// Event types whose payload we understand. Everything else is ignored unparsed.
pub(crate) const ISSUES: &str = "issues";
pub(crate) const ISSUE_COMMENT: &str = "issue_comment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Repository {
    pub full_name: String,
    pub clone_url: String,
    pub ssh_url: String,
}

impl Repository {
    /// Name without the owner, used as the directory name of the local clone.
    pub(crate) fn short_name(&self) -> &str {
        self.full_name
            .rsplit_once('/')
            .map_or(&self.full_name[..], |(_, name)| name)
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// A validated `issues` or `issue_comment` delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WebhookEvent {
    pub event_type: String,
    pub action: String,
    pub repository: Repository,
    pub issue_number: u64,
    /// Label added by an `issues.labeled` event
    pub label: Option<String>,
    /// Labels currently on the issue
    pub issue_labels: Vec<String>,
    pub raw_body: Bytes,
}

impl WebhookEvent {
    /// Parse a payload of the given event type.
    ///
    /// Returns `Ok(None)` for event types we never act on, without looking at the body.
    pub(crate) fn parse(event_type: &str, body: Bytes) -> serde_json::Result<Option<Self>> {
        if event_type != ISSUES && event_type != ISSUE_COMMENT {
            return Ok(None);
        }
        let payload: IssuePayload = serde_json::from_slice(&body)?;
        Ok(Some(WebhookEvent {
            event_type: event_type.to_owned(),
            action: payload.action,
            repository: Repository {
                full_name: payload.repository.full_name,
                clone_url: payload.repository.clone_url,
                ssh_url: payload.repository.ssh_url,
            },
            issue_number: payload.issue.number,
            label: payload.label.map(|l| l.name),
            issue_labels: payload.issue.labels.into_iter().map(|l| l.name).collect(),
            raw_body: body,
        }))
    }
}
