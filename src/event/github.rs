use serde::Deserialize;

/// A stripped down version of the `issues` and `issue_comment` webhook payloads.
/// Both events share this shape; `label` is only sent for `issues.labeled`.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct IssuePayload {
    /// The action this event represents.
    pub action: String,
    /// The issue this event corresponds to
    pub issue: PayloadIssue,
    /// The repository this event corresponds to
    pub repository: PayloadRepository,
    /// The label that was added, for `labeled` actions
    #[serde(default)]
    pub label: Option<PayloadLabel>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct PayloadIssue {
    pub number: u64,
    #[serde(default)]
    pub labels: Vec<PayloadLabel>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct PayloadRepository {
    pub full_name: String,
    pub clone_url: String,
    pub ssh_url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct PayloadLabel {
    pub name: String,
}
