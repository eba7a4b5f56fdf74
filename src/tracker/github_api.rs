use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::models::issues::{Comment, Issue};
use octocrab::models::IssueState;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};

use super::octocrab_utils::PageExt;
use super::{IssueComment, IssueContext, IssueTracker};
use crate::git::clone_shallow_async;

/// [`IssueTracker`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub(crate) struct GitHubApi {
    client: Arc<Octocrab>,
    token: Option<Arc<SecretString>>,
}

impl GitHubApi {
    pub(crate) fn new(token: SecretString) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.expose_secret().to_owned())
            .build()?;
        Ok(Self {
            client: Arc::new(client),
            token: Some(Arc::new(token)),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_client(client: Octocrab) -> Self {
        Self {
            client: Arc::new(client),
            token: None,
        }
    }
}

fn split_repo(repo: &str) -> Result<(&str, &str)> {
    repo.split_once('/')
        .with_context(|| format!("repository name {repo} is not owner/name"))
}

fn issue_state(state: &IssueState) -> String {
    match state {
        IssueState::Open => "open".to_owned(),
        IssueState::Closed => "closed".to_owned(),
        other => format!("{other:?}").to_lowercase(),
    }
}

impl From<Comment> for IssueComment {
    fn from(comment: Comment) -> Self {
        IssueComment {
            author: comment.user.login,
            body: comment.body.unwrap_or_default(),
            created_at: comment.created_at,
        }
    }
}

impl From<Issue> for IssueContext {
    fn from(issue: Issue) -> Self {
        IssueContext {
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            author: issue.user.login,
            state: issue_state(&issue.state),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            comments: Vec::new(),
        }
    }
}

#[async_trait]
impl IssueTracker for GitHubApi {
    async fn fetch_issue(
        &self,
        repo: &str,
        issue_number: u64,
        _workdir: &Path,
    ) -> Result<IssueContext> {
        let (owner, name) = split_repo(repo)?;
        let issue_api = self.client.issues(owner, name);
        let mut issue: IssueContext = issue_api
            .get(issue_number)
            .await
            .with_context(|| format!("failed to get {repo}#{issue_number}"))?
            .into();
        issue.comments = issue_api
            .list_comments(issue_number)
            .per_page(100u8)
            .send()
            .await
            .with_context(|| format!("failed to list comments of {repo}#{issue_number}"))?
            .collect_all(&self.client)
            .await?
            .into_iter()
            .map(IssueComment::from)
            .collect();
        Ok(issue)
    }

    async fn post_comment(&self, repo: &str, issue_number: u64, body: &str) -> Result<()> {
        let (owner, name) = split_repo(repo)?;
        let comment = self
            .client
            .issues(owner, name)
            .create_comment(issue_number, body)
            .await
            .with_context(|| format!("failed to comment on {repo}#{issue_number}"))?;
        tracing::info!("Created comment at {}", comment.html_url);
        Ok(())
    }

    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        clone_shallow_async(url, dest, self.token.clone()).await
    }
}
