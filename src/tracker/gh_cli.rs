use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Deserialize;
use tokio::process::Command;

use super::{IssueComment, IssueContext, IssueTracker};
use crate::git::clone_shallow_async;

const ISSUE_FIELDS: &str = "title,body,author,labels,state,comments";

/// [`IssueTracker`] that shells out to the GitHub CLI, using its stored login.
#[derive(Debug, Clone)]
pub(crate) struct GhCli {
    program: PathBuf,
    token: Option<Arc<SecretString>>,
}

impl GhCli {
    pub(crate) fn new(program: PathBuf, token: Option<SecretString>) -> Self {
        Self {
            program,
            token: token.map(Arc::new),
        }
    }

    async fn run(&self, cmd: &mut Command) -> Result<Output> {
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;
        if !output.status.success() {
            bail!(
                "gh exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output)
    }
}

#[derive(Deserialize, Debug)]
struct GhAuthor {
    login: String,
}

#[derive(Deserialize, Debug)]
struct GhLabel {
    name: String,
}

#[derive(Deserialize, Debug)]
struct GhComment {
    author: Option<GhAuthor>,
    body: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

/// Output of `gh issue view --json title,body,author,labels,state,comments`
#[derive(Deserialize, Debug)]
struct GhIssue {
    title: String,
    body: String,
    author: Option<GhAuthor>,
    state: String,
    labels: Vec<GhLabel>,
    comments: Vec<GhComment>,
}

fn login(author: Option<GhAuthor>) -> String {
    // deleted accounts come back as null
    author.map_or_else(|| "ghost".to_owned(), |a| a.login)
}

impl From<GhIssue> for IssueContext {
    fn from(issue: GhIssue) -> Self {
        IssueContext {
            title: issue.title,
            body: issue.body,
            author: login(issue.author),
            state: issue.state.to_lowercase(),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            comments: issue
                .comments
                .into_iter()
                .map(|c| IssueComment {
                    author: login(c.author),
                    body: c.body,
                    created_at: c.created_at,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl IssueTracker for GhCli {
    async fn fetch_issue(
        &self,
        repo: &str,
        issue_number: u64,
        workdir: &Path,
    ) -> Result<IssueContext> {
        let number = issue_number.to_string();
        let output = self
            .run(
                Command::new(&self.program)
                    .args(["issue", "view", number.as_str()])
                    .args(["--repo", repo, "--json", ISSUE_FIELDS])
                    .current_dir(workdir),
            )
            .await?;
        let issue: GhIssue =
            serde_json::from_slice(&output.stdout).context("unexpected gh issue view output")?;
        Ok(issue.into())
    }

    async fn post_comment(&self, repo: &str, issue_number: u64, body: &str) -> Result<()> {
        let number = issue_number.to_string();
        self.run(
            Command::new(&self.program)
                .args(["issue", "comment", number.as_str()])
                .args(["--repo", repo, "--body", body]),
        )
        .await?;
        Ok(())
    }

    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        clone_shallow_async(url, dest, self.token.clone()).await
    }
}
