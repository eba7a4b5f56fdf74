use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

mod gh_cli;
mod github_api;
mod octocrab_utils;

pub(crate) use gh_cli::GhCli;
pub(crate) use github_api::GitHubApi;

/// Which implementation of [`IssueTracker`] talks to GitHub.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum TrackerKind {
    /// Shell out to the GitHub CLI (`gh`)
    #[default]
    Gh,
    /// Call the GitHub REST API directly
    Api,
}

/// Current state of an issue, as fed to the analysis backend.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct IssueContext {
    pub title: String,
    pub body: String,
    pub author: String,
    pub state: String,
    pub labels: BTreeSet<String>,
    pub comments: Vec<IssueComment>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct IssueComment {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// The external issue tracker and VCS host.
#[async_trait]
pub(crate) trait IssueTracker: Send + Sync {
    /// Read an issue with its full comment history. `workdir` is the local clone.
    async fn fetch_issue(&self, repo: &str, issue_number: u64, workdir: &Path)
        -> Result<IssueContext>;
    async fn post_comment(&self, repo: &str, issue_number: u64, body: &str) -> Result<()>;
    /// Shallow-clone `url` into `dest`, which does not exist yet.
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;
}
