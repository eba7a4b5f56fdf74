//! Test payloads and in-memory collaborators.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{TimeZone, Utc};

use crate::analysis::{AnalysisBackend, AnalysisError};
use crate::config::Config;
use crate::event::{Repository, WebhookEvent};
use crate::repo_cache::CloneProtocol;
use crate::tracker::{IssueComment, IssueContext, IssueTracker};

pub(crate) const ISSUES_LABELED: &str = r#"{
  "action": "labeled",
  "issue": {
    "url": "https://api.github.com/repos/octo-org/hello-world/issues/42",
    "html_url": "https://github.com/octo-org/hello-world/issues/42",
    "id": 2181237489,
    "number": 42,
    "title": "Crash on startup",
    "user": { "login": "octocat", "id": 583231, "type": "User" },
    "labels": [
      { "id": 6451201, "name": "claude-discuss", "color": "5319e7", "default": false }
    ],
    "state": "open",
    "comments": 0,
    "body": "The app crashes when started without a config file."
  },
  "label": { "id": 6451201, "name": "claude-discuss", "color": "5319e7", "default": false },
  "repository": {
    "id": 1296269,
    "name": "hello-world",
    "full_name": "octo-org/hello-world",
    "private": false,
    "owner": { "login": "octo-org", "id": 6811672, "type": "Organization" },
    "html_url": "https://github.com/octo-org/hello-world",
    "clone_url": "https://github.com/octo-org/hello-world.git",
    "ssh_url": "git@github.com:octo-org/hello-world.git",
    "default_branch": "main"
  },
  "sender": { "login": "octocat", "id": 583231, "type": "User" }
}"#;

pub(crate) const ISSUE_COMMENT_CREATED: &str = r#"{
  "action": "created",
  "issue": {
    "url": "https://api.github.com/repos/octo-org/hello-world/issues/42",
    "id": 2181237489,
    "number": 42,
    "title": "Crash on startup",
    "user": { "login": "octocat", "id": 583231, "type": "User" },
    "labels": [
      { "id": 6451199, "name": "bug", "color": "d73a4a", "default": true },
      { "id": 6451201, "name": "claude-discuss", "color": "5319e7", "default": false }
    ],
    "state": "open",
    "comments": 1,
    "body": "The app crashes when started without a config file."
  },
  "comment": {
    "id": 1982377413,
    "user": { "login": "hubot", "id": 1, "type": "User" },
    "body": "Still happens on 1.2.0",
    "created_at": "2024-03-01T12:00:00Z"
  },
  "repository": {
    "id": 1296269,
    "name": "hello-world",
    "full_name": "octo-org/hello-world",
    "clone_url": "https://github.com/octo-org/hello-world.git",
    "ssh_url": "git@github.com:octo-org/hello-world.git"
  },
  "sender": { "login": "hubot", "id": 1, "type": "User" }
}"#;

/// `gh issue view 42 --json title,body,author,labels,state,comments`
pub(crate) const GH_ISSUE_VIEW: &str = r#"{
  "author": { "id": "MDQ6VXNlcjU4MzIzMQ==", "is_bot": false, "login": "octocat", "name": "The Octocat" },
  "body": "The app crashes when started without a config file.",
  "comments": [
    {
      "id": "IC_kwDOABCD",
      "author": { "login": "hubot" },
      "authorAssociation": "MEMBER",
      "body": "Still happens on 1.2.0",
      "createdAt": "2024-03-01T10:00:00Z",
      "includesCreatedEdit": false,
      "isMinimized": false,
      "minimizedReason": "",
      "reactionGroups": [],
      "url": "https://github.com/octo-org/hello-world/issues/42#issuecomment-1",
      "viewerDidAuthor": false
    },
    {
      "id": "IC_kwDOABCE",
      "author": null,
      "authorAssociation": "NONE",
      "body": "+1",
      "createdAt": "2024-03-01T11:00:00Z"
    }
  ],
  "labels": [
    { "id": "LA_1", "name": "bug", "description": "", "color": "d73a4a" },
    { "id": "LA_2", "name": "claude-discuss", "description": "", "color": "5319e7" }
  ],
  "state": "OPEN",
  "title": "Crash on startup"
}"#;

pub(crate) fn repository() -> Repository {
    Repository {
        full_name: "octo-org/hello-world".to_owned(),
        clone_url: "https://github.com/octo-org/hello-world.git".to_owned(),
        ssh_url: "git@github.com:octo-org/hello-world.git".to_owned(),
    }
}

pub(crate) fn webhook_event(
    event_type: &str,
    action: &str,
    label: Option<&str>,
    issue_labels: &[&str],
) -> WebhookEvent {
    WebhookEvent {
        event_type: event_type.to_owned(),
        action: action.to_owned(),
        repository: repository(),
        issue_number: 42,
        label: label.map(str::to_owned),
        issue_labels: issue_labels.iter().map(|&l| l.to_owned()).collect(),
        raw_body: Bytes::new(),
    }
}

pub(crate) fn comment(author: &str, body: &str) -> IssueComment {
    IssueComment {
        author: author.to_owned(),
        body: body.to_owned(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

pub(crate) fn issue_context(comments: &[(&str, &str)]) -> IssueContext {
    IssueContext {
        title: "Crash on startup".to_owned(),
        body: "The app crashes when started without a config file.".to_owned(),
        author: "octocat".to_owned(),
        state: "open".to_owned(),
        labels: ["claude-discuss".to_owned()].into(),
        comments: comments.iter().map(|&(a, b)| comment(a, b)).collect(),
    }
}

pub(crate) fn test_config(workdir: &Path) -> Config {
    Config {
        secret: None,
        analysis_timeout: Duration::from_secs(5),
        workdir: workdir.to_owned(),
        trigger_label: "claude-discuss".to_owned(),
        clone_protocol: CloneProtocol::Ssh,
    }
}

/// Write an executable shell script standing in for an external CLI.
#[cfg(unix)]
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Issue tracker holding one issue. Posted comments are appended to it.
#[derive(Default)]
pub(crate) struct FakeTracker {
    pub clones: AtomicUsize,
    pub fetches: AtomicUsize,
    pub cloned_urls: Mutex<Vec<String>>,
    pub comments: Mutex<Vec<IssueComment>>,
    pub posted: Mutex<Vec<(String, u64, String)>>,
    pub fail_clone: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_post: AtomicBool,
}

impl FakeTracker {
    pub(crate) fn with_comments(comments: &[(&str, &str)]) -> Self {
        let tracker = Self::default();
        *tracker.comments.lock().unwrap() = comments.iter().map(|&(a, b)| comment(a, b)).collect();
        tracker
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn fetch_issue(&self, _repo: &str, _number: u64, workdir: &Path) -> Result<IssueContext> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        assert!(workdir.is_dir(), "fetch before clone");
        if self.fail_fetch.load(Ordering::SeqCst) {
            bail!("gh: Could not resolve to an issue");
        }
        let mut issue = issue_context(&[]);
        issue.comments.clone_from(&self.comments.lock().unwrap());
        Ok(issue)
    }

    async fn post_comment(&self, repo: &str, number: u64, body: &str) -> Result<()> {
        if self.fail_post.load(Ordering::SeqCst) {
            bail!("gh: HTTP 502");
        }
        self.posted
            .lock()
            .unwrap()
            .push((repo.to_owned(), number, body.to_owned()));
        self.comments.lock().unwrap().push(comment("bot", body));
        Ok(())
    }

    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.clones.fetch_add(1, Ordering::SeqCst);
        self.cloned_urls.lock().unwrap().push(url.to_owned());
        // give concurrent callers a chance to race
        tokio::time::sleep(Duration::from_millis(20)).await;
        tokio::fs::create_dir_all(dest).await?;
        if self.fail_clone.load(Ordering::SeqCst) {
            bail!("git: connection reset");
        }
        Ok(())
    }
}

enum Behaviour {
    Reply(String),
    Fail,
    Broken,
    TimeOut,
    Hang,
}

pub(crate) struct FakeBackend {
    behaviour: Behaviour,
    pub calls: AtomicUsize,
}

impl FakeBackend {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        Self::new(Behaviour::Reply(text.to_owned()))
    }

    pub(crate) fn failing() -> Self {
        Self::new(Behaviour::Fail)
    }

    pub(crate) fn broken() -> Self {
        Self::new(Behaviour::Broken)
    }

    pub(crate) fn timing_out() -> Self {
        Self::new(Behaviour::TimeOut)
    }

    pub(crate) fn hanging() -> Self {
        Self::new(Behaviour::Hang)
    }
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn analyze(&self, prompt: &str, timeout: Duration) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(prompt.contains("Crash on startup"));
        match &self.behaviour {
            Behaviour::Reply(text) => Ok(text.clone()),
            Behaviour::Fail => Err(AnalysisError::Backend("exit status: 1".to_owned())),
            Behaviour::Broken => Err(anyhow::anyhow!("No such file or directory").into()),
            Behaviour::TimeOut => Err(AnalysisError::Timeout(timeout)),
            Behaviour::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
