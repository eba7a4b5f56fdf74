use anyhow::{Context, Result};
use clap::ValueEnum;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::event::Repository;
use crate::tracker::IssueTracker;

/// Which of the payload's clone URLs to use.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CloneProtocol {
    #[default]
    Ssh,
    Https,
}

/// Local shallow clones, one per repository short name, created on first use and never updated.
#[derive(Debug)]
pub(crate) struct RepoCache {
    root: PathBuf,
    protocol: CloneProtocol,
    /// Never pruned; holds one entry per repository ever seen.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl RepoCache {
    pub(crate) fn new(root: PathBuf, protocol: CloneProtocol) -> Self {
        Self {
            root,
            protocol,
            locks: Mutex::default(),
        }
    }

    fn lock_for(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_owned())
            .or_default()
            .clone()
    }

    /// Make sure a clone of `repo` exists and return its path.
    ///
    /// At most one clone per repository is in flight; concurrent callers wait for it.
    pub(crate) async fn ensure(
        &self,
        tracker: &dyn IssueTracker,
        repo: &Repository,
    ) -> Result<PathBuf> {
        let name = repo.short_name();
        let path = self.root.join(name);
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;

        if path.is_dir() {
            tracing::info!("Repository already exists: {}", path.display());
            return Ok(path);
        }
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let url = match self.protocol {
            CloneProtocol::Ssh => &repo.ssh_url,
            CloneProtocol::Https => &repo.clone_url,
        };
        if let Err(e) = tracker.clone_repo(url, &path).await {
            // don't leave a half-written clone behind to be reused later
            if path.exists() {
                if let Err(rm) = tokio::fs::remove_dir_all(&path).await {
                    tracing::warn!("Failed to remove partial clone {}: {rm}", path.display());
                }
            }
            return Err(e);
        }
        tracing::info!("Cloned repository: {repo}");
        Ok(path)
    }
}
