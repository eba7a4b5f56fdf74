use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use crate::analysis::{analyze_issue, AnalysisBackend};
use crate::classify::{classify, Case, Classification};
use crate::config::Config;
use crate::constants::is_bot_reply;
use crate::error::WebhookError;
use crate::event::WebhookEvent;
use crate::repo_cache::RepoCache;
use crate::tracker::{IssueContext, IssueTracker};

/// What happened to a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Decision {
    Ignored(String),
    Duplicate,
    Processed(Case),
}

impl Decision {
    pub(crate) fn message(&self) -> &str {
        match self {
            Decision::Ignored(reason) => reason.as_str(),
            Decision::Duplicate => "Claude reply already exists",
            Decision::Processed(Case::Fresh) => "Comment posted successfully",
            Decision::Processed(Case::Continuation) => "Reply posted successfully",
        }
    }
}

/// The last comment is one of ours, so this event was (or is being) handled.
pub(crate) fn already_replied(issue: &IssueContext) -> bool {
    issue.comments.last().is_some_and(is_bot_reply)
}

/// Post `body`, logging the failure if there is one.
pub(crate) async fn publish_comment(
    tracker: &dyn IssueTracker,
    repo: &str,
    issue_number: u64,
    body: &str,
) -> bool {
    match tracker.post_comment(repo, issue_number, body).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Error posting comment on {repo}#{issue_number}: {e:#}");
            false
        }
    }
}

/// Classifies verified events and runs the collaborators for the ones we handle.
pub(crate) struct Pipeline {
    tracker: Arc<dyn IssueTracker>,
    backend: Arc<dyn AnalysisBackend>,
    repo_cache: RepoCache,
    trigger_label: String,
    analysis_timeout: Duration,
}

impl Pipeline {
    pub(crate) fn new(
        config: &Config,
        tracker: Arc<dyn IssueTracker>,
        backend: Arc<dyn AnalysisBackend>,
    ) -> Self {
        Self {
            tracker,
            backend,
            repo_cache: RepoCache::new(config.workdir.clone(), config.clone_protocol),
            trigger_label: config.trigger_label.clone(),
            analysis_timeout: config.analysis_timeout,
        }
    }

    pub(crate) async fn dispatch(&self, event: &WebhookEvent) -> Result<Decision, WebhookError> {
        let case = match classify(event, &self.trigger_label) {
            Classification::Ignore(reason) => {
                tracing::info!("{reason}");
                return Ok(Decision::Ignored(reason));
            }
            Classification::Process(case) => case,
        };
        self.process(event, case)
            .instrument(tracing::info_span!(
                "process",
                repo = %event.repository,
                issue = event.issue_number,
                ?case,
            ))
            .await
    }

    async fn process(&self, event: &WebhookEvent, case: Case) -> Result<Decision, WebhookError> {
        let repo = &event.repository.full_name;
        let number = event.issue_number;

        let workdir = self
            .repo_cache
            .ensure(&*self.tracker, &event.repository)
            .await
            .map_err(WebhookError::CloneFailed)?;

        let issue = self
            .tracker
            .fetch_issue(repo, number, &workdir)
            .await
            .map_err(WebhookError::FetchFailed)?;
        tracing::info!("Viewing issue #{number}: {}", issue.title);

        if already_replied(&issue) {
            tracing::info!("Issue #{number} already has a Claude reply, skipping");
            return Ok(Decision::Duplicate);
        }

        let analysis =
            analyze_issue(&*self.backend, &issue, case, self.analysis_timeout).await;

        if !publish_comment(&*self.tracker, repo, number, &analysis.text).await {
            return Err(WebhookError::PublishFailed(match case {
                Case::Fresh => "comment",
                Case::Continuation => "reply",
            }));
        }
        let decision = Decision::Processed(case);
        tracing::info!("{} for issue #{number} in {repo}", decision.message());
        Ok(decision)
    }
}
