use std::time::Duration;

use askama::Template;
use async_trait::async_trait;

use crate::classify::Case;
use crate::constants::{MAX_COMMENT_BYTES, REPLY_SIGNATURE};
use crate::tracker::IssueContext;

mod claude_cli;

pub(crate) use claude_cli::ClaudeCli;

pub(crate) const FALLBACK_BACKEND_ERROR: &str = "🤖 分析系統暫時無法使用。我會稍後查看這個 issue。";
pub(crate) const FALLBACK_TIMEOUT: &str = "🤖 分析處理時間過長，我會稍後查看這個 issue。";
pub(crate) const FALLBACK_UNEXPECTED: &str = "🤖 系統發生未預期的錯誤，我會稍後查看這個 issue。";

#[derive(thiserror::Error, Debug)]
pub(crate) enum AnalysisError {
    #[error("analysis backend timed out after {0:?}")]
    Timeout(Duration),
    #[error("analysis backend failed: {0}")]
    Backend(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// A single-shot "prompt in, text out" model invocation.
#[async_trait]
pub(crate) trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, prompt: &str, timeout: Duration) -> Result<String, AnalysisError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnalysisResult {
    /// Reply text, always ending in [`REPLY_SIGNATURE`]
    pub text: String,
    pub appended_signature: bool,
}

/// Longest prefix of `text` within `max` bytes that doesn't split a character.
fn clamp(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let end = (0..=max)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0);
    &text[..end]
}

impl AnalysisResult {
    fn signed(text: &str) -> Self {
        let text = clamp(text, MAX_COMMENT_BYTES - REPLY_SIGNATURE.len());
        AnalysisResult {
            text: format!("{text}{REPLY_SIGNATURE}"),
            appended_signature: true,
        }
    }
}

#[derive(Template)]
#[template(path = "prompt.txt", escape = "none")]
struct Prompt<'a> {
    issue_json: &'a str,
    continuation: bool,
}

fn make_prompt(issue: &IssueContext, case: Case) -> anyhow::Result<String> {
    let issue_json = serde_json::to_string_pretty(issue)?;
    Ok(Prompt {
        issue_json: &issue_json,
        continuation: case == Case::Continuation,
    }
    .render()?)
}

async fn run_backend(
    backend: &dyn AnalysisBackend,
    issue: &IssueContext,
    case: Case,
    timeout: Duration,
) -> Result<String, AnalysisError> {
    let prompt = make_prompt(issue, case)?;
    // the backend is trusted to honour the timeout, but not relied upon
    let output = tokio::time::timeout(timeout, backend.analyze(&prompt, timeout))
        .await
        .map_err(|_| AnalysisError::Timeout(timeout))??;
    let output = output.trim();
    if output.is_empty() {
        return Err(anyhow::anyhow!("analysis backend returned no output").into());
    }
    Ok(output.to_owned())
}

/// Ask the backend about `issue`. Never fails: errors turn into an apologetic reply.
pub(crate) async fn analyze_issue(
    backend: &dyn AnalysisBackend,
    issue: &IssueContext,
    case: Case,
    timeout: Duration,
) -> AnalysisResult {
    match run_backend(backend, issue, case, timeout).await {
        Ok(text) => AnalysisResult::signed(&text),
        Err(e) => {
            tracing::error!("Analysis failed: {e:#}");
            AnalysisResult::signed(match e {
                AnalysisError::Timeout(_) => FALLBACK_TIMEOUT,
                AnalysisError::Backend(_) => FALLBACK_BACKEND_ERROR,
                AnalysisError::Unexpected(_) => FALLBACK_UNEXPECTED,
            })
        }
    }
}
