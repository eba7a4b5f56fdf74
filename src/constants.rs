use crate::tracker::IssueComment;

pub(crate) const TRIGGER_LABEL: &str = "claude-discuss";
/// Footer of every reply we post. Also how we recognise our own replies.
pub(crate) const REPLY_SIGNATURE: &str =
    "\n\n---\n*🔧 此回覆由 [Claude Code](https://claude.ai/code) 自動分析生成*";
/// GitHub rejects comment bodies above this many bytes.
pub(crate) const MAX_COMMENT_BYTES: usize = 65536;

pub(crate) const X_HUB_SIGNATURE_256: &str = "X-Hub-Signature-256";
pub(crate) const X_GITHUB_EVENT: &str = "X-GitHub-Event";

pub(crate) fn is_bot_reply(comment: &IssueComment) -> bool {
    comment.body.ends_with(REPLY_SIGNATURE)
}
