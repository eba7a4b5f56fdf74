use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::constants::TRIGGER_LABEL;
use crate::repo_cache::CloneProtocol;
use crate::tracker::TrackerKind;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start web hook server
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// IP to listen on
    #[arg(long, env, default_value = "0.0.0.0")]
    pub(crate) host: String,
    /// Port to listen on
    #[arg(long, env)]
    pub(crate) port: u16,
    /// Webhook secret as configured on GitHub. Falls back to the `webhook_secret` systemd credential.
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide_env_values = true)]
    pub(crate) webhook_secret: Option<String>,
    /// Seconds to wait for the analysis backend
    #[arg(long, env)]
    pub(crate) claude_timeout: u64,
    /// Directory holding the repository clones (default: ~/workdir)
    #[arg(long, env)]
    pub(crate) workdir: Option<PathBuf>,
    /// Issue label that enables replies
    #[arg(long, env, default_value = TRIGGER_LABEL)]
    pub(crate) trigger_label: String,
    /// How to talk to GitHub
    #[arg(long, env, value_enum, default_value_t)]
    pub(crate) tracker: TrackerKind,
    /// GitHub token, required for `--tracker api`, used for HTTPS clones
    #[arg(long, env, hide_env_values = true)]
    pub(crate) github_token: Option<String>,
    /// Which payload URL to clone repositories from
    #[arg(long, env, value_enum, default_value_t)]
    pub(crate) clone_protocol: CloneProtocol,
    /// GitHub CLI executable
    #[arg(long, env, default_value = "gh")]
    pub(crate) gh_bin: PathBuf,
    /// Claude CLI executable
    #[arg(long, env, default_value = "claude")]
    pub(crate) claude_bin: PathBuf,
    /// Model passed to the Claude CLI
    #[arg(long, env)]
    pub(crate) claude_model: Option<String>,
}
