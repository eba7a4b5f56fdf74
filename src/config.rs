use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::BaseDirs;
use secrecy::SecretString;

use crate::cli::ServeArgs;
use crate::repo_cache::CloneProtocol;
use crate::utils::get_credential;

/// Settings shared by every request, built once at startup.
#[derive(Debug)]
pub(crate) struct Config {
    /// `None` makes every webhook fail with a 500 until configured
    pub secret: Option<SecretString>,
    pub analysis_timeout: Duration,
    pub workdir: PathBuf,
    pub trigger_label: String,
    pub clone_protocol: CloneProtocol,
}

impl Config {
    pub(crate) fn from_args(args: &ServeArgs) -> Result<Self> {
        // If secret has not been passed via CLI or env, get it as a credential.
        let secret = match &args.webhook_secret {
            Some(secret) if !secret.is_empty() => Some(SecretString::new(secret.clone())),
            _ => get_credential("webhook_secret")
                .inspect_err(|e| tracing::warn!("Webhook secret not configured: {e}"))
                .ok(),
        };
        let workdir = match &args.workdir {
            Some(workdir) => workdir.clone(),
            None => BaseDirs::new()
                .context("No home directory to put the workdir in")?
                .home_dir()
                .join("workdir"),
        };
        Ok(Config {
            secret,
            analysis_timeout: Duration::from_secs(args.claude_timeout),
            workdir,
            trigger_label: args.trigger_label.clone(),
            clone_protocol: args.clone_protocol,
        })
    }
}
