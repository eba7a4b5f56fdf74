use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Clone `url` into `dest` with a history depth of 1. Blocking.
///
/// SSH remotes authenticate through the SSH agent, HTTPS remotes with `token` if given.
pub(crate) fn clone_shallow(url: &str, dest: &Path, token: Option<&SecretString>) -> Result<()> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username, allowed| {
        if allowed.contains(git2::CredentialType::SSH_KEY) {
            git2::Cred::ssh_key_from_agent(username.unwrap_or("git"))
        } else if let (true, Some(token)) = (
            allowed.contains(git2::CredentialType::USER_PASS_PLAINTEXT),
            token,
        ) {
            git2::Cred::userpass_plaintext("x-access-token", token.expose_secret())
        } else {
            git2::Cred::default()
        }
    });
    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(callbacks).depth(1);

    git2::build::RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(url, dest)
        .context(anyhow!("failed to clone {url}"))?;
    Ok(())
}

/// [`clone_shallow`] on the blocking thread pool.
pub(crate) async fn clone_shallow_async(
    url: &str,
    dest: &Path,
    token: Option<Arc<SecretString>>,
) -> Result<()> {
    let url = url.to_owned();
    let dest: PathBuf = dest.to_owned();
    tokio::task::spawn_blocking(move || clone_shallow(&url, &dest, token.as_deref())).await?
}
