use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::analysis::{AnalysisBackend, ClaudeCli};
use crate::cli::ServeArgs;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::tracker::{GhCli, GitHubApi, IssueTracker, TrackerKind};

mod listener;

pub(crate) async fn serve(args: ServeArgs) -> Result<()> {
    let config = Config::from_args(&args)?;
    tokio::fs::create_dir_all(&config.workdir)
        .await
        .with_context(|| format!("failed to create {}", config.workdir.display()))?;

    let github_token = args.github_token.map(SecretString::new);
    let tracker: Arc<dyn IssueTracker> = match args.tracker {
        TrackerKind::Gh => Arc::new(GhCli::new(args.gh_bin, github_token)),
        TrackerKind::Api => Arc::new(GitHubApi::new(
            github_token.context("--tracker api needs a GitHub token")?,
        )?),
    };
    let backend: Arc<dyn AnalysisBackend> =
        Arc::new(ClaudeCli::new(args.claude_bin, args.claude_model));

    let pipeline = Pipeline::new(&config, tracker, backend);
    let service = listener::listen(config.secret, pipeline);

    let addr = (args.host.as_str(), args.port);
    let tcp_listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", tcp_listener.local_addr()?);

    axum::serve(tcp_listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutting down, waiting for in-flight requests");
}
