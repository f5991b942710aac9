use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use lawfirm_backend::{config::Config, routes, state::AppState};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config).await.context("failed to load translations")?);

    let sessions = state.sessions.clone();
    let flags = state.flags.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                info!("purged {removed} idle chat session(s)");
            }
            let forgotten = flags.purge_expired().await;
            if forgotten > 0 {
                info!("purged {forgotten} expired visitor flag(s)");
            }
        }
    });

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!("law office backend running at http://{bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
