use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use run_watch::github::GitHubClient;
use run_watch::poller::{PollScheduler, PollerConfig};
use run_watch::store::MemoryRunStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "run_watch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PollerConfig::from_env();
    let store = Arc::new(MemoryRunStore::new());
    let scheduler = Arc::new(PollScheduler::new(config.clone(), Arc::clone(&store)));

    // The scheduler must not start without a credential; polling stays off
    // until one is supplied.
    match std::env::var("GITHUB_TOKEN") {
        Ok(token) => match GitHubClient::from_token(token, config.page_size) {
            Ok(client) => scheduler.start(client).await,
            Err(err) => {
                tracing::error!(error = %err, "failed to build GitHub client; polling disabled")
            }
        },
        Err(_) => {
            tracing::warn!("GITHUB_TOKEN not set; polling disabled until a credential is available")
        }
    }

    let app = Router::new().route("/api/health", get(health));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000u16);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&scheduler)))
        .await
        .unwrap();
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn shutdown_signal(scheduler: Arc<PollScheduler<MemoryRunStore>>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received, stopping poller");
    scheduler.stop().await;
}
