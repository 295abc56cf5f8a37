use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod models;
mod store;

use store::Store;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    /// Every shortener, mirrored to the JSON store file. Handlers are its
    /// only readers and writers.
    pub store: Store,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/help", get(handlers::help::help))
        .route(
            "/save",
            get(handlers::editor::save).post(handlers::editor::save),
        )
        .route("/add/:key", get(handlers::editor::add))
        .route("/edit/:key", get(handlers::editor::edit))
        .route("/remove/:key", get(handlers::editor::remove))
        // Short-key redirect; static routes above take priority
        .route("/:key", get(handlers::redirect::redirect))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present; plain env vars work too
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shorty=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting shorty on {}", config.bind_addr());

    // A malformed store file is fatal: refuse to start rather than overwrite it.
    let store = Store::load(&config.db_file).await?;
    tracing::info!(
        "Serving {} shortener(s) from {}",
        store.len().await,
        store.path().display()
    );
    if store.is_empty().await {
        tracing::info!("No shorteners yet; open /add/<key> to create one");
    }

    let app = router(Arc::new(AppState { store }));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
