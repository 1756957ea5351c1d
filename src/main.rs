use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wordcrowd::{
    api,
    config::{Config, StorageBackend},
    store::{FeedbackStore, FlatFileStore, RedbStore},
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "wordcrowd starting");

    let config = Config::load()?;
    info!(
        strategy = ?config.sentiment.strategy,
        max_chars = config.feedback.max_chars,
        allow_reset = config.allow_reset,
        "Loaded configuration"
    );

    let store: Arc<dyn FeedbackStore> = match config.storage.backend {
        StorageBackend::Files => {
            let store = FlatFileStore::new(&config.storage.data_dir)?;
            info!("Using flat-file storage at: {}", config.storage.data_dir);
            Arc::new(store)
        }
        StorageBackend::Redb => {
            let store = RedbStore::open(&config.storage.data_dir)?;
            info!("Using redb storage at: {}", config.storage.data_dir);
            Arc::new(store)
        }
    };

    let stylesheet = api::load_stylesheet(config.server.stylesheet_path.as_deref());
    let state = Arc::new(AppState::new(config.clone(), store, stylesheet));

    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
