use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitesync_api::config::ServerConfig;
use sitesync_api::router::build_app_router;
use sitesync_api::state::AppState;
use sitesync_core::store::{InMemoryPostStore, PostStore};
use sitesync_outbound::{FileSyncLog, SyncConfig, SyncDispatcher, SyncError, SyncLogSink};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "sitesync_api=debug,sitesync_outbound=debug,tower_http=debug".into()
    });
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Post store ---
    let (posts, db_pool) = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sitesync_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            sitesync_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            sitesync_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store: Arc<dyn PostStore> = Arc::new(sitesync_db::PgPostStore::new(pool.clone()));
            (store, Some(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using in-memory post store");
            let store: Arc<dyn PostStore> = Arc::new(InMemoryPostStore::new());
            (store, None)
        }
    };

    // --- Sync log + dispatcher ---
    let sync_log: Arc<dyn SyncLogSink> = Arc::new(FileSyncLog::new(config.sync_log_path.clone()));
    tracing::info!(path = %config.sync_log_path.display(), "Sync log location");

    let dispatcher = match SyncConfig::from_env()
        .map_err(SyncError::from)
        .and_then(|sync| SyncDispatcher::from_config(sync, Arc::clone(&sync_log)))
    {
        Ok(dispatcher) => {
            tracing::info!("Main website sync configured");
            Some(Arc::new(dispatcher))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Main website sync disabled");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        posts,
        sync_log,
        dispatcher,
        db_pool,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
