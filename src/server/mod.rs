//! HTTP front end for the merge operation.
//!
//! Routes live under `/api`:
//!
//! - `POST /api/merge-pdfs` merges the uploaded `pdfs` parts in order
//! - `GET /api/health` reports liveness and the crate version

pub mod error;
pub mod handlers;
pub mod staging;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use std::io;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post},
};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let body_limit = DefaultBodyLimit::max(state.config.max_request_size);

    let api = Router::new()
        .route("/merge-pdfs", post(handlers::merge_pdfs))
        .route("/health", get(handlers::health))
        .layer(body_limit)
        .layer(cors);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the upload directory, bind and serve until a shutdown signal.
pub async fn serve(config: Config) -> io::Result<()> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        upload_dir = %config.upload_dir.display(),
        max_file_size = config.max_file_size,
        max_request_size = config.max_request_size,
        bookmarks = config.bookmarks,
        "pdfmerge listening"
    );

    axum::serve(listener, router(AppState::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
