//! peergrade HTTP service.
//!
//! Routes, envelope, and error mapping for the evaluation and classroom
//! APIs. `main.rs` only parses flags, sets up tracing and calls [`serve`].

pub mod config;
pub mod envelope;
pub mod error;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use routes::{classroom, evaluations};

pub use config::Config;
pub use envelope::ApiResponse;
pub use error::ApiError;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/api/evaluations",
            post(evaluations::create_evaluation).get(evaluations::list_evaluations),
        )
        .route("/api/evaluations/summary", get(evaluations::evaluation_summary))
        .route(
            "/api/evaluations/:id",
            get(evaluations::get_evaluation)
                .put(evaluations::update_evaluation)
                .patch(evaluations::update_evaluation)
                .delete(evaluations::delete_evaluation),
        )
        .route("/api/session", post(classroom::login))
        .route("/api/rooms", post(classroom::create_room))
        .route("/api/rooms/:code", get(classroom::get_room))
        .route("/api/rooms/:code/join", post(classroom::join_room))
        .route("/api/rooms/:code/groups", post(classroom::create_group))
        .route(
            "/api/rooms/:code/groups/:group_id/join",
            post(classroom::join_group),
        )
        .route(
            "/api/rooms/:code/groups/:group_id/analytics",
            get(classroom::group_analytics),
        )
        .route("/api/rooms/:code/scores", post(classroom::submit_peer_score))
        .route("/api/rooms/:code/analytics", get(classroom::room_analytics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `config.bind` and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: &Config, state: AppState) -> std::io::Result<()> {
    let app = router(state);

    info!("Binding to {}", config.bind);
    let listener = TcpListener::bind(config.bind).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
