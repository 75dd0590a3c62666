//! HTTP/JSON API over the entity store.
//!
//! Every route is scoped to the single configured user. Handlers are thin:
//! they validate bodies, call one store or coach operation and translate
//! absence into 404.

mod error;
mod handlers;

pub use error::ApiError;

use crate::advice::FallbackAdvisor;
use crate::config::ServerConfig;
use crate::store::SharedStore;
use crate::Result;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub advisor: Arc<FallbackAdvisor>,
    pub user_id: String,
}

impl AppState {
    pub fn new(store: SharedStore, advisor: FallbackAdvisor, user_id: impl Into<String>) -> Self {
        Self {
            store,
            advisor: Arc::new(advisor),
            user_id: user_id.into(),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/exercises", get(handlers::list_exercises))
        .route("/api/exercises/:id", get(handlers::get_exercise))
        .route("/api/exercises/:id/advice", get(handlers::exercise_advice))
        .route(
            "/api/workout-templates",
            get(handlers::list_workout_templates).post(handlers::create_workout_template),
        )
        .route(
            "/api/workout-templates/:id",
            get(handlers::get_workout_template)
                .put(handlers::update_workout_template)
                .delete(handlers::delete_workout_template),
        )
        .route(
            "/api/workout-sessions",
            get(handlers::list_workout_sessions).post(handlers::create_workout_session),
        )
        .route(
            "/api/workout-sessions/:id",
            get(handlers::get_workout_session).put(handlers::update_workout_session),
        )
        .route(
            "/api/exercise-logs",
            get(handlers::list_exercise_logs).post(handlers::create_exercise_log),
        )
        .route("/api/ai-suggestions", get(handlers::list_ai_suggestions))
        .route(
            "/api/ai-suggestions/generate",
            post(handlers::generate_ai_suggestions),
        )
        .route(
            "/api/ai-suggestions/:id/read",
            put(handlers::mark_ai_suggestion_read),
        )
        .route("/api/user-stats", get(handlers::user_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
