//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for votings, bids, rounds and exports
//! - The mapping of application errors onto JSON error responses

pub mod error;
pub mod routes;

use axum::Router;
use bieterrunde_db::VotingRepository;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
}

impl AppState {
    /// Creates the state from a database connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Voting repository on the shared connection.
    #[must_use]
    pub fn votings(&self) -> VotingRepository {
        VotingRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
