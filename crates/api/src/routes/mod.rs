//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod bids;
pub mod export;
pub mod health;
pub mod rounds;
pub mod votings;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(votings::routes())
        .merge(bids::routes())
        .merge(rounds::routes())
        .merge(export::routes())
}
