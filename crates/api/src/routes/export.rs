//! Export routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bieterrunde_core::export::{DirectoryMember, export_round, plan_contributions};
use bieterrunde_shared::types::VotingId;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::error_response};

/// Creates the export routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/votings/{voting_id}/export", get(export_votes))
        .route(
            "/votings/{voting_id}/rounds/{round_number}/contributions",
            post(contributions),
        )
}

/// Request body for a contribution plan.
#[derive(Debug, Deserialize)]
pub struct ContributionRequest {
    /// Members of the directory.
    pub members: Vec<DirectoryMember>,
    /// Replaces the rounded average contribution target.
    #[serde(default)]
    pub average_contribution: Option<Decimal>,
}

/// GET `/votings/{voting_id}/export` - Download the final round as CSV.
async fn export_votes(State(state): State<AppState>, Path(voting_id): Path<Uuid>) -> Response {
    let ledger = match state.votings().ledger(VotingId::from(voting_id)).await {
        Ok(ledger) => ledger,
        Err(e) => return error_response(e),
    };

    match export_round(&ledger, Utc::now()) {
        Ok(export) => {
            info!(voting_id = %voting_id, round = export.round_number, "Votes exported");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", export.file_name),
                    ),
                ],
                export.content,
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// POST `/votings/{voting_id}/rounds/{round_number}/contributions` - Plan
/// contributions for a membership directory.
async fn contributions(
    State(state): State<AppState>,
    Path((voting_id, round_number)): Path<(Uuid, u32)>,
    Json(payload): Json<ContributionRequest>,
) -> Response {
    let ledger = match state.votings().ledger(VotingId::from(voting_id)).await {
        Ok(ledger) => ledger,
        Err(e) => return error_response(e),
    };

    match plan_contributions(
        &ledger,
        round_number,
        &payload.members,
        payload.average_contribution,
    ) {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(e) => error_response(e),
    }
}
