//! Round and vote routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bieterrunde_core::voting::{BudgetResult, Round, RoundProgress, VotingError, VotingLedger};
use bieterrunde_shared::types::{MemberId, VotingId, format_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::error_response};

/// Creates the round routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/votings/{voting_id}/rounds", post(new_round))
        .route("/votings/{voting_id}/rounds/active", get(active_round))
        .route("/votings/{voting_id}/rounds/{round_number}", get(get_round))
        .route(
            "/votings/{voting_id}/rounds/{round_number}/votes",
            post(record_vote),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a live vote.
#[derive(Debug, Deserialize)]
pub struct RecordVoteRequest {
    /// Voting member.
    pub member_id: MemberId,
    /// Contributed amount.
    pub amount: Decimal,
}

/// Response for a vote.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    /// Voting member.
    pub member_id: MemberId,
    /// Contributed amount.
    pub amount: String,
}

/// Response for a round with its progress and budget result.
#[derive(Debug, Serialize)]
pub struct RoundResponse {
    /// Round ID.
    pub id: Uuid,
    /// Sequential number.
    pub round_number: u32,
    /// Whether the round accepts votes.
    pub active: bool,
    /// Whether carried-forward bids were applied.
    pub bids_applied: bool,
    /// Votes ordered by member.
    pub votes: Vec<VoteResponse>,
    /// Vote counts.
    pub progress: RoundProgress,
    /// Budget result.
    pub result: BudgetResult,
}

impl RoundResponse {
    fn build(ledger: &VotingLedger, round: &Round) -> Self {
        Self {
            id: round.id().into_inner(),
            round_number: round.round_number(),
            active: round.is_active(),
            bids_applied: round.bids_applied(),
            votes: round
                .votes()
                .map(|v| VoteResponse {
                    member_id: v.member_id,
                    amount: format_amount(v.amount),
                })
                .collect(),
            progress: RoundProgress::compute(ledger.voting(), round, ledger.bid_count()),
            result: BudgetResult::compute(ledger.voting(), round),
        }
    }
}

fn round_response(ledger: &VotingLedger, round_number: u32) -> Option<RoundResponse> {
    ledger
        .round(round_number)
        .map(|round| RoundResponse::build(ledger, round))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/votings/{voting_id}/rounds` - Open the next round.
async fn new_round(State(state): State<AppState>, Path(voting_id): Path<Uuid>) -> Response {
    match state.votings().open_round(VotingId::from(voting_id)).await {
        Ok((round_number, ledger)) => match round_response(&ledger, round_number) {
            Some(response) => (StatusCode::CREATED, Json(response)).into_response(),
            None => error_response(VotingError::RoundNotFound(round_number)),
        },
        Err(e) => error_response(e),
    }
}

/// GET `/votings/{voting_id}/rounds/active` - The active round, or `null`.
async fn active_round(State(state): State<AppState>, Path(voting_id): Path<Uuid>) -> Response {
    match state.votings().ledger(VotingId::from(voting_id)).await {
        Ok(ledger) => {
            let round = ledger
                .active_round()
                .map(|round| RoundResponse::build(&ledger, round));
            (StatusCode::OK, Json(json!({ "round": round }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/votings/{voting_id}/rounds/{round_number}` - Get a round.
async fn get_round(
    State(state): State<AppState>,
    Path((voting_id, round_number)): Path<(Uuid, u32)>,
) -> Response {
    match state.votings().ledger(VotingId::from(voting_id)).await {
        Ok(ledger) => match round_response(&ledger, round_number) {
            Some(response) => (StatusCode::OK, Json(response)).into_response(),
            None => error_response(VotingError::RoundNotFound(round_number)),
        },
        Err(e) => error_response(e),
    }
}

/// POST `/votings/{voting_id}/rounds/{round_number}/votes` - Record a live vote.
async fn record_vote(
    State(state): State<AppState>,
    Path((voting_id, round_number)): Path<(Uuid, u32)>,
    Json(payload): Json<RecordVoteRequest>,
) -> Response {
    let voting_id = VotingId::from(voting_id);

    match state
        .votings()
        .record_vote(voting_id, round_number, payload.member_id, payload.amount)
        .await
    {
        Ok(receipt) => {
            if receipt.round_complete {
                info!(voting_id = %voting_id, round = round_number, "Round complete");
            }
            (StatusCode::CREATED, Json(receipt)).into_response()
        }
        Err(e) => error_response(e),
    }
}
