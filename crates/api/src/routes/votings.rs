//! Voting management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use bieterrunde_core::voting::{CreateVotingInput, Voting, VotingLedger};
use bieterrunde_shared::types::{OwnerId, VotingId, format_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, error::error_response};

/// Creates the voting routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/votings", get(list_votings).post(create_voting))
        .route("/votings/{voting_id}", get(get_voting))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a voting.
#[derive(Debug, Deserialize)]
pub struct CreateVotingRequest {
    /// Owner managing the voting.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Budget goal.
    pub budget_goal: Decimal,
    /// Participants on site.
    pub voter_count: u32,
    /// Total number of members.
    pub total_count: u32,
}

/// Query for listing votings.
#[derive(Debug, Deserialize)]
pub struct ListVotingsQuery {
    /// Owner whose votings are listed.
    pub owner_id: Uuid,
}

/// Response for a voting.
#[derive(Debug, Serialize)]
pub struct VotingResponse {
    /// Voting ID.
    pub id: Uuid,
    /// Created at timestamp.
    pub created_at: String,
    /// Owner ID.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Budget goal.
    pub budget_goal: String,
    /// Participants on site.
    pub voter_count: u32,
    /// Total number of members.
    pub total_count: u32,
    /// Budget goal divided by total count.
    pub average_contribution_target: String,
}

impl From<&Voting> for VotingResponse {
    fn from(voting: &Voting) -> Self {
        Self {
            id: voting.id.into_inner(),
            created_at: voting.created_at.to_rfc3339(),
            owner_id: voting.owner_id.into_inner(),
            name: voting.name.clone(),
            budget_goal: format_amount(voting.budget_goal),
            voter_count: voting.voter_count,
            total_count: voting.total_count,
            average_contribution_target: format_amount(voting.average_contribution_target()),
        }
    }
}

/// Response for a voting with its ledger counters.
#[derive(Debug, Serialize)]
pub struct VotingDetailResponse {
    /// The voting.
    #[serde(flatten)]
    pub voting: VotingResponse,
    /// Members holding a round-1 bid.
    pub bid_count: u32,
    /// Participants expected to vote live.
    pub local_voter_count: u32,
    /// Number of rounds so far.
    pub round_count: usize,
    /// Number of the active round.
    pub active_round: Option<u32>,
}

impl From<&VotingLedger> for VotingDetailResponse {
    fn from(ledger: &VotingLedger) -> Self {
        Self {
            voting: ledger.voting().into(),
            bid_count: ledger.bid_count(),
            local_voter_count: ledger.local_voter_count(),
            round_count: ledger.rounds().len(),
            active_round: ledger.active_round().map(|r| r.round_number()),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/votings` - Create a voting.
async fn create_voting(
    State(state): State<AppState>,
    Json(payload): Json<CreateVotingRequest>,
) -> Response {
    let input = CreateVotingInput {
        owner_id: OwnerId::from(payload.owner_id),
        name: payload.name,
        budget_goal: payload.budget_goal,
        voter_count: payload.voter_count,
        total_count: payload.total_count,
    };

    match state.votings().create(input).await {
        Ok(voting) => {
            (StatusCode::CREATED, Json(VotingResponse::from(&voting))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/votings?owner_id=` - List an owner's votings, newest first.
async fn list_votings(
    State(state): State<AppState>,
    Query(query): Query<ListVotingsQuery>,
) -> Response {
    match state
        .votings()
        .list_by_owner(OwnerId::from(query.owner_id))
        .await
    {
        Ok(votings) => {
            let response: Vec<VotingResponse> = votings.iter().map(VotingResponse::from).collect();
            (StatusCode::OK, Json(json!({ "votings": response }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/votings/{voting_id}` - Get a voting with its counters.
async fn get_voting(State(state): State<AppState>, Path(voting_id): Path<Uuid>) -> Response {
    match state.votings().ledger(VotingId::from(voting_id)).await {
        Ok(ledger) => (StatusCode::OK, Json(VotingDetailResponse::from(&ledger))).into_response(),
        Err(e) => error_response(e),
    }
}
