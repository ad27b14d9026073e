//! Bid import routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bieterrunde_core::voting::Bid;
use bieterrunde_shared::types::{MemberId, VotingId, format_amount};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, error::error_response};

/// Creates the bid routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/votings/{voting_id}/bids", get(list_bids))
        .route("/votings/{voting_id}/bids/import", post(import_bids))
}

/// Response for a bid.
#[derive(Debug, Serialize)]
pub struct BidResponse {
    /// Bidding member.
    pub member_id: MemberId,
    /// First round the bid applies to.
    pub round_number: u32,
    /// Declared amount.
    pub amount: String,
}

impl From<Bid> for BidResponse {
    fn from(bid: Bid) -> Self {
        Self {
            member_id: bid.member_id,
            round_number: bid.round_number,
            amount: format_amount(bid.amount),
        }
    }
}

/// POST `/votings/{voting_id}/bids/import` - Import a bid sheet.
///
/// The body is the sheet itself: one `member_id,round1,round2,...` row per
/// member, comma- or semicolon-delimited.
async fn import_bids(
    State(state): State<AppState>,
    Path(voting_id): Path<Uuid>,
    body: String,
) -> Response {
    match state
        .votings()
        .import_bids(VotingId::from(voting_id), &body)
        .await
    {
        Ok(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/votings/{voting_id}/bids` - List all bids.
async fn list_bids(State(state): State<AppState>, Path(voting_id): Path<Uuid>) -> Response {
    match state.votings().bids(VotingId::from(voting_id)).await {
        Ok(bids) => {
            let response: Vec<BidResponse> = bids.into_iter().map(BidResponse::from).collect();
            (StatusCode::OK, Json(json!({ "bids": response }))).into_response()
        }
        Err(e) => error_response(e),
    }
}
