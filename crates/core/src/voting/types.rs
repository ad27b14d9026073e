//! Voting data types.

use std::collections::BTreeMap;

use bieterrunde_shared::types::{MemberId, OwnerId, RoundId, VotingId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One fundraising event with a fixed goal and participant counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voting {
    /// Voting ID.
    pub id: VotingId,
    /// Creation timestamp, used by the expiry sweep.
    pub created_at: DateTime<Utc>,
    /// Owner who manages the voting.
    pub owner_id: OwnerId,
    /// Display name.
    pub name: String,
    /// Budget that the contributions must reach.
    pub budget_goal: Decimal,
    /// Participants on site, including members who bid in advance.
    pub voter_count: u32,
    /// Total number of members.
    pub total_count: u32,
}

impl Voting {
    /// Average contribution each member would need to pay to reach the goal.
    ///
    /// Non-participants are imputed with this value.
    #[must_use]
    pub fn average_contribution_target(&self) -> Decimal {
        self.budget_goal / Decimal::from(self.total_count)
    }

    /// Members who are not expected to take part in any round.
    #[must_use]
    pub const fn average_participants(&self) -> u32 {
        self.total_count.saturating_sub(self.voter_count)
    }
}

/// Input for creating a new voting.
#[derive(Debug, Clone)]
pub struct CreateVotingInput {
    /// Owner of the voting.
    pub owner_id: OwnerId,
    /// Display name.
    pub name: String,
    /// Budget goal.
    pub budget_goal: Decimal,
    /// Participants on site.
    pub voter_count: u32,
    /// Total number of members.
    pub total_count: u32,
}

/// A pre-declared amount, effective from `round_number` until superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Bidding member.
    pub member_id: MemberId,
    /// First round this bid applies to.
    pub round_number: u32,
    /// Declared amount.
    pub amount: Decimal,
}

/// A member's effective contribution in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Voting member.
    pub member_id: MemberId,
    /// Contributed amount.
    pub amount: Decimal,
}

/// One sequential voting attempt within a voting.
///
/// Votes are keyed by member, so a member holds at most one vote per round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub(crate) id: RoundId,
    pub(crate) round_number: u32,
    pub(crate) active: bool,
    pub(crate) bids_applied: bool,
    pub(crate) votes: BTreeMap<MemberId, Vote>,
}

impl Round {
    pub(crate) fn open(round_number: u32) -> Self {
        Self {
            id: RoundId::new(),
            round_number,
            active: true,
            bids_applied: false,
            votes: BTreeMap::new(),
        }
    }

    /// Rebuilds a round from stored state.
    #[must_use]
    pub fn restore(
        id: RoundId,
        round_number: u32,
        active: bool,
        bids_applied: bool,
        votes: impl IntoIterator<Item = Vote>,
    ) -> Self {
        Self {
            id,
            round_number,
            active,
            bids_applied,
            votes: votes.into_iter().map(|v| (v.member_id, v)).collect(),
        }
    }

    /// Round ID.
    #[must_use]
    pub const fn id(&self) -> RoundId {
        self.id
    }

    /// Sequential number, starting at 1.
    #[must_use]
    pub const fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Whether the round still accepts votes.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether carried-forward bids were applied.
    #[must_use]
    pub const fn bids_applied(&self) -> bool {
        self.bids_applied
    }

    /// Votes ordered by member ID.
    pub fn votes(&self) -> impl Iterator<Item = &Vote> {
        self.votes.values()
    }

    /// The vote of one member, if any.
    #[must_use]
    pub fn vote(&self, member_id: MemberId) -> Option<&Vote> {
        self.votes.get(&member_id)
    }

    /// Number of votes cast or carried into this round.
    #[must_use]
    pub fn vote_count(&self) -> u32 {
        u32::try_from(self.votes.len()).unwrap_or(u32::MAX)
    }

    /// Sum of all vote amounts.
    #[must_use]
    pub fn vote_sum(&self) -> Decimal {
        self.votes.values().map(|v| v.amount).sum()
    }
}
