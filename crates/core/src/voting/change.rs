//! Recorded ledger mutations.

use bieterrunde_shared::types::RoundId;

use super::types::{Bid, Vote};

/// How a vote entered a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteSource {
    /// Submitted by the member during the round.
    Live,
    /// Taken from the member's bid for `bid_round`.
    CarriedForward {
        /// Round the bid was placed for.
        bid_round: u32,
    },
}

/// One state change, in the order it happened.
///
/// Storage layers replay these inside a single transaction. The order matters:
/// a round is always closed before the next one is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerChange {
    /// A bid was added to the bid ledger.
    BidPlaced(Bid),
    /// The expected number of voters changed.
    VoterCountChanged {
        /// New voter count.
        voter_count: u32,
    },
    /// A new active round was created.
    RoundOpened {
        /// New round.
        round_id: RoundId,
        /// Its sequential number.
        round_number: u32,
    },
    /// A vote was added to a round.
    VoteCast {
        /// Target round.
        round_id: RoundId,
        /// The vote.
        vote: Vote,
        /// Where the vote came from.
        source: VoteSource,
    },
    /// Carried-forward bids were applied to a round.
    BidsApplied {
        /// Target round.
        round_id: RoundId,
    },
    /// A round stopped being active.
    RoundClosed {
        /// Closed round.
        round_id: RoundId,
    },
}
