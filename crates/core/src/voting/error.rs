//! Voting error types.

use bieterrunde_shared::AppError;
use bieterrunde_shared::types::{AmountError, MemberId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::import::ImportError;

/// Broad error classes callers map onto user-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before anything changed.
    Validation,
    /// Operation not allowed in the current lifecycle state.
    InvalidState,
    /// Uniqueness violated (duplicate bid or vote).
    Conflict,
    /// The round no longer accepts changes.
    State,
    /// Referenced entity does not exist.
    NotFound,
    /// Stored data breaks a ledger invariant.
    Internal,
}

/// Voting-related errors.
#[derive(Debug, Error)]
pub enum VotingError {
    /// Name is empty.
    #[error("Name cannot be empty")]
    EmptyName,

    /// Name exceeds the storage limit.
    #[error("Name is too long: {0} characters (max 255)")]
    NameTooLong(usize),

    /// Budget goal is zero or negative.
    #[error("Budget goal must be greater than 0, got {0}")]
    NonPositiveBudgetGoal(Decimal),

    /// Voter count is zero.
    #[error("Voter count must be at least 1")]
    VoterCountTooSmall,

    /// More voters than members.
    #[error("Voter count ({voter_count}) cannot exceed total count ({total_count})")]
    VoterCountExceedsTotal {
        /// Requested voter count.
        voter_count: u32,
        /// Total member count.
        total_count: u32,
    },

    /// Amount is negative, too precise or too large.
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The bid sheet could not be read.
    #[error("Invalid bid import: {0}")]
    Import(#[from] ImportError),

    /// Membership numbers are non-negative.
    #[error("Invalid member ID: {0}")]
    NegativeMemberId(MemberId),

    /// Round numbers start at 1.
    #[error("Round number must be at least 1")]
    InvalidRoundNumber,

    /// The active round has not collected all votes yet.
    #[error("Active round {round_number} is not complete ({vote_count} of {voter_count} votes)")]
    ActiveRoundIncomplete {
        /// Active round.
        round_number: u32,
        /// Votes collected so far.
        vote_count: u32,
        /// Votes required.
        voter_count: u32,
    },

    /// Carried-forward bids were already applied to the round.
    #[error("Bids already applied to round {0}")]
    BidsAlreadyApplied(u32),

    /// Carrying bids forward would exceed the expected number of voters.
    #[error("Round {round_number} would hold {votes} votes but only {voter_count} voters are expected")]
    TooManyVotes {
        /// Target round.
        round_number: u32,
        /// Votes after applying the bids.
        votes: u32,
        /// Expected voters.
        voter_count: u32,
    },

    /// A bid for this member and round already exists.
    #[error("Duplicate bid for member {member_id} in round {round_number}")]
    DuplicateBid {
        /// Bidding member.
        member_id: MemberId,
        /// Round of the bid.
        round_number: u32,
    },

    /// The member already voted in this round.
    #[error("Member {member_id} already voted in round {round_number}")]
    DuplicateVote {
        /// Voting member.
        member_id: MemberId,
        /// Round of the vote.
        round_number: u32,
    },

    /// The round has all its votes.
    #[error("Round {0} is complete and accepts no further votes")]
    RoundComplete(u32),

    /// The round was closed.
    #[error("Round {0} is no longer active")]
    RoundInactive(u32),

    /// No round with this number exists.
    #[error("Round not found: {0}")]
    RoundNotFound(u32),

    /// Stored state violates a ledger invariant.
    #[error("Inconsistent ledger: {0}")]
    InconsistentLedger(String),
}

impl VotingError {
    /// Returns the error class.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName
            | Self::NameTooLong(_)
            | Self::NonPositiveBudgetGoal(_)
            | Self::VoterCountTooSmall
            | Self::VoterCountExceedsTotal { .. }
            | Self::InvalidAmount(_)
            | Self::Import(_)
            | Self::NegativeMemberId(_)
            | Self::InvalidRoundNumber => ErrorKind::Validation,
            Self::ActiveRoundIncomplete { .. }
            | Self::BidsAlreadyApplied(_)
            | Self::TooManyVotes { .. } => ErrorKind::InvalidState,
            Self::DuplicateBid { .. } | Self::DuplicateVote { .. } => ErrorKind::Conflict,
            Self::RoundComplete(_) | Self::RoundInactive(_) => ErrorKind::State,
            Self::RoundNotFound(_) => ErrorKind::NotFound,
            Self::InconsistentLedger(_) => ErrorKind::Internal,
        }
    }
}

impl ErrorKind {
    /// Wraps a message in the matching application error.
    #[must_use]
    pub fn into_app_error(self, message: String) -> AppError {
        match self {
            Self::Validation => AppError::Validation(message),
            Self::InvalidState => AppError::InvalidState(message),
            Self::Conflict => AppError::Conflict(message),
            Self::State => AppError::RoundClosed(message),
            Self::NotFound => AppError::NotFound(message),
            Self::Internal => AppError::Internal(message),
        }
    }
}

impl From<VotingError> for AppError {
    fn from(err: VotingError) -> Self {
        err.kind().into_app_error(err.to_string())
    }
}
