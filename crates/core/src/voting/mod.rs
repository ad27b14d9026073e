//! Votings, rounds and the carry-forward of bids.
//!
//! A [`VotingLedger`] owns one voting together with its bids and rounds and is
//! the only place where round state changes. Every mutation is recorded as a
//! [`LedgerChange`] so that a storage layer can persist exactly what happened.

pub mod carry;
pub mod change;
pub mod error;
pub mod ledger;
pub mod result;
pub mod types;
pub mod validation;

#[cfg(test)]
mod ledger_props;
#[cfg(test)]
pub(crate) mod tests;

pub use carry::{CarriedBid, carry_forward};
pub use change::{LedgerChange, VoteSource};
pub use error::{ErrorKind, VotingError};
pub use ledger::{ImportSummary, VoteReceipt, VotingLedger};
pub use result::{BudgetResult, RoundProgress};
pub use types::{Bid, CreateVotingInput, Round, Vote, Voting};
pub use validation::{MAX_NAME_LENGTH, validate_voting};
