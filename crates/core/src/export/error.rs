//! Export error types.

use bieterrunde_shared::AppError;
use bieterrunde_shared::types::{AmountError, MemberId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::voting::ErrorKind;

/// Errors raised while exporting a round.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The voting has no rounds yet.
    #[error("Voting has no rounds to export")]
    NoRounds,

    /// No round with this number exists.
    #[error("Round not found: {0}")]
    RoundNotFound(u32),

    /// The round is still waiting for votes.
    #[error("Round {0} is not complete")]
    RoundIncomplete(u32),

    /// The round's result is below the goal.
    #[error("Budget goal not reached: result {result} is below goal {budget_goal}")]
    GoalNotReached {
        /// Round result.
        result: Decimal,
        /// Budget goal.
        budget_goal: Decimal,
    },

    /// Voters that the directory does not know.
    #[error("Members in voting but not in directory: {}", format_members(.0))]
    MembersNotInDirectory(Vec<MemberId>),

    /// The average contribution override is not a valid amount.
    #[error("Invalid average contribution: {0}")]
    InvalidAverage(#[from] AmountError),

    /// Writing the CSV content failed.
    #[error("Failed to write export: {0}")]
    Write(String),
}

fn format_members(members: &[MemberId]) -> String {
    members
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ExportError {
    /// Returns the error class.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRounds | Self::RoundNotFound(_) => ErrorKind::NotFound,
            Self::RoundIncomplete(_) | Self::GoalNotReached { .. } => ErrorKind::State,
            Self::MembersNotInDirectory(_) | Self::InvalidAverage(_) => ErrorKind::Validation,
            Self::Write(_) => ErrorKind::Internal,
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        err.kind().into_app_error(err.to_string())
    }
}
