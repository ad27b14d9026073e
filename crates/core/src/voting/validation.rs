//! Voting validation rules.

use bieterrunde_shared::types::validate_amount;
use rust_decimal::Decimal;

use super::error::VotingError;

/// Maximum length of a voting name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Validates the fields of a voting.
///
/// Checked in order: name, budget goal, voter count, voter count against total count.
/// The budget goal must also be a storable amount.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_voting(
    name: &str,
    budget_goal: Decimal,
    voter_count: u32,
    total_count: u32,
) -> Result<(), VotingError> {
    if name.trim().is_empty() {
        return Err(VotingError::EmptyName);
    }
    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(VotingError::NameTooLong(length));
    }
    if budget_goal <= Decimal::ZERO {
        return Err(VotingError::NonPositiveBudgetGoal(budget_goal));
    }
    validate_amount(budget_goal)?;
    if voter_count < 1 {
        return Err(VotingError::VoterCountTooSmall);
    }
    if voter_count > total_count {
        return Err(VotingError::VoterCountExceedsTotal {
            voter_count,
            total_count,
        });
    }
    Ok(())
}
