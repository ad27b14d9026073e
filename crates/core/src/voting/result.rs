//! Budget results and round progress.

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{Round, Voting};

/// Outcome of one round measured against the budget goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetResult {
    /// Round the result belongs to.
    pub round_number: u32,
    /// Sum of all votes in the round.
    pub vote_sum: Decimal,
    /// Goal divided by the total member count.
    pub average_contribution_target: Decimal,
    /// Members not taking part, imputed with the average.
    pub average_participants: u32,
    /// Imputed contribution of the non-participants.
    pub average_sum: Decimal,
    /// Average vote among the participants.
    pub average_contribution_voters: Decimal,
    /// `vote_sum + average_sum`.
    pub result: Decimal,
    /// `result - budget_goal`; negative when the goal is missed.
    pub difference: Decimal,
    /// The goal the result is compared with.
    pub budget_goal: Decimal,
    /// Whether the goal is reached.
    pub success: bool,
}

impl BudgetResult {
    /// Computes the result of `round` for `voting`.
    ///
    /// Division is safe because a valid voting has `total_count >= voter_count >= 1`.
    #[must_use]
    pub fn compute(voting: &Voting, round: &Round) -> Self {
        let vote_sum = round.vote_sum();
        let average_contribution_target = voting.average_contribution_target();
        let average_participants = voting.average_participants();
        let average_sum = average_contribution_target * Decimal::from(average_participants);
        let result = vote_sum + average_sum;

        Self {
            round_number: round.round_number(),
            vote_sum,
            average_contribution_target,
            average_participants,
            average_sum,
            average_contribution_voters: vote_sum / Decimal::from(voting.voter_count),
            result,
            difference: result - voting.budget_goal,
            budget_goal: voting.budget_goal,
            success: result >= voting.budget_goal,
        }
    }
}

/// How far a round is from completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundProgress {
    /// Round the figures belong to.
    pub round_number: u32,
    /// Votes collected.
    pub vote_count: u32,
    /// Votes required.
    pub voter_count: u32,
    /// `vote_count / voter_count * 100`, two decimal places.
    pub percent_complete: Decimal,
    /// Votes cast live, i.e. not carried from round-1 bidders.
    pub local_vote_count: u32,
    /// Participants expected to vote live.
    pub local_voter_count: u32,
    /// Live completion in percent; 100 when nobody has to vote live.
    pub percent_complete_local: Decimal,
    /// Whether all votes are in.
    pub is_complete: bool,
}

impl RoundProgress {
    /// Computes progress of `round`; `bid_count` is the number of round-1 bidders.
    #[must_use]
    pub fn compute(voting: &Voting, round: &Round, bid_count: u32) -> Self {
        let vote_count = round.vote_count();
        let local_vote_count = vote_count.saturating_sub(bid_count);
        let local_voter_count = voting.voter_count.saturating_sub(bid_count);

        Self {
            round_number: round.round_number(),
            vote_count,
            voter_count: voting.voter_count,
            percent_complete: percent(vote_count, voting.voter_count),
            local_vote_count,
            local_voter_count,
            percent_complete_local: percent(local_vote_count, local_voter_count),
            is_complete: vote_count == voting.voter_count,
        }
    }
}

fn percent(part: u32, whole: u32) -> Decimal {
    if whole == 0 {
        return Decimal::ONE_HUNDRED;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)).round_dp(2)
}
