//! Contribution plan for a membership directory.
//!
//! Every directory member gets a whole-unit contribution: their vote in the
//! round, or the average contribution if they did not vote.

use std::collections::BTreeSet;

use bieterrunde_shared::types::{MemberId, validate_amount};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::ExportError;
use crate::voting::VotingLedger;

/// A member record in the external directory.
///
/// The directory keeps its own record IDs next to the membership number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMember {
    /// Directory record ID.
    pub record_id: i64,
    /// Membership number.
    pub member_id: MemberId,
}

/// Contribution assigned to one directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contribution {
    /// Directory record ID.
    pub record_id: i64,
    /// Membership number.
    pub member_id: MemberId,
    /// Whole-unit amount.
    pub amount: Decimal,
    /// Whether the amount comes from a vote.
    pub voted: bool,
}

/// Directory records without a vote, to be grouped together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoBidGroup {
    /// Group title.
    pub title: String,
    /// Records in the group.
    pub record_ids: Vec<i64>,
}

/// Contributions for all directory members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionPlan {
    /// Round the votes come from.
    pub round_number: u32,
    /// Amount assigned to non-voting members.
    pub average_contribution: Decimal,
    /// One entry per directory member, in directory order.
    pub contributions: Vec<Contribution>,
    /// Members that did not vote, if any.
    pub no_bid_group: Option<NoBidGroup>,
}

impl ContributionPlan {
    /// Number of directory members that voted.
    #[must_use]
    pub fn voting_members(&self) -> usize {
        self.contributions.iter().filter(|c| c.voted).count()
    }

    /// Sum of all planned contributions.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.contributions.iter().map(|c| c.amount).sum()
    }
}

fn round_to_unit(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// Plans the contributions of a complete round for a directory.
///
/// `average_override` replaces the rounded average contribution target.
///
/// # Errors
///
/// Returns `ExportError::MembersNotInDirectory` listing every voter the
/// directory lacks, and `ExportError::RoundIncomplete` if the round still
/// waits for votes.
pub fn plan_contributions(
    ledger: &VotingLedger,
    round_number: u32,
    directory: &[DirectoryMember],
    average_override: Option<Decimal>,
) -> Result<ContributionPlan, ExportError> {
    let round = ledger
        .round(round_number)
        .ok_or(ExportError::RoundNotFound(round_number))?;
    if !ledger.is_complete(round) {
        return Err(ExportError::RoundIncomplete(round_number));
    }

    let known: BTreeSet<MemberId> = directory.iter().map(|m| m.member_id).collect();
    let missing: Vec<MemberId> = round
        .votes()
        .map(|v| v.member_id)
        .filter(|id| !known.contains(id))
        .collect();
    if !missing.is_empty() {
        return Err(ExportError::MembersNotInDirectory(missing));
    }

    let average_contribution = match average_override {
        Some(amount) => {
            validate_amount(amount)?;
            amount
        }
        None => round_to_unit(ledger.voting().average_contribution_target()),
    };

    let mut contributions = Vec::with_capacity(directory.len());
    let mut no_bid = Vec::new();
    for member in directory {
        let contribution = match round.vote(member.member_id) {
            Some(vote) => Contribution {
                record_id: member.record_id,
                member_id: member.member_id,
                amount: round_to_unit(vote.amount),
                voted: true,
            },
            None => {
                no_bid.push(member.record_id);
                Contribution {
                    record_id: member.record_id,
                    member_id: member.member_id,
                    amount: average_contribution,
                    voted: false,
                }
            }
        };
        contributions.push(contribution);
    }

    let no_bid_group = (!no_bid.is_empty()).then(|| NoBidGroup {
        title: format!("Kein Gebot - {}", ledger.voting().name),
        record_ids: no_bid,
    });

    Ok(ContributionPlan {
        round_number,
        average_contribution,
        contributions,
        no_bid_group,
    })
}
