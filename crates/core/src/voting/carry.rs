//! Carry-forward of bids into rounds.

use std::collections::BTreeMap;

use bieterrunde_shared::types::MemberId;
use rust_decimal::Decimal;

use super::types::Bid;

/// A bid selected as a member's vote for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarriedBid {
    /// Member the vote belongs to.
    pub member_id: MemberId,
    /// Round the selected bid was placed for.
    pub bid_round: u32,
    /// Amount of the selected bid.
    pub amount: Decimal,
}

/// Selects each member's effective bid for `round_number`.
///
/// For every member the bid with the highest round number that is not greater
/// than `round_number` wins. Members whose bids all lie in later rounds get no
/// entry and have to vote live. The result is ordered by member ID.
pub fn carry_forward<'a>(
    bids: impl IntoIterator<Item = &'a Bid>,
    round_number: u32,
) -> Vec<CarriedBid> {
    let mut selected: BTreeMap<MemberId, CarriedBid> = BTreeMap::new();

    for bid in bids {
        if bid.round_number > round_number {
            continue;
        }
        let candidate = CarriedBid {
            member_id: bid.member_id,
            bid_round: bid.round_number,
            amount: bid.amount,
        };
        selected
            .entry(bid.member_id)
            .and_modify(|current| {
                if candidate.bid_round > current.bid_round {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    selected.into_values().collect()
}
