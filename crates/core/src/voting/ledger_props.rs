//! Property-based tests for the voting ledger.
//!
//! - Carry-forward picks the latest non-future bid per member
//! - A round is active exactly until it holds one vote per voter
//! - Budget results add the imputed average to the vote sum

use std::collections::BTreeMap;

use bieterrunde_shared::types::{MemberId, RoundId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::carry::carry_forward;
use super::result::BudgetResult;
use super::tests::voting_with;
use super::types::{Bid, Round, Vote};

/// Strategy to generate amounts (0.00 to 9,999.99).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate bids for up to 8 members over rounds 1 to 6,
/// with at most one bid per member and round.
fn bids() -> impl Strategy<Value = Vec<Bid>> {
    prop::collection::btree_map((0i64..8, 1u32..=6), amount(), 0..30).prop_map(|map| {
        map.into_iter()
            .map(|((member, round_number), amount)| Bid {
                member_id: MemberId(member),
                round_number,
                amount,
            })
            .collect()
    })
}

proptest! {
    /// The carried amount for each member comes from the largest bid round <= target.
    #[test]
    fn test_carry_forward_matches_brute_force(bids in bids(), target in 1u32..=7) {
        let carried = carry_forward(&bids, target);

        let mut expected: BTreeMap<MemberId, (u32, Decimal)> = BTreeMap::new();
        for bid in &bids {
            if bid.round_number <= target {
                let entry = expected.entry(bid.member_id).or_insert((bid.round_number, bid.amount));
                if bid.round_number >= entry.0 {
                    *entry = (bid.round_number, bid.amount);
                }
            }
        }

        prop_assert_eq!(carried.len(), expected.len());
        for c in &carried {
            let (round, amount) = expected[&c.member_id];
            prop_assert_eq!(c.bid_round, round);
            prop_assert_eq!(c.amount, amount);
            prop_assert!(c.bid_round <= target);
        }
    }

    /// Carried bids never appear in rounds before their own round number.
    #[test]
    fn test_carry_forward_ignores_future_bids(bids in bids()) {
        let carried = carry_forward(&bids, 1);

        for c in carried {
            prop_assert_eq!(c.bid_round, 1);
        }
    }

    /// After every vote the round is active iff it is not yet complete.
    #[test]
    fn test_completion_after_every_vote(
        voter_count in 1u32..10,
        amounts in prop::collection::vec(amount(), 1..12),
    ) {
        let mut ledger = voting_with(Decimal::from(1000), voter_count, voter_count);
        ledger.new_round().unwrap();

        for (member, amount) in (0i64..).zip(amounts) {
            let before = ledger.round(1).unwrap().vote_count();
            let result = ledger.record_vote(1, MemberId(member), amount);
            let round = ledger.round(1).unwrap();

            if before < voter_count {
                let receipt = result.unwrap();
                prop_assert_eq!(receipt.round_complete, round.vote_count() == voter_count);
            } else {
                prop_assert!(result.is_err());
            }
            prop_assert_eq!(round.is_active(), !ledger.is_complete(round));
            prop_assert!(round.vote_count() <= voter_count);
        }
    }

    /// Success holds exactly when the difference to the goal is not negative.
    #[test]
    fn test_budget_result_arithmetic(
        goal_cents in 1i64..10_000_000,
        voter_count in 1u32..20,
        extra in 0u32..20,
        amounts in prop::collection::vec(amount(), 0..20),
    ) {
        let total_count = voter_count + extra;
        let ledger = voting_with(Decimal::new(goal_cents, 2), voter_count, total_count);
        let votes: Vec<Vote> = (0i64..)
            .zip(amounts.iter().take(voter_count as usize))
            .map(|(member, &amount)| Vote { member_id: MemberId(member), amount })
            .collect();
        let round = Round::restore(RoundId::new(), 1, false, true, votes);

        let result = BudgetResult::compute(ledger.voting(), &round);

        prop_assert_eq!(result.result, result.vote_sum + result.average_sum);
        prop_assert_eq!(result.average_participants, extra);
        prop_assert_eq!(result.success, result.difference >= Decimal::ZERO);
        if extra == 0 {
            prop_assert_eq!(result.result, round.vote_sum());
        }
    }
}
