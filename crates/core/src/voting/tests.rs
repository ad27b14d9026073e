//! Tests for the voting ledger.

use bieterrunde_shared::types::{MemberId, OwnerId, RoundId, VotingId};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

/// Ledger for a fresh voting named "Test Voting".
pub(crate) fn voting_with(budget_goal: Decimal, voter_count: u32, total_count: u32) -> VotingLedger {
    VotingLedger::new(Voting {
        id: VotingId::new(),
        created_at: Utc::now(),
        owner_id: OwnerId::new(),
        name: "Test Voting".to_string(),
        budget_goal,
        voter_count,
        total_count,
    })
    .unwrap()
}

fn bid(member_id: i64, round_number: u32, amount: Decimal) -> Bid {
    Bid {
        member_id: MemberId(member_id),
        round_number,
        amount,
    }
}

fn no_votes() -> Vec<Vote> {
    Vec::new()
}

fn amount_of(ledger: &VotingLedger, round_number: u32, member_id: i64) -> Option<Decimal> {
    ledger
        .round(round_number)
        .and_then(|r| r.vote(MemberId(member_id)))
        .map(|v| v.amount)
}

#[test]
fn test_new_ledger_rejects_invalid_voting() {
    let result = VotingLedger::new(Voting {
        id: VotingId::new(),
        created_at: Utc::now(),
        owner_id: OwnerId::new(),
        name: "x".to_string(),
        budget_goal: dec!(100),
        voter_count: 5,
        total_count: 4,
    });

    assert!(matches!(
        result,
        Err(VotingError::VoterCountExceedsTotal { .. })
    ));
}

#[test]
fn test_carry_forward_across_rounds() {
    // A bids for rounds 1 and 2, B for rounds 1 to 3; both rounds complete on bids alone.
    let mut ledger = voting_with(dec!(100), 2, 4);
    for b in [
        bid(1, 1, dec!(1)),
        bid(1, 2, dec!(2)),
        bid(2, 1, dec!(1)),
        bid(2, 2, dec!(2)),
        bid(2, 3, dec!(3)),
    ] {
        ledger.add_bid(b).unwrap();
    }

    let round = ledger.new_round().unwrap();
    assert_eq!(round.round_number(), 1);
    assert!(!round.is_active());
    assert_eq!(amount_of(&ledger, 1, 1), Some(dec!(1)));
    assert_eq!(amount_of(&ledger, 1, 2), Some(dec!(1)));

    ledger.new_round().unwrap();
    assert_eq!(amount_of(&ledger, 2, 1), Some(dec!(2)));
    assert_eq!(amount_of(&ledger, 2, 2), Some(dec!(2)));

    ledger.new_round().unwrap();
    assert_eq!(amount_of(&ledger, 3, 1), Some(dec!(2)));
    assert_eq!(amount_of(&ledger, 3, 2), Some(dec!(3)));

    assert!(ledger.active_round().is_none());
    assert_eq!(ledger.active_or_last_round().unwrap().round_number(), 3);
    assert!(ledger.rounds().iter().all(|r| ledger.is_complete(r)));
}

#[test]
fn test_live_votes_complete_round() {
    let mut ledger = voting_with(dec!(100), 2, 4);

    ledger.new_round().unwrap();
    let first = ledger.record_vote(1, MemberId(1), dec!(60)).unwrap();
    assert!(!first.round_complete);
    assert!(ledger.active_round().is_some());

    let second = ledger.record_vote(1, MemberId(2), dec!(40)).unwrap();
    assert!(second.round_complete);
    assert!(ledger.active_round().is_none());

    let result = ledger.budget_result(1).unwrap();
    assert_eq!(result.result, dec!(150));
    assert!(result.success);
}

#[test]
fn test_record_vote_on_complete_round() {
    let mut ledger = voting_with(dec!(100), 1, 1);
    ledger.new_round().unwrap();
    ledger.record_vote(1, MemberId(1), dec!(100)).unwrap();

    let err = ledger.record_vote(1, MemberId(2), dec!(10)).unwrap_err();

    assert!(matches!(err, VotingError::RoundComplete(1)));
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn test_record_vote_duplicate_member() {
    let mut ledger = voting_with(dec!(100), 3, 3);
    ledger.new_round().unwrap();
    ledger.record_vote(1, MemberId(1), dec!(10)).unwrap();

    let err = ledger.record_vote(1, MemberId(1), dec!(20)).unwrap_err();

    assert!(matches!(err, VotingError::DuplicateVote { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(amount_of(&ledger, 1, 1), Some(dec!(10)));
}

#[test]
fn test_record_vote_rejects_bad_amounts() {
    let mut ledger = voting_with(dec!(100), 3, 3);
    ledger.new_round().unwrap();

    for amount in [dec!(-1), dec!(1.001)] {
        let err = ledger.record_vote(1, MemberId(1), amount).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert_eq!(ledger.round(1).unwrap().vote_count(), 0);
}

#[test]
fn test_record_vote_unknown_round() {
    let mut ledger = voting_with(dec!(100), 2, 2);

    assert!(matches!(
        ledger.record_vote(1, MemberId(1), dec!(1)),
        Err(VotingError::RoundNotFound(1))
    ));
}

#[test]
fn test_new_round_requires_complete_active_round() {
    let mut ledger = voting_with(dec!(100), 2, 4);
    ledger.new_round().unwrap();
    ledger.record_vote(1, MemberId(1), dec!(50)).unwrap();
    ledger.take_changes();

    let err = ledger.new_round().unwrap_err();

    assert!(matches!(
        err,
        VotingError::ActiveRoundIncomplete {
            round_number: 1,
            vote_count: 1,
            voter_count: 2,
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(ledger.rounds().len(), 1);
    assert_eq!(ledger.voting().voter_count, 2);
    assert_eq!(ledger.voting().total_count, 4);
    assert!(ledger.changes().is_empty());
}

#[test]
fn test_new_round_after_goal_missed() {
    let mut ledger = voting_with(dec!(100), 2, 2);
    ledger.new_round().unwrap();
    ledger.record_vote(1, MemberId(1), dec!(30)).unwrap();
    ledger.record_vote(1, MemberId(2), dec!(30)).unwrap();
    assert!(!ledger.budget_result(1).unwrap().success);

    let round = ledger.new_round().unwrap();

    assert_eq!(round.round_number(), 2);
    assert!(round.is_active());
    assert_eq!(round.vote_count(), 0);
    assert!(round.bids_applied());
}

#[test]
fn test_apply_bids_only_once() {
    let mut ledger = voting_with(dec!(100), 2, 2);
    ledger.new_round().unwrap();

    let err = ledger.apply_bids(1).unwrap_err();

    assert!(matches!(err, VotingError::BidsAlreadyApplied(1)));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn test_apply_bids_conflicts_with_existing_vote() {
    let round = Round::restore(
        RoundId::new(),
        1,
        true,
        false,
        [Vote {
            member_id: MemberId(1),
            amount: dec!(5),
        }],
    );
    let voting = voting_with(dec!(100), 2, 2).voting().clone();
    let mut ledger =
        VotingLedger::restore(voting, vec![bid(1, 1, dec!(10))], vec![round]).unwrap();

    let err = ledger.apply_bids(1).unwrap_err();

    assert!(matches!(err, VotingError::DuplicateVote { .. }));
    assert!(!ledger.round(1).unwrap().bids_applied());
    assert_eq!(amount_of(&ledger, 1, 1), Some(dec!(5)));
}

#[test]
fn test_new_round_with_more_bids_than_voters() {
    let mut ledger = voting_with(dec!(100), 1, 3);
    ledger.add_bid(bid(1, 1, dec!(10))).unwrap();
    ledger.add_bid(bid(2, 1, dec!(10))).unwrap();

    let err = ledger.new_round().unwrap_err();

    assert!(matches!(err, VotingError::TooManyVotes { votes: 2, .. }));
    assert!(ledger.rounds().is_empty());
}

#[test]
fn test_add_bid_duplicate() {
    let mut ledger = voting_with(dec!(100), 2, 2);
    ledger.add_bid(bid(1, 1, dec!(10))).unwrap();

    let err = ledger.add_bid(bid(1, 1, dec!(20))).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(ledger.voting().voter_count, 2);
}

#[test]
fn test_add_bid_round_zero() {
    let mut ledger = voting_with(dec!(100), 2, 2);

    assert!(matches!(
        ledger.add_bid(bid(1, 0, dec!(10))),
        Err(VotingError::InvalidRoundNumber)
    ));
}

#[test]
fn test_import_raises_voter_count() {
    let mut ledger = voting_with(dec!(300), 1, 5);

    let summary = ledger
        .import_bids("member_id;round1;round2\n1;100;110\n2;90;\n")
        .unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            bids_imported: 3,
            members: 2,
            voter_count_added: 2,
        }
    );
    assert_eq!(ledger.voting().voter_count, 3);
    assert_eq!(ledger.bid_count(), 2);
    assert_eq!(ledger.local_voter_count(), 1);
    assert_eq!(ledger.bids().count(), 3);

    // Bids fill two of three seats; one live vote completes the round.
    ledger.new_round().unwrap();
    let receipt = ledger.record_vote(1, MemberId(3), dec!(80)).unwrap();
    assert!(receipt.round_complete);

    let progress = ledger.progress(1).unwrap();
    assert_eq!(progress.local_vote_count, 1);
    assert!(progress.is_complete);
}

#[test]
fn test_import_is_atomic_on_duplicate() {
    let mut ledger = voting_with(dec!(100), 1, 5);

    let err = ledger.import_bids("1,10\n2,20\n1,30\n").unwrap_err();

    assert!(matches!(err, VotingError::DuplicateBid { .. }));
    assert_eq!(ledger.bids().count(), 0);
    assert_eq!(ledger.voting().voter_count, 1);
    assert!(ledger.changes().is_empty());
}

#[test]
fn test_import_conflicts_with_stored_bid() {
    let mut ledger = voting_with(dec!(100), 1, 5);
    ledger.import_bids("1,10").unwrap();

    let err = ledger.import_bids("2,10\n1,20").unwrap_err();

    assert!(matches!(err, VotingError::DuplicateBid { .. }));
    assert_eq!(ledger.bids().count(), 1);
    assert_eq!(ledger.voting().voter_count, 2);
}

#[test]
fn test_import_accepts_future_round_bids() {
    let mut ledger = voting_with(dec!(100), 1, 5);

    let summary = ledger.import_bids("1,10\n2,,20\n").unwrap();

    assert_eq!(summary.bids_imported, 2);
    assert_eq!(summary.members, 2);
    assert_eq!(summary.voter_count_added, 1);
    assert_eq!(ledger.voting().voter_count, 2);
    assert_eq!(ledger.bid_count(), 1);

    ledger.new_round().unwrap();
    assert_eq!(amount_of(&ledger, 1, 1), Some(dec!(10)));
    assert_eq!(amount_of(&ledger, 1, 2), None);

    ledger.record_vote(1, MemberId(7), dec!(30)).unwrap();
    ledger.new_round().unwrap();
    assert_eq!(amount_of(&ledger, 2, 1), Some(dec!(10)));
    assert_eq!(amount_of(&ledger, 2, 2), Some(dec!(20)));
    assert_eq!(ledger.round(2).unwrap().vote_count(), 2);
}

#[test]
fn test_import_member_split_over_rows() {
    let mut ledger = voting_with(dec!(100), 1, 5);

    let summary = ledger.import_bids("1,10\n1,,20\n").unwrap();

    assert_eq!(summary.bids_imported, 2);
    assert_eq!(summary.members, 1);
    assert_eq!(summary.voter_count_added, 1);
    assert_eq!(ledger.voting().voter_count, 2);
    assert_eq!(ledger.bids().count(), 2);
}

#[test]
fn test_import_cannot_exceed_total_count() {
    let mut ledger = voting_with(dec!(100), 2, 3);

    let err = ledger.import_bids("1,10\n2,10\n").unwrap_err();

    assert!(matches!(err, VotingError::VoterCountExceedsTotal { .. }));
    assert_eq!(ledger.voting().voter_count, 2);
    assert_eq!(ledger.bids().count(), 0);
}

#[test]
fn test_import_empty_input() {
    let mut ledger = voting_with(dec!(100), 1, 5);

    let summary = ledger.import_bids("").unwrap();

    assert_eq!(summary.bids_imported, 0);
    assert_eq!(summary.voter_count_added, 0);
    assert!(ledger.changes().is_empty());
}

#[test]
fn test_import_invalid_amount_is_validation_error() {
    let mut ledger = voting_with(dec!(100), 1, 5);

    let err = ledger.import_bids("1,ten").unwrap_err();

    assert!(matches!(err, VotingError::Import(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_changes_record_round_lifecycle() {
    let mut ledger = voting_with(dec!(100), 1, 2);
    ledger.new_round().unwrap();
    ledger.record_vote(1, MemberId(4), dec!(70)).unwrap();

    let changes = ledger.take_changes();

    assert!(matches!(
        changes.as_slice(),
        [
            LedgerChange::RoundOpened { round_number: 1, .. },
            LedgerChange::BidsApplied { .. },
            LedgerChange::VoteCast {
                source: VoteSource::Live,
                ..
            },
            LedgerChange::RoundClosed { .. },
        ]
    ));
    assert!(ledger.changes().is_empty());
}

#[test]
fn test_changes_for_carried_votes() {
    let mut ledger = voting_with(dec!(100), 2, 2);
    ledger.add_bid(bid(1, 1, dec!(10))).unwrap();
    ledger.add_bid(bid(1, 2, dec!(15))).unwrap();
    ledger.new_round().unwrap();
    ledger.record_vote(1, MemberId(2), dec!(90)).unwrap();
    ledger.take_changes();

    ledger.new_round().unwrap();

    let carried: Vec<&LedgerChange> = ledger
        .changes()
        .iter()
        .filter(|c| matches!(c, LedgerChange::VoteCast { .. }))
        .collect();
    assert!(matches!(
        carried.as_slice(),
        [LedgerChange::VoteCast {
            source: VoteSource::CarriedForward { bid_round: 2 },
            ..
        }]
    ));
}

#[test]
fn test_restore_rejects_gaps_and_double_active() {
    let voting = voting_with(dec!(100), 2, 2).voting().clone();

    let gap = vec![Round::restore(RoundId::new(), 2, true, true, no_votes())];
    assert!(matches!(
        VotingLedger::restore(voting.clone(), vec![], gap),
        Err(VotingError::InconsistentLedger(_))
    ));

    let double = vec![
        Round::restore(RoundId::new(), 1, true, true, no_votes()),
        Round::restore(RoundId::new(), 2, true, true, no_votes()),
    ];
    assert!(matches!(
        VotingLedger::restore(voting, vec![], double),
        Err(VotingError::InconsistentLedger(_))
    ));
}

#[test]
fn test_restore_orders_rounds() {
    let voting = voting_with(dec!(100), 2, 2).voting().clone();
    let rounds = vec![
        Round::restore(RoundId::new(), 2, true, true, no_votes()),
        Round::restore(RoundId::new(), 1, false, true, no_votes()),
    ];

    let ledger = VotingLedger::restore(voting, vec![], rounds).unwrap();

    assert_eq!(ledger.rounds()[0].round_number(), 1);
    assert_eq!(ledger.active_round().unwrap().round_number(), 2);
}

#[test]
fn test_negative_member_id_is_rejected() {
    let mut ledger = voting_with(dec!(100), 2, 2);
    ledger.new_round().unwrap();

    let err = ledger.record_vote(1, MemberId(-3), dec!(10)).unwrap_err();
    assert!(matches!(err, VotingError::NegativeMemberId(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(ledger.add_bid(bid(-3, 1, dec!(10))).is_err());
}

#[test]
fn test_vote_into_inactive_round_is_rejected() {
    let mut ledger = voting_with(dec!(100), 1, 5);
    ledger.new_round().unwrap();
    assert!(ledger.record_vote(1, MemberId(1), dec!(50)).unwrap().round_complete);

    // A late round-1 bidder raises the voter count, so the closed round is
    // incomplete again but stays inactive.
    ledger.import_bids("2,10").unwrap();
    let round = ledger.round(1).unwrap();
    assert!(!round.active);
    assert!(!ledger.is_complete(round));

    let err = ledger.record_vote(1, MemberId(3), dec!(20)).unwrap_err();
    assert!(matches!(err, VotingError::RoundInactive(1)));
    assert_eq!(err.kind(), ErrorKind::State);
    assert_eq!(ledger.round(1).unwrap().vote_count(), 1);
}
