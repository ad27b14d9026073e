//! The voting ledger: one voting with its bids and rounds.
//!
//! All round state transitions happen here. Operations validate first and only
//! then mutate, so a failed call leaves the ledger untouched.

use std::collections::{BTreeMap, BTreeSet};

use bieterrunde_shared::types::{MemberId, validate_amount};
use rust_decimal::Decimal;
use serde::Serialize;

use super::carry::{CarriedBid, carry_forward};
use super::change::{LedgerChange, VoteSource};
use super::error::VotingError;
use super::result::{BudgetResult, RoundProgress};
use super::types::{Bid, Round, Vote, Voting};
use super::validation::validate_voting;
use crate::import::parse_bid_rows;

/// Outcome of a bid import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Bids added to the ledger.
    pub bids_imported: usize,
    /// Distinct members in the import.
    pub members: usize,
    /// Increase of the voter count (new round-1 bidders).
    pub voter_count_added: u32,
}

/// Outcome of a live vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    /// Round the vote was recorded in.
    pub round_number: u32,
    /// The recorded vote.
    pub vote: Vote,
    /// Whether this vote completed (and closed) the round.
    pub round_complete: bool,
}

/// A voting together with its bid ledger and rounds.
#[derive(Debug, Clone)]
pub struct VotingLedger {
    voting: Voting,
    bids: BTreeMap<(MemberId, u32), Decimal>,
    rounds: Vec<Round>,
    active: Option<usize>,
    changes: Vec<LedgerChange>,
}

impl VotingLedger {
    /// Creates a ledger for a voting without bids or rounds.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the voting itself is invalid.
    pub fn new(voting: Voting) -> Result<Self, VotingError> {
        Self::restore(voting, Vec::new(), Vec::new())
    }

    /// Rebuilds a ledger from stored state.
    ///
    /// # Errors
    ///
    /// Returns `VotingError::InconsistentLedger` if round numbers are not
    /// sequential from 1, more than one round is active, or a bid is stored twice.
    pub fn restore(
        voting: Voting,
        bids: Vec<Bid>,
        mut rounds: Vec<Round>,
    ) -> Result<Self, VotingError> {
        validate_voting(
            &voting.name,
            voting.budget_goal,
            voting.voter_count,
            voting.total_count,
        )?;

        let mut bid_map = BTreeMap::new();
        for bid in bids {
            if bid_map
                .insert((bid.member_id, bid.round_number), bid.amount)
                .is_some()
            {
                return Err(VotingError::InconsistentLedger(format!(
                    "bid for member {} in round {} stored twice",
                    bid.member_id, bid.round_number
                )));
            }
        }

        rounds.sort_by_key(Round::round_number);
        let mut active = None;
        for (idx, round) in rounds.iter().enumerate() {
            let expected = u32::try_from(idx + 1).unwrap_or(u32::MAX);
            if round.round_number != expected {
                return Err(VotingError::InconsistentLedger(format!(
                    "expected round {expected}, found round {}",
                    round.round_number
                )));
            }
            if round.active {
                if active.is_some() {
                    return Err(VotingError::InconsistentLedger(
                        "more than one active round".to_string(),
                    ));
                }
                active = Some(idx);
            }
        }

        Ok(Self {
            voting,
            bids: bid_map,
            rounds,
            active,
            changes: Vec::new(),
        })
    }

    /// The voting.
    #[must_use]
    pub const fn voting(&self) -> &Voting {
        &self.voting
    }

    /// All bids, ordered by member and round.
    pub fn bids(&self) -> impl Iterator<Item = Bid> + '_ {
        self.bids
            .iter()
            .map(|(&(member_id, round_number), &amount)| Bid {
                member_id,
                round_number,
                amount,
            })
    }

    /// All rounds in order.
    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// The round with the given number.
    #[must_use]
    pub fn round(&self, round_number: u32) -> Option<&Round> {
        self.round_index(round_number).map(|idx| &self.rounds[idx])
    }

    /// The active round, if any.
    #[must_use]
    pub fn active_round(&self) -> Option<&Round> {
        self.active.map(|idx| &self.rounds[idx])
    }

    /// The active round, or else the latest one.
    #[must_use]
    pub fn active_or_last_round(&self) -> Option<&Round> {
        self.active_round().or_else(|| self.rounds.last())
    }

    /// Number of members holding a round-1 bid.
    ///
    /// Members bidding only for later rounds are not counted; they are not
    /// part of the voter count.
    #[must_use]
    pub fn bid_count(&self) -> u32 {
        let count = self.bids.keys().filter(|(_, round)| *round == 1).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Participants expected to vote live.
    #[must_use]
    pub fn local_voter_count(&self) -> u32 {
        self.voting.voter_count.saturating_sub(self.bid_count())
    }

    /// A round is complete once it holds one vote per expected voter.
    #[must_use]
    pub fn is_complete(&self, round: &Round) -> bool {
        round.vote_count() == self.voting.voter_count
    }

    /// Changes recorded since the ledger was built or last drained.
    #[must_use]
    pub fn changes(&self) -> &[LedgerChange] {
        &self.changes
    }

    /// Drains the recorded changes.
    pub fn take_changes(&mut self) -> Vec<LedgerChange> {
        std::mem::take(&mut self.changes)
    }

    /// Budget result of a round.
    ///
    /// # Errors
    ///
    /// Returns `VotingError::RoundNotFound` for an unknown round.
    pub fn budget_result(&self, round_number: u32) -> Result<BudgetResult, VotingError> {
        let round = self
            .round(round_number)
            .ok_or(VotingError::RoundNotFound(round_number))?;
        Ok(BudgetResult::compute(&self.voting, round))
    }

    /// Progress of a round.
    ///
    /// # Errors
    ///
    /// Returns `VotingError::RoundNotFound` for an unknown round.
    pub fn progress(&self, round_number: u32) -> Result<RoundProgress, VotingError> {
        let round = self
            .round(round_number)
            .ok_or(VotingError::RoundNotFound(round_number))?;
        Ok(RoundProgress::compute(&self.voting, round, self.bid_count()))
    }

    /// Opens the next round and applies carried-forward bids to it.
    ///
    /// A complete active round is closed first. The new round closes right away
    /// if the carried bids already complete it.
    ///
    /// # Errors
    ///
    /// Returns `VotingError::ActiveRoundIncomplete` if the active round still
    /// waits for votes, or `VotingError::TooManyVotes` if the bids alone exceed
    /// the voter count.
    pub fn new_round(&mut self) -> Result<&Round, VotingError> {
        if let Some(active) = self.active_round() {
            if !self.is_complete(active) {
                return Err(VotingError::ActiveRoundIncomplete {
                    round_number: active.round_number,
                    vote_count: active.vote_count(),
                    voter_count: self.voting.voter_count,
                });
            }
        }

        let round_number = u32::try_from(self.rounds.len() + 1)
            .map_err(|_| VotingError::InconsistentLedger("too many rounds".to_string()))?;
        self.check_vote_capacity(round_number, 0, self.carried_bids(round_number).len())?;

        if let Some(idx) = self.active.take() {
            let round = &mut self.rounds[idx];
            round.active = false;
            self.changes.push(LedgerChange::RoundClosed { round_id: round.id });
        }

        let round = Round::open(round_number);
        self.changes.push(LedgerChange::RoundOpened {
            round_id: round.id,
            round_number,
        });
        self.rounds.push(round);
        let idx = self.rounds.len() - 1;
        self.active = Some(idx);

        self.apply_bids(round_number)?;
        Ok(&self.rounds[idx])
    }

    /// Turns each member's latest non-future bid into a vote for the round.
    ///
    /// Returns the number of votes created.
    ///
    /// # Errors
    ///
    /// Returns `VotingError::BidsAlreadyApplied` on a second call for the same
    /// round, `VotingError::DuplicateVote` if a bidder already voted in it, and
    /// `VotingError::TooManyVotes` if the voter count would be exceeded.
    pub fn apply_bids(&mut self, round_number: u32) -> Result<usize, VotingError> {
        let idx = self
            .round_index(round_number)
            .ok_or(VotingError::RoundNotFound(round_number))?;
        if self.rounds[idx].bids_applied {
            return Err(VotingError::BidsAlreadyApplied(round_number));
        }

        let carried = self.carried_bids(round_number);
        let round = &self.rounds[idx];
        if let Some(taken) = carried.iter().find(|c| round.votes.contains_key(&c.member_id)) {
            return Err(VotingError::DuplicateVote {
                member_id: taken.member_id,
                round_number,
            });
        }
        self.check_vote_capacity(round_number, round.votes.len(), carried.len())?;

        let round = &mut self.rounds[idx];
        for bid in &carried {
            let vote = Vote {
                member_id: bid.member_id,
                amount: bid.amount,
            };
            round.votes.insert(vote.member_id, vote);
            self.changes.push(LedgerChange::VoteCast {
                round_id: round.id,
                vote,
                source: VoteSource::CarriedForward {
                    bid_round: bid.bid_round,
                },
            });
        }
        round.bids_applied = true;
        self.changes
            .push(LedgerChange::BidsApplied { round_id: round.id });

        self.close_if_complete(idx);
        Ok(carried.len())
    }

    /// Records a live vote and closes the round when it becomes complete.
    ///
    /// # Errors
    ///
    /// Returns `VotingError::RoundComplete` or `VotingError::RoundInactive` if
    /// the round takes no more votes, a validation error for a bad amount, and
    /// `VotingError::DuplicateVote` if the member already voted.
    pub fn record_vote(
        &mut self,
        round_number: u32,
        member_id: MemberId,
        amount: Decimal,
    ) -> Result<VoteReceipt, VotingError> {
        let idx = self
            .round_index(round_number)
            .ok_or(VotingError::RoundNotFound(round_number))?;
        let round = &self.rounds[idx];
        if self.is_complete(round) {
            return Err(VotingError::RoundComplete(round_number));
        }
        if !round.active {
            return Err(VotingError::RoundInactive(round_number));
        }
        validate_member(member_id)?;
        validate_amount(amount)?;
        if round.votes.contains_key(&member_id) {
            return Err(VotingError::DuplicateVote {
                member_id,
                round_number,
            });
        }

        let vote = Vote { member_id, amount };
        let round = &mut self.rounds[idx];
        round.votes.insert(member_id, vote);
        self.changes.push(LedgerChange::VoteCast {
            round_id: round.id,
            vote,
            source: VoteSource::Live,
        });

        let round_complete = self.close_if_complete(idx);
        Ok(VoteReceipt {
            round_number,
            vote,
            round_complete,
        })
    }

    /// Adds a single bid without changing the voter count.
    ///
    /// # Errors
    ///
    /// Returns a validation error for round 0 or a bad amount, and
    /// `VotingError::DuplicateBid` if the member already bid for that round.
    pub fn add_bid(&mut self, bid: Bid) -> Result<(), VotingError> {
        if bid.round_number < 1 {
            return Err(VotingError::InvalidRoundNumber);
        }
        validate_member(bid.member_id)?;
        validate_amount(bid.amount)?;
        if self.bids.contains_key(&(bid.member_id, bid.round_number)) {
            return Err(VotingError::DuplicateBid {
                member_id: bid.member_id,
                round_number: bid.round_number,
            });
        }

        self.bids.insert((bid.member_id, bid.round_number), bid.amount);
        self.changes.push(LedgerChange::BidPlaced(bid));
        Ok(())
    }

    /// Imports a delimited bid sheet.
    ///
    /// Every non-empty cell becomes a bid for the round of its column. Each
    /// member with a round-1 bid in the sheet raises the voter count by one,
    /// since that member is represented by their bid rather than by a live
    /// vote. Members bidding only for later rounds get no round-1 vote. Nothing
    /// is changed unless the whole sheet is valid.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unreadable rows or a resulting voter
    /// count above the total count, and
    /// `VotingError::DuplicateBid` if a member/round combination repeats.
    pub fn import_bids(&mut self, text: &str) -> Result<ImportSummary, VotingError> {
        let rows = parse_bid_rows(text)?;

        let mut staged: BTreeMap<(MemberId, u32), Decimal> = BTreeMap::new();
        let mut members = BTreeSet::new();
        let mut first_round_bidders = BTreeSet::new();

        for row in &rows {
            if row.amounts.is_empty() {
                continue;
            }
            validate_member(row.member_id)?;
            for &(round_number, amount) in &row.amounts {
                let key = (row.member_id, round_number);
                if self.bids.contains_key(&key) || staged.contains_key(&key) {
                    return Err(VotingError::DuplicateBid {
                        member_id: row.member_id,
                        round_number,
                    });
                }
                staged.insert(key, amount);
                if round_number == 1 {
                    first_round_bidders.insert(row.member_id);
                }
            }
            members.insert(row.member_id);
        }

        let added = u32::try_from(first_round_bidders.len()).unwrap_or(u32::MAX);
        let voter_count = self.voting.voter_count.saturating_add(added);
        validate_voting(
            &self.voting.name,
            self.voting.budget_goal,
            voter_count,
            self.voting.total_count,
        )?;

        for (&(member_id, round_number), &amount) in &staged {
            self.bids.insert((member_id, round_number), amount);
            self.changes.push(LedgerChange::BidPlaced(Bid {
                member_id,
                round_number,
                amount,
            }));
        }
        if added > 0 {
            self.voting.voter_count = voter_count;
            self.changes
                .push(LedgerChange::VoterCountChanged { voter_count });
        }

        Ok(ImportSummary {
            bids_imported: staged.len(),
            members: members.len(),
            voter_count_added: added,
        })
    }

    fn round_index(&self, round_number: u32) -> Option<usize> {
        let idx = usize::try_from(round_number.checked_sub(1)?).ok()?;
        (idx < self.rounds.len()).then_some(idx)
    }

    fn carried_bids(&self, round_number: u32) -> Vec<CarriedBid> {
        let bids: Vec<Bid> = self.bids().collect();
        carry_forward(&bids, round_number)
    }

    fn check_vote_capacity(
        &self,
        round_number: u32,
        existing: usize,
        carried: usize,
    ) -> Result<(), VotingError> {
        let votes = u32::try_from(existing + carried).unwrap_or(u32::MAX);
        if votes > self.voting.voter_count {
            return Err(VotingError::TooManyVotes {
                round_number,
                votes,
                voter_count: self.voting.voter_count,
            });
        }
        Ok(())
    }

    /// Deactivates the round at `idx` if it is active and complete.
    fn close_if_complete(&mut self, idx: usize) -> bool {
        let voter_count = self.voting.voter_count;
        let round = &mut self.rounds[idx];
        let complete = round.vote_count() == voter_count;
        if complete && round.active {
            round.active = false;
            if self.active == Some(idx) {
                self.active = None;
            }
            self.changes
                .push(LedgerChange::RoundClosed { round_id: round.id });
        }
        complete
    }
}

fn validate_member(member_id: MemberId) -> Result<(), VotingError> {
    if member_id.into_inner() < 0 {
        return Err(VotingError::NegativeMemberId(member_id));
    }
    Ok(())
}
