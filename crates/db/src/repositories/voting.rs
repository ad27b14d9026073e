//! Voting repository for database operations.
//!
//! Every mutating operation is one unit of work: begin a transaction, lock the
//! voting row, load the ledger, run the core operation, write the recorded
//! changes in order and commit. Any error drops the transaction, which rolls
//! it back.

use std::collections::HashMap;

use bieterrunde_core::voting::{
    Bid, CreateVotingInput, ImportSummary, LedgerChange, Round, Vote, VoteReceipt, VoteSource,
    Voting, VotingError, VotingLedger, validate_voting,
};
use bieterrunde_shared::AppError;
use bieterrunde_shared::types::{MemberId, OwnerId, RoundId, VotingId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{bids, rounds, votes, votings};

/// Error types for voting repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Voting not found.
    #[error("Voting not found: {0}")]
    VotingNotFound(VotingId),

    /// The ledger rejected the operation.
    #[error(transparent)]
    Voting(#[from] VotingError),

    /// A unique constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored number does not fit the domain type.
    #[error("Stored {field} is out of range: {value}")]
    OutOfRange {
        /// Column name.
        field: &'static str,
        /// Offending value.
        value: i64,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::Conflict(message),
            _ => Self::Database(err),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        let message = err.to_string();
        match err {
            RepositoryError::VotingNotFound(_) => Self::NotFound(message),
            RepositoryError::Voting(e) => e.into(),
            RepositoryError::Conflict(_) => Self::Conflict(message),
            RepositoryError::OutOfRange { .. } => Self::Internal(message),
            RepositoryError::Database(_) => Self::Database(message),
        }
    }
}

/// Voting repository.
#[derive(Debug, Clone)]
pub struct VotingRepository {
    db: DatabaseConnection,
}

impl VotingRepository {
    /// Creates a new voting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a voting.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid input, or a database error.
    pub async fn create(&self, input: CreateVotingInput) -> Result<Voting, RepositoryError> {
        validate_voting(
            &input.name,
            input.budget_goal,
            input.voter_count,
            input.total_count,
        )?;

        let model = votings::ActiveModel {
            id: Set(VotingId::new().into_inner()),
            created_at: Set(Utc::now().into()),
            owner_id: Set(input.owner_id.into_inner()),
            name: Set(input.name.trim().to_string()),
            budget_goal: Set(input.budget_goal),
            voter_count: Set(to_i32("voter_count", input.voter_count)?),
            total_count: Set(to_i32("total_count", input.total_count)?),
            active_round_id: Set(None),
        }
        .insert(&self.db)
        .await?;

        let voting = voting_from_model(model)?;
        info!(voting_id = %voting.id, owner_id = %voting.owner_id, "Voting created");
        Ok(voting)
    }

    /// Gets a voting by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VotingNotFound` for an unknown ID.
    pub async fn get(&self, id: VotingId) -> Result<Voting, RepositoryError> {
        let model = votings::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::VotingNotFound(id))?;
        voting_from_model(model)
    }

    /// Lists an owner's votings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Voting>, RepositoryError> {
        votings::Entity::find()
            .filter(votings::Column::OwnerId.eq(owner_id.into_inner()))
            .order_by_desc(votings::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(voting_from_model)
            .collect()
    }

    /// Loads a voting with its bids and rounds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VotingNotFound` for an unknown ID.
    pub async fn ledger(&self, id: VotingId) -> Result<VotingLedger, RepositoryError> {
        load_ledger(&self.db, id, false).await
    }

    /// Lists a voting's bids, ordered by member and round.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VotingNotFound` for an unknown ID.
    pub async fn bids(&self, id: VotingId) -> Result<Vec<Bid>, RepositoryError> {
        Ok(self.ledger(id).await?.bids().collect())
    }

    /// Gets a round by number.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown voting or round.
    pub async fn round(&self, id: VotingId, round_number: u32) -> Result<Round, RepositoryError> {
        let ledger = self.ledger(id).await?;
        ledger
            .round(round_number)
            .cloned()
            .ok_or(RepositoryError::Voting(VotingError::RoundNotFound(round_number)))
    }

    /// Gets the active round, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VotingNotFound` for an unknown ID.
    pub async fn active_round(&self, id: VotingId) -> Result<Option<Round>, RepositoryError> {
        Ok(self.ledger(id).await?.active_round().cloned())
    }

    /// Opens the next round and applies carried-forward bids.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error if the active round is incomplete.
    pub async fn new_round(&self, id: VotingId) -> Result<Round, RepositoryError> {
        self.in_unit_of_work(id, |ledger| ledger.new_round().cloned())
            .await
    }

    /// Opens the next round and returns its number with the ledger as
    /// committed by the same unit of work.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error if the active round is incomplete.
    pub async fn open_round(&self, id: VotingId) -> Result<(u32, VotingLedger), RepositoryError> {
        self.run_unit_of_work(id, |ledger| {
            ledger.new_round().map(Round::round_number)
        })
        .await
    }

    /// Applies carried-forward bids to a round that has none applied yet.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error if the bids were already applied.
    pub async fn apply_bids(
        &self,
        id: VotingId,
        round_number: u32,
    ) -> Result<usize, RepositoryError> {
        self.in_unit_of_work(id, |ledger| ledger.apply_bids(round_number))
            .await
    }

    /// Records a live vote.
    ///
    /// # Errors
    ///
    /// Returns a state error for a complete or inactive round and a conflict
    /// if the member already voted.
    pub async fn record_vote(
        &self,
        id: VotingId,
        round_number: u32,
        member_id: MemberId,
        amount: Decimal,
    ) -> Result<VoteReceipt, RepositoryError> {
        self.in_unit_of_work(id, |ledger| {
            ledger.record_vote(round_number, member_id, amount)
        })
        .await
    }

    /// Imports a bid sheet atomically.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad rows and a conflict for repeated
    /// member/round combinations. Nothing is stored on error.
    pub async fn import_bids(
        &self,
        id: VotingId,
        text: &str,
    ) -> Result<ImportSummary, RepositoryError> {
        let summary = self
            .in_unit_of_work(id, |ledger| ledger.import_bids(text))
            .await?;
        info!(
            voting_id = %id,
            bids = summary.bids_imported,
            members = summary.members,
            voter_count_added = summary.voter_count_added,
            "Bids imported"
        );
        Ok(summary)
    }

    /// Places a single bid without changing the voter count.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the member already bid for that round.
    pub async fn add_bid(&self, id: VotingId, bid: Bid) -> Result<(), RepositoryError> {
        self.in_unit_of_work(id, |ledger| ledger.add_bid(bid)).await
    }

    /// Deletes votings created at or before `cutoff`, with all their data.
    ///
    /// Returns the number of deleted votings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn expire_votings(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = votings::Entity::delete_many()
            .filter(votings::Column::CreatedAt.lte(cutoff))
            .exec(&self.db)
            .await?;
        info!(cutoff = %cutoff, deleted = result.rows_affected, "Expired votings removed");
        Ok(result.rows_affected)
    }

    async fn in_unit_of_work<T, F>(&self, id: VotingId, op: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut VotingLedger) -> Result<T, VotingError> + Send,
        T: Send,
    {
        self.run_unit_of_work(id, op).await.map(|(output, _)| output)
    }

    /// Locks the voting, applies `op` and commits its changes, returning the
    /// updated ledger alongside the output.
    async fn run_unit_of_work<T, F>(
        &self,
        id: VotingId,
        op: F,
    ) -> Result<(T, VotingLedger), RepositoryError>
    where
        F: FnOnce(&mut VotingLedger) -> Result<T, VotingError> + Send,
        T: Send,
    {
        let txn = self.db.begin().await?;
        let mut ledger = load_ledger(&txn, id, true).await?;

        let output = op(&mut ledger)?;
        persist_changes(&txn, id, ledger.take_changes()).await?;

        txn.commit().await?;
        Ok((output, ledger))
    }
}

async fn load_ledger<C: ConnectionTrait>(
    conn: &C,
    id: VotingId,
    lock: bool,
) -> Result<VotingLedger, RepositoryError> {
    let mut query = votings::Entity::find_by_id(id.into_inner());
    if lock {
        query = query.lock_exclusive();
    }
    let model = query
        .one(conn)
        .await?
        .ok_or(RepositoryError::VotingNotFound(id))?;
    let voting = voting_from_model(model)?;

    let bids = bids::Entity::find()
        .filter(bids::Column::VotingId.eq(id.into_inner()))
        .all(conn)
        .await?
        .into_iter()
        .map(|bid| {
            Ok(Bid {
                member_id: MemberId(bid.member_id),
                round_number: to_u32("round_number", bid.round_number)?,
                amount: bid.amount,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

    let round_models = rounds::Entity::find()
        .filter(rounds::Column::VotingId.eq(id.into_inner()))
        .order_by_asc(rounds::Column::RoundNumber)
        .all(conn)
        .await?;

    let mut votes_by_round: HashMap<Uuid, Vec<Vote>> = HashMap::new();
    if !round_models.is_empty() {
        let round_ids: Vec<Uuid> = round_models.iter().map(|r| r.id).collect();
        let vote_models = votes::Entity::find()
            .filter(votes::Column::RoundId.is_in(round_ids))
            .all(conn)
            .await?;
        for vote in vote_models {
            votes_by_round.entry(vote.round_id).or_default().push(Vote {
                member_id: MemberId(vote.member_id),
                amount: vote.amount,
            });
        }
    }

    let rounds = round_models
        .into_iter()
        .map(|round| {
            Ok(Round::restore(
                RoundId::from(round.id),
                to_u32("round_number", round.round_number)?,
                round.active,
                round.bids_applied,
                votes_by_round.remove(&round.id).unwrap_or_default(),
            ))
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

    Ok(VotingLedger::restore(voting, bids, rounds)?)
}

async fn persist_changes(
    txn: &DatabaseTransaction,
    voting_id: VotingId,
    changes: Vec<LedgerChange>,
) -> Result<(), RepositoryError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let vid = voting_id.into_inner();

    for change in changes {
        match change {
            LedgerChange::BidPlaced(bid) => {
                bids::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    voting_id: Set(vid),
                    member_id: Set(bid.member_id.into_inner()),
                    round_number: Set(to_i32("round_number", bid.round_number)?),
                    amount: Set(bid.amount),
                    created_at: Set(now),
                }
                .insert(txn)
                .await?;
            }
            LedgerChange::VoterCountChanged { voter_count } => {
                votings::Entity::update_many()
                    .col_expr(
                        votings::Column::VoterCount,
                        Expr::value(to_i32("voter_count", voter_count)?),
                    )
                    .filter(votings::Column::Id.eq(vid))
                    .exec(txn)
                    .await?;
                info!(voting_id = %voting_id, voter_count, "Voter count updated");
            }
            LedgerChange::RoundOpened {
                round_id,
                round_number,
            } => {
                rounds::ActiveModel {
                    id: Set(round_id.into_inner()),
                    voting_id: Set(vid),
                    round_number: Set(to_i32("round_number", round_number)?),
                    active: Set(true),
                    bids_applied: Set(false),
                    created_at: Set(now),
                }
                .insert(txn)
                .await?;
                set_active_round(txn, vid, Some(round_id.into_inner())).await?;
                info!(voting_id = %voting_id, round = round_number, "Round opened");
            }
            LedgerChange::VoteCast {
                round_id,
                vote,
                source,
            } => {
                votes::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    round_id: Set(round_id.into_inner()),
                    member_id: Set(vote.member_id.into_inner()),
                    amount: Set(vote.amount),
                    created_at: Set(now),
                }
                .insert(txn)
                .await?;
                match source {
                    VoteSource::Live => {
                        info!(voting_id = %voting_id, round_id = %round_id, member_id = %vote.member_id, "Vote recorded");
                    }
                    VoteSource::CarriedForward { bid_round } => {
                        debug!(voting_id = %voting_id, round_id = %round_id, member_id = %vote.member_id, bid_round, "Bid carried forward");
                    }
                }
            }
            LedgerChange::BidsApplied { round_id } => {
                rounds::Entity::update_many()
                    .col_expr(rounds::Column::BidsApplied, Expr::value(true))
                    .filter(rounds::Column::Id.eq(round_id.into_inner()))
                    .exec(txn)
                    .await?;
            }
            LedgerChange::RoundClosed { round_id } => {
                rounds::Entity::update_many()
                    .col_expr(rounds::Column::Active, Expr::value(false))
                    .filter(rounds::Column::Id.eq(round_id.into_inner()))
                    .exec(txn)
                    .await?;
                votings::Entity::update_many()
                    .col_expr(votings::Column::ActiveRoundId, Expr::value(Option::<Uuid>::None))
                    .filter(votings::Column::Id.eq(vid))
                    .filter(votings::Column::ActiveRoundId.eq(round_id.into_inner()))
                    .exec(txn)
                    .await?;
                info!(voting_id = %voting_id, round_id = %round_id, "Round closed");
            }
        }
    }
    Ok(())
}

async fn set_active_round(
    txn: &DatabaseTransaction,
    voting_id: Uuid,
    round_id: Option<Uuid>,
) -> Result<(), DbErr> {
    votings::Entity::update_many()
        .col_expr(votings::Column::ActiveRoundId, Expr::value(round_id))
        .filter(votings::Column::Id.eq(voting_id))
        .exec(txn)
        .await?;
    Ok(())
}

fn voting_from_model(model: votings::Model) -> Result<Voting, RepositoryError> {
    Ok(Voting {
        id: VotingId::from(model.id),
        created_at: model.created_at.with_timezone(&Utc),
        owner_id: OwnerId::from(model.owner_id),
        name: model.name,
        budget_goal: model.budget_goal,
        voter_count: to_u32("voter_count", model.voter_count)?,
        total_count: to_u32("total_count", model.total_count)?,
    })
}

fn to_u32(field: &'static str, value: i32) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| RepositoryError::OutOfRange {
        field,
        value: i64::from(value),
    })
}

fn to_i32(field: &'static str, value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value).map_err(|_| RepositoryError::OutOfRange {
        field,
        value: i64::from(value),
    })
}
