//! Initial schema: votings, bids, rounds and votes.
//!
//! Uniqueness of bids, votes and round numbers as well as the single active
//! round per voting are enforced by constraints.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SCHEMA_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS votes, rounds, bids, votings CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r"
CREATE TABLE votings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    owner_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    budget_goal NUMERIC(10, 2) NOT NULL,
    voter_count INTEGER NOT NULL,
    total_count INTEGER NOT NULL,
    -- The round of this voting with active = true, if any
    active_round_id UUID,
    CONSTRAINT chk_votings_name CHECK (length(btrim(name)) > 0),
    CONSTRAINT chk_votings_budget_goal CHECK (budget_goal > 0),
    CONSTRAINT chk_votings_voter_count CHECK (voter_count >= 1),
    CONSTRAINT chk_votings_total_count CHECK (voter_count <= total_count)
);

CREATE INDEX idx_votings_owner ON votings(owner_id, created_at DESC);

-- Expiry sweep
CREATE INDEX idx_votings_created ON votings(created_at);

CREATE TABLE bids (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    voting_id UUID NOT NULL REFERENCES votings(id) ON DELETE CASCADE,
    member_id BIGINT NOT NULL,
    round_number INTEGER NOT NULL,
    amount NUMERIC(10, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_bids_member_id CHECK (member_id >= 0),
    CONSTRAINT chk_bids_round_number CHECK (round_number >= 1),
    CONSTRAINT chk_bids_amount CHECK (amount >= 0),
    CONSTRAINT uq_bids_voting_member_round UNIQUE (voting_id, member_id, round_number)
);

CREATE TABLE rounds (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    voting_id UUID NOT NULL REFERENCES votings(id) ON DELETE CASCADE,
    round_number INTEGER NOT NULL,
    active BOOLEAN NOT NULL DEFAULT true,
    bids_applied BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rounds_round_number CHECK (round_number >= 1),
    CONSTRAINT uq_rounds_voting_number UNIQUE (voting_id, round_number)
);

-- At most one active round per voting
CREATE UNIQUE INDEX uq_rounds_one_active ON rounds(voting_id) WHERE active;

CREATE TABLE votes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    round_id UUID NOT NULL REFERENCES rounds(id) ON DELETE CASCADE,
    member_id BIGINT NOT NULL,
    amount NUMERIC(10, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_votes_member_id CHECK (member_id >= 0),
    CONSTRAINT chk_votes_amount CHECK (amount >= 0),
    CONSTRAINT uq_votes_round_member UNIQUE (round_id, member_id)
);
";
