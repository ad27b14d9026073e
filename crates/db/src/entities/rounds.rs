//! `SeaORM` Entity for rounds table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rounds")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voting_id: Uuid,
    pub round_number: i32,
    pub active: bool,
    pub bids_applied: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::votings::Entity",
        from = "Column::VotingId",
        to = "super::votings::Column::Id",
        on_delete = "Cascade"
    )]
    Votings,
    #[sea_orm(has_many = "super::votes::Entity")]
    Votes,
}

impl Related<super::votings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votings.def()
    }
}

impl Related<super::votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
