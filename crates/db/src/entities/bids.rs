//! `SeaORM` Entity for bids table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voting_id: Uuid,
    pub member_id: i64,
    pub round_number: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
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
}

impl Related<super::votings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
