//! `SeaORM` entities.

pub mod prelude;

pub mod bids;
pub mod rounds;
pub mod votes;
pub mod votings;
