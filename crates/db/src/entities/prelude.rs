//! Entity re-exports.

pub use super::bids::Entity as Bids;
pub use super::rounds::Entity as Rounds;
pub use super::votes::Entity as Votes;
pub use super::votings::Entity as Votings;
