//! Export of completed rounds.
//!
//! - [`export_round`]: the final round's votes as a CSV sheet.
//! - [`plan_contributions`]: contribution amounts for a membership directory.

mod contribution;
mod error;
mod sheet;

pub use contribution::{
    Contribution, ContributionPlan, DirectoryMember, NoBidGroup, plan_contributions,
};
pub use error::ExportError;
pub use sheet::{RoundExport, export_round, slugify};
