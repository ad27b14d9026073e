//! Core business logic for Bieterrunde.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `voting` - Votings, rounds, carry-forward of bids and budget results
//! - `import` - Parsing of delimited bid sheets
//! - `export` - Vote export and membership contribution planning

pub mod export;
pub mod import;
pub mod voting;
