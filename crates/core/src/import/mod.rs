//! Bid sheet import.
//!
//! A bid sheet is delimited text with one member per row: the membership
//! number first, followed by one amount column per round.

mod parser;

pub use parser::{BidRow, ImportError, detect_delimiter, parse_bid_rows};
