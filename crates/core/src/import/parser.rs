//! Bid sheet parser.

use bieterrunde_shared::types::{AmountError, MemberId, parse_amount};
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while reading a bid sheet.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The text is not readable as delimited rows.
    #[error("line {line}: {message}")]
    Malformed {
        /// Line of the offending row.
        line: u64,
        /// Reader message.
        message: String,
    },

    /// An amount cell is not a valid amount.
    #[error("line {line}, column {column}: {source}")]
    InvalidAmount {
        /// Line of the offending row.
        line: u64,
        /// 1-based column of the cell.
        column: usize,
        /// Why the amount was rejected.
        #[source]
        source: AmountError,
    },
}

/// One member row of a bid sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidRow {
    /// Line the row starts on.
    pub line: u64,
    /// Member in the first column.
    pub member_id: MemberId,
    /// `(round_number, amount)` for every non-empty amount cell.
    pub amounts: Vec<(u32, Decimal)>,
}

/// Picks `;` if the first non-blank line contains one, `,` otherwise.
#[must_use]
pub fn detect_delimiter(text: &str) -> u8 {
    let first = text.lines().find(|line| !line.trim().is_empty());
    match first {
        Some(line) if line.contains(';') => b';',
        _ => b',',
    }
}

/// Parses a bid sheet into member rows.
///
/// Rows whose first cell is not a membership number (headers, comments,
/// blank rows) are skipped. Empty amount cells are skipped too; the column
/// position still decides the round.
///
/// # Errors
///
/// Returns `ImportError::InvalidAmount` for the first unparsable amount cell
/// and `ImportError::Malformed` if the reader fails.
pub fn parse_bid_rows(text: &str) -> Result<Vec<BidRow>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(detect_delimiter(text))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| ImportError::Malformed {
            line: err.position().map_or(0, csv::Position::line),
            message: err.to_string(),
        })?;
        let line = record.position().map_or(0, csv::Position::line);

        let Some(member_id) = record.get(0).and_then(|cell| cell.parse::<MemberId>().ok())
        else {
            continue;
        };

        let mut amounts = Vec::new();
        for (idx, cell) in record.iter().enumerate().skip(1) {
            if cell.is_empty() {
                continue;
            }
            let amount = parse_amount(cell).map_err(|source| ImportError::InvalidAmount {
                line,
                column: idx + 1,
                source,
            })?;
            let round_number = u32::try_from(idx).map_err(|_| ImportError::Malformed {
                line,
                message: format!("too many columns ({})", record.len()),
            })?;
            amounts.push((round_number, amount));
        }

        rows.push(BidRow {
            line,
            member_id,
            amounts,
        });
    }
    Ok(rows)
}
