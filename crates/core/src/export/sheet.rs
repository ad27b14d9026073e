//! CSV export of the final round.

use bieterrunde_shared::types::format_amount;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::error::ExportError;
use crate::voting::VotingLedger;

/// A rendered export sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundExport {
    /// Exported round.
    pub round_number: u32,
    /// Suggested download name.
    pub file_name: String,
    /// CSV text with a `member_id,amount` header.
    pub content: String,
}

/// Exports the votes of the voting's last round.
///
/// The round must be complete and must have reached the budget goal.
///
/// # Errors
///
/// Returns `ExportError::NoRounds`, `ExportError::RoundIncomplete` or
/// `ExportError::GoalNotReached` if there is nothing final to export.
pub fn export_round(ledger: &VotingLedger, now: DateTime<Utc>) -> Result<RoundExport, ExportError> {
    let round = ledger.rounds().last().ok_or(ExportError::NoRounds)?;
    if !ledger.is_complete(round) {
        return Err(ExportError::RoundIncomplete(round.round_number()));
    }

    let voting = ledger.voting();
    let result = ledger
        .budget_result(round.round_number())
        .map_err(|_| ExportError::RoundNotFound(round.round_number()))?;
    if !result.success {
        return Err(ExportError::GoalNotReached {
            result: result.result,
            budget_goal: voting.budget_goal,
        });
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(["member_id", "amount"])
        .map_err(|e| ExportError::Write(e.to_string()))?;
    for vote in round.votes() {
        writer
            .write_record([vote.member_id.to_string(), format_amount(vote.amount)])
            .map_err(|e| ExportError::Write(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Write(e.to_string()))?;
    let content = String::from_utf8(bytes).map_err(|e| ExportError::Write(e.to_string()))?;

    Ok(RoundExport {
        round_number: round.round_number(),
        file_name: format!(
            "bieterrunde-export-{}-{}.csv",
            slugify(&voting.name),
            now.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        content,
    })
}

/// Reduces a name to lowercase ASCII words joined by hyphens.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        let mapped = match ch {
            'à' | 'á' | 'â' | 'ä' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            c => c,
        };
        if mapped.is_ascii_alphanumeric() || mapped == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(mapped);
        } else if mapped.is_whitespace() || mapped == '-' {
            pending_dash = true;
        }
    }
    slug
}
