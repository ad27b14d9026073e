//! Membership numbers.
//!
//! Members are identified by the public number printed on their membership
//! record, not by a database key.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a membership number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberIdError {
    /// The input was empty.
    #[error("Member ID is empty")]
    Empty,
    /// The input contained something other than ASCII digits.
    #[error("Member ID must consist of digits only: {0:?}")]
    NotNumeric(String),
    /// The number does not fit the storage type.
    #[error("Member ID is too large: {0}")]
    TooLarge(String),
}

/// A member's public membership number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl MemberId {
    /// Creates a member ID from a raw number.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw number.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MemberId {
    type Err = MemberIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(MemberIdError::Empty);
        }
        // Signs, spaces and decimal points are rejected; header cells such as
        // "id" or "Mitglied" fail here as well.
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MemberIdError::NotNumeric(s.to_string()));
        }
        s.parse::<i64>()
            .map(Self)
            .map_err(|_| MemberIdError::TooLarge(s.to_string()))
    }
}

impl From<i64> for MemberId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
