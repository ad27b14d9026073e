//! Common types used across the application.

pub mod id;
pub mod member;
pub mod money;

pub use id::*;
pub use member::{MemberId, MemberIdError};
pub use money::{AmountError, format_amount, parse_amount, validate_amount};
