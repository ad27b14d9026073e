//! Shared types, errors, and configuration for Bieterrunde.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for votings, rounds and owners
//! - Membership numbers (`MemberId`)
//! - Amount parsing and formatting with decimal precision
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
