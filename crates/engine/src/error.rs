//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`EmptyParticipants`] thrown when an expense is shared by nobody.
//! - [`InvalidAmount`] thrown when an amount is negative, not finite or not
//!   parsable.
//! - [`InvalidSnapshot`] thrown when a snapshot decodes but is inconsistent.
//! - [`InvalidRecord`] thrown when a CSV row cannot become an expense.
//!
//!  [`EmptyParticipants`]: EngineError::EmptyParticipants
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidSnapshot`]: EngineError::InvalidSnapshot
//!  [`InvalidRecord`]: EngineError::InvalidRecord
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("An expense needs at least one participant")]
    EmptyParticipants,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::EmptyParticipants, Self::EmptyParticipants) => true,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidSnapshot(a), Self::InvalidSnapshot(b)) => a == b,
            (
                Self::InvalidRecord { line: la, reason: ra },
                Self::InvalidRecord { line: lb, reason: rb },
            ) => la == lb && ra == rb,
            (Self::Csv(a), Self::Csv(b)) => a.to_string() == b.to_string(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
