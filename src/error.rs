//! Error type shared by the table loader, the scoring tables and the aggregator.

use std::fmt;
use thiserror::Error;

/// Which filter failed to match any measurement rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    City,
    State,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::City => f.write_str("City"),
            Scope::State => f.write_str("State"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AqiError {
    #[error("{0} not found")]
    NotFound(Scope),
    #[error("invalid scoring configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AqiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AqiError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, AqiError>;
