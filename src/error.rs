use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::StatementKind;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PolicyError {
    #[error("empty segment value in '{0}'")]
    EmptyValue(String),

    #[error("statement definition is empty")]
    EmptyDefinition,

    #[error("invalid segment count {count} for {kind} statement '{definition}'")]
    InvalidSegmentCount {
        count: usize,
        kind: StatementKind,
        definition: String,
    },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        PolicyError::InvalidFormat(err.to_string())
    }
}
