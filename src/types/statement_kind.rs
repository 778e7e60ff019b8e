//! Statement kinds and their segment layouts.
//!
//! Centralizes the per-kind constants so the parser, the builders and the
//! merge-back code agree on how many segments a statement may carry.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// The two statement flavours handled by the engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatementKind {
    /// RBAC statement attached to a role: `subject.resource.action.object`
    Role,
    /// UBAC statement attached directly to a user or application: `resource.action.object`
    Subject,
}

impl StatementKind {
    /// Largest number of dot-separated segments accepted for this kind.
    pub fn max_segments(&self) -> usize {
        match self {
            Self::Role => 4,
            Self::Subject => 3,
        }
    }
}
