//! Point-evaluation decisions with the deciding statement.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::statement_kind::StatementKind;

/// Allow or deny, naming the statement that decided.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum Decision {
    Allow {
        statement: String,
        level: StatementKind,
    },
    /// `statement` is `None` when nothing matched (implicit deny).
    Deny {
        statement: Option<String>,
        level: Option<StatementKind>,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    pub(crate) fn implicit_deny() -> Self {
        Decision::Deny {
            statement: None,
            level: None,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Decision::Allow { statement, level } => write!(f, "Allow({level}; {statement})"),
            Decision::Deny {
                statement: Some(statement),
                level: Some(level),
            } => write!(f, "Deny({level}; {statement})"),
            Decision::Deny { .. } => write!(f, "Deny"),
        }
    }
}
