//! Statement segments with optional organization categories.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PolicyError;

/// The universal wildcard.
pub const ALL: &str = "*";

const CATEGORY_SEPARATOR: char = ':';

/// One addressable part of a statement, e.g. `users` or `organizations:org1`.
///
/// The category (an organization id) follows the value after a single `:`.
/// Text after the first `:` is kept verbatim, so rendering a parsed segment
/// always reproduces its input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct Segment {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl Segment {
    /// Construct from its parts. An empty category is treated as absent.
    pub fn new(value: impl Into<String>, category: Option<String>) -> Self {
        Segment {
            value: value.into(),
            category: category.filter(|c| !c.is_empty()),
        }
    }

    /// The wildcard segment.
    pub fn all() -> Self {
        Segment::new(ALL, None)
    }

    /// Parse `value` or `value:category`.
    pub fn parse(text: &str) -> Result<Self, PolicyError> {
        let (value, category) = match text.split_once(CATEGORY_SEPARATOR) {
            Some((value, category)) => (value, Some(category.to_string())),
            None => (text, None),
        };

        if value.is_empty() {
            return Err(PolicyError::EmptyValue(text.to_string()));
        }

        Ok(Segment {
            value: value.to_string(),
            category,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The organization category, if one is present and non-empty.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn is_all(&self) -> bool {
        self.value == ALL
    }

    pub fn has_category(&self) -> bool {
        self.category().is_some()
    }

    /// Same value and same (normalized) category.
    pub fn same_scope(&self, other: &Segment) -> bool {
        self.value == other.value && self.category() == other.category()
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.category {
            Some(category) => write!(f, "{}{CATEGORY_SEPARATOR}{category}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

impl FromStr for Segment {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Segment::parse(s)
    }
}
