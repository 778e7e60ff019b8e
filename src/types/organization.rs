//! Organization summaries and the buckets statements are grouped into.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::traits::OrganizationAuthorizer;

/// Key of the bucket holding the authentication system's own resources.
pub const UNCATEGORIZED: &str = "uncategorized";

/// An organization as seen by the role being edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct OrganizationSummary {
    pub id: String,
    /// Whether the acting role may see and operate this organization's resources.
    pub is_authorized_for_current_role: bool,
}

impl OrganizationSummary {
    pub fn new(id: impl Into<String>, is_authorized_for_current_role: bool) -> Self {
        OrganizationSummary {
            id: id.into(),
            is_authorized_for_current_role,
        }
    }

    /// Build summaries for `organization_ids`, asking `authorizer` about each one.
    pub fn resolve_all<I, S, A>(role_id: &str, organization_ids: I, authorizer: &A) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        A: OrganizationAuthorizer + ?Sized,
    {
        organization_ids
            .into_iter()
            .map(|id| {
                let id = id.as_ref();
                OrganizationSummary::new(id, authorizer.is_authorized(role_id, id))
            })
            .collect()
    }
}

/// Where a statement lands when grouped by organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationBucket {
    /// Resources of the authentication system itself, not of any organization.
    Uncategorized,
    Organization(String),
}

impl OrganizationBucket {
    /// Bucket for an optional resource category.
    pub fn for_category(category: Option<&str>) -> Self {
        match category {
            Some(id) => OrganizationBucket::Organization(id.to_string()),
            None => OrganizationBucket::Uncategorized,
        }
    }

    pub fn organization_id(&self) -> Option<&str> {
        match self {
            OrganizationBucket::Uncategorized => None,
            OrganizationBucket::Organization(id) => Some(id),
        }
    }
}

impl Display for OrganizationBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OrganizationBucket::Uncategorized => write!(f, "{UNCATEGORIZED}"),
            OrganizationBucket::Organization(id) => write!(f, "{id}"),
        }
    }
}
