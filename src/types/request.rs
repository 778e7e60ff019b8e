//! Point-evaluation request type.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// "May `subject_id` perform `action` on `resource` (optionally `object_id`)?"
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct AccessRequest {
    pub subject_id: String,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

impl AccessRequest {
    pub fn new(
        subject_id: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        AccessRequest {
            subject_id: subject_id.into(),
            resource: resource.into(),
            organization: None,
            action: action.into(),
            object_id: None,
        }
    }

    /// Scope the request to an organization's resources.
    pub fn in_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Target a single object of the resource.
    pub fn on_object(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }
}

impl Display for AccessRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.subject_id, self.resource)?;
        if let Some(organization) = &self.organization {
            write!(f, ":{organization}")?;
        }
        write!(f, ".{}.{}", self.action, self.object_id.as_deref().unwrap_or("*"))
    }
}
