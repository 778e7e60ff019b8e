//! The resource/action matrix handed to the UI.
//!
//! These are derived, disposable views: the engine rebuilds them from
//! statements on every change and nothing else mutates them.

use serde::Serialize;
use utoipa::ToSchema;

use super::organization::{OrganizationBucket, OrganizationSummary};
use super::role::StatementLists;
use super::statement::Statement;

/// One checkbox of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ActionModel {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// What the UI shows as checked.
    pub effective_value: Option<bool>,
    /// Value attributable to the role alone.
    pub role_value: Option<bool>,
    /// Value attributable to the subject's own statements, absent if it has none.
    pub subject_value: Option<bool>,
    /// Not part of the default action list of the resource.
    pub is_custom: bool,
}

impl ActionModel {
    pub(crate) fn seeded(slug: impl Into<String>, is_custom: bool) -> Self {
        ActionModel {
            slug: slug.into(),
            label: None,
            effective_value: None,
            role_value: Some(false),
            subject_value: None,
            is_custom,
        }
    }

    /// Effective value with absence read as deny.
    pub fn is_effective(&self) -> bool {
        self.effective_value.unwrap_or(false)
    }

    pub(crate) fn resolve(&mut self) {
        self.effective_value = Some(self.subject_value.or(self.role_value).unwrap_or(false));
    }
}

/// Exceptional statements of a resource, kept verbatim outside the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExceptionalCases {
    #[schema(value_type = Vec<String>)]
    pub permissions: Vec<Statement>,
    #[schema(value_type = Vec<String>)]
    pub forbiddens: Vec<Statement>,
    #[schema(value_type = Vec<String>)]
    pub subject_permissions: Vec<Statement>,
    #[schema(value_type = Vec<String>)]
    pub subject_forbiddens: Vec<Statement>,
}

impl ExceptionalCases {
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
            && self.forbiddens.is_empty()
            && self.subject_permissions.is_empty()
            && self.subject_forbiddens.is_empty()
    }

    /// Role-level cases as `(permissions, forbidden)` lists.
    pub fn role_level(&self) -> StatementLists {
        StatementLists::new(self.permissions.clone(), self.forbiddens.clone())
    }

    /// Subject-level cases as `(permissions, forbidden)` lists.
    pub fn subject_level(&self) -> StatementLists {
        StatementLists::new(
            self.subject_permissions.clone(),
            self.subject_forbiddens.clone(),
        )
    }

    /// Every statement across the four lists.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.permissions
            .iter()
            .chain(&self.forbiddens)
            .chain(&self.subject_permissions)
            .chain(&self.subject_forbiddens)
    }
}

/// A resource row of the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResourceModel {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub organization: Option<OrganizationSummary>,
    pub actions: Vec<ActionModel>,
    pub exceptional_cases: ExceptionalCases,
    /// Unknown organizations whose statements are shown in this row.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub folded_organizations: Vec<String>,
}

impl ResourceModel {
    /// The row for `slug`, default or custom.
    pub fn action(&self, slug: &str) -> Option<&ActionModel> {
        self.actions.iter().find(|a| a.slug == slug)
    }

    /// Slugs of the actions whose effective value is `true`.
    pub fn granted_actions(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter(|a| a.is_effective())
            .map(|a| a.slug.as_str())
            .collect()
    }

    /// Id of the organization the row belongs to, `None` when uncategorized.
    pub fn organization_id(&self) -> Option<&str> {
        self.organization.as_ref().map(|o| o.id.as_str())
    }
}

/// One organization (or the uncategorized bucket) and its resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrganizationModel {
    pub bucket: OrganizationBucket,
    pub organization: Option<OrganizationSummary>,
    /// Callers must not allow edits when this is false.
    pub is_authorized_by_role: bool,
    pub resources: Vec<ResourceModel>,
}

impl OrganizationModel {
    pub fn resource(&self, slug: &str) -> Option<&ResourceModel> {
        self.resources.iter().find(|r| r.slug == slug)
    }
}

/// The full matrix: the uncategorized bucket first, then one entry per organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PermissionMatrix {
    pub organizations: Vec<OrganizationModel>,
}

impl PermissionMatrix {
    pub fn bucket(&self, bucket: &OrganizationBucket) -> Option<&OrganizationModel> {
        self.organizations.iter().find(|o| &o.bucket == bucket)
    }

    pub fn uncategorized(&self) -> Option<&OrganizationModel> {
        self.bucket(&OrganizationBucket::Uncategorized)
    }

    pub fn organization(&self, id: &str) -> Option<&OrganizationModel> {
        self.organizations
            .iter()
            .find(|o| o.bucket.organization_id() == Some(id))
    }

    /// Look up a resource row; `organization` of `None` means uncategorized.
    pub fn resource(&self, organization: Option<&str>, slug: &str) -> Option<&ResourceModel> {
        self.bucket(&OrganizationBucket::for_category(organization))
            .and_then(|o| o.resource(slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_resolve_prefers_subject() {
        let mut action = ActionModel::seeded("read", false);
        action.role_value = Some(true);
        action.resolve();
        assert_eq!(action.effective_value, Some(true));

        action.subject_value = Some(false);
        action.resolve();
        assert_eq!(action.effective_value, Some(false));
        assert_eq!(action.role_value, Some(true));
    }

    #[test]
    fn test_action_resolve_absent_is_false() {
        let mut action = ActionModel::seeded("read", true);
        action.role_value = None;
        action.resolve();
        assert!(!action.is_effective());
    }

    #[test]
    fn test_granted_actions() {
        let mut read = ActionModel::seeded("read", false);
        read.role_value = Some(true);
        read.resolve();
        let mut update = ActionModel::seeded("update", false);
        update.resolve();

        let resource = ResourceModel {
            slug: "users".to_string(),
            label: None,
            organization: None,
            actions: vec![read, update],
            exceptional_cases: ExceptionalCases::default(),
            folded_organizations: Vec::new(),
        };
        assert_eq!(resource.granted_actions(), vec!["read"]);
        assert!(resource.action("update").is_some());
        assert!(resource.action("delete").is_none());
    }

    #[test]
    fn test_action_model_serialization_skips_missing_label() {
        let mut action = ActionModel::seeded("read", false);
        action.resolve();
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "slug": "read",
                "effective_value": false,
                "role_value": false,
                "subject_value": null,
                "is_custom": false,
            })
        );
    }
}
