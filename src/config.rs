//! Engine configuration: default action tables and the canonical resource order.
//!
//! Two tables exist: one for the authentication system's own resources
//! (statements without an organization category) and one for resources scoped
//! to an organization. The resource order drives both matrix row order and the
//! canonical statement sort.
//!
//! A configuration can be loaded from JSON:
//!
//! ```rust
//! use latchkey_core::EngineConfig;
//! let config = EngineConfig::from_json_str(r#"{
//!     "system_resources": [{ "slug": "users", "actions": ["read", "update"] }],
//!     "organization_resources": [{ "slug": "projects", "actions": ["read"] }]
//! }"#).unwrap();
//! assert_eq!(config.resource_order, vec!["users", "projects"]);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PolicyError;
use crate::types::OrganizationBucket;

const CRUD: [&str; 4] = ["create", "read", "update", "delete"];

static DEFAULT_CONFIG: Lazy<EngineConfig> = Lazy::new(|| {
    EngineConfig::builder()
        .system_resource("users", CRUD)
        .system_resource("roles", CRUD)
        .system_resource("applications", CRUD)
        .system_resource("organizations", CRUD)
        .system_resource("providers", CRUD)
        .system_resource("sessions", ["read", "delete"])
        .organization_resource("organizations", ["read", "update", "delete"])
        .organization_resource("users", CRUD)
        .organization_resource("roles", CRUD)
        .organization_resource("applications", CRUD)
        .build()
});

/// Default actions of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ResourceDefaults {
    pub slug: String,
    pub actions: Vec<String>,
}

/// Ordered `resource -> default actions` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ResourceTable(Vec<ResourceDefaults>);

impl ResourceTable {
    pub fn new(entries: Vec<ResourceDefaults>) -> Self {
        ResourceTable(entries)
    }

    /// Add a resource; a slug already present has its actions replaced.
    pub fn with_resource<I, S>(mut self, slug: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slug = slug.into();
        let actions: Vec<String> = actions.into_iter().map(Into::into).collect();
        match self.0.iter_mut().find(|entry| entry.slug == slug) {
            Some(entry) => entry.actions = actions,
            None => self.0.push(ResourceDefaults { slug, actions }),
        }
        self
    }

    /// Default actions of `slug`, in table order.
    pub fn actions(&self, slug: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|entry| entry.slug == slug)
            .map(|entry| entry.actions.as_slice())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.actions(slug).is_some()
    }

    /// True when `action` is one of the default actions of `slug`. Anything
    /// else is shown as a custom action.
    pub fn is_default_action(&self, slug: &str, action: &str) -> bool {
        self.actions(slug)
            .is_some_and(|actions| actions.iter().any(|a| a == action))
    }

    /// Resource slugs in table order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.slug.as_str())
    }

    /// Number of resources in the table.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(&self, table: &str) -> Result<(), PolicyError> {
        for (i, entry) in self.0.iter().enumerate() {
            if entry.slug.is_empty() {
                return Err(PolicyError::InvalidFormat(format!(
                    "{table}: resource #{i} has an empty slug"
                )));
            }
            if self.0[..i].iter().any(|other| other.slug == entry.slug) {
                return Err(PolicyError::InvalidFormat(format!(
                    "{table}: resource '{}' is listed twice",
                    entry.slug
                )));
            }
            if entry.actions.iter().any(|a| a.is_empty()) {
                return Err(PolicyError::InvalidFormat(format!(
                    "{table}: resource '{}' has an empty action slug",
                    entry.slug
                )));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngineConfig {
    #[serde(default)]
    system_resources: ResourceTable,
    #[serde(default)]
    organization_resources: ResourceTable,
    #[serde(default)]
    resource_order: Option<Vec<String>>,
}

/// Default action tables plus the canonical resource order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawEngineConfig")]
pub struct EngineConfig {
    pub system_resources: ResourceTable,
    pub organization_resources: ResourceTable,
    pub resource_order: Vec<String>,
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn from_json_str(text: &str) -> Result<Self, PolicyError> {
        let raw: RawEngineConfig = serde_json::from_str(text)?;
        EngineConfig::try_from(raw)
    }

    /// The default table that applies to a bucket.
    pub fn table(&self, bucket: &OrganizationBucket) -> &ResourceTable {
        match bucket {
            OrganizationBucket::Uncategorized => &self.system_resources,
            OrganizationBucket::Organization(_) => &self.organization_resources,
        }
    }

    fn validate(&self) -> Result<(), PolicyError> {
        self.system_resources.validate("system_resources")?;
        self.organization_resources.validate("organization_resources")?;
        if self.resource_order.iter().any(|slug| slug.is_empty()) {
            return Err(PolicyError::InvalidFormat(
                "resource_order contains an empty slug".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

impl TryFrom<RawEngineConfig> for EngineConfig {
    type Error = PolicyError;

    fn try_from(raw: RawEngineConfig) -> Result<Self, Self::Error> {
        let mut builder = EngineConfigBuilder {
            system_resources: raw.system_resources,
            organization_resources: raw.organization_resources,
            resource_order: None,
        };
        if let Some(order) = raw.resource_order {
            builder = builder.resource_order(order);
        }
        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

/// Builder for `EngineConfig`.
///
/// Without an explicit order, resources are ordered as the system table lists
/// them, followed by organization-only resources.
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    system_resources: ResourceTable,
    organization_resources: ResourceTable,
    resource_order: Option<Vec<String>>,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default actions of a resource of the authentication system.
    pub fn system_resource<I, S>(mut self, slug: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.system_resources = self.system_resources.with_resource(slug, actions);
        self
    }

    /// Set the default actions of an organization-scoped resource.
    pub fn organization_resource<I, S>(mut self, slug: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.organization_resources = self.organization_resources.with_resource(slug, actions);
        self
    }

    /// Explicit resource priority for row order and the canonical sort.
    pub fn resource_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> EngineConfig {
        let resource_order = self.resource_order.unwrap_or_else(|| {
            let mut order: Vec<String> = self.system_resources.slugs().map(String::from).collect();
            for slug in self.organization_resources.slugs() {
                if !order.iter().any(|known| known == slug) {
                    order.push(slug.to_string());
                }
            }
            order
        });

        EngineConfig {
            system_resources: self.system_resources,
            organization_resources: self.organization_resources,
            resource_order,
        }
    }
}
