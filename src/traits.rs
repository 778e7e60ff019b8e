//! Seams to the collaborators the engine consumes but never implements.
//!
//! Every collaborator is a plain synchronous lookup. Fetching the data behind
//! them (network calls, caches) happens before the engine is called.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Answers whether a role may operate on an organization's resources.
pub trait OrganizationAuthorizer {
    fn is_authorized(&self, role_id: &str, organization_id: &str) -> bool;
}

impl<F> OrganizationAuthorizer for F
where
    F: Fn(&str, &str) -> bool,
{
    fn is_authorized(&self, role_id: &str, organization_id: &str) -> bool {
        self(role_id, organization_id)
    }
}

/// A record that can be referenced from a statement segment.
pub trait Addressable {
    /// The id written into the subject or object segment.
    fn id(&self) -> &str;

    /// Display title, the id by default.
    fn title(&self) -> &str {
        self.id()
    }
}

/// A user or application that may be named in a subject segment.
pub trait SubjectRecord: Addressable {
    /// Name of the role the subject is assigned, if any.
    fn role_name(&self) -> Option<&str>;
}

/// Resolves subject ids found in exceptional statements.
pub trait SubjectDirectory {
    type Record: SubjectRecord;

    fn lookup_subject_by_id(&self, id: &str) -> Option<Self::Record>;
}

/// Resolves object ids found in exceptional statements.
pub trait ObjectDirectory {
    type Record: Addressable;

    fn lookup_object_by_slug_and_id(&self, resource_slug: &str, id: &str) -> Option<Self::Record>;
}

/// What is being localized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizationScope<'a> {
    Resource,
    Action { resource: &'a str },
}

impl Display for LocalizationScope<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LocalizationScope::Resource => write!(f, "resource"),
            LocalizationScope::Action { resource } => write!(f, "action:{resource}"),
        }
    }
}

/// Maps slugs to display strings. Purely cosmetic.
pub trait Localizer: Send + Sync {
    fn localize(&self, slug: &str, scope: LocalizationScope<'_>) -> String;
}

impl<F> Localizer for F
where
    F: Fn(&str, LocalizationScope<'_>) -> String + Send + Sync,
{
    fn localize(&self, slug: &str, scope: LocalizationScope<'_>) -> String {
        self(slug, scope)
    }
}
