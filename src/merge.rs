//! Merge-back: fold an edited resource row into the raw statement lists.
//!
//! The grid shown to the user only speaks about plain statements. Everything
//! else in the lists (other resources, other organizations, exceptional
//! statements) passes through untouched unless the edit explicitly replaces
//! the exceptional cases of the resource.
//!
//! An uncategorized row also covers the statements of unknown organizations
//! that the matrix folded into it, so saving the row as shown is a no-op.

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::statement_set::{canonical_sort, deduplicate_paths};
use crate::types::{ResourceModel, Segment, Statement, StatementKind, StatementLists};

/// Desired state of one action of the edited resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionToggle {
    pub action: String,
    pub value: bool,
}

impl ActionToggle {
    pub fn new(action: impl Into<String>, value: bool) -> Self {
        ActionToggle {
            action: action.into(),
            value,
        }
    }
}

/// An edit of one resource row.
///
/// Actions not mentioned keep their current plain statements. When a toggle
/// for the same action appears twice, the last one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceEdit {
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub actions: Vec<ActionToggle>,
    /// Replacement for the exceptional statements of this resource at the
    /// edited level. `None` leaves them as they are.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceptional: Option<StatementLists>,
    /// Unknown organizations whose statements were shown in this uncategorized
    /// row. The edit covers their statements as well. Ignored when
    /// `organization` is set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub folded_organizations: Vec<String>,
}

impl ResourceEdit {
    /// An edit of the uncategorized row of `resource` with no toggles.
    pub fn new(resource: impl Into<String>) -> Self {
        ResourceEdit {
            resource: resource.into(),
            ..Default::default()
        }
    }

    /// Scope the edit to the row of `organization`.
    pub fn in_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set `action` to `value`. Later toggles of the same action win.
    pub fn toggle(mut self, action: impl Into<String>, value: bool) -> Self {
        self.actions.push(ActionToggle::new(action, value));
        self
    }

    /// Replace the exceptional statements of the edited scope.
    pub fn with_exceptional(mut self, exceptional: StatementLists) -> Self {
        self.exceptional = Some(exceptional);
        self
    }

    /// Also cover statements of these unknown organizations, which the
    /// matrix showed in the uncategorized row.
    pub fn with_folded_organizations<I, S>(mut self, organizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.folded_organizations = organizations.into_iter().map(Into::into).collect();
        self
    }

    /// Capture the full row of a (possibly modified) resource model.
    ///
    /// For `StatementKind::Role` the role column is written back, for
    /// `StatementKind::Subject` the subject column. Exceptional cases of the
    /// same level are carried along as the replacement set.
    pub fn from_resource_model(model: &ResourceModel, kind: StatementKind) -> Self {
        let actions = model
            .actions
            .iter()
            .map(|action| {
                let value = match kind {
                    StatementKind::Role => action.role_value.unwrap_or(false),
                    StatementKind::Subject => action.subject_value.unwrap_or(false),
                };
                ActionToggle::new(&action.slug, value)
            })
            .collect();

        let exceptional = match kind {
            StatementKind::Role => model.exceptional_cases.role_level(),
            StatementKind::Subject => model.exceptional_cases.subject_level(),
        };

        ResourceEdit {
            resource: model.slug.clone(),
            organization: model.organization_id().map(String::from),
            actions,
            exceptional: Some(exceptional),
            folded_organizations: model.folded_organizations.clone(),
        }
    }

    fn scope(&self) -> EditScope<'_> {
        EditScope {
            resource: Segment::new(&self.resource, self.organization.clone()),
            folded: match self.organization {
                Some(_) => &[],
                None => self.folded_organizations.as_slice(),
            },
        }
    }

    /// Last toggle per action, in first-mention order.
    fn desired(&self) -> Vec<(&str, bool)> {
        let mut desired: Vec<(&str, bool)> = Vec::new();
        for toggle in &self.actions {
            match desired.iter_mut().find(|(action, _)| *action == toggle.action) {
                Some(entry) => entry.1 = toggle.value,
                None => desired.push((&toggle.action, toggle.value)),
            }
        }
        desired
    }
}

/// Resource segments one row edit covers.
struct EditScope<'a> {
    resource: Segment,
    folded: &'a [String],
}

impl EditScope<'_> {
    fn covers(&self, resource: &Segment) -> bool {
        if resource.same_scope(&self.resource) {
            return true;
        }
        resource.value() == self.resource.value()
            && resource
                .category()
                .is_some_and(|category| self.folded.iter().any(|f| f == category))
    }
}

fn is_plain_for(statement: &Statement, scope: &EditScope<'_>) -> bool {
    statement.is_plain() && scope.covers(statement.resource())
}

fn is_exceptional_for(statement: &Statement, scope: &EditScope<'_>) -> bool {
    statement.is_exceptional() && scope.covers(statement.resource())
}

/// A plain statement granting `action` on `scope`, in any of its spellings.
fn grants(statement: &Statement, scope: &EditScope<'_>, action: &str) -> bool {
    is_plain_for(statement, scope) && statement.action().value() == action
}

/// Apply `edit` to `lists`, returning the new lists. The input is not touched.
///
/// Checking an action adds a plain permission and drops a plain forbidden
/// statement for it. Unchecking only removes the plain permission. Plain
/// statements of the resource are then regrouped and de-duplicated, the
/// exceptional cases are replaced when the edit carries them, and both lists
/// are put into canonical order.
pub fn merge_back<S: AsRef<str>>(
    lists: &StatementLists,
    kind: StatementKind,
    edit: &ResourceEdit,
    resource_order: &[S],
) -> StatementLists {
    let scope = edit.scope();
    let mut permissions = lists.permissions.clone();
    let mut forbidden = lists.forbidden.clone();

    for (action, value) in edit.desired() {
        if value {
            if !permissions.iter().any(|s| grants(s, &scope, action)) {
                permissions.push(Statement::plain(
                    kind,
                    scope.resource.clone(),
                    Segment::new(action, None),
                ));
            }
            forbidden.retain(|s| !grants(s, &scope, action));
        } else {
            permissions.retain(|s| !grants(s, &scope, action));
        }
    }

    let (permissions, forbidden) = match &edit.exceptional {
        Some(replacement) => (
            regroup(permissions, &scope, Some(replacement.permissions.as_slice())),
            regroup(forbidden, &scope, Some(replacement.forbidden.as_slice())),
        ),
        None => (
            regroup(permissions, &scope, None),
            regroup(forbidden, &scope, None),
        ),
    };

    let merged = StatementLists::new(
        canonical_sort(&permissions, resource_order),
        canonical_sort(&forbidden, resource_order),
    );

    debug!(
        event = "Merge",
        phase = "Applied",
        resource = %scope.resource,
        folded = scope.folded.len(),
        kind = %kind,
        toggles = edit.actions.len(),
        permissions = merged.permissions.len(),
        forbidden = merged.forbidden.len(),
        replaced_exceptional = edit.exceptional.is_some()
    );

    merged
}

/// Pull the plain statements of `scope` (and, when replacing, its
/// exceptional ones) out of `statements`, then append them back deduplicated.
/// Statements outside the scope are kept as they are, duplicates included.
fn regroup(
    statements: Vec<Statement>,
    scope: &EditScope<'_>,
    replacement: Option<&[Statement]>,
) -> Vec<Statement> {
    let (plain, rest): (Vec<Statement>, Vec<Statement>) =
        statements.into_iter().partition(|s| is_plain_for(s, scope));

    let mut regrouped: Vec<Statement> = match replacement {
        Some(_) => rest
            .into_iter()
            .filter(|s| !is_exceptional_for(s, scope))
            .collect(),
        None => rest,
    };
    let scoped = plain
        .into_iter()
        .chain(replacement.into_iter().flatten().cloned())
        .collect();
    regrouped.extend(deduplicate_paths(scoped));
    regrouped
}

/// Apply several edits in order.
pub fn merge_all<S: AsRef<str>>(
    lists: &StatementLists,
    kind: StatementKind,
    edits: &[ResourceEdit],
    resource_order: &[S],
) -> StatementLists {
    edits.iter().fold(lists.clone(), |current, edit| {
        merge_back(&current, kind, edit, resource_order)
    })
}
