//! Advisory checks on exceptional statements.
//!
//! A warning never blocks saving; it only tells the operator that an
//! exception is pointless or will not apply.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::traits::SubjectRecord;
use crate::types::{ResourceModel, Role, Statement};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ValidationWarning {
    /// The grid already resolves the action to the exception's value.
    ExceptionHasNoEffect,
    /// The named subject is not assigned the role being edited.
    SubjectDoesNotHoldRole,
}

/// Check one exceptional statement against the resolved row of its resource.
///
/// The redundancy check runs first. The role check only runs when both a
/// subject record and a role are given.
pub fn validate(
    statement: &Statement,
    is_permitted: bool,
    resource: &ResourceModel,
    subject: Option<&dyn SubjectRecord>,
    role: Option<&Role>,
) -> Option<ValidationWarning> {
    let current = resource
        .action(statement.action().value())
        .is_some_and(|action| action.is_effective());
    if current == is_permitted {
        return Some(ValidationWarning::ExceptionHasNoEffect);
    }

    match (subject, role) {
        (Some(subject), Some(role)) if subject.role_name() != Some(role.name.as_str()) => {
            Some(ValidationWarning::SubjectDoesNotHoldRole)
        }
        _ => None,
    }
}
