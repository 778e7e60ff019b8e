//! Exceptional cases: resolving statements into records and back.
//!
//! Subject cases name a subject (`subject.resource.action.*`, role level
//! only). Object cases name only an object (`*.resource.action.object` or
//! `resource.action.object`). A statement naming both is a subject case.
//!
//! Lookups happen through the directory traits; a statement whose record is
//! not found is kept in `ResolvedCases::unresolved` so that writing the cases
//! back never loses it.

use tracing::warn;

use crate::statement_set::deduplicate;
use crate::traits::{Addressable, ObjectDirectory, SubjectDirectory, SubjectRecord};
use crate::types::{
    ExceptionalCaseEntry, ResolvedCases, ResourceModel, Role, Statement, StatementLists,
};
use crate::validator::validate;

fn sides(cases: &StatementLists) -> impl Iterator<Item = (&Statement, bool)> {
    cases
        .permissions
        .iter()
        .map(|s| (s, true))
        .chain(cases.forbidden.iter().map(|s| (s, false)))
}

fn resolve<T, F>(
    cases: &StatementLists,
    picker: &str,
    applies: fn(&Statement) -> bool,
    lookup: F,
) -> ResolvedCases<T>
where
    F: Fn(&Statement) -> Option<T>,
{
    let mut resolved = ResolvedCases::default();
    for (statement, is_permitted) in sides(cases).filter(|(s, _)| applies(s)) {
        match lookup(statement) {
            Some(record) => resolved.entries.push(ExceptionalCaseEntry::new(
                statement.clone(),
                record,
                is_permitted,
            )),
            None => {
                warn!(
                    event = "Exceptional",
                    phase = "Resolve",
                    picker = picker,
                    statement = statement.to_path(),
                    "record not found"
                );
                let side = if is_permitted {
                    &mut resolved.unresolved.permissions
                } else {
                    &mut resolved.unresolved.forbidden
                };
                side.push(statement.clone());
            }
        }
    }
    resolved
}

fn is_subject_case(statement: &Statement) -> bool {
    statement.targets_subject()
}

fn is_object_case(statement: &Statement) -> bool {
    statement.targets_object() && !statement.targets_subject()
}

/// Resolve the subject cases among `cases` through `directory`.
pub fn resolve_subject_cases<D: SubjectDirectory>(
    cases: &StatementLists,
    directory: &D,
) -> ResolvedCases<D::Record> {
    resolve(cases, "subject", is_subject_case, |statement| {
        statement
            .subject()
            .and_then(|subject| directory.lookup_subject_by_id(subject.value()))
    })
}

/// Resolve the object cases among `cases` through `directory`, looking
/// objects up under `resource_slug`.
pub fn resolve_object_cases<D: ObjectDirectory>(
    resource_slug: &str,
    cases: &StatementLists,
    directory: &D,
) -> ResolvedCases<D::Record> {
    resolve(cases, "object", is_object_case, |statement| {
        directory.lookup_object_by_slug_and_id(resource_slug, statement.object().value())
    })
}

/// Add freshly picked entries to the existing ones. The first entry per
/// `(record id, statement path)` wins.
pub fn merge_picked<T: Addressable>(
    existing: Vec<ExceptionalCaseEntry<T>>,
    picked: Vec<ExceptionalCaseEntry<T>>,
) -> Vec<ExceptionalCaseEntry<T>> {
    deduplicate(existing.into_iter().chain(picked).collect())
}

/// Fill in the validation warning of every subject case.
pub fn validate_entries<T: SubjectRecord>(
    entries: Vec<ExceptionalCaseEntry<T>>,
    resource: &ResourceModel,
    role: Option<&Role>,
) -> Vec<ExceptionalCaseEntry<T>> {
    entries
        .into_iter()
        .map(|mut entry| {
            entry.validation_warning = validate(
                &entry.statement,
                entry.is_permitted,
                resource,
                Some(&entry.subject_or_object_data),
                role,
            )
            .map(|warning| warning.to_string());
            entry
        })
        .collect()
}

/// Fill in the validation warning of every object case. Only the redundancy
/// check applies.
pub fn validate_object_entries<T: Addressable>(
    entries: Vec<ExceptionalCaseEntry<T>>,
    resource: &ResourceModel,
) -> Vec<ExceptionalCaseEntry<T>> {
    entries
        .into_iter()
        .map(|mut entry| {
            entry.validation_warning =
                validate(&entry.statement, entry.is_permitted, resource, None, None)
                    .map(|warning| warning.to_string());
            entry
        })
        .collect()
}
