//! Pure operations over collections of statements.
//!
//! Nothing here mutates its input: every function returns a fresh collection.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::traits::Addressable;
use crate::types::{ExceptionalCaseEntry, OrganizationBucket, Statement};

/// Group statements by the organization category of their resource segment.
///
/// Statements without a category land in `OrganizationBucket::Uncategorized`.
pub fn group_by_organization(statements: &[Statement]) -> BTreeMap<OrganizationBucket, Vec<Statement>> {
    let mut groups: BTreeMap<OrganizationBucket, Vec<Statement>> = BTreeMap::new();
    for statement in statements {
        groups
            .entry(OrganizationBucket::for_category(statement.organization()))
            .or_default()
            .push(statement.clone());
    }
    groups
}

/// Group statements by resource slug (the resource value, category ignored).
///
/// Groups come back in order of first appearance.
pub fn group_by_resource(statements: &[Statement]) -> Vec<(String, Vec<Statement>)> {
    let mut groups: Vec<(String, Vec<Statement>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for statement in statements {
        let slug = statement.resource().value();
        match index.get(slug) {
            Some(&i) => groups[i].1.push(statement.clone()),
            None => {
                index.insert(slug, groups.len());
                groups.push((slug.to_string(), vec![statement.clone()]));
            }
        }
    }
    groups
}

/// Drop entries naming the same record for the same statement path.
/// The first occurrence wins.
pub fn deduplicate<T: Addressable>(entries: Vec<ExceptionalCaseEntry<T>>) -> Vec<ExceptionalCaseEntry<T>> {
    entries
        .into_iter()
        .unique_by(|entry| {
            let (id, path) = entry.key();
            (id.to_string(), path.to_string())
        })
        .collect()
}

/// Drop statements whose path already appeared. The first occurrence wins.
pub fn deduplicate_paths(statements: Vec<Statement>) -> Vec<Statement> {
    statements
        .into_iter()
        .unique_by(|statement| statement.to_path().to_string())
        .collect()
}

/// Sort statements by a fixed resource priority list.
///
/// Known resources come first, in priority order, each group sorted by full
/// path. Statements for resources missing from `resource_order` follow in
/// their original relative order. Sorting a sorted list is a no-op.
pub fn canonical_sort<S: AsRef<str>>(statements: &[Statement], resource_order: &[S]) -> Vec<Statement> {
    let rank: HashMap<&str, usize> = resource_order
        .iter()
        .enumerate()
        .map(|(i, slug)| (slug.as_ref(), i))
        .rev()
        .collect();

    statements
        .iter()
        .cloned()
        .sorted_by(|a, b| {
            match (
                rank.get(a.resource().value()),
                rank.get(b.resource().value()),
            ) {
                (Some(x), Some(y)) => x.cmp(y).then_with(|| a.to_path().cmp(b.to_path())),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
        .collect()
}
