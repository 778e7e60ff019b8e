//! Exceptional-case entries: a targeted statement plus the record it names.

use serde::Serialize;

use crate::traits::{Addressable, SubjectRecord};

use super::role::StatementLists;
use super::segment::Segment;
use super::statement::Statement;
use super::statement_kind::StatementKind;

/// An exceptional statement paired with the resolved subject or object record.
///
/// `T` is opaque to the engine apart from its `Addressable` id and title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionalCaseEntry<T> {
    pub statement: Statement,
    pub subject_or_object_data: T,
    pub is_permitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_warning: Option<String>,
}

impl<T> ExceptionalCaseEntry<T> {
    pub fn new(statement: Statement, data: T, is_permitted: bool) -> Self {
        ExceptionalCaseEntry {
            statement,
            subject_or_object_data: data,
            is_permitted,
            validation_warning: None,
        }
    }
}

impl<T: SubjectRecord> ExceptionalCaseEntry<T> {
    /// Entry for a picked subject: `subject.resource.action.*`.
    pub fn for_subject(subject: T, resource: Segment, action: Segment, is_permitted: bool) -> Self {
        let statement = Statement::build(
            StatementKind::Role,
            Some(Segment::new(subject.id(), None)),
            resource,
            action,
            None,
        );
        ExceptionalCaseEntry::new(statement, subject, is_permitted)
    }
}

impl<T: Addressable> ExceptionalCaseEntry<T> {
    /// Entry for a picked object: `*.resource.action.object` or `resource.action.object`.
    pub fn for_object(
        kind: StatementKind,
        object: T,
        resource: Segment,
        action: Segment,
        is_permitted: bool,
    ) -> Self {
        let statement = Statement::build(
            kind,
            None,
            resource,
            action,
            Some(Segment::new(object.id(), None)),
        );
        ExceptionalCaseEntry::new(statement, object, is_permitted)
    }

    /// Identity used when de-duplicating: `(record id, statement path)`.
    pub fn key(&self) -> (&str, &str) {
        (self.subject_or_object_data.id(), self.statement.to_path())
    }
}

/// Entries whose records were found, and the statements whose records were not.
///
/// Unresolved statements stay on the side they came from so they can be
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCases<T> {
    pub entries: Vec<ExceptionalCaseEntry<T>>,
    pub unresolved: StatementLists,
}

impl<T> ResolvedCases<T> {
    /// All statements, resolved or not, split back into allow and deny lists.
    pub fn to_lists(&self) -> StatementLists {
        let mut lists = entries_to_lists(&self.entries);
        lists.permissions.extend(self.unresolved.permissions.iter().cloned());
        lists.forbidden.extend(self.unresolved.forbidden.iter().cloned());
        lists
    }
}

impl<T> Default for ResolvedCases<T> {
    fn default() -> Self {
        ResolvedCases {
            entries: Vec::new(),
            unresolved: StatementLists::default(),
        }
    }
}

/// Split entries into `permissions` (permitted) and `forbidden` statement lists.
pub fn entries_to_lists<T>(entries: &[ExceptionalCaseEntry<T>]) -> StatementLists {
    let (permitted, denied): (Vec<_>, Vec<_>) = entries.iter().partition(|e| e.is_permitted);
    StatementLists::new(
        permitted.into_iter().map(|e| e.statement.clone()).collect(),
        denied.into_iter().map(|e| e.statement.clone()).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    struct Member {
        id: String,
        role: String,
    }

    impl Addressable for Member {
        fn id(&self) -> &str {
            &self.id
        }
    }

    impl SubjectRecord for Member {
        fn role_name(&self) -> Option<&str> {
            Some(&self.role)
        }
    }

    #[test]
    fn test_for_subject_builds_role_statement() {
        let member = Member {
            id: "u1".to_string(),
            role: "editor".to_string(),
        };
        let entry = ExceptionalCaseEntry::for_subject(
            member,
            Segment::new("users", Some("org1".to_string())),
            Segment::new("read", None),
            true,
        );
        assert_eq!(entry.statement.to_path(), "u1.users:org1.read.*");
        assert!(entry.statement.is_exceptional());
        assert_eq!(entry.key(), ("u1", "u1.users:org1.read.*"));
    }

    #[test]
    fn test_for_object_subject_kind() {
        let member = Member {
            id: "o7".to_string(),
            role: "editor".to_string(),
        };
        let entry = ExceptionalCaseEntry::for_object(
            StatementKind::Subject,
            member,
            Segment::new("roles", None),
            Segment::new("update", None),
            false,
        );
        assert_eq!(entry.statement.to_path(), "roles.update.o7");
        assert!(!entry.is_permitted);
        assert!(entry.validation_warning.is_none());
    }

    #[test]
    fn test_resolved_cases_to_lists_keeps_unresolved() {
        let member = Member {
            id: "u1".to_string(),
            role: "editor".to_string(),
        };
        let entry = ExceptionalCaseEntry::for_subject(
            member,
            Segment::new("users", None),
            Segment::new("read", None),
            false,
        );
        let missing = Statement::parse("ghost.users.read.*", StatementKind::Role).unwrap();
        let cases = ResolvedCases {
            entries: vec![entry],
            unresolved: StatementLists::new(vec![missing], Vec::new()),
        };
        let lists = cases.to_lists();
        assert_eq!(lists.permission_paths(), vec!["ghost.users.read.*"]);
        assert_eq!(lists.forbidden_paths(), vec!["u1.users.read.*"]);
    }
}
