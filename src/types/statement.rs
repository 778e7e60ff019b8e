//! Permission statements: dot-separated segment strings.
//!
//! Canonical string forms:
//! - Role: `subject.resource.action.object`, shorter forms drop the subject
//!   first and then trailing segments (`resource.action.object`,
//!   `resource.action`, `resource`)
//! - Subject: `resource.action.object`, `resource.action` or `resource`
//!
//! Missing segments are the wildcard `*`. The original text is kept and
//! returned verbatim by `to_path`.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::PolicyError;

use super::segment::Segment;
use super::statement_kind::StatementKind;

const SEGMENT_SEPARATOR: char = '.';

fn split_definition(definition: &str, kind: StatementKind) -> Result<Vec<Segment>, PolicyError> {
    if definition.is_empty() {
        return Err(PolicyError::EmptyDefinition);
    }

    let parts: Vec<&str> = definition.split(SEGMENT_SEPARATOR).collect();
    if parts.len() > kind.max_segments() {
        return Err(PolicyError::InvalidSegmentCount {
            count: parts.len(),
            kind,
            definition: definition.to_string(),
        });
    }

    parts
        .into_iter()
        .map(|part| {
            Segment::parse(part).map_err(|_| PolicyError::EmptyValue(definition.to_string()))
        })
        .collect()
}

/// Spread up to three segments over `(resource, action, object)`.
fn resource_action_object(mut segments: Vec<Segment>) -> (Segment, Segment, Segment) {
    let object = if segments.len() == 3 {
        segments.pop()
    } else {
        None
    };
    let action = if segments.len() == 2 {
        segments.pop()
    } else {
        None
    };
    let resource = segments.pop().unwrap_or_else(Segment::all);
    (
        resource,
        action.unwrap_or_else(Segment::all),
        object.unwrap_or_else(Segment::all),
    )
}

/// A statement attached to a role (RBAC).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleStatement {
    definition: String,
    subject: Segment,
    resource: Segment,
    action: Segment,
    object: Segment,
}

impl RoleStatement {
    pub fn parse(definition: &str) -> Result<Self, PolicyError> {
        let mut segments = split_definition(definition, StatementKind::Role)?;
        let subject = if segments.len() == StatementKind::Role.max_segments() {
            segments.remove(0)
        } else {
            Segment::all()
        };
        let (resource, action, object) = resource_action_object(segments);

        Ok(RoleStatement {
            definition: definition.to_string(),
            subject,
            resource,
            action,
            object,
        })
    }

    /// Build a full four-segment statement.
    pub fn build(subject: Segment, resource: Segment, action: Segment, object: Segment) -> Self {
        RoleStatement {
            definition: format!("{subject}.{resource}.{action}.{object}"),
            subject,
            resource,
            action,
            object,
        }
    }

    pub fn subject(&self) -> &Segment {
        &self.subject
    }

    pub fn resource(&self) -> &Segment {
        &self.resource
    }

    pub fn action(&self) -> &Segment {
        &self.action
    }

    pub fn object(&self) -> &Segment {
        &self.object
    }

    pub fn to_path(&self) -> &str {
        &self.definition
    }

    pub fn is_exceptional(&self) -> bool {
        !self.subject.is_all() || !self.object.is_all()
    }
}

impl TryFrom<String> for RoleStatement {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RoleStatement::parse(&value)
    }
}

impl From<RoleStatement> for String {
    fn from(statement: RoleStatement) -> Self {
        statement.definition
    }
}

/// A statement attached directly to a user or application (UBAC).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectStatement {
    definition: String,
    resource: Segment,
    action: Segment,
    object: Segment,
}

impl SubjectStatement {
    pub fn parse(definition: &str) -> Result<Self, PolicyError> {
        let segments = split_definition(definition, StatementKind::Subject)?;
        let (resource, action, object) = resource_action_object(segments);

        Ok(SubjectStatement {
            definition: definition.to_string(),
            resource,
            action,
            object,
        })
    }

    /// Build a full three-segment statement.
    pub fn build(resource: Segment, action: Segment, object: Segment) -> Self {
        SubjectStatement {
            definition: format!("{resource}.{action}.{object}"),
            resource,
            action,
            object,
        }
    }

    pub fn resource(&self) -> &Segment {
        &self.resource
    }

    pub fn action(&self) -> &Segment {
        &self.action
    }

    pub fn object(&self) -> &Segment {
        &self.object
    }

    pub fn to_path(&self) -> &str {
        &self.definition
    }

    pub fn is_exceptional(&self) -> bool {
        !self.object.is_all()
    }
}

impl TryFrom<String> for SubjectStatement {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SubjectStatement::parse(&value)
    }
}

impl From<SubjectStatement> for String {
    fn from(statement: SubjectStatement) -> Self {
        statement.definition
    }
}

/// Either kind of statement. Serializes as its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Role(RoleStatement),
    Subject(SubjectStatement),
}

impl Statement {
    pub fn parse(definition: &str, kind: StatementKind) -> Result<Self, PolicyError> {
        match kind {
            StatementKind::Role => RoleStatement::parse(definition).map(Statement::Role),
            StatementKind::Subject => SubjectStatement::parse(definition).map(Statement::Subject),
        }
    }

    /// Build a statement from its parts; absent subject and object are `*`.
    ///
    /// Subject statements have an implicit subject, so `subject` is ignored
    /// for `StatementKind::Subject`.
    pub fn build(
        kind: StatementKind,
        subject: Option<Segment>,
        resource: Segment,
        action: Segment,
        object: Option<Segment>,
    ) -> Self {
        let object = object.unwrap_or_else(Segment::all);
        match kind {
            StatementKind::Role => Statement::Role(RoleStatement::build(
                subject.unwrap_or_else(Segment::all),
                resource,
                action,
                object,
            )),
            StatementKind::Subject => {
                Statement::Subject(SubjectStatement::build(resource, action, object))
            }
        }
    }

    /// The plain (wildcard subject and object) statement for `resource.action`.
    pub fn plain(kind: StatementKind, resource: Segment, action: Segment) -> Self {
        Statement::build(kind, None, resource, action, None)
    }

    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Role(_) => StatementKind::Role,
            Statement::Subject(_) => StatementKind::Subject,
        }
    }

    /// The subject segment; subject statements have none.
    pub fn subject(&self) -> Option<&Segment> {
        match self {
            Statement::Role(s) => Some(s.subject()),
            Statement::Subject(_) => None,
        }
    }

    pub fn resource(&self) -> &Segment {
        match self {
            Statement::Role(s) => s.resource(),
            Statement::Subject(s) => s.resource(),
        }
    }

    pub fn action(&self) -> &Segment {
        match self {
            Statement::Role(s) => s.action(),
            Statement::Subject(s) => s.action(),
        }
    }

    pub fn object(&self) -> &Segment {
        match self {
            Statement::Role(s) => s.object(),
            Statement::Subject(s) => s.object(),
        }
    }

    pub fn to_path(&self) -> &str {
        match self {
            Statement::Role(s) => s.to_path(),
            Statement::Subject(s) => s.to_path(),
        }
    }

    pub fn is_exceptional(&self) -> bool {
        match self {
            Statement::Role(s) => s.is_exceptional(),
            Statement::Subject(s) => s.is_exceptional(),
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.is_exceptional()
    }

    /// Organization the statement is scoped to, taken from the resource category.
    pub fn organization(&self) -> Option<&str> {
        self.resource().category()
    }

    /// True if the subject segment names a specific subject.
    pub fn targets_subject(&self) -> bool {
        self.subject().is_some_and(|s| !s.is_all())
    }

    /// True if the object segment names a specific object.
    pub fn targets_object(&self) -> bool {
        !self.object().is_all()
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_path())
    }
}

impl From<RoleStatement> for Statement {
    fn from(statement: RoleStatement) -> Self {
        Statement::Role(statement)
    }
}

impl From<SubjectStatement> for Statement {
    fn from(statement: SubjectStatement) -> Self {
        Statement::Subject(statement)
    }
}

impl Serialize for Statement {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser.serialize_str(self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        four_segments = { "alice.users.read.doc1", "alice", "users", "read", "doc1" },
        three_segments = { "users.read.doc1", "*", "users", "read", "doc1" },
        two_segments = { "users.read", "*", "users", "read", "*" },
        one_segment = { "users", "*", "users", "*", "*" },
        all_wildcards = { "*.*.*.*", "*", "*", "*", "*" },
    )]
    fn test_role_statement_parse(
        definition: &str,
        subject: &str,
        resource: &str,
        action: &str,
        object: &str,
    ) {
        let statement = RoleStatement::parse(definition).unwrap();
        assert_eq!(statement.subject().value(), subject);
        assert_eq!(statement.resource().value(), resource);
        assert_eq!(statement.action().value(), action);
        assert_eq!(statement.object().value(), object);
        assert_eq!(statement.to_path(), definition);
    }

    #[parameterized(
        three_segments = { "users.read.doc1", "users", "read", "doc1" },
        two_segments = { "users.read", "users", "read", "*" },
        one_segment = { "users", "users", "*", "*" },
    )]
    fn test_subject_statement_parse(definition: &str, resource: &str, action: &str, object: &str) {
        let statement = SubjectStatement::parse(definition).unwrap();
        assert_eq!(statement.resource().value(), resource);
        assert_eq!(statement.action().value(), action);
        assert_eq!(statement.object().value(), object);
        assert_eq!(statement.to_path(), definition);
    }

    #[parameterized(
        role_five = { "a.b.c.d.e", StatementKind::Role, 5 },
        subject_four = { "*.users.read.*", StatementKind::Subject, 4 },
    )]
    fn test_statement_rejects_segment_count(definition: &str, kind: StatementKind, count: usize) {
        let result = Statement::parse(definition, kind);
        assert_eq!(
            result,
            Err(PolicyError::InvalidSegmentCount {
                count,
                kind,
                definition: definition.to_string(),
            })
        );
    }

    #[parameterized(
        role = { StatementKind::Role },
        subject = { StatementKind::Subject },
    )]
    fn test_statement_rejects_empty_definition(kind: StatementKind) {
        assert_eq!(
            Statement::parse("", kind),
            Err(PolicyError::EmptyDefinition)
        );
    }

    #[parameterized(
        empty_middle = { "*..read.*" },
        trailing_dot = { "users.read." },
        empty_value_with_category = { "*.:org1.read.*" },
    )]
    fn test_statement_rejects_empty_segment(definition: &str) {
        assert_eq!(
            Statement::parse(definition, StatementKind::Role),
            Err(PolicyError::EmptyValue(definition.to_string()))
        );
    }

    #[parameterized(
        plain = { "*.users.read.*", StatementKind::Role, false },
        specific_subject = { "u1.users.read.*", StatementKind::Role, true },
        specific_object = { "*.users.read.o1", StatementKind::Role, true },
        short_role = { "users.read", StatementKind::Role, false },
        subject_plain = { "users.read.*", StatementKind::Subject, false },
        subject_object = { "users.read.o1", StatementKind::Subject, true },
    )]
    fn test_statement_is_exceptional(definition: &str, kind: StatementKind, expected: bool) {
        let statement = Statement::parse(definition, kind).unwrap();
        assert_eq!(statement.is_exceptional(), expected);
        assert_eq!(statement.is_plain(), !expected);
    }

    #[test]
    fn test_statement_category_on_resource() {
        let statement =
            Statement::parse("specific-user-id.organizations:org1.read.*", StatementKind::Role)
                .unwrap();
        assert!(statement.resource().has_category());
        assert_eq!(statement.organization(), Some("org1"));
        assert_eq!(statement.resource().value(), "organizations");
        assert!(statement.targets_subject());
        assert!(!statement.targets_object());
    }

    #[test]
    fn test_statement_build_role() {
        let statement = Statement::build(
            StatementKind::Role,
            None,
            Segment::new("users", Some("org1".to_string())),
            Segment::new("read", None),
            None,
        );
        assert_eq!(statement.to_path(), "*.users:org1.read.*");
        assert_eq!(statement.kind(), StatementKind::Role);
        assert!(statement.is_plain());
    }

    #[test]
    fn test_statement_build_subject_ignores_subject_segment() {
        let statement = Statement::build(
            StatementKind::Subject,
            Some(Segment::new("alice", None)),
            Segment::new("users", None),
            Segment::new("read", None),
            Some(Segment::new("o1", None)),
        );
        assert_eq!(statement.to_path(), "users.read.o1");
        assert!(statement.subject().is_none());
    }

    #[test]
    fn test_built_statement_reparses_equal() {
        let built = Statement::plain(
            StatementKind::Role,
            Segment::new("roles", None),
            Segment::new("update", None),
        );
        let parsed = Statement::parse(built.to_path(), StatementKind::Role).unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_role_statement_serde_as_string() {
        let statement = RoleStatement::parse("*.users.read.*").unwrap();
        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json, serde_json::json!("*.users.read.*"));
        let back: RoleStatement = serde_json::from_value(json).unwrap();
        assert_eq!(back, statement);
    }

    #[test]
    fn test_subject_statement_deserialize_rejects_invalid() {
        let result: Result<SubjectStatement, _> =
            serde_json::from_value(serde_json::json!("a.b.c.d"));
        assert!(result.is_err());
    }

    #[test]
    fn test_statement_serializes_as_path() {
        let statement = Statement::parse("users.read", StatementKind::Subject).unwrap();
        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json, serde_json::json!("users.read"));
        assert_eq!(statement.to_string(), "users.read");
    }
}
