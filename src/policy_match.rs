use std::cmp::Reverse;

use crate::types::{AccessRequest, Decision, Segment, Statement, StatementKind, StatementLists};

/// `*` stands for any subject or object.
fn segment_matches(segment: &Segment, value: &str) -> bool {
    segment.is_all() || segment.value() == value
}

/// Resources and actions compare literally, a `*` only matches a `*`. The
/// matrix shows such a statement as its own row, so evaluation agrees with it.
fn literal_matches(segment: &Segment, value: &str) -> bool {
    segment.value() == value
}

/// Resource value and organization must both line up.
pub(crate) fn resource_matches(segment: &Segment, request: &AccessRequest) -> bool {
    literal_matches(segment, &request.resource)
        && segment.category() == request.organization.as_deref()
}

pub(crate) fn subject_matches(segment: Option<&Segment>, subject_id: &str) -> bool {
    segment.is_none_or(|segment| segment_matches(segment, subject_id))
}

pub(crate) fn object_matches(segment: &Segment, object_id: Option<&str>) -> bool {
    segment.is_all() || object_id == Some(segment.value())
}

pub(crate) fn statement_matches(statement: &Statement, request: &AccessRequest) -> bool {
    subject_matches(statement.subject(), &request.subject_id)
        && resource_matches(statement.resource(), request)
        && literal_matches(statement.action(), &request.action)
        && object_matches(statement.object(), request.object_id.as_deref())
}

/// Number of concrete targeting segments: 0 for plain, up to 2 for a
/// statement naming both a subject and an object.
pub(crate) fn specificity(statement: &Statement) -> u8 {
    u8::from(statement.targets_subject()) + u8::from(statement.targets_object())
}

/// Most specific matching statement, the first one on ties.
fn best_match<'a>(statements: &'a [Statement], request: &AccessRequest) -> Option<&'a Statement> {
    statements
        .iter()
        .filter(|s| statement_matches(s, request))
        .min_by_key(|s| Reverse(specificity(s)))
}

/// Decide a request against one level of statements.
///
/// `None` when nothing at this level matches. A forbidden statement wins over
/// a permission of the same specificity; a strictly more specific permission
/// wins over a forbidden statement.
pub(crate) fn decide_level(
    lists: &StatementLists,
    request: &AccessRequest,
    level: StatementKind,
) -> Option<Decision> {
    let permit = best_match(&lists.permissions, request);
    let forbid = best_match(&lists.forbidden, request);

    match (permit, forbid) {
        (Some(p), Some(f)) if specificity(p) > specificity(f) => Some(allow(p, level)),
        (_, Some(f)) => Some(deny(f, level)),
        (Some(p), None) => Some(allow(p, level)),
        (None, None) => None,
    }
}

fn allow(statement: &Statement, level: StatementKind) -> Decision {
    Decision::Allow {
        statement: statement.to_path().to_string(),
        level,
    }
}

fn deny(statement: &Statement, level: StatementKind) -> Decision {
    Decision::Deny {
        statement: Some(statement.to_path().to_string()),
        level: Some(level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn role(definition: &str) -> Statement {
        Statement::parse(definition, StatementKind::Role).unwrap()
    }

    fn request() -> AccessRequest {
        AccessRequest::new("u1", "users", "read")
    }

    #[parameterized(
        wildcard = { "*.users.read.*", true },
        named_subject = { "u1.users.read.*", true },
        other_subject = { "u2.users.read.*", false },
        wildcard_resource = { "*.*.read.*", false },
        wildcard_action = { "*.users.*.*", false },
        other_action = { "*.users.update.*", false },
        named_object = { "*.users.read.o1", false },
        organization_scoped = { "*.users:org1.read.*", false },
        short_form = { "users.read", true },
    )]
    fn test_statement_matches(definition: &str, expected: bool) {
        assert_eq!(statement_matches(&role(definition), &request()), expected);
    }

    #[test]
    fn test_object_and_organization_match() {
        let request = AccessRequest::new("u1", "users", "read")
            .in_organization("org1")
            .on_object("o1");
        assert!(statement_matches(&role("*.users:org1.read.o1"), &request));
        assert!(statement_matches(&role("*.users:org1.read.*"), &request));
        assert!(!statement_matches(&role("*.users.read.*"), &request));
    }

    #[test]
    fn test_wildcard_action_matches_only_itself() {
        let request = AccessRequest::new("u1", "users", "*");
        assert!(statement_matches(&role("*.users.*.*"), &request));
        assert!(!statement_matches(&role("*.users.read.*"), &request));
    }

    #[parameterized(
        plain = { "*.users.read.*", 0 },
        subject = { "u1.users.read.*", 1 },
        object = { "*.users.read.o1", 1 },
        both = { "u1.users.read.o1", 2 },
    )]
    fn test_specificity(definition: &str, expected: u8) {
        assert_eq!(specificity(&role(definition)), expected);
    }

    #[test]
    fn test_forbidden_wins_on_equal_specificity() {
        let lists = StatementLists::new(vec![role("*.users.read.*")], vec![role("users.read")]);
        let decision = decide_level(&lists, &request(), StatementKind::Role).unwrap();
        assert_eq!(decision.to_string(), "Deny(role; users.read)");
    }

    #[test]
    fn test_exceptional_permission_beats_plain_forbidden() {
        let lists = StatementLists::new(vec![role("u1.users.read.*")], vec![role("*.users.read.*")]);
        let decision = decide_level(&lists, &request(), StatementKind::Role).unwrap();
        assert_eq!(decision.to_string(), "Allow(role; u1.users.read.*)");
    }

    #[test]
    fn test_no_match_is_none() {
        let lists = StatementLists::new(vec![role("*.roles.read.*")], Vec::new());
        assert!(decide_level(&lists, &request(), StatementKind::Role).is_none());
    }
}
