//! Data model types: statements, roles and the derived permission matrix.
//!
//! Canonical string forms:
//! - Segment: `value` or `value:category`, `*` is the wildcard
//! - Role statement: `subject.resource.action.object` (1 to 4 segments)
//! - Subject statement: `resource.action.object` (1 to 3 segments)
//!
//! No escaping of `.` or `:` inside values is supported.

mod decision;
mod exceptional;
mod matrix;
mod organization;
mod request;
mod role;
mod segment;
mod statement;
mod statement_kind;

pub use decision::Decision;
pub use exceptional::{ExceptionalCaseEntry, ResolvedCases, entries_to_lists};
pub use matrix::{ActionModel, ExceptionalCases, OrganizationModel, PermissionMatrix, ResourceModel};
pub use organization::{OrganizationBucket, OrganizationSummary, UNCATEGORIZED};
pub use request::AccessRequest;
pub use role::{Role, StatementLists, SubjectPolicies};
pub use segment::{ALL, Segment};
pub use statement::{RoleStatement, Statement, SubjectStatement};
pub use statement_kind::StatementKind;
