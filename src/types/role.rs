//! Roles and subjects: the allow and deny lists that feed the engine.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::loader::compile_statements;

use super::statement::Statement;
use super::statement_kind::StatementKind;

/// A `permissions` (allow) list and a `forbidden` (deny) list of statements.
///
/// Both lists may mix plain and exceptional statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementLists {
    pub permissions: Vec<Statement>,
    pub forbidden: Vec<Statement>,
}

impl StatementLists {
    pub fn new(permissions: Vec<Statement>, forbidden: Vec<Statement>) -> Self {
        StatementLists {
            permissions,
            forbidden,
        }
    }

    /// Parse both lists as statements of `kind`.
    pub fn parse<P, F, S>(kind: StatementKind, permissions: P, forbidden: F) -> Result<Self, PolicyError>
    where
        P: IntoIterator<Item = S>,
        F: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(StatementLists {
            permissions: compile_statements(permissions, kind)?,
            forbidden: compile_statements(forbidden, kind)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty() && self.forbidden.is_empty()
    }

    pub fn permission_paths(&self) -> Vec<String> {
        self.permissions.iter().map(|s| s.to_path().to_string()).collect()
    }

    pub fn forbidden_paths(&self) -> Vec<String> {
        self.forbidden.iter().map(|s| s.to_path().to_string()).collect()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRole {
    name: String,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    forbidden: Vec<String>,
}

/// A named role with RBAC statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRole")]
pub struct Role {
    pub name: String,
    #[serde(flatten)]
    pub statements: StatementLists,
}

impl Role {
    pub fn new(name: impl Into<String>, statements: StatementLists) -> Self {
        Role {
            name: name.into(),
            statements,
        }
    }

    /// Parse a role from its persisted string lists.
    pub fn parse<P, F, S>(name: impl Into<String>, permissions: P, forbidden: F) -> Result<Self, PolicyError>
    where
        P: IntoIterator<Item = S>,
        F: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Role::new(
            name,
            StatementLists::parse(StatementKind::Role, permissions, forbidden)?,
        ))
    }
}

impl TryFrom<RawRole> for Role {
    type Error = PolicyError;

    fn try_from(raw: RawRole) -> Result<Self, Self::Error> {
        Role::parse(raw.name, raw.permissions, raw.forbidden)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSubjectPolicies {
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    forbidden: Vec<String>,
}

/// UBAC statements attached to one user or application, layered over its role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSubjectPolicies")]
pub struct SubjectPolicies {
    #[serde(flatten)]
    pub statements: StatementLists,
}

impl SubjectPolicies {
    pub fn new(statements: StatementLists) -> Self {
        SubjectPolicies { statements }
    }

    pub fn parse<P, F, S>(permissions: P, forbidden: F) -> Result<Self, PolicyError>
    where
        P: IntoIterator<Item = S>,
        F: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(SubjectPolicies::new(StatementLists::parse(
            StatementKind::Subject,
            permissions,
            forbidden,
        )?))
    }
}

impl TryFrom<RawSubjectPolicies> for SubjectPolicies {
    type Error = PolicyError;

    fn try_from(raw: RawSubjectPolicies) -> Result<Self, Self::Error> {
        SubjectPolicies::parse(raw.permissions, raw.forbidden)
    }
}
