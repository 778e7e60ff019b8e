use super::*;
use crate::types::Role;
use itertools::Itertools;
use yare::parameterized;

mod generate;

/// Small tables keep the expected rows readable.
fn test_config() -> EngineConfig {
    EngineConfig::builder()
        .system_resource("users", ["create", "read", "update", "delete"])
        .system_resource("roles", ["read", "update"])
        .organization_resource("organizations", ["read", "update"])
        .organization_resource("users", ["read"])
        .build()
}

fn engine() -> MatrixEngine {
    MatrixEngine::new(test_config())
}

fn organizations() -> Vec<OrganizationSummary> {
    vec![
        OrganizationSummary::new("org1", true),
        OrganizationSummary::new("org2", false),
    ]
}

fn role(permissions: &[&str], forbidden: &[&str]) -> Role {
    Role::parse("editor", permissions, forbidden).unwrap()
}

fn subject(permissions: &[&str], forbidden: &[&str]) -> SubjectPolicies {
    SubjectPolicies::parse(permissions, forbidden).unwrap()
}

fn flag(value: Option<bool>) -> char {
    match value {
        Some(true) => 'T',
        Some(false) => 'F',
        None => '-',
    }
}

/// `slug:EFFECTIVE ROLE SUBJECT`, custom actions prefixed with `+`.
fn render_row(resource: &ResourceModel) -> String {
    resource
        .actions
        .iter()
        .map(|a| {
            format!(
                "{}{}:{}{}{}",
                if a.is_custom { "+" } else { "" },
                a.slug,
                flag(a.effective_value),
                flag(a.role_value),
                flag(a.subject_value)
            )
        })
        .join(" ")
}

fn render(matrix: &PermissionMatrix) -> String {
    let mut lines = Vec::new();
    for organization in &matrix.organizations {
        let locked = if organization.is_authorized_by_role { "" } else { " (locked)" };
        lines.push(format!("[{}]{locked}", organization.bucket));
        for resource in &organization.resources {
            lines.push(format!("{}: {}", resource.slug, render_row(resource)));
        }
    }
    lines.join("\n")
}

fn row(matrix: &PermissionMatrix, organization: Option<&str>, resource: &str) -> String {
    render_row(matrix.resource(organization, resource).unwrap())
}

#[test]
fn test_engine_default_uses_builtin_tables() {
    let engine = MatrixEngine::default();
    assert_eq!(engine.config(), &EngineConfig::default());

    let built = MatrixEngine::builder().build();
    assert_eq!(built.config(), engine.config());
}

#[test]
fn test_engine_builder_with_config() {
    let engine = MatrixEngine::builder().config(test_config()).build();
    assert_eq!(engine.config().resource_order, vec!["users", "roles", "organizations"]);
    assert!(format!("{engine:?}").contains("localizer: false"));
}

#[test]
fn test_engine_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync + Clone>() {}
    assert_send_sync::<MatrixEngine>();
}

#[parameterized(
    uncategorized_users = { None, "users", "create:FF- read:TT- update:FF- delete:FF-" },
    uncategorized_roles = { None, "roles", "read:FF- update:TT-" },
    org_users = { Some("org1"), "users", "read:FF- +delete:TT-" },
)]
fn test_rows_across_buckets(organization: Option<&str>, resource: &str, expected: &str) {
    let role = role(
        &["*.users.read.*", "*.roles.update.*", "*.users:org1.delete.*"],
        &[],
    );
    let matrix = engine().generate_for_role(&role, None, &organizations());
    assert_eq!(row(&matrix, organization, resource), expected);
}
