use super::*;
use crate::traits::LocalizationScope;

#[test]
fn test_empty_role_emits_every_bucket_and_default_resource() {
    let matrix = engine().generate_for_role(&role(&[], &[]), None, &organizations());
    insta::assert_snapshot!(render(&matrix), @r"
    [uncategorized]
    users: create:FF- read:FF- update:FF- delete:FF-
    roles: read:FF- update:FF-
    [org1]
    users: read:FF-
    organizations: read:FF- update:FF-
    [org2] (locked)
    users: read:FF-
    organizations: read:FF- update:FF-
    ");
}

#[test]
fn test_forbidden_overrides_permission() {
    let role = role(&["*.users.read.*", "*.users.update.*"], &["*.users.update.*"]);
    let matrix = engine().generate_for_role(&role, None, &[]);
    assert_eq!(
        row(&matrix, None, "users"),
        "create:FF- read:TT- update:FF- delete:FF-"
    );
}

#[test]
fn test_subject_overlay() {
    let role = role(&["*.users.read.*"], &[]);
    let subject = subject(&["users.delete.*", "users.export.*"], &["users.read.*"]);
    let matrix = engine().generate_for_role(&role, Some(&subject), &[]);
    assert_eq!(
        row(&matrix, None, "users"),
        "create:FF- read:FTF update:FF- delete:TFT +export:T-T"
    );
}

#[test]
fn test_subject_forbidden_overrides_subject_permission() {
    let subject = subject(&["users.read.*"], &["users.read"]);
    let matrix = engine().generate_for_role(&role(&[], &[]), Some(&subject), &[]);
    let read = matrix.resource(None, "users").unwrap().action("read").unwrap();
    assert_eq!(read.subject_value, Some(false));
    assert!(!read.is_effective());
}

#[test]
fn test_unknown_resources_follow_known_ones() {
    let role = role(
        &["*.zeta.read.*", "*.reports.read.*", "*.roles.read.*"],
        &["*.alpha.read.*"],
    );
    let matrix = engine().generate_for_role(&role, None, &[]);
    insta::assert_snapshot!(render(&matrix), @r"
    [uncategorized]
    users: create:FF- read:FF- update:FF- delete:FF-
    roles: read:TT- update:FF-
    zeta: +read:TT-
    reports: +read:TT-
    alpha: +read:FF-
    ");
}

#[test]
fn test_wildcard_action_is_its_own_row() {
    let matrix = engine().generate_for_role(&role(&["*.roles.*.*"], &[]), None, &[]);
    assert_eq!(row(&matrix, None, "roles"), "read:FF- update:FF- +*:TT-");
}

#[test]
fn test_exceptional_statements_stay_out_of_the_grid() {
    let role = role(
        &["u1.users.read.*", "*.users.read.*"],
        &["*.users.delete.o1", "u1.users.purge.*"],
    );
    let subject = subject(&["users.update.o2", "users.export.o1"], &[]);
    let matrix = engine().generate_for_role(&role, Some(&subject), &[]);
    let users = matrix.resource(None, "users").unwrap();

    assert_eq!(
        render_row(users),
        "create:FF- read:TT- update:FF- delete:FF- +purge:FF- +export:F--"
    );

    fn paths(statements: &[Statement]) -> Vec<String> {
        statements.iter().map(|s| s.to_path().to_string()).collect()
    }
    let cases = &users.exceptional_cases;
    assert_eq!(paths(&cases.permissions), vec!["u1.users.read.*"]);
    assert_eq!(
        paths(&cases.forbiddens),
        vec!["*.users.delete.o1", "u1.users.purge.*"]
    );
    assert_eq!(
        paths(&cases.subject_permissions),
        vec!["users.update.o2", "users.export.o1"]
    );
    assert!(cases.subject_forbiddens.is_empty());
}

#[test]
fn test_unknown_organization_folds_into_uncategorized() {
    let role = role(&["*.users:org9.read.*"], &[]);
    let matrix = engine().generate_for_role(&role, None, &organizations());
    assert_eq!(matrix.organizations.len(), 3);
    assert!(matrix.organization("org9").is_none());
    assert_eq!(
        row(&matrix, None, "users"),
        "create:FF- read:TT- update:FF- delete:FF-"
    );
    assert_eq!(row(&matrix, Some("org1"), "users"), "read:FF-");
}

#[test]
fn test_unauthorized_organization_is_still_emitted() {
    let role = role(&["*.users:org2.read.*"], &[]);
    let matrix = engine().generate_for_role(&role, None, &organizations());
    let org2 = matrix.organization("org2").unwrap();
    assert!(!org2.is_authorized_by_role);
    assert_eq!(org2.organization, Some(OrganizationSummary::new("org2", false)));
    assert_eq!(row(&matrix, Some("org2"), "users"), "read:TT-");
    assert_eq!(
        org2.resource("users").unwrap().organization_id(),
        Some("org2")
    );
}

#[test]
fn test_duplicate_organizations_keep_first() {
    let summaries = vec![
        OrganizationSummary::new("org1", true),
        OrganizationSummary::new("org1", false),
    ];
    let matrix = engine().generate_for_role(&role(&[], &[]), None, &summaries);
    assert_eq!(matrix.organizations.len(), 2);
    assert!(matrix.organization("org1").unwrap().is_authorized_by_role);
}

#[test]
fn test_generation_is_deterministic_and_pure() {
    let role = role(
        &["*.users.read.*", "u1.roles.read.*", "*.users:org1.read.*"],
        &["*.roles.update.*"],
    );
    let before = role.clone();
    let engine = engine();
    let first = engine.generate_for_role(&role, None, &organizations());
    let second = engine.generate_for_role(&role, None, &organizations());
    assert_eq!(first, second);
    assert_eq!(role, before);
}

#[test]
fn test_labels_from_localizer() {
    let engine = MatrixEngine::builder()
        .config(test_config())
        .localizer(Arc::new(|slug: &str, scope: LocalizationScope<'_>| {
            format!("{scope}/{slug}")
        }))
        .build();
    let matrix = engine.generate_for_role(&role(&[], &[]), None, &[]);
    let roles = matrix.resource(None, "roles").unwrap();
    assert_eq!(roles.label.as_deref(), Some("resource/roles"));
    assert_eq!(roles.actions[0].label.as_deref(), Some("action:roles/read"));
}

#[test]
fn test_matrix_json() {
    let config = EngineConfig::builder()
        .system_resource("sessions", ["read"])
        .build();
    let engine = MatrixEngine::new(config);
    let matrix = engine.generate_for_role(&role(&["*.sessions.read.*"], &[]), None, &[]);
    insta::assert_json_snapshot!(matrix, @r#"
    {
      "organizations": [
        {
          "bucket": "uncategorized",
          "organization": null,
          "is_authorized_by_role": true,
          "resources": [
            {
              "slug": "sessions",
              "organization": null,
              "actions": [
                {
                  "slug": "read",
                  "effective_value": true,
                  "role_value": true,
                  "subject_value": null,
                  "is_custom": false
                }
              ],
              "exceptional_cases": {
                "permissions": [],
                "forbiddens": [],
                "subject_permissions": [],
                "subject_forbiddens": []
              }
            }
          ]
        }
      ]
    }
    "#);
}
