//! Permission-statement policy engine.
//!
//! Roles and subjects carry `permissions` and `forbidden` lists of dotted
//! statements such as `*.users:org1.read.*`. The engine turns those lists into
//! an organization/resource/action matrix for display, folds edits of the
//! matrix back into the lists, and answers single access requests.
//!
//! ```rust
//! use latchkey_core::{MatrixEngine, OrganizationSummary, Role};
//!
//! let role = Role::parse("editor", ["*.users.read.*", "*.users:org1.update.*"], [] as [&str; 0]).unwrap();
//! let engine = MatrixEngine::default();
//! let matrix = engine.generate_for_role(&role, None, &[OrganizationSummary::new("org1", true)]);
//!
//! let users = matrix.resource(None, "users").unwrap();
//! assert_eq!(users.granted_actions(), vec!["read"]);
//! let org_users = matrix.resource(Some("org1"), "users").unwrap();
//! assert_eq!(org_users.granted_actions(), vec!["update"]);
//! ```
pub use config::{EngineConfig, EngineConfigBuilder, ResourceDefaults, ResourceTable};
pub use engine::{MatrixEngine, MatrixEngineBuilder};
pub use error::PolicyError;
pub use exceptional::{
    merge_picked, resolve_object_cases, resolve_subject_cases, validate_entries,
    validate_object_entries,
};
pub use loader::compile_statements;
pub use merge::{ActionToggle, ResourceEdit, merge_all, merge_back};
pub use statement_set::{
    canonical_sort, deduplicate, deduplicate_paths, group_by_organization, group_by_resource,
};
pub use traits::{
    Addressable, LocalizationScope, Localizer, ObjectDirectory, OrganizationAuthorizer,
    SubjectDirectory, SubjectRecord,
};
pub use types::*;
pub use validator::{ValidationWarning, validate};

mod config;
mod engine;
mod error;
mod exceptional;
mod loader;
mod merge;
mod policy_match;
mod statement_set;
mod traits;
mod types;
mod validator;

#[cfg(feature = "observability")]
pub mod metrics;
#[cfg(feature = "observability")]
mod timers;
