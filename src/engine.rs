use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

#[cfg(feature = "observability")]
use std::time::{Duration, Instant};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::config::{EngineConfig, ResourceTable};
use crate::merge::{ResourceEdit, merge_all, merge_back};
use crate::policy_match::decide_level;
use crate::statement_set::group_by_organization;
use crate::traits::{LocalizationScope, Localizer};
use crate::types::{
    AccessRequest, ActionModel, Decision, ExceptionalCases, OrganizationBucket, OrganizationModel,
    OrganizationSummary, PermissionMatrix, ResourceModel, Role, Statement, StatementKind,
    StatementLists, SubjectPolicies,
};

#[cfg(feature = "observability")]
use crate::metrics::{self, GenerationPhases, GenerationStats};
#[cfg(feature = "observability")]
use crate::timers::{PhaseTimer, as_millis_f64};

/// Statements of one organization bucket, by level and side.
#[derive(Debug, Default)]
struct BucketStatements {
    role_permissions: Vec<Statement>,
    role_forbidden: Vec<Statement>,
    subject_permissions: Vec<Statement>,
    subject_forbidden: Vec<Statement>,
}

impl BucketStatements {
    fn slot(&mut self, level: StatementKind, permitted: bool) -> &mut Vec<Statement> {
        match (level, permitted) {
            (StatementKind::Role, true) => &mut self.role_permissions,
            (StatementKind::Role, false) => &mut self.role_forbidden,
            (StatementKind::Subject, true) => &mut self.subject_permissions,
            (StatementKind::Subject, false) => &mut self.subject_forbidden,
        }
    }

    /// Lists in the order they are applied: permissions before forbidden,
    /// role level before subject level.
    fn sources(&self) -> [(StatementKind, bool, &[Statement]); 4] {
        [
            (StatementKind::Role, true, self.role_permissions.as_slice()),
            (StatementKind::Role, false, self.role_forbidden.as_slice()),
            (StatementKind::Subject, true, self.subject_permissions.as_slice()),
            (StatementKind::Subject, false, self.subject_forbidden.as_slice()),
        ]
    }

    fn resources(&self) -> impl Iterator<Item = &str> {
        self.role_permissions
            .iter()
            .chain(&self.role_forbidden)
            .chain(&self.subject_permissions)
            .chain(&self.subject_forbidden)
            .map(|s| s.resource().value())
    }
}

fn exceptional_slot(
    cases: &mut ExceptionalCases,
    level: StatementKind,
    permitted: bool,
) -> &mut Vec<Statement> {
    match (level, permitted) {
        (StatementKind::Role, true) => &mut cases.permissions,
        (StatementKind::Role, false) => &mut cases.forbiddens,
        (StatementKind::Subject, true) => &mut cases.subject_permissions,
        (StatementKind::Subject, false) => &mut cases.subject_forbiddens,
    }
}

/// Find the row for `action`, inserting it when missing.
///
/// Rows inserted from role statements start with `role_value = false`, rows
/// inserted from subject statements have no role value at all.
fn action_row<'a>(
    actions: &'a mut Vec<ActionModel>,
    table: &ResourceTable,
    resource: &str,
    action: &str,
    level: StatementKind,
) -> &'a mut ActionModel {
    let index = match actions.iter().position(|a| a.slug == action) {
        Some(index) => index,
        None => {
            let mut row = ActionModel::seeded(action, !table.is_default_action(resource, action));
            if level == StatementKind::Subject {
                row.role_value = None;
            }
            actions.push(row);
            actions.len() - 1
        }
    };
    &mut actions[index]
}

/// The resolution engine. Cloneable and thread-safe; every operation is a
/// pure function of its arguments and the engine configuration.
#[derive(Clone)]
pub struct MatrixEngine {
    config: Arc<EngineConfig>,
    localizer: Option<Arc<dyn Localizer>>,
}

impl Debug for MatrixEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MatrixEngine")
            .field("config", &self.config)
            .field("localizer", &self.localizer.is_some())
            .finish()
    }
}

impl Default for MatrixEngine {
    fn default() -> Self {
        MatrixEngine::new(EngineConfig::default())
    }
}

impl MatrixEngine {
    /// Create an engine over `config`, without a localizer.
    pub fn new(config: EngineConfig) -> Self {
        MatrixEngine {
            config: Arc::new(config),
            localizer: None,
        }
    }

    /// Start building an engine with a custom config or a localizer.
    pub fn builder() -> MatrixEngineBuilder {
        MatrixEngineBuilder::default()
    }

    /// The default tables and resource order this engine uses.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the organization/resource/action matrix for a role, optionally
    /// overlaid with a subject's own statements.
    ///
    /// The uncategorized bucket comes first, then one bucket per organization
    /// in the order given, each present even when it has no statements.
    /// Statements scoped to an organization missing from `organizations` are
    /// shown in the uncategorized bucket.
    pub fn generate_matrix(
        &self,
        role: &StatementLists,
        subject: Option<&StatementLists>,
        organizations: &[OrganizationSummary],
    ) -> PermissionMatrix {
        #[cfg(feature = "observability")]
        let start = Instant::now();
        #[cfg(feature = "observability")]
        let mut bucket_time = Duration::ZERO;
        #[cfg(feature = "observability")]
        let mut build_time = Duration::ZERO;

        let organizations: Vec<&OrganizationSummary> =
            organizations.iter().unique_by(|o| o.id.as_str()).collect();

        debug!(
            event = "Matrix",
            phase = "Input",
            role_permissions = role.permissions.len(),
            role_forbidden = role.forbidden.len(),
            subject = subject.is_some(),
            organizations = organizations.len()
        );

        let mut buckets = {
            #[cfg(feature = "observability")]
            let _timer = PhaseTimer::new(&mut bucket_time);
            self.bucket_statements(role, subject, &organizations)
        };

        let matrix = {
            #[cfg(feature = "observability")]
            let _timer = PhaseTimer::new(&mut build_time);

            let mut models = Vec::with_capacity(organizations.len() + 1);
            let uncategorized = buckets
                .remove(&OrganizationBucket::Uncategorized)
                .unwrap_or_default();
            models.push(self.build_organization(
                OrganizationBucket::Uncategorized,
                None,
                &uncategorized,
            ));
            for summary in &organizations {
                let bucket = OrganizationBucket::Organization(summary.id.clone());
                let statements = buckets.remove(&bucket).unwrap_or_default();
                models.push(self.build_organization(bucket, Some(*summary), &statements));
            }
            PermissionMatrix {
                organizations: models,
            }
        };

        let resources: usize = matrix.organizations.iter().map(|o| o.resources.len()).sum();
        debug!(
            event = "Matrix",
            phase = "Generated",
            organizations = matrix.organizations.len(),
            resources = resources
        );

        #[cfg(feature = "observability")]
        {
            let duration = start.elapsed();
            let statements = role.permissions.len()
                + role.forbidden.len()
                + subject.map_or(0, |s| s.permissions.len() + s.forbidden.len());
            metrics::record_generation(
                GenerationStats {
                    duration,
                    organizations: matrix.organizations.len(),
                    resources,
                    statements,
                },
                Some(GenerationPhases {
                    bucket_ms: as_millis_f64(bucket_time),
                    build_ms: as_millis_f64(build_time),
                    total_ms: as_millis_f64(duration),
                }),
            );
        }

        matrix
    }

    /// `generate_matrix` for a role record and an optional subject record.
    pub fn generate_for_role(
        &self,
        role: &Role,
        subject: Option<&SubjectPolicies>,
        organizations: &[OrganizationSummary],
    ) -> PermissionMatrix {
        self.generate_matrix(
            &role.statements,
            subject.map(|s| &s.statements),
            organizations,
        )
    }

    /// Fold one resource edit into `lists`, using the configured resource order.
    pub fn apply_edit(
        &self,
        lists: &StatementLists,
        kind: StatementKind,
        edit: &ResourceEdit,
    ) -> StatementLists {
        #[cfg(feature = "observability")]
        let start = Instant::now();

        let merged = merge_back(lists, kind, edit, &self.config.resource_order);

        #[cfg(feature = "observability")]
        {
            let resource = match &edit.organization {
                Some(organization) => format!("{}:{organization}", edit.resource),
                None => edit.resource.clone(),
            };
            metrics::record_merge(start.elapsed(), resource, kind.to_string(), edit.actions.len());
        }

        merged
    }

    /// Fold several resource edits into `lists`, in order.
    pub fn apply_edits(
        &self,
        lists: &StatementLists,
        kind: StatementKind,
        edits: &[ResourceEdit],
    ) -> StatementLists {
        merge_all(lists, kind, edits, &self.config.resource_order)
    }

    /// Decide a single request.
    ///
    /// Subject-level statements are consulted first; the role level only
    /// decides when nothing at the subject level matches. Without any match
    /// the request is denied.
    pub fn evaluate(
        &self,
        request: &AccessRequest,
        role: &Role,
        subject: Option<&SubjectPolicies>,
    ) -> Decision {
        #[cfg(feature = "observability")]
        let start = Instant::now();

        debug!(
            event = "Request",
            phase = "Evaluation",
            request = %request,
            role = role.name.as_str(),
            subject = subject.is_some()
        );

        let decision = subject
            .and_then(|s| decide_level(&s.statements, request, StatementKind::Subject))
            .or_else(|| decide_level(&role.statements, request, StatementKind::Role))
            .unwrap_or_else(Decision::implicit_deny);

        debug!(event = "Request", phase = "Result", decision = %decision);

        #[cfg(feature = "observability")]
        metrics::record_evaluation(
            decision.is_allowed(),
            start.elapsed(),
            request.subject_id.clone(),
            request.action.clone(),
        );

        decision
    }

    fn bucket_statements(
        &self,
        role: &StatementLists,
        subject: Option<&StatementLists>,
        organizations: &[&OrganizationSummary],
    ) -> BTreeMap<OrganizationBucket, BucketStatements> {
        let known: HashSet<&str> = organizations.iter().map(|o| o.id.as_str()).collect();
        let empty = StatementLists::default();
        let subject = subject.unwrap_or(&empty);

        let sources = [
            (StatementKind::Role, true, &role.permissions),
            (StatementKind::Role, false, &role.forbidden),
            (StatementKind::Subject, true, &subject.permissions),
            (StatementKind::Subject, false, &subject.forbidden),
        ];

        let mut buckets: BTreeMap<OrganizationBucket, BucketStatements> = BTreeMap::new();
        for (level, permitted, statements) in sources {
            for (bucket, grouped) in group_by_organization(statements) {
                let bucket = match bucket {
                    OrganizationBucket::Organization(ref id) if !known.contains(id.as_str()) => {
                        warn!(
                            event = "Matrix",
                            phase = "Bucket",
                            organization = %bucket,
                            statements = grouped.len(),
                            "statements scoped to an unknown organization, shown as uncategorized"
                        );
                        OrganizationBucket::Uncategorized
                    }
                    bucket => bucket,
                };
                buckets
                    .entry(bucket)
                    .or_default()
                    .slot(level, permitted)
                    .extend(grouped);
            }
        }
        buckets
    }

    fn build_organization(
        &self,
        bucket: OrganizationBucket,
        summary: Option<&OrganizationSummary>,
        statements: &BucketStatements,
    ) -> OrganizationModel {
        let table = self.config.table(&bucket);
        let resources = self
            .resource_slugs(table, statements)
            .into_iter()
            .map(|slug| self.build_resource(slug, table, summary, statements))
            .collect();

        let is_authorized_by_role = summary.is_none_or(|s| s.is_authorized_for_current_role);
        if !is_authorized_by_role {
            debug!(
                event = "Matrix",
                phase = "Bucket",
                organization = %bucket,
                "organization is not authorized for the current role"
            );
        }

        OrganizationModel {
            bucket,
            organization: summary.cloned(),
            is_authorized_by_role,
            resources,
        }
    }

    /// Table resources plus statement resources, known ones in canonical
    /// order, the rest after them in order of first appearance.
    fn resource_slugs<'a>(
        &self,
        table: &'a ResourceTable,
        statements: &'a BucketStatements,
    ) -> Vec<&'a str> {
        let rank: HashMap<&str, usize> = self
            .config
            .resource_order
            .iter()
            .enumerate()
            .map(|(i, slug)| (slug.as_str(), i))
            .rev()
            .collect();

        table
            .slugs()
            .chain(statements.resources())
            .unique()
            .sorted_by_key(|slug| rank.get(slug).copied().unwrap_or(usize::MAX))
            .collect()
    }

    fn build_resource(
        &self,
        slug: &str,
        table: &ResourceTable,
        summary: Option<&OrganizationSummary>,
        statements: &BucketStatements,
    ) -> ResourceModel {
        let mut actions: Vec<ActionModel> = table
            .actions(slug)
            .unwrap_or_default()
            .iter()
            .map(|action| ActionModel::seeded(action, false))
            .collect();
        let mut cases = ExceptionalCases::default();

        for (level, permitted, list) in statements.sources() {
            for statement in list.iter().filter(|s| s.resource().value() == slug) {
                let row = action_row(&mut actions, table, slug, statement.action().value(), level);
                if statement.is_exceptional() {
                    exceptional_slot(&mut cases, level, permitted).push(statement.clone());
                    continue;
                }
                match level {
                    StatementKind::Role => row.role_value = Some(permitted),
                    StatementKind::Subject => row.subject_value = Some(permitted),
                }
            }
        }

        let own_organization = summary.map(|o| o.id.as_str());
        let folded_organizations = statements
            .sources()
            .into_iter()
            .flat_map(|(_, _, list)| list)
            .filter(|s| s.resource().value() == slug)
            .filter_map(|s| s.organization())
            .filter(|category| Some(*category) != own_organization)
            .unique()
            .map(String::from)
            .collect();

        for action in &mut actions {
            action.resolve();
            if let Some(localizer) = &self.localizer {
                action.label = Some(
                    localizer.localize(&action.slug, LocalizationScope::Action { resource: slug }),
                );
            }
        }

        ResourceModel {
            slug: slug.to_string(),
            label: self
                .localizer
                .as_ref()
                .map(|l| l.localize(slug, LocalizationScope::Resource)),
            organization: summary.cloned(),
            actions,
            exceptional_cases: cases,
            folded_organizations,
        }
    }
}

/// Builder for `MatrixEngine`.
///
/// Without a config the built-in tables of `EngineConfig::default()` are used.
#[derive(Default)]
pub struct MatrixEngineBuilder {
    config: Option<EngineConfig>,
    localizer: Option<Arc<dyn Localizer>>,
}

impl MatrixEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` instead of the built-in tables.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Fill `label` on every resource and action row through `localizer`.
    pub fn localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    /// Finalize the engine.
    pub fn build(self) -> MatrixEngine {
        MatrixEngine {
            config: Arc::new(self.config.unwrap_or_default()),
            localizer: self.localizer,
        }
    }
}

#[cfg(test)]
mod tests;
