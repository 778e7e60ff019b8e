#![allow(dead_code)] // This entire file is feature-gated
//! Backend-agnostic metrics collection via a pluggable sink.
//!
//! The engine reports every matrix generation, merge-back and point
//! evaluation to a global [`MetricsSink`]. Nothing is tied to a particular
//! metrics backend; route the events wherever you like.
//!
//! **Note:** This module is only available when the `observability` feature is enabled.
//! To run the doctests for this module, use: `cargo test --doc --features observability`
//!
//! ## Usage
//!
//! ```ignore
//! use latchkey_core::metrics::{EvaluationStats, GenerationStats, MergeStats, MetricsSink};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! struct CountingSink {
//!     generations: AtomicU64,
//! }
//!
//! impl MetricsSink for CountingSink {
//!     fn on_generation(&self, stats: &GenerationStats) {
//!         self.generations.fetch_add(1, Ordering::Relaxed);
//!         eprintln!("matrix with {} resources took {:?}", stats.resources, stats.duration);
//!     }
//!
//!     fn on_merge(&self, _stats: &MergeStats) {}
//!
//!     fn on_evaluation(&self, _stats: &EvaluationStats) {}
//! }
//!
//! latchkey_core::metrics::set_sink(Arc::new(CountingSink { generations: AtomicU64::new(0) }));
//! ```

use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

/// Snapshot of one matrix generation, passed to [`MetricsSink::on_generation`].
#[derive(Debug, Clone, Serialize)]
pub struct GenerationStats {
    /// Total time spent generating the matrix
    pub duration: Duration,
    /// Number of buckets, the uncategorized one included
    pub organizations: usize,
    /// Number of resource rows across all buckets
    pub resources: usize,
    /// Number of statements fed in (role and subject, both lists)
    pub statements: usize,
}

/// Time spent in each generation phase, in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationPhases {
    /// Grouping statements into organization buckets
    pub bucket_ms: f64,
    /// Building resource rows and resolving action values
    pub build_ms: f64,
    pub total_ms: f64,
}

impl GenerationPhases {
    /// Time not accounted for by the measured phases
    pub fn overhead_ms(&self) -> f64 {
        self.total_ms - (self.bucket_ms + self.build_ms)
    }
}

/// Snapshot of one merge-back, passed to [`MetricsSink::on_merge`].
#[derive(Debug, Clone, Serialize)]
pub struct MergeStats {
    pub duration: Duration,
    /// Resource scope of the edit, `value` or `value:organization`
    pub resource: String,
    /// `role` or `subject`
    pub kind: String,
    /// Number of action toggles in the edit
    pub toggles: usize,
}

/// Snapshot of one point evaluation, passed to [`MetricsSink::on_evaluation`].
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationStats {
    pub duration: Duration,
    pub allowed: bool,
    pub subject_id: String,
    pub action: String,
}

/// Consumer of engine metrics.
///
/// Implementations must be thread-safe and should return quickly; they are
/// called synchronously after each engine operation. If no sink is set via
/// [`set_sink`], a no-op sink is used.
pub trait MetricsSink: Send + Sync {
    fn on_generation(&self, stats: &GenerationStats);

    fn on_merge(&self, stats: &MergeStats);

    fn on_evaluation(&self, stats: &EvaluationStats);

    /// Phase breakdown of a generation. The default implementation does nothing.
    fn on_generation_phases(&self, _stats: &GenerationStats, _phases: &GenerationPhases) {}
}

/// No-op sink; metrics are silently dropped.
struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_generation(&self, _stats: &GenerationStats) {}
    fn on_merge(&self, _stats: &MergeStats) {}
    fn on_evaluation(&self, _stats: &EvaluationStats) {}
}

static SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

fn sink() -> Arc<dyn MetricsSink> {
    SINK.get_or_init(|| Arc::new(NoOpSink)).clone()
}

/// Set the global metrics sink.
///
/// The sink can be set once. Call this at startup, before the first engine
/// operation; later calls are ignored with a warning.
pub fn set_sink(sink: Arc<dyn MetricsSink>) {
    if SINK.set(sink).is_err() {
        warn!(
            "Metrics sink was already initialized. Ignoring subsequent set_sink call. Set the sink before the first engine operation."
        );
    }
}

pub(crate) fn record_generation(stats: GenerationStats, phases: Option<GenerationPhases>) {
    let sink = sink();
    sink.on_generation(&stats);
    if let Some(phases) = phases {
        sink.on_generation_phases(&stats, &phases);
    }
}

pub(crate) fn record_merge(duration: Duration, resource: String, kind: String, toggles: usize) {
    sink().on_merge(&MergeStats {
        duration,
        resource,
        kind,
        toggles,
    });
}

pub(crate) fn record_evaluation(
    allowed: bool,
    duration: Duration,
    subject_id: String,
    action: String,
) {
    sink().on_evaluation(&EvaluationStats {
        duration,
        allowed,
        subject_id,
        action,
    });
}
