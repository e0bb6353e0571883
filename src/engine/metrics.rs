//! Pass metrics.
//!
//! `Runner::run` is the normal entry point; `Runner::run_with_metrics` also
//! reports where the time went. Collection is cheap (a few `Instant`s per
//! rule), so the runner always collects and `run` just drops the numbers.

use std::time::Duration;

use super::trigger::InputTraits;
use crate::DiagnosticReport;
use crate::error::RuleError;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for the pass.
    pub total: Duration,
    pub segmentation: Duration,
    /// Wall time of the parallel rule phase.
    pub rules_total: Duration,
    /// One entry per rule that ran, in registration order.
    pub rules: Vec<RuleTiming>,
    pub aggregation: Duration,
    pub tokens: usize,
    pub sentences: usize,
    /// Diagnostics produced by the rules before aggregation.
    pub raw_diagnostics: usize,
}

/// Timing and output of a single rule.
#[derive(Debug, Clone)]
pub struct RuleTiming {
    pub rule: &'static str,
    pub duration: Duration,
    pub produced: usize,
    /// Why the rule contributed nothing, if it failed.
    pub error: Option<RuleError>,
}

/// Runner output bundled with timing information.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub report: DiagnosticReport,
    pub traits: InputTraits,
    /// Rules that ran for this input.
    pub active: Vec<&'static str>,
    /// Rules skipped because their triggers were absent.
    pub skipped: Vec<&'static str>,
    pub metrics: RunMetrics,
}
