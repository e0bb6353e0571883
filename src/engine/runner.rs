//! Pass runner.
//!
//! This module is the operational core of the engine:
//!
//! - Segment the document once.
//! - Select the rules whose triggers the input satisfies (see `registry.rs`
//!   and `trigger.rs`).
//! - Run those rules in parallel over the same read-only view, each isolated
//!   from the others' failures.
//! - Aggregate their diagnostics into a report (see `resolve.rs`).
//!
//! ## Pass structure
//!
//! ```text
//! (0) segment              -> tokens + sentences
//! (1) trigger scan         -> InputTraits -> active rules
//! (2) dictionary           -> loaded once, only if an active rule needs it
//! (3) rules (rayon)        -> Vec<Diagnostic> or RuleError, per rule
//! (4) aggregate            -> DiagnosticReport (+ recovered errors, status)
//! ```
//!
//! Rules are collected back in registration order, so the result never
//! depends on which thread finished first.
//!
//! ## Failure handling
//!
//! A rule that returns an error or panics contributes nothing and is recorded
//! as a `RuleExecution` error. A rule interrupted by the deadline contributes
//! nothing and is named in an `AnalysisTimeout` error. Either way the pass is
//! `Partial`; the other rules' diagnostics are kept.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::metrics::{RuleTiming, RunMetrics, RunResult};
use super::registry::{RuleId, RuleRegistry};
use super::resolve::aggregate;
use super::trigger::InputTraits;
use crate::config::{OverlapPolicy, PipelineConfig};
use crate::dictionary::{Dictionary, DictionaryStore};
use crate::error::{DictionaryLoadError, ProofError, RuleError, SegmentationError};
use crate::rules::{AnalysisContext, Deadline, Rule};
use crate::segment::segment;
use crate::{Diagnostic, DiagnosticReport, Document, PassStatus};

/// Runs one pass of a registry's rules over a document.
///
/// Usage: `Runner::new(&registry, &store, &config).run(&document)`.
#[derive(Debug)]
pub struct Runner<'a> {
    registry: &'a RuleRegistry,
    dictionary: &'a DictionaryStore,
    budget: Duration,
    policy: OverlapPolicy,
}

struct RuleOutcome {
    rule: &'static str,
    result: Result<Vec<Diagnostic>, RuleError>,
    duration: Duration,
}

impl<'a> Runner<'a> {
    pub fn new(registry: &'a RuleRegistry, dictionary: &'a DictionaryStore, config: &PipelineConfig) -> Self {
        Runner { registry, dictionary, budget: config.analysis_budget(), policy: config.overlap_policy }
    }

    /// Run with an explicit deadline instead of the configured budget.
    pub fn run_with_deadline(&self, document: &Document, deadline: Deadline) -> RunResult {
        self.pass(document, || deadline)
    }

    /// `start_clock` is called once the dictionary is ready, so a first load
    /// does not eat into the rules' budget.
    fn pass(&self, document: &Document, start_clock: impl FnOnce() -> Deadline) -> RunResult {
        let total_start = Instant::now();

        let segmentation_start = Instant::now();
        let segmentation = segment(&document.text);
        let segmentation_time = segmentation_start.elapsed();

        let traits = InputTraits::scan(&segmentation);
        let active = self.registry.active(traits);
        let skipped: Vec<&'static str> = (0..self.registry.len())
            .filter(|id| active.binary_search(id).is_err())
            .map(|id| self.registry.meta(id).id)
            .collect();
        log::debug!("v{}: traits={traits:?}, active={}, skipped={skipped:?}", document.version, active.len());

        let dictionary = if active.iter().any(|&id| self.registry.meta(id).uses_dictionary) {
            Some(self.dictionary.get())
        } else {
            None
        };
        let ctx = AnalysisContext::new(&document.text, &segmentation)
            .with_dictionary(dictionary.as_ref().and_then(|d| d.as_ref().ok()).map(|d| &**d))
            .with_deadline(start_clock());

        let rules_start = Instant::now();
        let outcomes: Vec<RuleOutcome> = active.par_iter().map(|&id| self.run_rule(id, &ctx)).collect();
        let rules_total = rules_start.elapsed();

        let mut raw = Vec::new();
        let mut errors = Vec::new();
        let mut interrupted = Vec::new();
        let mut timings = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            let (produced, error) = match outcome.result {
                Ok(diagnostics) => match out_of_bounds(&diagnostics, &document.text) {
                    None => {
                        let produced = diagnostics.len();
                        raw.extend(diagnostics);
                        (produced, None)
                    }
                    Some(bad) => {
                        let message = format!("diagnostic range {}..{} is outside the document", bad.start, bad.end);
                        (0, Some(RuleError::Failed(message)))
                    }
                },
                Err(err) => (0, Some(err)),
            };

            match &error {
                None => {}
                Some(RuleError::Interrupted) => interrupted.push(outcome.rule),
                Some(RuleError::DictionaryUnavailable) => errors.push(dictionary_error(outcome.rule, dictionary.as_ref())),
                Some(RuleError::Failed(message)) => {
                    log::warn!("rule `{}` failed: {message}", outcome.rule);
                    errors.push(ProofError::RuleExecution { rule: outcome.rule, message: message.clone() });
                }
            }
            timings.push(RuleTiming { rule: outcome.rule, duration: outcome.duration, produced, error });
        }

        if !interrupted.is_empty() {
            log::warn!("v{}: analysis budget exceeded, interrupted {interrupted:?}", document.version);
            errors.push(ProofError::AnalysisTimeout { budget_ms: self.budget.as_millis() as u64, interrupted });
        }

        let raw_diagnostics = raw.len();
        let aggregation_start = Instant::now();
        let mut report = aggregate(document.version, raw, self.policy);
        let aggregation = aggregation_start.elapsed();
        if !errors.is_empty() {
            report.status = PassStatus::Partial;
            report.errors = errors;
        }

        let metrics = RunMetrics {
            total: total_start.elapsed(),
            segmentation: segmentation_time,
            rules_total,
            rules: timings,
            aggregation,
            tokens: segmentation.tokens.len(),
            sentences: segmentation.sentences.len(),
            raw_diagnostics,
        };
        let active = active.iter().map(|&id| self.registry.meta(id).id).collect();
        RunResult { report, traits, active, skipped, metrics }
    }

    /// Run the pass and return timing details.
    pub fn run_with_metrics(&self, document: &Document) -> RunResult {
        self.pass(document, || Deadline::after(self.budget))
    }

    /// Convenience wrapper that discards timing details.
    pub fn run(&self, document: &Document) -> DiagnosticReport {
        self.run_with_metrics(document).report
    }

    /// Validate `bytes` as text first; invalid input fails the whole pass.
    pub fn run_bytes(&self, version: u64, bytes: &[u8]) -> DiagnosticReport {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.run(&Document::new(text, version)),
            Err(err) => {
                let err = SegmentationError::from(err);
                log::warn!("v{version}: {err}");
                DiagnosticReport::failed(version, err.into())
            }
        }
    }

    fn run_rule(&self, id: RuleId, ctx: &AnalysisContext<'_>) -> RuleOutcome {
        let rule: &dyn Rule = self.registry.rule(id);
        let start = Instant::now();
        let result = match panic::catch_unwind(AssertUnwindSafe(|| rule.analyze(ctx))) {
            Ok(result) => result,
            Err(payload) => Err(RuleError::Failed(format!("panicked: {}", panic_message(payload.as_ref())))),
        };
        RuleOutcome { rule: rule.id(), result, duration: start.elapsed() }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// First diagnostic whose range does not address `text` on char boundaries.
fn out_of_bounds<'d>(diagnostics: &'d [Diagnostic], text: &str) -> Option<&'d crate::Span> {
    diagnostics.iter().map(|d| &d.range).find(|r| r.start > r.end || text.get(r.start..r.end).is_none())
}

fn dictionary_error(rule: &'static str, dictionary: Option<&Result<Arc<Dictionary>, DictionaryLoadError>>) -> ProofError {
    match dictionary {
        Some(Err(err)) => ProofError::DictionaryLoad(err.clone()),
        _ => ProofError::RuleExecution { rule, message: RuleError::DictionaryUnavailable.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Severity, Span};
    use pretty_assertions::assert_eq;

    struct Fixed(&'static str, Vec<Diagnostic>);

    impl Rule for Fixed {
        fn id(&self) -> &'static str {
            self.0
        }

        fn analyze(&self, _: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
            Ok(self.1.clone())
        }
    }

    struct Panics;

    impl Rule for Panics {
        fn id(&self) -> &'static str {
            "panics"
        }

        fn analyze(&self, _: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
            panic!("boom")
        }
    }

    /// Spins until the deadline passes.
    struct Slow;

    impl Rule for Slow {
        fn id(&self) -> &'static str {
            "slow"
        }

        fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
            loop {
                ctx.deadline.check()?;
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }

    /// Checks the deadline once, after the dictionary is in place.
    struct NeedsDictionary;

    impl Rule for NeedsDictionary {
        fn id(&self) -> &'static str {
            "needs-dictionary"
        }

        fn uses_dictionary(&self) -> bool {
            true
        }

        fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
            ctx.dictionary.ok_or(RuleError::DictionaryUnavailable)?;
            ctx.deadline.check()?;
            Ok(Vec::new())
        }
    }

    fn registry(rules: Vec<Box<dyn Rule>>) -> RuleRegistry {
        let mut registry = RuleRegistry::new();
        for rule in rules {
            registry.register(rule).unwrap();
        }
        registry
    }

    fn flag(rule: &'static str, start: usize, end: usize) -> Diagnostic {
        Diagnostic::new(rule, Severity::Warning, Span::new(start, end), "flagged")
    }

    #[test]
    fn panicking_rule_is_isolated() {
        let registry = registry(vec![Box::new(Panics), Box::new(Fixed("fixed", vec![flag("fixed", 0, 5)]))]);
        let store = DictionaryStore::bundled();
        let run = Runner::new(&registry, &store, &PipelineConfig::default()).run_with_metrics(&Document::new("hello", 4));

        assert_eq!(run.report.status, PassStatus::Partial);
        assert_eq!(run.report.diagnostics.len(), 1);
        assert!(
            matches!(&run.report.errors[..], [ProofError::RuleExecution { rule: "panics", message }] if message.contains("boom"))
        );
        assert_eq!(run.metrics.rules.len(), 2);
        assert!(run.metrics.rules[0].error.is_some());
    }

    #[test]
    fn out_of_range_diagnostics_reject_the_rule() {
        let registry = registry(vec![Box::new(Fixed("bad", vec![flag("bad", 3, 40)]))]);
        let store = DictionaryStore::bundled();
        let report = Runner::new(&registry, &store, &PipelineConfig::default()).run(&Document::new("hello", 1));
        assert!(report.diagnostics.is_empty());
        assert!(matches!(&report.errors[..], [ProofError::RuleExecution { rule: "bad", .. }]));
    }

    #[test]
    fn expired_deadline_keeps_finished_rules() {
        let registry = registry(vec![Box::new(Slow), Box::new(Fixed("fixed", vec![flag("fixed", 0, 5)]))]);
        let store = DictionaryStore::bundled();
        let config = PipelineConfig { analysis_budget_ms: 20, ..Default::default() };
        let report = Runner::new(&registry, &store, &config).run(&Document::new("hello", 2));

        assert_eq!(report.status, PassStatus::Partial);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.errors,
            vec![ProofError::AnalysisTimeout { budget_ms: 20, interrupted: vec!["slow"] }]
        );
    }

    #[test]
    fn broken_dictionary_skips_only_spelling() {
        let registry = RuleRegistry::from_config(&PipelineConfig::default());
        let store = DictionaryStore::from_data("SFX S Y 2\n", "cat\n");
        let report = Runner::new(&registry, &store, &PipelineConfig::default()).run(&Document::new("this is is wrong", 1));

        assert_eq!(report.status, PassStatus::Partial);
        assert!(matches!(&report.errors[..], [ProofError::DictionaryLoad(DictionaryLoadError::Affix { line: 1, .. })]));
        let rules: Vec<_> = report.diagnostics.iter().map(|d| d.rule_id).collect();
        assert_eq!(rules, vec!["capitalization", "repeated-words"]);
    }

    #[test]
    fn budget_starts_after_the_dictionary_loads() {
        let mut words = String::from("200000\n");
        for i in 0..200_000 {
            words.push_str(&format!("w{i}\n"));
        }
        let registry = registry(vec![Box::new(NeedsDictionary)]);
        let store = DictionaryStore::from_data("", words);
        let config = PipelineConfig { analysis_budget_ms: 25, ..Default::default() };

        let report = Runner::new(&registry, &store, &config).run(&Document::new("hello", 1));
        assert!(store.is_loaded());
        assert_eq!(report.status, PassStatus::Complete, "{:?}", report.errors);
    }

    #[test]
    fn dictionary_is_not_loaded_without_a_rule_that_needs_it() {
        let config = PipelineConfig { enabled_rules: crate::RuleSet::CAPITALIZATION, ..Default::default() };
        let registry = RuleRegistry::from_config(&config);
        let store = DictionaryStore::from_data("", "");
        Runner::new(&registry, &store, &config).run(&Document::new("hello there", 1));
        assert!(!store.is_loaded());
    }

    #[test]
    fn invalid_utf8_fails_the_pass() {
        let registry = RuleRegistry::from_config(&PipelineConfig::default());
        let store = DictionaryStore::bundled();
        let report = Runner::new(&registry, &store, &PipelineConfig::default()).run_bytes(9, b"ok \xff\xfe");

        assert_eq!(report.status, PassStatus::Failed);
        assert_eq!(report.document_version, 9);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.errors, vec![ProofError::Segmentation(SegmentationError { valid_up_to: 3 })]);
    }

    #[test]
    fn triggers_skip_rules_that_cannot_fire() {
        let registry = RuleRegistry::from_config(&PipelineConfig::default());
        let store = DictionaryStore::bundled();
        let run = Runner::new(&registry, &store, &PipelineConfig::default()).run_with_metrics(&Document::new("Fine.", 1));
        assert_eq!(run.skipped, vec!["sentence-spacing", "quote-style"]);
        assert_eq!(run.active.len(), 4);
        assert_eq!(run.metrics.rules.len(), 4);
        assert_eq!(run.report.status, PassStatus::Complete);
    }
}
