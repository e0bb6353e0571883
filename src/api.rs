use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::PipelineConfig;
use crate::dictionary::DictionaryStore;
use crate::engine::{InputTraits, RuleRegistry, RunMetrics, Runner};
use crate::error::ConfigError;
use crate::rules::Rule;
use crate::{DiagnosticReport, Document};

static DEFAULT_PIPELINE: Lazy<Pipeline> = Lazy::new(|| Pipeline::new(PipelineConfig::default()));

/// A configured set of rules plus the dictionary they share.
///
/// A pipeline is immutable once built and can be shared across threads; every
/// call to [`Pipeline::run`] is an independent pass.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    registry: RuleRegistry,
    dictionary: Arc<DictionaryStore>,
}

/// Result from [`check_verbose`] and [`Pipeline::run_verbose`].
///
/// Meant for debugging and performance inspection; [`Pipeline::run`] returns
/// the same report without the extra detail.
#[derive(Debug, Clone)]
pub struct CheckDetails {
    pub report: DiagnosticReport,
    /// Coarse features detected in the input.
    pub traits: InputTraits,
    /// Ids of rules that ran for this input.
    pub active_rules: Vec<&'static str>,
    /// Ids of rules skipped because their triggers were absent.
    pub skipped_rules: Vec<&'static str>,
    pub metrics: RunMetrics,
}

impl Pipeline {
    /// Pipeline over the bundled English dictionary.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_dictionary(config, Arc::new(DictionaryStore::bundled()))
    }

    pub fn with_dictionary(config: PipelineConfig, dictionary: Arc<DictionaryStore>) -> Self {
        let registry = RuleRegistry::from_config(&config);
        log::debug!("pipeline rules: {:?}", registry.ids());
        Pipeline { config, registry, dictionary }
    }

    /// Add a rule alongside the configured built-ins.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), ConfigError> {
        self.registry.register(rule)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.registry.ids()
    }

    pub fn dictionary(&self) -> &Arc<DictionaryStore> {
        &self.dictionary
    }

    fn runner(&self) -> Runner<'_> {
        Runner::new(&self.registry, &self.dictionary, &self.config)
    }

    /// Analyze one document snapshot.
    ///
    /// # Example
    /// ```
    /// use proofline::{Document, Pipeline, PipelineConfig};
    ///
    /// let pipeline = Pipeline::new(PipelineConfig::default());
    /// let report = pipeline.run(&Document::new("This is is fine.", 1));
    /// assert_eq!(report.diagnostics[0].rule_id, "repeated-words");
    /// ```
    pub fn run(&self, document: &Document) -> DiagnosticReport {
        self.runner().run(document)
    }

    /// Analyze raw bytes. Input that is not UTF-8 yields a `Failed` report.
    pub fn run_bytes(&self, version: u64, bytes: &[u8]) -> DiagnosticReport {
        self.runner().run_bytes(version, bytes)
    }

    pub fn run_verbose(&self, document: &Document) -> CheckDetails {
        let run = self.runner().run_with_metrics(document);
        CheckDetails {
            report: run.report,
            traits: run.traits,
            active_rules: run.active,
            skipped_rules: run.skipped,
            metrics: run.metrics,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

/// Check `text` with every built-in rule and the default configuration.
///
/// # Example
/// ```
/// use proofline::check;
///
/// let report = check("this sentence has two errrors.");
/// assert_eq!(report.diagnostics.len(), 2);
/// ```
pub fn check(text: &str) -> DiagnosticReport {
    DEFAULT_PIPELINE.run(&Document::new(text, 0))
}

/// [`check`] plus timing and rule-selection details.
pub fn check_verbose(text: &str) -> CheckDetails {
    DEFAULT_PIPELINE.run_verbose(&Document::new(text, 0))
}
