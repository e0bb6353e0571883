//! Proofreading rules.
//!
//! Every rule is a stateless analyzer over one segmented document. Rules never
//! see each other's output and may run in any order (or in parallel); the
//! aggregator is the only place their diagnostics meet.
//!
//! ## Adding a rule
//!
//! 1. Implement [`Rule`] in a new file under `rules/`.
//! 2. Give it a stable kebab-case id (the constants below).
//! 3. Either add a [`RuleSet`] bit and construct it in [`builtin`], or register
//!    it at runtime with [`crate::RuleRegistry::register`].

use std::time::{Duration, Instant};

use crate::config::{PipelineConfig, RuleSet};
use crate::dictionary::Dictionary;
use crate::engine::InputTraits;
use crate::error::RuleError;
use crate::segment::Segmentation;
use crate::{Diagnostic, Sentence, Token};

#[path = "rules/capitalization.rs"]
mod capitalization;
#[path = "rules/contraction_usage.rs"]
mod contraction_usage;
#[path = "rules/quote_style.rs"]
mod quote_style;
#[path = "rules/repeated_words.rs"]
mod repeated_words;
#[path = "rules/sentence_spacing.rs"]
mod sentence_spacing;
#[path = "rules/spelling.rs"]
mod spelling;


pub use capitalization::Capitalization;
pub use contraction_usage::ContractionUsage;
pub use quote_style::QuoteStyleRule;
pub use repeated_words::RepeatedWords;
pub use sentence_spacing::SentenceSpacing;
pub use spelling::Spelling;

pub const SPELLING: &str = "spelling";
pub const REPEATED_WORDS: &str = "repeated-words";
pub const SENTENCE_SPACING: &str = "sentence-spacing";
pub const QUOTE_STYLE: &str = "quote-style";
pub const CAPITALIZATION: &str = "capitalization";
pub const CONTRACTION_USAGE: &str = "contraction-usage";

/// A single proofreading check.
pub trait Rule: Send + Sync {
    /// Stable identifier reported on every diagnostic of this rule.
    fn id(&self) -> &'static str;

    /// Input traits that must all be present for the rule to be able to fire.
    /// The default (no traits) always runs.
    fn triggers(&self) -> InputTraits {
        InputTraits::empty()
    }

    /// Whether the runner must load the dictionary before running this rule.
    fn uses_dictionary(&self) -> bool {
        false
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError>;
}

/// Soft time limit shared by every rule of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn none() -> Self {
        Deadline(None)
    }

    pub fn after(budget: Duration) -> Self {
        Deadline(Instant::now().checked_add(budget))
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// `Err(RuleError::Interrupted)` once the deadline has passed.
    pub fn check(&self) -> Result<(), RuleError> {
        if self.is_expired() { Err(RuleError::Interrupted) } else { Ok(()) }
    }
}

/// Read-only view of one document handed to every rule.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub text: &'a str,
    pub segmentation: &'a Segmentation,
    /// `None` when the dictionary failed to load.
    pub dictionary: Option<&'a Dictionary>,
    pub deadline: Deadline,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(text: &'a str, segmentation: &'a Segmentation) -> Self {
        AnalysisContext { text, segmentation, dictionary: None, deadline: Deadline::none() }
    }

    pub fn with_dictionary(mut self, dictionary: Option<&'a Dictionary>) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn tokens(&self) -> &'a [Token] {
        &self.segmentation.tokens
    }

    pub fn sentences(&self) -> &'a [Sentence] {
        &self.segmentation.sentences
    }
}

/// Instantiate the built-in rules enabled in `config`.
pub fn builtin(config: &PipelineConfig) -> Vec<Box<dyn Rule>> {
    let enabled = config.enabled_rules;
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();

    if enabled.contains(RuleSet::SPELLING) {
        rules.push(Box::new(Spelling::new(&config.allowed_words, config.max_suggestions_per_diagnostic)));
    }
    if enabled.contains(RuleSet::REPEATED_WORDS) {
        rules.push(Box::new(RepeatedWords));
    }
    if enabled.contains(RuleSet::SENTENCE_SPACING) {
        rules.push(Box::new(SentenceSpacing));
    }
    if enabled.contains(RuleSet::QUOTE_STYLE) {
        rules.push(Box::new(QuoteStyleRule::new(config.preferred_quote_style)));
    }
    if enabled.contains(RuleSet::CAPITALIZATION) {
        rules.push(Box::new(Capitalization));
    }
    if enabled.contains(RuleSet::CONTRACTION_USAGE) {
        rules.push(Box::new(ContractionUsage));
    }
    rules
}

/// `word` with its first character upper-cased.
pub(crate) fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
