//! Pipeline configuration.
//!
//! The configuration is plain data: it can be built in code, or deserialized
//! from the editor's JSON settings where every field is optional:
//!
//! ```json
//! { "enabledRules": ["spelling", "capitalization"], "preferredQuoteStyle": "curly" }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules;

bitflags::bitflags! {
    /// Set of built-in rules.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RuleSet: u8 {
        const SPELLING          = 1 << 0;
        const REPEATED_WORDS    = 1 << 1;
        const SENTENCE_SPACING  = 1 << 2;
        const QUOTE_STYLE       = 1 << 3;
        const CAPITALIZATION    = 1 << 4;
        const CONTRACTION_USAGE = 1 << 5;
    }
}

const RULE_IDS: [(RuleSet, &str); 6] = [
    (RuleSet::SPELLING, rules::SPELLING),
    (RuleSet::REPEATED_WORDS, rules::REPEATED_WORDS),
    (RuleSet::SENTENCE_SPACING, rules::SENTENCE_SPACING),
    (RuleSet::QUOTE_STYLE, rules::QUOTE_STYLE),
    (RuleSet::CAPITALIZATION, rules::CAPITALIZATION),
    (RuleSet::CONTRACTION_USAGE, rules::CONTRACTION_USAGE),
];

impl RuleSet {
    pub fn from_id(id: &str) -> Option<RuleSet> {
        RULE_IDS.iter().find(|(_, rule_id)| *rule_id == id).map(|(flag, _)| *flag)
    }

    /// Parse a list of rule ids. Unknown ids are rejected.
    pub fn from_ids<I, S>(ids: I) -> Result<RuleSet, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter().try_fold(RuleSet::empty(), |set, id| {
            let id = id.as_ref().trim();
            RuleSet::from_id(id).map(|flag| set | flag).ok_or_else(|| ConfigError::UnknownRule(id.to_string()))
        })
    }

    pub fn ids(self) -> Vec<&'static str> {
        RULE_IDS.iter().filter(|(flag, _)| self.contains(*flag)).map(|(_, id)| *id).collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::all()
    }
}

impl Serialize for RuleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids())
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ids = Vec::<String>::deserialize(deserializer)?;
        RuleSet::from_ids(&ids).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// `"` and `'`.
    #[default]
    Straight,
    /// `“ ”` and `‘ ’`.
    Curly,
}

/// How the aggregator treats two same-severity diagnostics when one range contains the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Keep both unless the ranges are identical.
    #[default]
    KeepBoth,
    /// Keep only the diagnostic with the wider range.
    PreferWider,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub enabled_rules: RuleSet,
    pub preferred_quote_style: QuoteStyle,
    pub max_suggestions_per_diagnostic: usize,
    /// Quiescence window for the scheduler.
    pub debounce_window_ms: u64,
    /// Soft time budget for a single pass.
    pub analysis_budget_ms: u64,
    pub overlap_policy: OverlapPolicy,
    /// Words the spelling rule never flags (proper nouns, product names).
    pub allowed_words: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enabled_rules: RuleSet::all(),
            preferred_quote_style: QuoteStyle::Straight,
            max_suggestions_per_diagnostic: 5,
            debounce_window_ms: 300,
            analysis_budget_ms: 2_000,
            overlap_policy: OverlapPolicy::KeepBoth,
            allowed_words: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }

    pub fn analysis_budget(&self) -> Duration {
        Duration::from_millis(self.analysis_budget_ms)
    }
}
