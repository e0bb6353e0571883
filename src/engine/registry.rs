//! Rule registration and indexing.
//!
//! This is the *static* side of the engine: the rule list for a pipeline and
//! the index that lets the runner pick the rules worth running for an input.
//!
//! 1. **Register** (this module): built-in rules come from the configuration's
//!    [`RuleSet`](crate::RuleSet); extra rules are added with
//!    [`RuleRegistry::register`]. Each rule's triggers are captured once.
//! 2. **Run** (see `runner.rs`): scan the input for [`InputTraits`], select the
//!    matching rules via the index, then run and aggregate.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `RuleRegistry::rules` and `RuleRegistry::metas`;
//!   the two vectors stay aligned.
//! - Rule ids are unique within a registry.
//! - `RuleIndex::by_trait` uses fixed slots (`InputTraits::slot`) rather than a
//!   map.

use super::trigger::{InputTraits, TRAIT_COUNT};
use crate::config::PipelineConfig;
use crate::error::ConfigError;
use crate::rules::{self, Rule};

/// Rule identifier (index into the rules vector).
pub(crate) type RuleId = usize;

/// Facts about a rule captured at registration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RuleMeta {
    pub id: &'static str,
    pub triggers: InputTraits,
    pub uses_dictionary: bool,
}

#[derive(Debug, Default)]
pub(crate) struct RuleIndex {
    pub always_on: Vec<RuleId>,
    pub by_trait: [Vec<RuleId>; TRAIT_COUNT],
}

/// The ordered set of rules one pipeline runs.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    metas: Vec<RuleMeta>,
    index: RuleIndex,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry").field("rules", &self.ids()).finish()
    }
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in rules enabled in `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut registry = Self::new();
        for rule in rules::builtin(config) {
            // Built-in ids are distinct.
            registry.insert(rule);
        }
        registry
    }

    /// Add a rule. Its id must not already be registered.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), ConfigError> {
        let id = rule.id();
        if self.metas.iter().any(|m| m.id == id) {
            return Err(ConfigError::DuplicateRule(id.to_string()));
        }
        self.insert(rule);
        log::debug!("registered rule `{id}`");
        Ok(())
    }

    fn insert(&mut self, rule: Box<dyn Rule>) {
        let id: RuleId = self.rules.len();
        let meta = RuleMeta { id: rule.id(), triggers: rule.triggers(), uses_dictionary: rule.uses_dictionary() };

        if meta.triggers.is_empty() {
            self.index.always_on.push(id);
        } else {
            // A rule is listed under each of its traits; `active` checks the full set.
            for slot in meta.triggers.iter().filter_map(InputTraits::slot) {
                self.index.by_trait[slot].push(id);
            }
        }
        self.rules.push(rule);
        self.metas.push(meta);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule ids in registration order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.metas.iter().map(|m| m.id).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.metas.iter().any(|m| m.id == id)
    }

    pub(crate) fn rule(&self, id: RuleId) -> &dyn Rule {
        self.rules[id].as_ref()
    }

    pub(crate) fn meta(&self, id: RuleId) -> &RuleMeta {
        &self.metas[id]
    }

    /// Rules whose triggers are all present in `traits`, in registration order.
    pub(crate) fn active(&self, traits: InputTraits) -> Vec<RuleId> {
        let mut active = self.index.always_on.clone();
        for slot in traits.iter().filter_map(InputTraits::slot) {
            active.extend(self.index.by_trait[slot].iter().filter(|&&id| traits.contains(self.metas[id].triggers)));
        }
        active.sort_unstable();
        active.dedup();
        active
    }
}
