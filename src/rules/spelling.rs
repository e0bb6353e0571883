use std::collections::{HashMap, HashSet};

use super::{AnalysisContext, Rule, SPELLING};
use crate::engine::InputTraits;
use crate::error::RuleError;
use crate::{Diagnostic, Severity};

/// Flags words the dictionary does not know.
#[derive(Debug, Clone, Default)]
pub struct Spelling {
    /// Lowercased.
    allowed: HashSet<String>,
    max_suggestions: usize,
}

impl Spelling {
    pub fn new(allowed_words: &[String], max_suggestions: usize) -> Self {
        let allowed = allowed_words.iter().map(|w| w.to_lowercase()).collect();
        Spelling { allowed, max_suggestions }
    }

    fn is_exempt(&self, word: &str) -> bool {
        word.chars().any(|c| c.is_numeric())
            || regex!(r"^[A-Z]{2,}s?$").is_match(word)
            || self.allowed.contains(&word.to_lowercase())
    }
}

impl Rule for Spelling {
    fn id(&self) -> &'static str {
        SPELLING
    }

    fn triggers(&self) -> InputTraits {
        InputTraits::HAS_WORDS
    }

    fn uses_dictionary(&self) -> bool {
        true
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let dictionary = ctx.dictionary.ok_or(RuleError::DictionaryUnavailable)?;
        let mut out = Vec::new();
        // Suggestions per distinct spelling; `None` when the word is fine.
        let mut seen: HashMap<&str, Option<Vec<String>>> = HashMap::new();

        for (_, token) in ctx.segmentation.words() {
            ctx.deadline.check()?;
            let verdict = seen.entry(token.text.as_str()).or_insert_with(|| {
                let known = self.is_exempt(&token.text) || dictionary.is_known(&token.text);
                (!known).then(|| dictionary.suggest(&token.text, self.max_suggestions))
            });
            let Some(suggestions) = verdict else { continue };
            out.push(
                Diagnostic::new(SPELLING, Severity::Warning, token.span, format!("unknown word `{}`", token.text))
                    .with_suggestions(suggestions.clone()),
            );
        }
        Ok(out)
    }
}
