use super::{AnalysisContext, CAPITALIZATION, Rule, capitalize_first};
use crate::engine::InputTraits;
use crate::error::RuleError;
use crate::{Diagnostic, Severity, Token};

/// Lowercase sentence starts and the lowercase pronoun "i".
#[derive(Debug, Clone, Copy, Default)]
pub struct Capitalization;

fn is_lowercase_pronoun(word: &str) -> bool {
    regex!(r"^i(?:['’](?:m|ve|ll|d))?$").is_match(word)
}

fn starts_lowercase(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_alphabetic() && c.is_lowercase())
}

fn diagnostic(token: &Token, message: &str) -> Diagnostic {
    Diagnostic::new(CAPITALIZATION, Severity::Warning, token.span, message).with_suggestion(capitalize_first(&token.text))
}

impl Rule for Capitalization {
    fn id(&self) -> &'static str {
        CAPITALIZATION
    }

    fn triggers(&self) -> InputTraits {
        InputTraits::HAS_WORDS
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let segmentation = ctx.segmentation;
        let mut out = Vec::new();
        // Ascending, since sentences are ordered.
        let mut sentence_starts = Vec::with_capacity(segmentation.sentences.len());

        for sentence in ctx.sentences() {
            ctx.deadline.check()?;
            let Some(first) = segmentation.first_word(sentence) else { continue };
            sentence_starts.push(first);
            let token = &segmentation.tokens[first];
            if starts_lowercase(&token.text) {
                out.push(diagnostic(token, "sentences start with a capital letter"));
            }
        }

        for (index, token) in segmentation.words() {
            if is_lowercase_pronoun(&token.text) && sentence_starts.binary_search(&index).is_err() {
                out.push(diagnostic(token, "the pronoun `I` is always capitalized"));
            }
        }
        Ok(out)
    }
}
