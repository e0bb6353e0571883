use super::{AnalysisContext, Rule, SENTENCE_SPACING};
use crate::engine::InputTraits;
use crate::error::RuleError;
use crate::{Diagnostic, Severity};

/// Exactly one space between sentences on the same line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSpacing;

impl Rule for SentenceSpacing {
    fn id(&self) -> &'static str {
        SENTENCE_SPACING
    }

    fn triggers(&self) -> InputTraits {
        InputTraits::MULTI_SENTENCE
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let sentences = ctx.sentences();
        let mut out = Vec::new();

        // The gap before the next sentence is the trailing whitespace token of
        // the current one; the last sentence has no successor.
        for sentence in sentences.iter().take(sentences.len().saturating_sub(1)) {
            ctx.deadline.check()?;
            let Some(gap) = ctx.tokens().get(sentence.token_range.end - 1).filter(|t| t.is_whitespace()) else {
                continue;
            };
            if gap.text == " " || gap.text.contains('\n') {
                continue;
            }
            out.push(
                Diagnostic::new(SENTENCE_SPACING, Severity::Info, gap.span, "use a single space between sentences")
                    .with_suggestion(" "),
            );
        }
        Ok(out)
    }
}
