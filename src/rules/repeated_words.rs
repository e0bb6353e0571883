use super::{AnalysisContext, REPEATED_WORDS, Rule};
use crate::engine::InputTraits;
use crate::error::RuleError;
use crate::{Diagnostic, Severity, Span, Token, TokenKind};

/// "the the": the same word twice in a row, separated only by whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatedWords;

impl Rule for RepeatedWords {
    fn id(&self) -> &'static str {
        REPEATED_WORDS
    }

    fn triggers(&self) -> InputTraits {
        InputTraits::HAS_WORDS
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();

        for sentence in ctx.sentences() {
            ctx.deadline.check()?;
            let mut previous: Option<&Token> = None;
            for token in ctx.segmentation.sentence_tokens(sentence) {
                match token.kind {
                    TokenKind::Whitespace => {}
                    TokenKind::Punctuation => previous = None,
                    TokenKind::Word => {
                        if let Some(prev) = previous.filter(|p| p.text.to_lowercase() == token.text.to_lowercase()) {
                            out.push(
                                Diagnostic::new(
                                    REPEATED_WORDS,
                                    Severity::Warning,
                                    Span::new(prev.span.start, token.span.end),
                                    format!("`{}` is repeated", prev.text),
                                )
                                .with_suggestion(prev.text.clone()),
                            );
                        }
                        previous = Some(token);
                    }
                }
            }
        }
        Ok(out)
    }
}
