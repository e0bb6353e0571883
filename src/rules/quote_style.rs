use super::{AnalysisContext, QUOTE_STYLE, Rule};
use crate::config::QuoteStyle;
use crate::engine::InputTraits;
use crate::error::RuleError;
use crate::{Diagnostic, Severity, Token, TokenKind};

/// Words that commonly lose their first letters to an apostrophe ('tis, 'em).
const ELIDED: &[&str] = &["tis", "twas", "em", "cause", "til", "bout", "n", "round", "neath"];

/// Quote characters that do not match the preferred style.
///
/// Apostrophes inside words are part of word tokens and never flagged. A
/// leading apostrophe that elides letters ('Tis, '90s) is an apostrophe, not
/// an opening quote.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteStyleRule {
    preferred: QuoteStyle,
}

impl QuoteStyleRule {
    pub fn new(preferred: QuoteStyle) -> Self {
        QuoteStyleRule { preferred }
    }

    fn replacement(&self, quote: char, previous: Option<&Token>, next: Option<&Token>) -> Option<char> {
        match self.preferred {
            QuoteStyle::Straight => match quote {
                '“' | '”' => Some('"'),
                '‘' | '’' => Some('\''),
                _ => None,
            },
            QuoteStyle::Curly => {
                let opening = previous.is_none_or(|prev| {
                    prev.is_whitespace() || ['(', '[', '{', '“', '‘', '—', '–'].iter().any(|&c| prev.is_punct(c))
                });
                match (quote, opening) {
                    ('"', true) => Some('“'),
                    ('"', false) => Some('”'),
                    ('\'', true) if next.is_some_and(is_elided) => Some('’'),
                    ('\'', true) => Some('‘'),
                    ('\'', false) => Some('’'),
                    _ => None,
                }
            }
        }
    }
}

impl Rule for QuoteStyleRule {
    fn id(&self) -> &'static str {
        QUOTE_STYLE
    }

    fn triggers(&self) -> InputTraits {
        InputTraits::HAS_QUOTES
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let tokens = ctx.tokens();
        let mut out = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if token.kind != TokenKind::Punctuation {
                continue;
            }
            let Some(quote) = token.text.chars().next() else { continue };
            let previous = i.checked_sub(1).map(|p| &tokens[p]);
            let Some(fixed) = self.replacement(quote, previous, tokens.get(i + 1)) else { continue };

            let message = match self.preferred {
                QuoteStyle::Straight => "use straight quotes",
                QuoteStyle::Curly => "use curly quotes",
            };
            out.push(Diagnostic::new(QUOTE_STYLE, Severity::Info, token.span, message).with_suggestion(fixed));
        }
        Ok(out)
    }
}

fn is_elided(word: &Token) -> bool {
    word.is_word()
        && (word.text.starts_with(|c: char| c.is_ascii_digit()) || ELIDED.contains(&word.text.to_lowercase().as_str()))
}
