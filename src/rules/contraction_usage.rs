use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{AnalysisContext, CONTRACTION_USAGE, Rule, capitalize_first};
use crate::engine::InputTraits;
use crate::error::RuleError;
use crate::{Diagnostic, Severity};

/// Bare forms that are never standard words on their own.
static UNCONDITIONAL: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("aint", "ain't"),
        ("arent", "aren't"),
        ("cant", "can't"),
        ("couldnt", "couldn't"),
        ("couldve", "could've"),
        ("didnt", "didn't"),
        ("doesnt", "doesn't"),
        ("dont", "don't"),
        ("hadnt", "hadn't"),
        ("hasnt", "hasn't"),
        ("havent", "haven't"),
        ("heres", "here's"),
        ("hes", "he's"),
        ("im", "I'm"),
        ("isnt", "isn't"),
        ("ive", "I've"),
        ("mustnt", "mustn't"),
        ("neednt", "needn't"),
        ("shant", "shan't"),
        ("shes", "she's"),
        ("shouldnt", "shouldn't"),
        ("shouldve", "should've"),
        ("thats", "that's"),
        ("theres", "there's"),
        ("theyd", "they'd"),
        ("theyll", "they'll"),
        ("theyre", "they're"),
        ("theyve", "they've"),
        ("wasnt", "wasn't"),
        ("werent", "weren't"),
        ("weve", "we've"),
        ("whats", "what's"),
        ("whos", "who's"),
        ("wont", "won't"),
        ("wouldnt", "wouldn't"),
        ("wouldve", "would've"),
        ("youd", "you'd"),
        ("youll", "you'll"),
        ("youre", "you're"),
        ("youve", "you've"),
    ])
});

/// Bare forms that are also real words, flagged only when the next word of
/// the sentence cannot follow the possessive or verb reading.
struct Contextual {
    bare: &'static str,
    fixed: &'static str,
    next_words: &'static [&'static str],
    /// Only at the start of a clause ("lets go", "Well, lets see"), since
    /// "she lets go" is the verb.
    clause_initial: bool,
}

const CONTEXTUAL: &[Contextual] = &[
    Contextual {
        bare: "its",
        fixed: "it's",
        next_words: &["not", "been", "going", "gonna", "got", "a", "an", "the", "so", "too", "really"],
        clause_initial: false,
    },
    Contextual {
        bare: "lets",
        fixed: "let's",
        next_words: &["go", "see", "get", "do", "try", "make", "talk", "be"],
        clause_initial: true,
    },
];

/// Contractions written without their apostrophe.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractionUsage;

impl ContractionUsage {
    fn correction(ctx: &AnalysisContext<'_>, index: usize, lower: &str) -> Option<&'static str> {
        if let Some(fixed) = UNCONDITIONAL.get(lower) {
            return Some(*fixed);
        }

        let contextual = CONTEXTUAL.iter().find(|c| c.bare == lower)?;
        let tokens = ctx.tokens();
        let sentence = tokens[index].sentence_index;
        let in_sentence = |i: usize| tokens[i].is_word() && tokens[i].sentence_index == sentence;

        if contextual.clause_initial && ctx.segmentation.previous_non_whitespace(index).is_some_and(in_sentence) {
            return None;
        }
        let next = ctx.segmentation.next_non_whitespace(index)?;
        let follows = in_sentence(next) && contextual.next_words.contains(&tokens[next].text.to_lowercase().as_str());
        follows.then_some(contextual.fixed)
    }
}

impl Rule for ContractionUsage {
    fn id(&self) -> &'static str {
        CONTRACTION_USAGE
    }

    fn triggers(&self) -> InputTraits {
        InputTraits::HAS_WORDS
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();

        for (index, token) in ctx.segmentation.words() {
            ctx.deadline.check()?;
            let lower = token.text.to_lowercase();
            let Some(fixed) = Self::correction(ctx, index, &lower) else { continue };

            let suggestion = if token.text.starts_with(char::is_uppercase) { capitalize_first(fixed) } else { fixed.to_string() };
            out.push(
                Diagnostic::new(
                    CONTRACTION_USAGE,
                    Severity::Warning,
                    token.span,
                    format!("`{}` is missing its apostrophe", token.text),
                )
                .with_suggestion(suggestion),
            );
        }
        Ok(out)
    }
}
