//! Trigger scanning (input pre-classification).
//!
//! Before any rule runs, the segmented input is classified into a handful of
//! coarse traits. A rule whose declared [`crate::Rule::triggers`] are not all
//! present cannot produce anything and is skipped without being called.
//!
//! ## Design notes
//!
//! - The scan is a single pass over tokens. Keep it that way: the point is to
//!   make the active rule set smaller, not to do the rules' work early.
//! - False positives are fine (the rule simply finds nothing); false negatives
//!   are not, since they silently disable a rule.

use crate::segment::Segmentation;

bitflags::bitflags! {
    /// Coarse features of a segmented document.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputTraits: u8 {
        const HAS_WORDS      = 1 << 0;
        /// Any straight or curly quote character outside a word.
        const HAS_QUOTES     = 1 << 1;
        const MULTI_SENTENCE = 1 << 2;
    }
}

pub(crate) const TRAIT_COUNT: usize = 3;

const QUOTES: &[char] = &['"', '\'', '“', '”', '‘', '’'];

impl InputTraits {
    pub fn scan(segmentation: &Segmentation) -> Self {
        let mut traits = InputTraits::empty();
        if segmentation.sentences.len() > 1 {
            traits |= InputTraits::MULTI_SENTENCE;
        }

        for token in &segmentation.tokens {
            if token.is_word() {
                traits |= InputTraits::HAS_WORDS;
            } else if QUOTES.iter().any(|&q| token.is_punct(q)) {
                traits |= InputTraits::HAS_QUOTES;
            }
            if traits.contains(InputTraits::HAS_WORDS | InputTraits::HAS_QUOTES) {
                break;
            }
        }
        traits
    }

    /// Position of a single-bit trait in [`crate::RuleRegistry`]'s index.
    pub(crate) fn slot(self) -> Option<usize> {
        (self.bits().count_ones() == 1).then(|| self.bits().trailing_zeros() as usize)
    }
}
