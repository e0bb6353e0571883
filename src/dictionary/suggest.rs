//! Replacement candidates by edit distance.
//!
//! Candidates come from suggestible forms within two characters of the
//! query's length, scored with optimal string alignment distance (adjacent
//! transpositions cost one edit). Ranking: distance, then frequency, then
//! alphabetical.
//!
//! Each indexed form carries a 64-bit mask of the characters it contains.
//! Characters present in one word and absent from the other each need their
//! own edit, so a form whose mask differs from the query's by more than
//! [`MAX_DISTANCE`] bits either way is skipped without computing a distance.

use std::cmp::Reverse;
use std::collections::HashMap;

use super::{Casing, Dictionary, casing, title_case};

const MAX_DISTANCE: usize = 2;

/// A lowercased form in the suggestion index.
#[derive(Debug)]
pub(super) struct Candidate {
    text: String,
    mask: u64,
}

/// Lowercased forms bucketed by character count.
pub(super) fn index<'a>(forms: impl IntoIterator<Item = &'a str>) -> HashMap<usize, Vec<Candidate>> {
    let mut lowered: Vec<String> = forms.into_iter().map(str::to_lowercase).collect();
    lowered.sort();
    lowered.dedup();

    let mut by_len: HashMap<usize, Vec<Candidate>> = HashMap::new();
    for text in lowered {
        let mask = char_mask(&text);
        by_len.entry(text.chars().count()).or_default().push(Candidate { text, mask });
    }
    by_len
}

fn char_mask(word: &str) -> u64 {
    word.chars().fold(0, |mask, c| mask | 1 << (c as u32 % 64))
}

fn may_be_within(query: u64, form: u64) -> bool {
    (query & !form).count_ones() as usize <= MAX_DISTANCE && (form & !query).count_ones() as usize <= MAX_DISTANCE
}

pub(super) fn suggest(dict: &Dictionary, word: &str, max: usize) -> Vec<String> {
    if word.is_empty() || max == 0 {
        return Vec::new();
    }
    let query = word.to_lowercase();
    let query_mask = char_mask(&query);
    let len = query.chars().count();

    let mut scored: Vec<(usize, Reverse<u32>, &str)> = Vec::new();
    for bucket in len.saturating_sub(MAX_DISTANCE)..=len + MAX_DISTANCE {
        let Some(candidates) = dict.by_len.get(&bucket) else { continue };
        for candidate in candidates.iter().filter(|c| may_be_within(query_mask, c.mask)) {
            let distance = strsim::osa_distance(&query, &candidate.text);
            // Distance zero is a case-only mismatch ("paris" for "Paris").
            if distance <= MAX_DISTANCE {
                scored.push((distance, Reverse(best_frequency(dict, &candidate.text)), candidate.text.as_str()));
            }
        }
    }
    scored.sort();

    let shape = casing(word);
    let mut out: Vec<String> = Vec::new();
    for (_, _, form) in scored {
        let candidate = restore_case(dict, form, shape);
        if candidate != word && !out.contains(&candidate) {
            out.push(candidate);
        }
        if out.len() == max {
            break;
        }
    }
    out
}

/// Frequency of a lowercased form, looking at the cased spellings too.
fn best_frequency(dict: &Dictionary, lower: &str) -> u32 {
    dict.frequency(lower).max(dict.frequency(&title_case(lower)))
}

/// Recase a lowercased candidate to the query's shape, or to the
/// dictionary's own casing when only that spelling exists.
fn restore_case(dict: &Dictionary, lower: &str, shape: Casing) -> String {
    match shape {
        Casing::Upper => lower.to_uppercase(),
        Casing::Title => title_case(lower),
        Casing::Lower | Casing::Mixed => {
            if dict.forms.contains_key(lower) {
                lower.to_string()
            } else {
                let title = title_case(lower);
                if dict.forms.contains_key(&title) { title } else { lower.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Dictionary;
    use super::{char_mask, may_be_within};
    use pretty_assertions::assert_eq;

    const AFF: &str = "SFX S Y 1\nSFX S 0 s .\n";

    fn dict() -> Dictionary {
        Dictionary::load(AFF, "error/S fr:50\nmirror/S fr:5\nterror/S fr:20\nthe fr:900\nParis\n").unwrap()
    }

    #[test]
    fn closer_candidates_rank_first() {
        assert_eq!(dict().suggest("erors", 3), vec!["errors", "error", "terrors"]);
    }

    #[test]
    fn frequency_breaks_distance_ties() {
        // "errors", "terror" and "mirror" are all two edits from "rror".
        assert_eq!(dict().suggest("rror", 4), vec!["error", "errors", "terror", "mirror"]);
    }

    #[test]
    fn transpositions_count_as_one_edit() {
        assert_eq!(dict().suggest("teh", 1), vec!["the"]);
    }

    #[test]
    fn query_casing_is_preserved() {
        assert_eq!(dict().suggest("Erors", 1), vec!["Errors"]);
        assert_eq!(dict().suggest("TEH", 1), vec!["THE"]);
    }

    #[test]
    fn proper_nouns_keep_their_capital() {
        assert_eq!(dict().suggest("paris", 1), vec!["Paris"]);
        assert_eq!(dict().suggest("parsi", 1), vec!["Paris"]);
    }

    #[test]
    fn limits_and_empty_queries() {
        assert!(dict().suggest("erors", 0).is_empty());
        assert!(dict().suggest("", 5).is_empty());
        assert!(dict().suggest("qqqqqqqqqq", 5).is_empty());
    }

    #[test]
    fn character_masks_never_reject_a_close_form() {
        let pairs = [("teh", "the"), ("rror", "mirror"), ("erors", "terrors"), ("cat", "dog"), ("naïve", "naive")];
        for (query, form) in pairs {
            let close = strsim::osa_distance(query, form) <= 2;
            assert!(!close || may_be_within(char_mask(query), char_mask(form)), "{query} / {form}");
        }
        assert!(!may_be_within(char_mask("abc"), char_mask("xyz")));
    }
}
