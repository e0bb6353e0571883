//! Word-list (`.dic`) parsing.
//!
//! An optional first line holds the entry count. Each following line is
//! `word[/FLAGS] [fr:<frequency>] [field:value ...]`; blank lines and `#`
//! comments are skipped. Flags no directive defines and morphological fields
//! other than `fr:` are ignored.

use std::collections::HashSet;

use super::DictionaryEntry;
use super::affix::AffixTable;
use crate::error::DictionaryLoadError;

/// Frequency given to entries that do not state one.
pub(crate) const DEFAULT_FREQUENCY: u32 = 0;

pub(crate) fn parse(data: &str, affixes: &AffixTable) -> Result<Vec<DictionaryEntry>, DictionaryLoadError> {
    let mut entries = Vec::new();
    let mut declared = None;
    let mut undefined = HashSet::new();

    for (line, text) in data.lines().enumerate().map(|(idx, line)| (idx + 1, line.trim())) {
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        match text.parse::<usize>() {
            Ok(count) if declared.is_none() && entries.is_empty() => declared = Some((line, count)),
            _ => {
                let entry = parse_entry(line, text)?;
                for &flag in &entry.flags {
                    if !affixes.defines(flag) && undefined.insert(flag) {
                        log::debug!("word list, line {line}: ignoring undefined flag `{flag}`");
                    }
                }
                entries.push(entry);
            }
        }
    }

    match declared {
        Some((line, count)) if count != entries.len() => Err(DictionaryLoadError::WordList {
            line,
            message: format!("header declares {count} entries but {} were found", entries.len()),
        }),
        _ => Ok(entries),
    }
}

fn parse_entry(line: usize, text: &str) -> Result<DictionaryEntry, DictionaryLoadError> {
    let err = |message: String| DictionaryLoadError::WordList { line, message };

    let mut fields = text.split_whitespace();
    let word_field = fields.next().unwrap_or_default();
    let (stem, flags) = match word_field.split_once('/') {
        Some((stem, flags)) => (stem, flags.chars().collect::<Vec<_>>()),
        None => (word_field, Vec::new()),
    };
    if stem.is_empty() {
        return Err(err("empty word".to_string()));
    }

    let mut frequency = DEFAULT_FREQUENCY;
    for value in fields.filter_map(|field| field.strip_prefix("fr:")) {
        frequency = value.parse().map_err(|_| err(format!("invalid frequency `{value}`")))?;
    }

    Ok(DictionaryEntry { stem: stem.to_string(), flags, frequency })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn affixes() -> AffixTable {
        AffixTable::parse("SFX S Y 1\nSFX S 0 s .\n").unwrap()
    }

    #[test]
    fn parses_flags_and_frequencies() {
        let entries = parse("3\ncat/S fr:40\n# pets\ndog/S\nthe fr:900\n", &affixes()).unwrap();
        assert_eq!(
            entries,
            vec![
                DictionaryEntry { stem: "cat".into(), flags: vec!['S'], frequency: 40 },
                DictionaryEntry { stem: "dog".into(), flags: vec!['S'], frequency: DEFAULT_FREQUENCY },
                DictionaryEntry { stem: "the".into(), flags: vec![], frequency: 900 },
            ]
        );
    }

    #[test]
    fn count_header_is_optional() {
        let entries = parse("cat\ndog\n", &affixes()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn mismatched_count_is_an_error() {
        let err = parse("3\ncat\ndog\n", &affixes()).unwrap_err();
        assert_eq!(
            err,
            DictionaryLoadError::WordList { line: 1, message: "header declares 3 entries but 2 were found".into() }
        );
    }

    #[test]
    fn undefined_flags_and_extra_fields_are_kept_but_ignored() {
        let entries = parse("2\n1st/p\ndog/SQ po:noun fr:7 st:dog\n", &affixes()).unwrap();
        assert_eq!(
            entries,
            vec![
                DictionaryEntry { stem: "1st".into(), flags: vec!['p'], frequency: DEFAULT_FREQUENCY },
                DictionaryEntry { stem: "dog".into(), flags: vec!['S', 'Q'], frequency: 7 },
            ]
        );
    }

    #[test]
    fn malformed_entries_report_their_line() {
        let empty = parse("/S\n", &affixes()).unwrap_err();
        assert!(matches!(empty, DictionaryLoadError::WordList { line: 1, .. }), "{empty}");

        let frequency = parse("cat\n\nbird fr:lots\n", &affixes()).unwrap_err();
        assert!(matches!(frequency, DictionaryLoadError::WordList { line: 3, .. }), "{frequency}");
    }
}
