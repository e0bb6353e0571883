//! Affix rules: parsing and expansion.
//!
//! The accepted format is the single-character-flag subset of Hunspell's
//! `.aff` files:
//!
//! ```text
//! SFX S Y 2              <- header: kind, flag, cross product, rule count
//! SFX S   y  ies [^aeiou]y   <- rule: strip, add, condition
//! SFX S   0  s   [aeiou]y
//! ```
//!
//! `0` means "nothing" for strip/add. A condition is a sequence of `.`
//! (any character), literal characters, `[abc]` and `[^abc]`, matched against
//! the end of the stem for suffixes and its start for prefixes.
//!
//! Flags can also be bound to word properties (`NOSUGGEST`, `KEEPCASE`,
//! `NEEDAFFIX`, `ONLYINCOMPOUND`, `FORBIDDENWORD`) or to compounding
//! (`COMPOUNDFLAG`, `COMPOUNDRULE`). Compounds are never formed; their flags
//! are only recognized. Every other directive (`TRY`, `REP`, `KEY`, ...) is
//! skipped.

use std::collections::{HashMap, HashSet};

use crate::error::DictionaryLoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AffixKind {
    Prefix,
    Suffix,
}

impl AffixKind {
    fn parse(directive: &str) -> Option<AffixKind> {
        match directive {
            "PFX" => Some(AffixKind::Prefix),
            "SFX" => Some(AffixKind::Suffix),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CondItem {
    Any,
    Char(char),
    OneOf(Vec<char>),
    NoneOf(Vec<char>),
}

impl CondItem {
    fn matches(&self, c: char) -> bool {
        match self {
            CondItem::Any => true,
            CondItem::Char(expected) => *expected == c,
            CondItem::OneOf(set) => set.contains(&c),
            CondItem::NoneOf(set) => !set.contains(&c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Condition(Vec<CondItem>);

impl Condition {
    fn parse(pattern: &str) -> Result<Condition, String> {
        if pattern == "." {
            return Ok(Condition(Vec::new()));
        }

        let mut items = Vec::new();
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            let item = match c {
                '.' => CondItem::Any,
                '[' => {
                    let mut negate = false;
                    let mut set = Vec::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '^' if set.is_empty() && !negate => negate = true,
                            ']' => {
                                closed = true;
                                break;
                            }
                            c => set.push(c),
                        }
                    }
                    if !closed || set.is_empty() {
                        return Err(format!("malformed condition `{pattern}`"));
                    }
                    if negate { CondItem::NoneOf(set) } else { CondItem::OneOf(set) }
                }
                ']' => return Err(format!("malformed condition `{pattern}`")),
                c => CondItem::Char(c),
            };
            items.push(item);
        }
        Ok(Condition(items))
    }

    fn matches_start(&self, word: &[char]) -> bool {
        word.len() >= self.0.len() && self.0.iter().zip(word).all(|(item, &c)| item.matches(c))
    }

    fn matches_end(&self, word: &[char]) -> bool {
        word.len() >= self.0.len() && self.0.iter().zip(&word[word.len() - self.0.len()..]).all(|(item, &c)| item.matches(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AffixRule {
    strip: String,
    add: String,
    condition: Condition,
}

/// All rules sharing one flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AffixClass {
    pub flag: char,
    pub kind: AffixKind,
    /// Whether this class combines with affixes of the other kind.
    pub cross_product: bool,
    rules: Vec<AffixRule>,
}

impl AffixClass {
    /// Every form produced by applying one of this class's rules to `word`.
    pub fn apply(&self, word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        self.rules.iter().filter_map(|rule| self.apply_rule(rule, word, &chars)).collect()
    }

    fn apply_rule(&self, rule: &AffixRule, word: &str, chars: &[char]) -> Option<String> {
        match self.kind {
            AffixKind::Suffix => {
                if !rule.condition.matches_end(chars) {
                    return None;
                }
                let base = word.strip_suffix(rule.strip.as_str())?;
                (!base.is_empty()).then(|| format!("{base}{}", rule.add))
            }
            AffixKind::Prefix => {
                if !rule.condition.matches_start(chars) {
                    return None;
                }
                let base = word.strip_prefix(rule.strip.as_str())?;
                (!base.is_empty()).then(|| format!("{}{base}", rule.add))
            }
        }
    }
}

/// A header whose rule lines are still being read.
struct OpenClass {
    class: AffixClass,
    remaining: usize,
    line: usize,
}

impl OpenClass {
    fn push(&mut self, fields: &[&str]) -> Result<(), String> {
        let expected = || {
            format!("expected {} more rule(s) for flag `{}`, found `{}`", self.remaining, self.class.flag, fields.join(" "))
        };
        if fields.len() < 4
            || AffixKind::parse(fields[0]) != Some(self.class.kind)
            || parse_flag(fields[1]) != Some(self.class.flag)
        {
            return Err(expected());
        }

        let strip = if fields[2] == "0" { String::new() } else { fields[2].to_string() };
        // Continuation flags (`add/FLAGS`) are not supported and are dropped.
        let add = match fields[3].split('/').next() {
            Some("0") | None => String::new(),
            Some(add) => add.to_string(),
        };
        let condition = Condition::parse(fields.get(4).copied().unwrap_or("."))?;

        self.class.rules.push(AffixRule { strip, add, condition });
        self.remaining -= 1;
        Ok(())
    }
}

fn parse_flag(field: &str) -> Option<char> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(flag), None) => Some(flag),
        _ => None,
    }
}

/// Flags that mark how a word list entry is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WordFlags {
    /// Accepted but never offered as a suggestion.
    pub no_suggest: Option<char>,
    /// Accepted only in the exact case listed.
    pub keep_case: Option<char>,
    /// The bare stem is not a word; its affixed forms are.
    pub need_affix: Option<char>,
    /// Only valid inside compounds.
    pub only_in_compound: Option<char>,
    /// Never accepted, even when another entry generates the form.
    pub forbidden: Option<char>,
}

impl WordFlags {
    fn contains(&self, flag: char) -> bool {
        [self.no_suggest, self.keep_case, self.need_affix, self.only_in_compound, self.forbidden].contains(&Some(flag))
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AffixTable {
    classes: HashMap<char, AffixClass>,
    pub word_flags: WordFlags,
    compound_flags: HashSet<char>,
}

impl AffixTable {
    pub fn parse(data: &str) -> Result<AffixTable, DictionaryLoadError> {
        let mut table = AffixTable::default();
        let mut open: Option<OpenClass> = None;
        let mut compound_rules = 0usize;

        for (idx, raw) in data.lines().enumerate() {
            let line = idx + 1;
            let err = |message: String| DictionaryLoadError::Affix { line, message };
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = trimmed.split_whitespace().collect();

            if let Some(mut pending) = open.take() {
                pending.push(&fields).map_err(err)?;
                if pending.remaining == 0 {
                    table.insert(pending.class).map_err(err)?;
                } else {
                    open = Some(pending);
                }
                continue;
            }

            match fields[0] {
                "SET" => match fields.get(1) {
                    Some(enc) if enc.eq_ignore_ascii_case("UTF-8") => {}
                    Some(enc) => return Err(err(format!("unsupported encoding `{enc}`"))),
                    None => return Err(err("SET needs an encoding".to_string())),
                },
                "FLAG" => match fields.get(1) {
                    Some(&"UTF-8") | Some(&"char") => {}
                    Some(kind) => return Err(err(format!("unsupported flag type `{kind}`"))),
                    None => return Err(err("FLAG needs a type".to_string())),
                },
                directive @ ("NOSUGGEST" | "KEEPCASE" | "NEEDAFFIX" | "ONLYINCOMPOUND" | "FORBIDDENWORD") => {
                    let flag = fields
                        .get(1)
                        .and_then(|f| parse_flag(f))
                        .ok_or_else(|| err(format!("{directive} needs a one-character flag")))?;
                    let slot = match directive {
                        "NOSUGGEST" => &mut table.word_flags.no_suggest,
                        "KEEPCASE" => &mut table.word_flags.keep_case,
                        "NEEDAFFIX" => &mut table.word_flags.need_affix,
                        "ONLYINCOMPOUND" => &mut table.word_flags.only_in_compound,
                        _ => &mut table.word_flags.forbidden,
                    };
                    *slot = Some(flag);
                }
                "COMPOUNDFLAG" => {
                    let flag = fields
                        .get(1)
                        .and_then(|f| parse_flag(f))
                        .ok_or_else(|| err("COMPOUNDFLAG needs a one-character flag".to_string()))?;
                    table.compound_flags.insert(flag);
                }
                "COMPOUNDRULE" => {
                    let Some(value) = fields.get(1) else {
                        return Err(err("COMPOUNDRULE needs a count or a pattern".to_string()));
                    };
                    match value.parse::<usize>() {
                        Ok(count) if compound_rules == 0 => compound_rules = count,
                        _ => {
                            // A pattern: flags with `*`, `?` and parentheses.
                            table.compound_flags.extend(value.chars().filter(|c| !matches!(c, '*' | '?' | '(' | ')')));
                            compound_rules = compound_rules.saturating_sub(1);
                        }
                    }
                }
                directive @ ("PFX" | "SFX") => {
                    let (Some(kind), [_, flag, cross, count]) = (AffixKind::parse(directive), fields.as_slice()) else {
                        return Err(err(format!("malformed {directive} header `{trimmed}`")));
                    };
                    let flag = parse_flag(flag).ok_or_else(|| err(format!("flag `{flag}` must be one character")))?;
                    let cross_product = match *cross {
                        "Y" => true,
                        "N" => false,
                        other => return Err(err(format!("cross product must be Y or N, got `{other}`"))),
                    };
                    let count: usize = count.parse().map_err(|_| err(format!("invalid rule count `{count}`")))?;

                    let class = AffixClass { flag, kind, cross_product, rules: Vec::new() };
                    if count == 0 {
                        table.insert(class).map_err(err)?;
                    } else {
                        open = Some(OpenClass { class, remaining: count, line });
                    }
                }
                _ => {}
            }
        }

        if let Some(pending) = open {
            return Err(DictionaryLoadError::Affix {
                line: pending.line,
                message: format!("flag `{}` is missing {} rule line(s)", pending.class.flag, pending.remaining),
            });
        }
        Ok(table)
    }

    fn insert(&mut self, class: AffixClass) -> Result<(), String> {
        if self.classes.contains_key(&class.flag) {
            return Err(format!("flag `{}` is defined twice", class.flag));
        }
        self.classes.insert(class.flag, class);
        Ok(())
    }

    pub fn has_flag(&self, flag: char) -> bool {
        self.classes.contains_key(&flag)
    }

    /// Whether any directive gives `flag` a meaning.
    pub fn defines(&self, flag: char) -> bool {
        self.has_flag(flag) || self.word_flags.contains(flag) || self.compound_flags.contains(&flag)
    }

    /// `stem` plus every form its `flags` generate, sorted and deduplicated.
    pub fn expand(&self, stem: &str, flags: &[char]) -> Vec<String> {
        let mut forms = vec![stem.to_string()];
        let classes: Vec<&AffixClass> = flags.iter().filter_map(|f| self.classes.get(f)).collect();

        let mut cross_suffixed = Vec::new();
        for class in classes.iter().filter(|c| c.kind == AffixKind::Suffix) {
            for form in class.apply(stem) {
                if class.cross_product {
                    cross_suffixed.push(form.clone());
                }
                forms.push(form);
            }
        }
        for class in classes.iter().filter(|c| c.kind == AffixKind::Prefix) {
            forms.extend(class.apply(stem));
            if class.cross_product {
                for suffixed in &cross_suffixed {
                    forms.extend(class.apply(suffixed));
                }
            }
        }

        forms.sort();
        forms.dedup();
        forms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AFF: &str = "\
SET UTF-8
# plurals
SFX S Y 3
SFX S   y     ies        [^aeiou]y
SFX S   0     es         [cs]h
SFX S   0     s          [^hy]

PFX U Y 1
PFX U   0     un         .

SFX D N 1
SFX D   0     ed         [^e]
";

    #[test]
    fn expands_suffixes_by_condition() {
        let table = AffixTable::parse(AFF).unwrap();
        assert_eq!(table.expand("story", &['S']), vec!["stories", "story"]);
        assert_eq!(table.expand("church", &['S']), vec!["church", "churches"]);
        assert_eq!(table.expand("cat", &['S']), vec!["cat", "cats"]);
    }

    #[test]
    fn cross_product_combines_prefix_and_suffix() {
        let table = AffixTable::parse(AFF).unwrap();
        assert_eq!(table.expand("lock", &['U', 'S']), vec!["lock", "locks", "unlock", "unlocks"]);
        // `D` does not allow cross products, so no "unlocked".
        assert_eq!(table.expand("lock", &['U', 'D']), vec!["lock", "locked", "unlock"]);
    }

    #[test]
    fn unknown_flags_are_ignored_during_expansion() {
        let table = AffixTable::parse(AFF).unwrap();
        assert!(table.has_flag('S'));
        assert!(!table.has_flag('Q'));
        assert_eq!(table.expand("word", &['Q']), vec!["word"]);
    }

    #[test]
    fn reports_missing_rule_lines_at_the_header() {
        let err = AffixTable::parse("SFX S Y 2\nSFX S 0 s .\n").unwrap_err();
        assert_eq!(
            err,
            DictionaryLoadError::Affix { line: 1, message: "flag `S` is missing 1 rule line(s)".to_string() }
        );
    }

    #[test]
    fn rejects_rules_for_the_wrong_flag() {
        let err = AffixTable::parse("SFX S Y 2\nSFX S 0 s .\nSFX D 0 ed .\n").unwrap_err();
        assert!(matches!(err, DictionaryLoadError::Affix { line: 3, .. }), "{err}");
    }

    #[test]
    fn rejects_malformed_headers_and_conditions() {
        assert!(matches!(AffixTable::parse("SFX S maybe 1\n"), Err(DictionaryLoadError::Affix { line: 1, .. })));
        assert!(matches!(AffixTable::parse("PFX A Y many\n"), Err(DictionaryLoadError::Affix { line: 1, .. })));
        assert!(matches!(
            AffixTable::parse("SFX S Y 1\nSFX S 0 s [abc\n"),
            Err(DictionaryLoadError::Affix { line: 2, .. })
        ));
        assert!(matches!(AffixTable::parse("FLAG long\n"), Err(DictionaryLoadError::Affix { line: 1, .. })));
    }

    #[test]
    fn word_and_compound_directives_define_flags() {
        let table = AffixTable::parse(
            "TRY esianrtolcdugmphbyfvkwz\nCOMPOUNDMIN 1\nONLYINCOMPOUND c\nCOMPOUNDRULE 2\nCOMPOUNDRULE n*1t\n\
             COMPOUNDRULE n*mp\nNOSUGGEST !\nKEEPCASE K\nNEEDAFFIX N\nFORBIDDENWORD X\nCOMPOUNDFLAG W\n",
        )
        .unwrap();
        assert_eq!(
            table.word_flags,
            WordFlags {
                no_suggest: Some('!'),
                keep_case: Some('K'),
                need_affix: Some('N'),
                only_in_compound: Some('c'),
                forbidden: Some('X'),
            }
        );
        for flag in ['n', '1', 't', 'm', 'p', 'c', '!', 'W'] {
            assert!(table.defines(flag), "{flag}");
        }
        assert!(!table.defines('*'));
        assert!(!table.defines('Q'));
        assert!(!table.has_flag('n'));
    }

    #[test]
    fn word_flag_directives_need_a_flag() {
        assert!(matches!(AffixTable::parse("NOSUGGEST\n"), Err(DictionaryLoadError::Affix { line: 1, .. })));
        assert!(matches!(AffixTable::parse("\nKEEPCASE KK\n"), Err(DictionaryLoadError::Affix { line: 2, .. })));
    }

    #[test]
    fn duplicate_flags_are_rejected() {
        let err = AffixTable::parse("SFX S Y 0\nPFX S Y 0\n").unwrap_err();
        assert_eq!(err, DictionaryLoadError::Affix { line: 2, message: "flag `S` is defined twice".to_string() });
    }
}
