//! Spelling dictionary.
//!
//! A [`Dictionary`] is built once from affix rules and a word list, expanded
//! eagerly into the set of accepted surface forms, and shared read-only
//! behind an `Arc`. [`DictionaryStore`] owns the lazy, once-only load.

mod affix;
mod suggest;
mod word_list;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};

use crate::error::DictionaryLoadError;
use affix::AffixTable;

/// One line of the word list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub stem: String,
    /// Affix flags that apply to the stem.
    pub flags: Vec<char>,
    /// Relative frequency; higher ranks first among suggestions.
    pub frequency: u32,
}

/// What the word list says about one accepted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Form {
    frequency: u32,
    /// Every entry producing this form is `KEEPCASE`.
    keep_case: bool,
    /// Some entry producing this form may be suggested.
    suggest: bool,
}

impl Form {
    fn merge(&mut self, other: Form) {
        self.frequency = self.frequency.max(other.frequency);
        self.keep_case &= other.keep_case;
        self.suggest |= other.suggest;
    }
}

#[derive(Debug)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    /// Every accepted form.
    forms: HashMap<String, Form>,
    /// Lowercased suggestible forms bucketed by character count.
    by_len: HashMap<usize, Vec<suggest::Candidate>>,
}

static BUNDLED: Lazy<Result<Arc<Dictionary>, DictionaryLoadError>> = Lazy::new(|| {
    let dictionary = Dictionary::load(include_str!("../../data/en_US.aff"), include_str!("../../data/en_US.dic"))?;
    log::debug!("bundled dictionary: {} entries, {} forms", dictionary.len(), dictionary.forms.len());
    Ok(Arc::new(dictionary))
});

impl Dictionary {
    /// Build a dictionary from the text of an affix file and a word list.
    pub fn load(affix: &str, words: &str) -> Result<Dictionary, DictionaryLoadError> {
        let table = AffixTable::parse(affix)?;
        let entries = word_list::parse(words, &table)?;
        let marks = table.word_flags;

        let mut forms: HashMap<String, Form> = HashMap::new();
        let mut forbidden: HashSet<String> = HashSet::new();
        for entry in &entries {
            let has = |flag: Option<char>| flag.is_some_and(|f| entry.flags.contains(&f));
            if has(marks.only_in_compound) {
                continue;
            }
            let mut generated = table.expand(&entry.stem, &entry.flags);
            if has(marks.need_affix) {
                generated.retain(|form| *form != entry.stem);
            }
            if has(marks.forbidden) {
                forbidden.extend(generated);
                continue;
            }

            let form = Form {
                frequency: entry.frequency,
                keep_case: has(marks.keep_case),
                suggest: !has(marks.no_suggest),
            };
            for text in generated {
                forms.entry(text).and_modify(|known| known.merge(form)).or_insert(form);
            }
        }
        forms.retain(|text, _| !forbidden.contains(text));

        let by_len = suggest::index(forms.iter().filter(|(_, form)| form.suggest).map(|(text, _)| text.as_str()));
        Ok(Dictionary { entries, forms, by_len })
    }

    pub fn load_files(affix: impl AsRef<Path>, words: impl AsRef<Path>) -> Result<Dictionary, DictionaryLoadError> {
        let affix = read(affix.as_ref())?;
        let words = read(words.as_ref())?;
        Self::load(&affix, &words)
    }

    /// The English dictionary compiled into the crate, parsed on first use.
    pub fn bundled() -> Result<Arc<Dictionary>, DictionaryLoadError> {
        BUNDLED.clone()
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Number of word-list entries (not expanded forms).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `word` is accepted.
    ///
    /// Matching is exact, except that a capitalized or all-caps word is also
    /// accepted when its lowercase (or, for all-caps, title-case) form is
    /// known and not marked `KEEPCASE`. `’` is treated as `'`.
    pub fn is_known(&self, word: &str) -> bool {
        let word = normalize(word);
        if word.is_empty() {
            return false;
        }
        if self.forms.contains_key(word.as_str()) {
            return true;
        }

        let recased = |form: &str| self.forms.get(form).is_some_and(|f| !f.keep_case);
        match casing(&word) {
            Casing::Title => recased(&word.to_lowercase()),
            Casing::Upper => {
                let lower = word.to_lowercase();
                recased(&lower) || recased(&title_case(&lower))
            }
            Casing::Lower | Casing::Mixed => false,
        }
    }

    /// Up to `max` replacement candidates for `word`, best first.
    pub fn suggest(&self, word: &str, max: usize) -> Vec<String> {
        suggest::suggest(self, &normalize(word), max)
    }

    fn frequency(&self, form: &str) -> u32 {
        self.forms.get(form).map_or(0, |f| f.frequency)
    }
}

fn read(path: &Path) -> Result<String, DictionaryLoadError> {
    std::fs::read_to_string(path)
        .map_err(|err| DictionaryLoadError::Io { path: path.display().to_string(), message: err.to_string() })
}

fn normalize(word: &str) -> String {
    word.replace('\u{2019}', "'")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Casing {
    Lower,
    Title,
    Upper,
    Mixed,
}

fn casing(word: &str) -> Casing {
    let mut letters = word.chars().filter(|c| c.is_alphabetic());
    let Some(first) = letters.next() else { return Casing::Lower };
    let rest: Vec<char> = letters.collect();

    if first.is_lowercase() {
        if rest.iter().all(|c| c.is_lowercase()) { Casing::Lower } else { Casing::Mixed }
    } else if rest.iter().all(|c| c.is_lowercase()) {
        Casing::Title
    } else if rest.iter().all(|c| c.is_uppercase()) {
        Casing::Upper
    } else {
        Casing::Mixed
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
enum Source {
    Bundled,
    Inline { affix: String, words: String },
    Files { affix: PathBuf, words: PathBuf },
}

/// Lazily loads a dictionary exactly once and shares it afterwards.
///
/// Concurrent first calls to [`DictionaryStore::get`] block until the single
/// load finishes; a failed load is remembered and returned to every caller.
#[derive(Debug)]
pub struct DictionaryStore {
    source: Source,
    cell: OnceCell<Result<Arc<Dictionary>, DictionaryLoadError>>,
}

impl DictionaryStore {
    pub fn bundled() -> Self {
        Self::with_source(Source::Bundled)
    }

    pub fn from_data(affix: impl Into<String>, words: impl Into<String>) -> Self {
        Self::with_source(Source::Inline { affix: affix.into(), words: words.into() })
    }

    pub fn from_files(affix: impl Into<PathBuf>, words: impl Into<PathBuf>) -> Self {
        Self::with_source(Source::Files { affix: affix.into(), words: words.into() })
    }

    fn with_source(source: Source) -> Self {
        Self { source, cell: OnceCell::new() }
    }

    pub fn get(&self) -> Result<Arc<Dictionary>, DictionaryLoadError> {
        self.cell.get_or_init(|| self.load()).clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    fn load(&self) -> Result<Arc<Dictionary>, DictionaryLoadError> {
        log::debug!("loading dictionary from {:?}", self.source_name());
        let loaded = match &self.source {
            Source::Bundled => return Dictionary::bundled(),
            Source::Inline { affix, words } => Dictionary::load(affix, words),
            Source::Files { affix, words } => Dictionary::load_files(affix, words),
        };
        if let Err(err) = &loaded {
            log::warn!("dictionary load failed: {err}");
        }
        loaded.map(Arc::new)
    }

    fn source_name(&self) -> String {
        match &self.source {
            Source::Bundled => "bundled".to_string(),
            Source::Inline { .. } => "inline data".to_string(),
            Source::Files { words, .. } => words.display().to_string(),
        }
    }
}

impl Default for DictionaryStore {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const AFF: &str = "SFX S Y 2\nSFX S 0 es [sxz]\nSFX S 0 s [^sxz]\n";

    #[test]
    fn bundled_dictionary_loads() {
        let dict = Dictionary::bundled().unwrap();
        assert_eq!(dict.len(), 50241);
        for word in [
            "the", "sentence", "errors", "checker", "believe", "butter", "I", "its", "tests", "can’t", "I'm", "park",
            "yesterday", "friends", "walked", "quickly", "bought", "bread", "Hello", "Paris", "NASA",
        ] {
            assert!(dict.is_known(word), "{word}");
        }
        for word in ["errrors", "teh", "paris", "recieve"] {
            assert!(!dict.is_known(word), "{word}");
        }
    }

    #[test]
    fn hunspell_word_flags_load_and_apply() {
        let aff = "SET UTF-8\nTRY esianrtolcdugmphbyfvkwz\nONLYINCOMPOUND c\nCOMPOUNDRULE 1\nCOMPOUNDRULE n*1t\n\
                   NOSUGGEST !\nKEEPCASE K\nNEEDAFFIX N\nFORBIDDENWORD X\nSFX S Y 1\nSFX S 0 s .\n";
        let dic = "8\n1st/p\ncat/S\nshit/S!\nssl/K\nth/c\nwalk/NS\ncats/X\nchat/S\n";
        let dict = Dictionary::load(aff, dic).unwrap();

        assert!(dict.is_known("1st"));
        assert!(dict.is_known("shits"));
        assert!(dict.is_known("ssl"));
        assert!(!dict.is_known("Ssl"));
        assert!(!dict.is_known("SSL"));
        assert!(!dict.is_known("th"));
        assert!(dict.is_known("walks"));
        assert!(!dict.is_known("walk"));
        assert!(dict.is_known("cat"));
        assert!(!dict.is_known("cats"));

        assert_eq!(dict.suggest("shat", 5), vec!["chat", "cat", "chats"]);
        assert!(dict.suggest("shitt", 5).is_empty());
    }

    #[test]
    fn casing_variants_of_known_words() {
        let dict = Dictionary::load(AFF, "cat/S\nParis\n").unwrap();
        assert!(dict.is_known("cat"));
        assert!(dict.is_known("Cat"));
        assert!(dict.is_known("CATS"));
        assert!(!dict.is_known("cAt"));

        assert!(dict.is_known("Paris"));
        assert!(dict.is_known("PARIS"));
        assert!(!dict.is_known("paris"));
        assert!(!dict.is_known(""));
    }

    #[test]
    fn curly_apostrophes_match_straight_entries() {
        let dict = Dictionary::load(AFF, "can't\n").unwrap();
        assert!(dict.is_known("can\u{2019}t"));
    }

    #[test]
    fn suggests_the_bundled_correction_first() {
        let dict = Dictionary::bundled().unwrap();
        let suggestions = dict.suggest("errrors", 5);
        assert_eq!(suggestions.first().map(String::as_str), Some("errors"));
        assert!(suggestions.len() <= 5);
    }

    #[test]
    fn load_errors_carry_line_numbers() {
        let err = Dictionary::load("SFX S Y 1\n", "cat/S\n").unwrap_err();
        assert!(matches!(err, DictionaryLoadError::Affix { line: 1, .. }), "{err}");

        let err = Dictionary::load(AFF, "2\ncat/S\n").unwrap_err();
        assert!(matches!(err, DictionaryLoadError::WordList { line: 1, .. }), "{err}");
    }

    #[test]
    fn missing_files_are_io_errors() {
        let err = Dictionary::load_files("/nonexistent/en.aff", "/nonexistent/en.dic").unwrap_err();
        assert!(matches!(err, DictionaryLoadError::Io { ref path, .. } if path.ends_with("en.aff")), "{err}");
    }

    #[test]
    fn store_loads_once_under_concurrency() {
        let store = Arc::new(DictionaryStore::from_data(AFF, "cat/S\ndog/S\n"));
        let seen = Arc::new(AtomicUsize::new(0));
        assert!(!store.is_loaded());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let seen = Arc::clone(&seen);
                std::thread::spawn(move || {
                    let dict = store.get().unwrap();
                    seen.fetch_add(1, Ordering::SeqCst);
                    Arc::as_ptr(&dict) as usize
                })
            })
            .collect();
        let ptrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(seen.load(Ordering::SeqCst), 8);
        assert!(ptrs.windows(2).all(|w| w[0] == w[1]), "every caller shares one instance");
        assert!(store.is_loaded());
    }

    #[test]
    fn store_remembers_failures() {
        let store = DictionaryStore::from_data("SFX S Y 1\n", "cat\n");
        let first = store.get().unwrap_err();
        assert_eq!(store.get().unwrap_err(), first);
    }
}
