//! Sentence and token segmentation.
//!
//! Segmentation is two passes over the input:
//!
//! ```text
//! "Dr. Lee left.  Then"  ──tokenize──▶  [Dr][.][ ][Lee][ ][left][.][  ][Then]
//!                        ──boundaries─▶  [Dr . Lee left .  ] [Then]
//!                                         ^ "Dr." is an abbreviation, not a boundary
//! ```
//!
//! Tokens cover the input exactly (concatenating their texts gives the input
//! back), and sentences cover the tokens exactly. The whitespace between two
//! sentences belongs to the earlier one.

use crate::error::SegmentationError;
use crate::{Sentence, Span, Token, TokenKind};

/// Lowercased words that end in a non-terminal period. Single-letter
/// initials (`J. Smith`, `e.g.`) are handled separately.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "mx", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "inc", "ltd", "co", "corp", "no",
    "approx", "dept", "est", "fig", "gen", "gov", "rev", "sen", "rep", "capt", "col", "lt", "sgt", "jan", "feb",
    "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

const TERMINALS: &[char] = &['.', '!', '?', '…'];
const CLOSERS: &[char] = &['"', '\'', '”', '’', ')', ']', '»'];
const OPENERS: &[char] = &['"', '\'', '“', '‘', '(', '[', '«'];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub tokens: Vec<Token>,
    pub sentences: Vec<Sentence>,
}

impl Segmentation {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn sentence_tokens(&self, sentence: &Sentence) -> &[Token] {
        &self.tokens[sentence.token_range.clone()]
    }

    /// Index of the first word token of `sentence`.
    pub fn first_word(&self, sentence: &Sentence) -> Option<usize> {
        sentence.token_range.clone().find(|&i| self.tokens[i].is_word())
    }

    /// Index of the next non-whitespace token after `index`.
    pub fn next_non_whitespace(&self, index: usize) -> Option<usize> {
        (index + 1..self.tokens.len()).find(|&i| !self.tokens[i].is_whitespace())
    }

    /// Index of the closest non-whitespace token before `index`.
    pub fn previous_non_whitespace(&self, index: usize) -> Option<usize> {
        (0..index.min(self.tokens.len())).rev().find(|&i| !self.tokens[i].is_whitespace())
    }

    pub fn words(&self) -> impl Iterator<Item = (usize, &Token)> {
        self.tokens.iter().enumerate().filter(|(_, t)| t.is_word())
    }
}

/// Split `text` into tokens and sentences.
pub fn segment(text: &str) -> Segmentation {
    let raw = tokenize(text);
    let breaks = sentence_breaks(text, &raw);

    let mut tokens = Vec::with_capacity(raw.len());
    let mut sentences = Vec::with_capacity(breaks.len());
    let mut first = 0;
    for (index, &end) in breaks.iter().enumerate() {
        for &(kind, span) in &raw[first..end] {
            tokens.push(Token { kind, text: span.slice(text).to_string(), span, sentence_index: index });
        }
        sentences.push(Sentence { index, span: Span::new(raw[first].1.start, raw[end - 1].1.end), token_range: first..end });
        first = end;
    }

    log::trace!("segmented {} bytes into {} tokens, {} sentences", text.len(), tokens.len(), sentences.len());
    Segmentation { tokens, sentences }
}

/// Validate `bytes` as UTF-8 text, then [`segment`] it.
pub fn segment_bytes(bytes: &[u8]) -> Result<Segmentation, SegmentationError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(segment(text))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '’'
}

/// Words, single punctuation characters, and whitespace runs.
fn tokenize(text: &str) -> Vec<(TokenKind, Span)> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let kind = if c.is_whitespace() {
            while chars.next_if(|&(_, next)| next.is_whitespace()).is_some() {}
            TokenKind::Whitespace
        } else if is_word_char(c) {
            loop {
                match chars.peek() {
                    Some(&(_, next)) if is_word_char(next) => {
                        chars.next();
                    }
                    // An apostrophe stays inside the word only when a word character follows it.
                    Some(&(i, next))
                        if is_apostrophe(next) && text[i + next.len_utf8()..].chars().next().is_some_and(is_word_char) =>
                    {
                        chars.next();
                    }
                    _ => break,
                }
            }
            TokenKind::Word
        } else {
            TokenKind::Punctuation
        };
        let end = chars.peek().map_or(text.len(), |&(i, _)| i);
        out.push((kind, Span::new(start, end)));
    }

    out
}

fn is_one_of(text: &str, kind: TokenKind, span: Span, set: &[char]) -> bool {
    kind == TokenKind::Punctuation && span.slice(text).chars().next().is_some_and(|c| set.contains(&c))
}

fn is_paragraph_break(ws: &str) -> bool {
    ws.matches('\n').count() >= 2
}

/// Exclusive token indices at which sentences end. The last entry is always `tokens.len()`.
fn sentence_breaks(text: &str, tokens: &[(TokenKind, Span)]) -> Vec<usize> {
    let mut breaks = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let (kind, span) = tokens[i];

        if kind == TokenKind::Whitespace {
            if i > 0 && i + 1 < tokens.len() && is_paragraph_break(span.slice(text)) {
                breaks.push(i + 1);
            }
            i += 1;
            continue;
        }
        if !is_one_of(text, kind, span, TERMINALS) {
            i += 1;
            continue;
        }

        let run_start = i;
        let mut j = i;
        while j < tokens.len() && is_one_of(text, tokens[j].0, tokens[j].1, TERMINALS) {
            j += 1;
        }
        while j < tokens.len() && is_one_of(text, tokens[j].0, tokens[j].1, CLOSERS) {
            j += 1;
        }
        if j == run_start + 1 && is_abbreviation(text, tokens, run_start) {
            i = j;
            continue;
        }

        match tokens.get(j) {
            Some(&(TokenKind::Whitespace, ws)) => {
                let next = j + 1;
                if next < tokens.len() && (starts_sentence(text, tokens, next) || is_paragraph_break(ws.slice(text))) {
                    breaks.push(next);
                }
                i = j + 1;
            }
            _ => i = j,
        }
    }

    if !tokens.is_empty() {
        breaks.push(tokens.len());
    }
    breaks
}

/// A lone `.` directly after a known abbreviation or a single-letter initial.
fn is_abbreviation(text: &str, tokens: &[(TokenKind, Span)], period: usize) -> bool {
    if period == 0 || tokens[period].1.slice(text) != "." {
        return false;
    }
    let (kind, span) = tokens[period - 1];
    if kind != TokenKind::Word {
        return false;
    }
    let word = span.slice(text);
    let mut chars = word.chars();
    let single_letter = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic());
    single_letter || ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

/// Uppercase letter, optionally behind an opening quote or bracket.
fn starts_sentence(text: &str, tokens: &[(TokenKind, Span)], index: usize) -> bool {
    let starts_upper = |i: usize| {
        tokens.get(i).is_some_and(|&(_, span)| span.slice(text).chars().next().is_some_and(char::is_uppercase))
    };
    let (kind, span) = tokens[index];
    starts_upper(index) || (is_one_of(text, kind, span, OPENERS) && starts_upper(index + 1))
}
