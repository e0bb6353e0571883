//! Rule-based proofreading pipeline.
//!
//! ```text
//! text ── segment ──▶ tokens + sentences ──▶ rules (parallel) ──▶ aggregate ──▶ DiagnosticReport
//!                                              │
//!                                              └─ Dictionary (shared, read-only)
//! ```
//!
//! [`Pipeline`] runs a single pass synchronously; [`scheduler::Scheduler`]
//! wraps it behind a debounced, version-tagged contract for interactive
//! editors.

use serde::{Serialize, Serializer};

#[macro_use]
mod macros;
mod api;
pub mod config;
pub mod dictionary;
mod engine;
pub mod error;
pub mod rules;
pub mod scheduler;
pub mod segment;

pub use api::{CheckDetails, Pipeline, check, check_verbose};
pub use config::{OverlapPolicy, PipelineConfig, QuoteStyle, RuleSet};
pub use dictionary::{Dictionary, DictionaryEntry, DictionaryStore};
pub use engine::{InputTraits, RuleRegistry, RuleTiming, RunMetrics, aggregate};
pub use error::{ConfigError, DictionaryLoadError, ProofError, RuleError, SegmentationError};
pub use rules::{AnalysisContext, Deadline, Rule};
pub use segment::{Segmentation, segment, segment_bytes};

// --- Spans -------------------------------------------------------------------

/// Half-open byte range into a document's text.
///
/// Both ends always sit on `char` boundaries, so `&text[span.start..span.end]`
/// is valid for the text the span was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} > end {end}");
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `other` lies entirely within `self` (equal spans contain each other).
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn intersects(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Slice `text` by this span.
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }

    /// Convert byte offsets into character (Unicode scalar) offsets of `text`.
    pub fn to_char_range(&self, text: &str) -> Span {
        let start = text[..self.start].chars().count();
        let len = text[self.start..self.end].chars().count();
        Span { start, end: start + len }
    }
}

// --- Documents and tokens ----------------------------------------------------

/// Immutable snapshot of the editor's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    /// Incremented by the caller on every edit.
    pub version: u64,
}

impl Document {
    pub fn new(text: impl Into<String>, version: u64) -> Self {
        Document { text: text.into(), version }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Word,
    Punctuation,
    Whitespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// Index of the sentence containing this token.
    pub sentence_index: usize,
}

impl Token {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// True for a punctuation token holding exactly `c`.
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punctuation && self.text.starts_with(c) && self.text.len() == c.len_utf8()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub index: usize,
    pub span: Span,
    /// Indices into the token list (half-open, never empty).
    pub token_range: std::ops::Range<usize>,
}

// --- Diagnostics -------------------------------------------------------------

/// Ordered so that `Error > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One reported issue. Created by a rule and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub rule_id: &'static str,
    pub severity: Severity,
    pub range: Span,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn new(rule_id: &'static str, severity: Severity, range: Span, message: impl Into<String>) -> Self {
        Diagnostic { rule_id, severity, range, message: message.into(), suggestions: Vec::new() }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassStatus {
    /// Every active rule ran to completion.
    Complete,
    /// Some rules were skipped or interrupted; the diagnostics that are present are valid.
    Partial,
    /// The input could not be analysed at all.
    Failed,
}

/// Final, ordered result of one analysis pass.
///
/// Diagnostics are sorted by `range.start`, then `rule_id`, and no two share
/// the same `(range, rule_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub document_version: u64,
    pub diagnostics: Vec<Diagnostic>,
    pub status: PassStatus,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<ProofError>,
}

impl DiagnosticReport {
    pub fn empty(document_version: u64) -> Self {
        DiagnosticReport { document_version, diagnostics: Vec::new(), status: PassStatus::Complete, errors: Vec::new() }
    }

    pub(crate) fn failed(document_version: u64, error: ProofError) -> Self {
        DiagnosticReport { document_version, diagnostics: Vec::new(), status: PassStatus::Failed, errors: vec![error] }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Copy of this report with every range expressed in character offsets of `text`.
    pub fn with_char_offsets(&self, text: &str) -> DiagnosticReport {
        let diagnostics = self
            .diagnostics
            .iter()
            .map(|d| Diagnostic { range: d.range.to_char_range(text), ..d.clone() })
            .collect();
        DiagnosticReport { diagnostics, ..self.clone() }
    }
}

fn serialize_errors<S: Serializer>(errors: &[ProofError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}
