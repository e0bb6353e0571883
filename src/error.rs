//! Error types.
//!
//! Every failure inside a pass is recovered at the smallest scope it can be:
//! a broken rule is skipped, a missing dictionary disables spelling, a blown
//! time budget keeps what already finished. The recovered failures travel
//! with the report as [`ProofError`]s instead of unwinding to the caller.

use thiserror::Error;

/// Malformed affix or word-list data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictionaryLoadError {
    #[error("affix data, line {line}: {message}")]
    Affix { line: usize, message: String },
    #[error("word list, line {line}: {message}")]
    WordList { line: usize, message: String },
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
}

/// The input is not text the segmenter can work on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("input is not valid UTF-8 (valid up to byte {valid_up_to})")]
pub struct SegmentationError {
    pub valid_up_to: usize,
}

impl From<std::str::Utf8Error> for SegmentationError {
    fn from(err: std::str::Utf8Error) -> Self {
        SegmentationError { valid_up_to: err.valid_up_to() }
    }
}

/// Failure of a single rule during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("no dictionary is available")]
    DictionaryUnavailable,
    /// The pass deadline expired while the rule was running.
    #[error("interrupted by the analysis deadline")]
    Interrupted,
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown rule id `{0}`")]
    UnknownRule(String),
    #[error("rule `{0}` is already registered")]
    DuplicateRule(String),
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure recovered during a pass and reported alongside its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("dictionary unavailable, spelling skipped: {0}")]
    DictionaryLoad(#[from] DictionaryLoadError),
    #[error("rule `{rule}` skipped: {message}")]
    RuleExecution { rule: &'static str, message: String },
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
    #[error("analysis exceeded its {budget_ms} ms budget (interrupted: {})", .interrupted.join(", "))]
    AnalysisTimeout { budget_ms: u64, interrupted: Vec<&'static str> },
}
