//! Deduplication keys for diagnostics.
//!
//! Two diagnostics from the same rule over the same range are the same
//! finding, whatever their message. The aggregator collapses them on this
//! key before any overlap resolution.
//!
//! Two different rules flagging the same range are distinct findings; overlap
//! resolution decides between them.

use crate::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct DiagnosticKey {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) rule_id: &'static str,
}

impl DiagnosticKey {
    pub(crate) fn from_diagnostic(diagnostic: &Diagnostic) -> Self {
        DiagnosticKey { start: diagnostic.range.start, end: diagnostic.range.end, rule_id: diagnostic.rule_id }
    }
}
