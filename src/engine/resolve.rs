//! Diagnostic aggregation.
//!
//! Rules produce raw diagnostics independently; aggregation turns them into
//! the final report:
//!
//! ```text
//! raw ──▶ collapse (range, rule_id) duplicates ──▶ drop overlapped ──▶ sort ──▶ report
//!          highest severity wins                    see `dominates`
//! ```
//!
//! The output depends only on the multiset of raw diagnostics, never on the
//! order in which rules finished.

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

use super::dedup::DiagnosticKey;
use crate::config::OverlapPolicy;
use crate::{Diagnostic, DiagnosticReport};

/// Whether keeping `winner` means `loser` must go.
///
/// ```text
/// one range contains the other?  no  ──▶ keep both
///            │ yes
/// severities differ?             yes ──▶ higher severity wins
///            │ no
/// identical ranges?              yes ──▶ smaller rule_id wins
///            │ no
/// PreferWider?                   yes ──▶ wider range wins, else keep both
/// ```
fn dominates(winner: &Diagnostic, loser: &Diagnostic, policy: OverlapPolicy) -> bool {
    let (w, l) = (&winner.range, &loser.range);
    if !w.contains(l) && !l.contains(w) {
        return false;
    }
    if winner.severity != loser.severity {
        return winner.severity > loser.severity;
    }
    if w == l {
        return winner.rule_id < loser.rule_id;
    }
    policy == OverlapPolicy::PreferWider && w.contains(l)
}

/// Order in which survivors are chosen: anything that can dominate another
/// diagnostic sorts before it.
fn strength(a: &Diagnostic, b: &Diagnostic) -> Ordering {
    (Reverse(a.severity), Reverse(a.range.len()), a.rule_id, a.range.start)
        .cmp(&(Reverse(b.severity), Reverse(b.range.len()), b.rule_id, b.range.start))
}

/// Final report ordering: start, rule id, then the remaining fields.
fn report_order(a: &Diagnostic, b: &Diagnostic) -> Ordering {
    (a.range.start, a.rule_id, a.range.end, a.severity, &a.message)
        .cmp(&(b.range.start, b.rule_id, b.range.end, b.severity, &b.message))
}

/// Merge raw rule output into an ordered, conflict-free report.
pub fn aggregate(document_version: u64, raw: Vec<Diagnostic>, policy: OverlapPolicy) -> DiagnosticReport {
    let raw_count = raw.len();

    let mut unique: HashMap<DiagnosticKey, Diagnostic> = HashMap::with_capacity(raw.len());
    for diagnostic in raw {
        let key = DiagnosticKey::from_diagnostic(&diagnostic);
        // Highest severity first, then the smallest message.
        let replace = unique.get(&key).is_none_or(|kept| {
            (Reverse(diagnostic.severity), &diagnostic.message, &diagnostic.suggestions)
                < (Reverse(kept.severity), &kept.message, &kept.suggestions)
        });
        if replace {
            unique.insert(key, diagnostic);
        }
    }

    let mut candidates: Vec<Diagnostic> = unique.into_values().collect();
    candidates.sort_by(strength);

    let mut kept: Vec<Diagnostic> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !kept.iter().any(|k| dominates(k, &candidate, policy)) {
            kept.push(candidate);
        }
    }
    kept.sort_by(report_order);

    log::debug!("aggregated {raw_count} raw diagnostics into {}", kept.len());
    DiagnosticReport { diagnostics: kept, ..DiagnosticReport::empty(document_version) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Severity, Span};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn diag(rule_id: &'static str, severity: Severity, start: usize, end: usize) -> Diagnostic {
        Diagnostic::new(rule_id, severity, Span::new(start, end), format!("{rule_id} {start}..{end}"))
    }

    fn summary(report: &DiagnosticReport) -> Vec<(&'static str, usize, usize)> {
        report.diagnostics.iter().map(|d| (d.rule_id, d.range.start, d.range.end)).collect()
    }

    #[test]
    fn sorts_by_start_then_rule_id() {
        let raw = vec![
            diag("spelling", Severity::Warning, 10, 14),
            diag("capitalization", Severity::Warning, 0, 4),
            diag("b-rule", Severity::Warning, 10, 12),
            diag("a-rule", Severity::Info, 20, 22),
        ];
        let report = aggregate(7, raw, OverlapPolicy::KeepBoth);
        assert_eq!(report.document_version, 7);
        assert_eq!(
            summary(&report),
            vec![("capitalization", 0, 4), ("b-rule", 10, 12), ("spelling", 10, 14), ("a-rule", 20, 22)]
        );
    }

    #[test]
    fn exact_duplicates_keep_the_highest_severity() {
        let raw = vec![diag("x", Severity::Info, 0, 3), diag("x", Severity::Error, 0, 3), diag("x", Severity::Warning, 0, 3)];
        let report = aggregate(1, raw, OverlapPolicy::KeepBoth);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn higher_severity_drops_contained_or_containing_lower() {
        let raw = vec![diag("wide", Severity::Info, 0, 10), diag("narrow", Severity::Warning, 2, 5)];
        assert_eq!(summary(&aggregate(1, raw, OverlapPolicy::KeepBoth)), vec![("narrow", 2, 5)]);

        let raw = vec![diag("wide", Severity::Error, 0, 10), diag("narrow", Severity::Warning, 2, 5)];
        assert_eq!(summary(&aggregate(1, raw, OverlapPolicy::KeepBoth)), vec![("wide", 0, 10)]);
    }

    #[test]
    fn equal_severity_follows_the_overlap_policy() {
        let raw = || vec![diag("wide", Severity::Warning, 0, 10), diag("narrow", Severity::Warning, 2, 5)];
        assert_eq!(summary(&aggregate(1, raw(), OverlapPolicy::KeepBoth)), vec![("wide", 0, 10), ("narrow", 2, 5)]);
        assert_eq!(summary(&aggregate(1, raw(), OverlapPolicy::PreferWider)), vec![("wide", 0, 10)]);
    }

    #[test]
    fn identical_ranges_keep_the_smaller_rule_id() {
        let raw = vec![diag("spelling", Severity::Warning, 0, 4), diag("contraction-usage", Severity::Warning, 0, 4)];
        assert_eq!(summary(&aggregate(1, raw, OverlapPolicy::KeepBoth)), vec![("contraction-usage", 0, 4)]);
    }

    #[test]
    fn partial_and_disjoint_overlaps_are_kept() {
        let raw = vec![
            diag("a", Severity::Error, 0, 5),
            diag("b", Severity::Info, 3, 8),
            diag("c", Severity::Info, 5, 9),
            diag("d", Severity::Warning, 20, 25),
        ];
        assert_eq!(aggregate(1, raw, OverlapPolicy::PreferWider).diagnostics.len(), 4);
    }

    #[test]
    fn a_dropped_diagnostic_does_not_drop_others() {
        // `wide` loses to `inner`; `other` sits inside `wide` only and survives.
        let raw = vec![
            diag("wide", Severity::Warning, 0, 20),
            diag("inner", Severity::Error, 2, 4),
            diag("other", Severity::Info, 10, 12),
        ];
        assert_eq!(summary(&aggregate(1, raw, OverlapPolicy::KeepBoth)), vec![("inner", 2, 4), ("other", 10, 12)]);
    }

    #[test]
    fn empty_input_is_an_empty_complete_report() {
        let report = aggregate(3, Vec::new(), OverlapPolicy::KeepBoth);
        assert_eq!(report, DiagnosticReport::empty(3));
    }

    fn arb_diagnostic() -> impl Strategy<Value = Diagnostic> {
        let rules = prop_oneof![Just("alpha"), Just("beta"), Just("gamma")];
        let severity = prop_oneof![Just(Severity::Info), Just(Severity::Warning), Just(Severity::Error)];
        (rules, severity, 0usize..30, 0usize..8).prop_map(|(rule, severity, start, len)| diag(rule, severity, start, start + len))
    }

    proptest! {
        #[test]
        fn output_is_sorted_unique_and_order_independent(
            raw in proptest::collection::vec(arb_diagnostic(), 0..40),
            wider in any::<bool>(),
        ) {
            let policy = if wider { OverlapPolicy::PreferWider } else { OverlapPolicy::KeepBoth };
            let report = aggregate(1, raw.clone(), policy);

            for pair in report.diagnostics.windows(2) {
                prop_assert!((pair[0].range.start, pair[0].rule_id) <= (pair[1].range.start, pair[1].rule_id));
                prop_assert!((pair[0].range, pair[0].rule_id) != (pair[1].range, pair[1].rule_id));
            }
            for a in &report.diagnostics {
                for b in &report.diagnostics {
                    prop_assert!(!dominates(a, b, policy) || std::ptr::eq(a, b));
                }
            }

            let mut reversed = raw;
            reversed.reverse();
            prop_assert_eq!(aggregate(1, reversed, policy), report);
        }
    }
}
