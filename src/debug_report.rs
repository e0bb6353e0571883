use proofline::{CheckDetails, Diagnostic, DiagnosticReport, PassStatus, Severity};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_report(text: &str, report: &DiagnosticReport, color: bool) {
    let palette = ansi::Palette::new(color);

    println!("\n{}", palette.paint("━━━ Diagnostics ━━━", ansi::GRAY));
    if report.diagnostics.is_empty() {
        println!("  {}", palette.paint("✓ no issues found", ansi::GREEN));
    }
    for (idx, diagnostic) in report.diagnostics.iter().enumerate() {
        print_diagnostic(idx, text, diagnostic, &palette);
    }

    if !report.errors.is_empty() {
        println!("\n{}", palette.paint("━━━ Errors ━━━", ansi::GRAY));
        for err in &report.errors {
            println!("  {} {}", palette.paint("!", ansi::RED), err);
        }
    }

    let status = match report.status {
        PassStatus::Complete => palette.paint("complete", ansi::GREEN),
        PassStatus::Partial => palette.paint("partial", ansi::YELLOW),
        PassStatus::Failed => palette.paint("failed", ansi::RED),
    };
    println!(
        "\n  {} {}  {} {}",
        palette.dim("status:"),
        status,
        palette.dim("│ issues:"),
        palette.bold(report.diagnostics.len().to_string())
    );
    println!();
}

pub fn print_details(details: &CheckDetails, color: bool) {
    let palette = ansi::Palette::new(color);
    let traits: Vec<&str> = details.traits.iter_names().map(|(name, _)| name).collect();

    println!("\n{}", palette.paint("━━━ Rules ━━━", ansi::GRAY));
    println!("  {} {}", palette.dim("input:"), palette.paint(traits.join(" | "), ansi::BLUE));
    if !details.skipped_rules.is_empty() {
        println!("  {} {}", palette.dim("skipped:"), palette.dim(details.skipped_rules.join(", ")));
    }
    for timing in &details.metrics.rules {
        let outcome = match &timing.error {
            Some(err) => palette.paint(format!("✗ {err}"), ansi::RED),
            None if timing.produced > 0 => palette.paint(format!("✓ {} raw", timing.produced), ansi::YELLOW),
            None => palette.dim("✓ 0 raw"),
        };
        println!(
            "  {:<18} {}  {}",
            palette.paint(timing.rule, ansi::CYAN),
            palette.dim(format!("{:?}", timing.duration)),
            outcome
        );
    }

    let metrics = &details.metrics;
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Segment: {}  │  Rules: {}  │  Aggregate: {}",
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
        palette.dim(format!("{:?}", metrics.segmentation)),
        palette.paint(format!("{:?}", metrics.rules_total), ansi::CYAN),
        palette.dim(format!("{:?}", metrics.aggregation)),
    );
    println!(
        "  {} tokens, {} sentences, {} raw diagnostics",
        metrics.tokens, metrics.sentences, metrics.raw_diagnostics
    );
    println!();
}

fn print_diagnostic(idx: usize, text: &str, diagnostic: &Diagnostic, palette: &ansi::Palette) {
    let (line, column) = line_col(text, diagnostic.range.start);
    let severity = match diagnostic.severity {
        Severity::Error => palette.paint("error", ansi::RED),
        Severity::Warning => palette.paint("warning", ansi::YELLOW),
        Severity::Info => palette.paint("info", ansi::BLUE),
    };
    println!(
        "  {} {} {} {} {}",
        palette.paint(format!("[{idx}]"), ansi::GRAY),
        palette.paint(format!("{line}:{column}"), ansi::YELLOW),
        severity,
        palette.bold(&diagnostic.message),
        palette.dim(format!("({})", diagnostic.rule_id)),
    );

    let excerpt = diagnostic.range.slice(text);
    if diagnostic.suggestions.is_empty() {
        println!("      {} {:?}", palette.dim("text:"), excerpt);
    } else {
        println!(
            "      {} {:?} {} {}",
            palette.dim("text:"),
            excerpt,
            palette.dim("→"),
            palette.paint(diagnostic.suggestions.join(", "), ansi::GREEN)
        );
    }
}

/// 1-based line and character column of a byte offset.
fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}
