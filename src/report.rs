//! Output formatting for doccheck results.
//!
//! Findings are streamed through a [`Reporter`] while files are checked.
//! After the run, either a pretty summary or a single JSON document is
//! written.

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::detect::{EntityKind, Finding, KindCount, Tally};
use crate::score::CoverageScore;

/// Receives findings for enabled kinds, in scan order.
pub trait Reporter {
    fn report(&mut self, finding: &Finding);
}

/// Prints `file:line: message` for each finding.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, finding: &Finding) {
        println!("{}", finding);
    }
}

/// Keeps findings in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub findings: Vec<Finding>,
}

impl Reporter for CollectingReporter {
    fn report(&mut self, finding: &Finding) {
        self.findings.push(finding.clone());
    }
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub inputs: Vec<String>,
    pub findings: Vec<Finding>,
    pub counts: BTreeMap<EntityKind, KindCount>,
    pub reported: u32,
    pub total_missing: u32,
    pub files_checked: u32,
    pub directories_checked: u32,
    pub coverage: CoverageScore,
}

impl JsonReport {
    pub fn new(inputs: &[String], findings: Vec<Finding>, tally: &Tally, score: &CoverageScore) -> Self {
        // Every kind appears, even when nothing of it was seen.
        let counts = EntityKind::ALL
            .iter()
            .map(|kind| (*kind, tally.count(*kind)))
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            inputs: inputs.to_vec(),
            findings,
            counts,
            reported: tally.reported,
            total_missing: tally.total_missing(),
            files_checked: tally.files_checked,
            directories_checked: tally.directories_checked,
            coverage: score.clone(),
        }
    }
}

/// Write results as one JSON document.
pub fn write_json(
    inputs: &[String],
    findings: Vec<Finding>,
    tally: &Tally,
    score: &CoverageScore,
) -> anyhow::Result<()> {
    let report = JsonReport::new(inputs, findings, tally, score);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Per-kind lines of the `Missing:` block, in display order.
const SUMMARY_KINDS: [(EntityKind, &str); 6] = [
    (EntityKind::File, "File doc-comments"),
    (EntityKind::Class, "Class doc-comments"),
    (EntityKind::Interface, "Interface doc-comments"),
    (EntityKind::Function, "Function doc-comments"),
    (EntityKind::ClassConstant, "Class constant doc-comments"),
    (EntityKind::ClassVariable, "Class variable doc-comments"),
];

/// Plain-text `Missing:` block.
pub fn format_missing_summary(tally: &Tally) -> String {
    let mut out = String::from("Missing:\n");
    for (kind, label) in SUMMARY_KINDS {
        out.push_str(&format!("\t{}: {}\n", label, tally.missing(kind)));
    }
    out.push_str(&format!("\tMissing Doc-comments: {}\n", tally.reported));
    out
}

/// Write the end-of-run summary.
pub fn write_pretty(tally: &Tally, score: &CoverageScore) {
    print!("{}", format_missing_summary(tally));
    println!();

    print!("  {}", "Checked: ".dimmed());
    println!(
        "{} files, {} directories",
        tally.files_checked, tally.directories_checked
    );

    print!("  {}", "Coverage: ".dimmed());
    write_colored_percent(score.rounded());
    if let Some(threshold) = score.threshold {
        print!("  {}", format!("(minimum {}%)", threshold).dimmed());
    }
    println!();

    for (kind, percent) in &score.per_kind {
        print!("    {}", format!("{:<16}", kind.label()).dimmed());
        write_colored_percent((percent * 10.0).round() / 10.0);
        println!();
    }

    if score.threshold.is_some() {
        println!();
        if score.passed {
            println!("  {}", "✓ PASS".green());
        } else {
            println!("  {}", "✗ FAIL".red());
        }
    }
}

fn write_colored_percent(p: f64) {
    let text = format!("{}%", p);
    match p {
        p if p >= 90.0 => print!("{}", text.green().bold()),
        p if p >= 75.0 => print!("{}", text.green()),
        p if p >= 50.0 => print!("{}", text.yellow()),
        _ => print!("{}", text.red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score;

    #[test]
    fn test_collecting_reporter_keeps_order() {
        let mut reporter = CollectingReporter::default();
        for line in [3, 1] {
            reporter.report(&Finding {
                kind: EntityKind::Class,
                file: "a.php".to_string(),
                line,
                message: "m".to_string(),
            });
        }
        let lines: Vec<_> = reporter.findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![3, 1]);
    }

    #[test]
    fn test_missing_summary() {
        let mut tally = Tally::new();
        tally.record_missing(EntityKind::Class);
        tally.record_missing(EntityKind::Class);
        tally.record_missing(EntityKind::ClassVariable);
        tally.reported = 2;

        assert_eq!(
            format_missing_summary(&tally),
            "Missing:\n\
             \tFile doc-comments: 0\n\
             \tClass doc-comments: 2\n\
             \tInterface doc-comments: 0\n\
             \tFunction doc-comments: 0\n\
             \tClass constant doc-comments: 0\n\
             \tClass variable doc-comments: 1\n\
             \tMissing Doc-comments: 2\n"
        );
    }

    #[test]
    fn test_json_report_lists_every_kind() {
        let mut tally = Tally::new();
        tally.record_found(EntityKind::Function);
        tally.files_checked = 1;
        let coverage = score::calculate(&tally, None);

        let report = JsonReport::new(&["src".to_string()], Vec::new(), &tally, &coverage);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["counts"].as_object().unwrap().len(), EntityKind::ALL.len());
        assert_eq!(value["counts"]["function"]["found"], 1);
        assert_eq!(value["files_checked"], 1);
        assert_eq!(value["coverage"]["percent"], 100.0);
    }
}
