//! Command-line interface for doccheck.

use clap::{Args, Parser};
use std::path::PathBuf;

use crate::config::{ConfigFile, ReportConfig};
use crate::detect::{Checker, EntityKind};
use crate::report::{self, CollectingReporter, ConsoleReporter, Reporter};
use crate::score::{self, CoverageScore};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

const NO_INPUT: &str =
    "Error: No input file was given. Use -f to specify a file or directory to check.";

/// Find PHP classes, interfaces, functions, properties and constants that
/// have no doc-comment.
#[derive(Parser, Debug)]
#[command(name = "doccheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File or directory to check (repeatable)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Print the report configuration
    #[arg(short = 'c', long)]
    pub print_config: bool,

    /// Path to config YAML file (default: auto-discover)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(long, default_value = "pretty")]
    pub format: String,

    /// Minimum documentation coverage percent (exit non-zero if below)
    #[arg(long, value_name = "PCT")]
    pub min_coverage: Option<f64>,

    /// Treat `<?` as an open tag
    #[arg(long)]
    pub short_tags: bool,

    #[command(flatten)]
    pub report: ReportFlags,
}

/// Per-kind report switches.
#[derive(Args, Debug, Default, Clone)]
pub struct ReportFlags {
    /// Report every kind of missing doc-comment
    #[arg(long)]
    pub report_all: bool,
    /// Report nothing, only count
    #[arg(long)]
    pub report_none: bool,

    #[arg(long)]
    pub report_file_level: bool,
    #[arg(long)]
    pub noreport_file_level: bool,
    #[arg(long)]
    pub report_class_level: bool,
    #[arg(long)]
    pub noreport_class_level: bool,
    #[arg(long)]
    pub report_interface_level: bool,
    #[arg(long)]
    pub noreport_interface_level: bool,
    #[arg(long)]
    pub report_class_var_level: bool,
    #[arg(long)]
    pub noreport_class_var_level: bool,
    #[arg(long)]
    pub report_class_const_level: bool,
    #[arg(long)]
    pub noreport_class_const_level: bool,
    #[arg(long)]
    pub report_constant_level: bool,
    #[arg(long)]
    pub noreport_constant_level: bool,
    #[arg(long)]
    pub report_function_level: bool,
    #[arg(long)]
    pub noreport_function_level: bool,
}

impl ReportFlags {
    /// `(kind, report, noreport)` for each kind.
    fn switches(&self) -> [(EntityKind, bool, bool); 7] {
        [
            (EntityKind::File, self.report_file_level, self.noreport_file_level),
            (EntityKind::Class, self.report_class_level, self.noreport_class_level),
            (
                EntityKind::Interface,
                self.report_interface_level,
                self.noreport_interface_level,
            ),
            (
                EntityKind::ClassVariable,
                self.report_class_var_level,
                self.noreport_class_var_level,
            ),
            (
                EntityKind::ClassConstant,
                self.report_class_const_level,
                self.noreport_class_const_level,
            ),
            (
                EntityKind::Constant,
                self.report_constant_level,
                self.noreport_constant_level,
            ),
            (
                EntityKind::Function,
                self.report_function_level,
                self.noreport_function_level,
            ),
        ]
    }

    /// Apply the flags on top of `base`.
    ///
    /// `--report-none` goes first, then the per-kind pairs (`noreport` wins),
    /// then `--report-all`.
    pub fn apply(&self, base: ReportConfig) -> ReportConfig {
        let mut config = if self.report_none {
            ReportConfig::none()
        } else {
            base
        };
        for (kind, report, noreport) in self.switches() {
            if report {
                config.set(kind, true);
            }
            if noreport {
                config.set(kind, false);
            }
        }
        if self.report_all {
            config = ReportConfig::all();
        }
        config
    }
}

/// Settings resolved from the config file and the command line.
struct Settings {
    report: ReportConfig,
    excluded_paths: Vec<String>,
    min_coverage: Option<f64>,
    short_tags: bool,
}

impl Settings {
    fn resolve(cli: &Cli, file: ConfigFile) -> Self {
        Self {
            report: cli.report.apply(file.report),
            excluded_paths: file.excluded_paths,
            min_coverage: cli.min_coverage.or(file.min_coverage),
            short_tags: cli.short_tags || file.short_tags,
        }
    }

    fn checker<R: Reporter>(&self, reporter: R) -> anyhow::Result<Checker<R>> {
        let checker = Checker::new(self.report, reporter)
            .exclude(&self.excluded_paths)?
            .short_tags(self.short_tags);
        Ok(checker)
    }
}

/// Run the checker with the given arguments and return the exit code.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    if cli.format != "pretty" && cli.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            cli.format
        );
        return Ok(EXIT_ERROR);
    }

    let cwd = std::env::current_dir()?;
    let file = match ConfigFile::load(cli.config.as_deref(), &cwd) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let settings = Settings::resolve(cli, file);

    if cli.print_config {
        print!("{}", settings.report.format_config());
        if cli.files.is_empty() {
            return Ok(EXIT_SUCCESS);
        }
    }

    if cli.files.is_empty() {
        eprintln!("{}", NO_INPUT);
        return Ok(EXIT_ERROR);
    }

    let inputs: Vec<String> = cli.files.iter().map(|p| p.display().to_string()).collect();

    let coverage = if cli.format == "json" {
        let mut checker = settings.checker(CollectingReporter::default())?;
        check_inputs(&mut checker, &cli.files);
        let (tally, reporter) = checker.into_parts();
        let coverage = score::calculate(&tally, settings.min_coverage);
        report::write_json(&inputs, reporter.findings, &tally, &coverage)?;
        coverage
    } else {
        let mut checker = settings.checker(ConsoleReporter)?;
        check_inputs(&mut checker, &cli.files);
        let coverage = score::calculate(checker.tally(), settings.min_coverage);
        report::write_pretty(checker.tally(), &coverage);
        coverage
    };

    Ok(exit_code(&coverage))
}

/// Check every input in order; missing paths are reported and skipped.
fn check_inputs<R: Reporter>(checker: &mut Checker<R>, paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = checker.check_path(path) {
            eprintln!("Error: {}", e);
        }
    }
}

fn exit_code(coverage: &CoverageScore) -> i32 {
    if coverage.passed {
        EXIT_SUCCESS
    } else {
        EXIT_FAILED
    }
}
