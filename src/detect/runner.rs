//! Checker that drives files and directories through the scanner.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::ReportConfig;
use crate::error::{CheckError, Result};
use crate::lexer::Lexer;
use crate::report::Reporter;

use super::{scan, FileReport, Tally};

/// Extension of files picked up when walking directories.
const PHP_EXTENSION: &str = "php";

/// Checks files for missing doc-comments and keeps run-wide totals.
///
/// Counters accumulate for the lifetime of the checker. Findings are handed
/// to the reporter only for kinds enabled in the [`ReportConfig`]; the
/// counters are updated either way.
pub struct Checker<R> {
    config: ReportConfig,
    reporter: R,
    tally: Tally,
    excluded: GlobSet,
    short_tags: bool,
}

impl<R: Reporter> Checker<R> {
    /// Create a new checker.
    pub fn new(config: ReportConfig, reporter: R) -> Self {
        Self {
            config,
            reporter,
            tally: Tally::new(),
            excluded: GlobSet::empty(),
            short_tags: false,
        }
    }

    /// Skip paths matching any of these glob patterns.
    pub fn exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        self.excluded = builder.build()?;
        Ok(self)
    }

    /// Treat bare `<?` as an open tag.
    pub fn short_tags(mut self, enabled: bool) -> Self {
        self.short_tags = enabled;
        self
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_parts(self) -> (Tally, R) {
        (self.tally, self.reporter)
    }

    /// Check a file or, recursively, a directory.
    pub fn check_path(&mut self, path: &Path) -> Result<()> {
        let metadata = std::fs::metadata(path)
            .map_err(|_| CheckError::MissingInput(path.to_path_buf()))?;
        if metadata.is_dir() {
            self.check_dir(path);
            Ok(())
        } else {
            self.check_file(path).map(|_| ())
        }
    }

    /// Check every `.php` file below `dir`.
    ///
    /// Entries are visited in file-name order. Unreadable entries are logged
    /// and skipped so one bad file never stops the rest of the walk.
    pub fn check_dir(&mut self, dir: &Path) {
        let excluded = self.excluded.clone();
        let walker = WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let skip = e.depth() > 0 && excluded.is_match(e.path());
                if skip {
                    tracing::debug!(path = %e.path().display(), "excluded");
                }
                !skip
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                tracing::debug!(dir = %entry.path().display(), "checking directory");
                self.tally.directories_checked += 1;
                continue;
            }

            if entry.file_type().is_file() && is_php_file(entry.path()) {
                if let Err(e) = self.check_file(entry.path()) {
                    tracing::warn!("{}", e);
                }
            }
        }
    }

    /// Read and check a single file.
    pub fn check_file(&mut self, path: &Path) -> Result<FileReport> {
        let bytes = std::fs::read(path).map_err(|source| CheckError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes);
        Ok(self.check_source(&path.display().to_string(), &source))
    }

    /// Check in-memory source under the given file name.
    pub fn check_source(&mut self, name: &str, source: &str) -> FileReport {
        tracing::debug!(file = name, "checking file");
        let stream = Lexer::new(source).short_tags(self.short_tags).tokenize();
        let report = scan(name, &stream);

        for finding in &report.findings {
            if self.config.is_enabled(finding.kind) {
                self.reporter.report(finding);
                self.tally.reported += 1;
            }
        }

        self.tally.merge(&report.tally);
        self.tally.files_checked += 1;
        tracing::debug!(
            file = name,
            missing = report.tally.total_missing(),
            found = report.tally.total_found(),
            "file checked"
        );
        report
    }
}

/// Whether `path` has a `.php` extension (any case).
pub fn is_php_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(PHP_EXTENSION))
}
