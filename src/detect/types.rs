//! Core types for detection results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kinds of documentable constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    File,
    Class,
    Interface,
    Function,
    ClassVariable,
    ClassConstant,
    /// `define()` constants. Counted and configurable, never detected.
    Constant,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::File,
        EntityKind::Class,
        EntityKind::Interface,
        EntityKind::Function,
        EntityKind::ClassVariable,
        EntityKind::ClassConstant,
        EntityKind::Constant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::File => "file",
            EntityKind::Class => "class",
            EntityKind::Interface => "interface",
            EntityKind::Function => "function",
            EntityKind::ClassVariable => "class_variable",
            EntityKind::ClassConstant => "class_constant",
            EntityKind::Constant => "constant",
        }
    }

    /// Human-readable label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::File => "File",
            EntityKind::Class => "Class",
            EntityKind::Interface => "Interface",
            EntityKind::Function => "Function",
            EntityKind::ClassVariable => "Class variable",
            EntityKind::ClassConstant => "Class constant",
            EntityKind::Constant => "Constant",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A missing doc-comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: EntityKind,
    pub file: String,
    pub line: u32,
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.message)
    }
}

/// Documented / undocumented counts for one entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    pub found: u32,
    pub missing: u32,
}

impl KindCount {
    pub fn total(&self) -> u32 {
        self.found + self.missing
    }
}

/// Cumulative counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub counts: BTreeMap<EntityKind, KindCount>,
    pub files_checked: u32,
    pub directories_checked: u32,
    /// Findings handed to the reporter (report flag enabled).
    pub reported: u32,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: EntityKind) -> KindCount {
        self.counts.get(&kind).copied().unwrap_or_default()
    }

    pub fn found(&self, kind: EntityKind) -> u32 {
        self.count(kind).found
    }

    pub fn missing(&self, kind: EntityKind) -> u32 {
        self.count(kind).missing
    }

    pub fn record_found(&mut self, kind: EntityKind) {
        self.counts.entry(kind).or_default().found += 1;
    }

    pub fn record_missing(&mut self, kind: EntityKind) {
        self.counts.entry(kind).or_default().missing += 1;
    }

    /// Move one `found` to `missing`, for a comment credited to another entity.
    pub fn reclassify_as_missing(&mut self, kind: EntityKind) {
        let entry = self.counts.entry(kind).or_default();
        entry.found = entry.found.saturating_sub(1);
        entry.missing += 1;
    }

    pub fn total_found(&self) -> u32 {
        self.counts.values().map(|c| c.found).sum()
    }

    pub fn total_missing(&self) -> u32 {
        self.counts.values().map(|c| c.missing).sum()
    }

    /// Merge another tally into this one.
    pub fn merge(&mut self, other: &Tally) {
        for (kind, count) in &other.counts {
            let entry = self.counts.entry(*kind).or_default();
            entry.found += count.found;
            entry.missing += count.missing;
        }
        self.files_checked += other.files_checked;
        self.directories_checked += other.directories_checked;
        self.reported += other.reported;
    }
}

/// Outcome of scanning a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Every missing doc-comment in scan order, regardless of report flags.
    pub findings: Vec<Finding>,
    pub tally: Tally,
}

impl FileReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    #[cfg(test)]
    pub fn findings_of(&self, kind: EntityKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_names() {
        let names: Vec<_> = EntityKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "file",
                "class",
                "interface",
                "function",
                "class_variable",
                "class_constant",
                "constant"
            ]
        );
    }

    #[test]
    fn test_tally_merge() {
        let mut a = Tally::new();
        a.record_found(EntityKind::Class);
        a.files_checked = 1;

        let mut b = Tally::new();
        b.record_missing(EntityKind::Class);
        b.record_missing(EntityKind::Function);
        b.files_checked = 2;
        b.directories_checked = 1;

        a.merge(&b);
        assert_eq!(a.count(EntityKind::Class), KindCount { found: 1, missing: 1 });
        assert_eq!(a.missing(EntityKind::Function), 1);
        assert_eq!(a.files_checked, 3);
        assert_eq!(a.directories_checked, 1);
        assert_eq!(a.total_missing(), 2);
    }

    #[test]
    fn test_reclassify_moves_found_to_missing() {
        let mut t = Tally::new();
        t.record_found(EntityKind::File);
        t.reclassify_as_missing(EntityKind::File);
        assert_eq!(t.count(EntityKind::File), KindCount { found: 0, missing: 1 });
    }

    #[test]
    fn test_finding_display() {
        let f = Finding {
            kind: EntityKind::Class,
            file: "a.php".to_string(),
            line: 3,
            message: "Missing doc-comment for class `Foo`".to_string(),
        };
        assert_eq!(f.to_string(), "a.php:3: Missing doc-comment for class `Foo`");
    }
}
