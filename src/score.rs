//! Documentation coverage score.
//!
//! Coverage is the share of checked entities that carry a doc-comment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::detect::{EntityKind, KindCount, Tally};

/// Coverage of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageScore {
    /// 0-100, higher is better documented.
    pub percent: f64,
    /// Coverage per entity kind, for kinds that were seen at all.
    pub per_kind: BTreeMap<EntityKind, f64>,
    /// Minimum percent required, if any.
    pub threshold: Option<f64>,
    /// Whether the run meets the threshold.
    pub passed: bool,
}

impl CoverageScore {
    /// Rounded for display.
    pub fn rounded(&self) -> f64 {
        (self.percent * 10.0).round() / 10.0
    }
}

fn percent_of(count: KindCount) -> f64 {
    match count.total() {
        0 => 100.0,
        total => f64::from(count.found) * 100.0 / f64::from(total),
    }
}

/// Calculate coverage from run totals.
pub fn calculate(tally: &Tally, threshold: Option<f64>) -> CoverageScore {
    let overall = KindCount {
        found: tally.total_found(),
        missing: tally.total_missing(),
    };
    let percent = percent_of(overall);

    let per_kind = tally
        .counts
        .iter()
        .filter(|(_, count)| count.total() > 0)
        .map(|(kind, count)| (*kind, percent_of(*count)))
        .collect();

    CoverageScore {
        percent,
        per_kind,
        threshold,
        passed: threshold.map_or(true, |t| percent >= t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(found: u32, missing: u32) -> Tally {
        let mut t = Tally::new();
        for _ in 0..found {
            t.record_found(EntityKind::Function);
        }
        for _ in 0..missing {
            t.record_missing(EntityKind::Class);
        }
        t
    }

    #[test]
    fn test_empty_run_is_fully_covered() {
        let score = calculate(&Tally::new(), Some(90.0));
        assert_eq!(score.percent, 100.0);
        assert!(score.passed);
        assert!(score.per_kind.is_empty());
    }

    #[test]
    fn test_percent_and_per_kind() {
        let score = calculate(&tally(3, 1), None);
        assert_eq!(score.percent, 75.0);
        assert_eq!(score.per_kind.get(&EntityKind::Function), Some(&100.0));
        assert_eq!(score.per_kind.get(&EntityKind::Class), Some(&0.0));
        assert!(score.passed);
    }

    #[test]
    fn test_threshold() {
        assert!(calculate(&tally(3, 1), Some(75.0)).passed);
        assert!(!calculate(&tally(3, 1), Some(75.1)).passed);
    }

    #[test]
    fn test_rounded() {
        let score = calculate(&tally(1, 2), None);
        assert_eq!(score.rounded(), 33.3);
    }
}
