// src/analyzer/score.rs
// =============================================================================
// Folds issues and link results into the report summary.
//
// Score: start at 100, lose 5 per error, 2 per warning, 0.5 per info,
// then clamp to [0, 100].
//
// Link results are COUNTED (brokenLinks / totalLinks) but do not change the
// score. Only issues move the number.
// =============================================================================

use crate::analyzer::{Issue, Severity};
use crate::checker::LinkResult;
use serde::{Deserialize, Serialize};

const ERROR_PENALTY: f64 = 5.0;
const WARNING_PENALTY: f64 = 2.0;
const INFO_PENALTY: f64 = 0.5;

/// Qualitative bucket for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    Poor,
}

impl Rating {
    // Inclusive lower bounds, checked from the top down
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Rating::Excellent
        } else if score >= 60.0 {
            Rating::Good
        } else if score >= 40.0 {
            Rating::NeedsImprovement
        } else {
            Rating::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::NeedsImprovement => "Needs Improvement",
            Rating::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub score: f64,
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub rating: Rating,
    pub broken_links: usize,
    pub total_links: usize,
}

pub fn summarize(issues: &[Issue], links: &[LinkResult]) -> Summary {
    let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);
    let info = count(Severity::Info);

    let score = quality_score(errors, warnings, info);

    Summary {
        score,
        total: issues.len(),
        errors,
        warnings,
        info,
        rating: Rating::from_score(score),
        broken_links: links.iter().filter(|l| !l.ok).count(),
        total_links: links.len(),
    }
}

pub fn quality_score(errors: usize, warnings: usize, info: usize) -> f64 {
    let penalty = errors as f64 * ERROR_PENALTY
        + warnings as f64 * WARNING_PENALTY
        + info as f64 * INFO_PENALTY;
    (100.0 - penalty).clamp(0.0, 100.0)
}
