// src/analyzer/scanner.rs
// =============================================================================
// Runs a language's rules over the code, one line at a time.
//
// For every line, every rule, and every (non-overlapping) match we emit an
// Issue. Positions are 1-based and counted in characters so editors can jump
// straight to them. Afterwards the issues are sorted by severity only; the
// sort is stable, so within a severity they stay in scan order
// (line, then rule, then match).
// =============================================================================

use crate::analyzer::{LanguageTag, RuleCatalog, Severity};
use serde::{Deserialize, Serialize};

/// A single located finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// 1-based line number
    pub line: usize,
    /// 1-based column of the match start, in characters
    pub column: usize,
    pub message: String,
    pub severity: Severity,
    pub rule_id: String,
}

// Scans `code` with the rules for `language`
pub fn scan(catalog: &RuleCatalog, code: &str, language: LanguageTag) -> Vec<Issue> {
    let rules = catalog.rules_for(language);
    let mut issues = Vec::new();

    for (index, line) in code.split('\n').enumerate() {
        // Windows line endings: the \r is not part of the line
        let line = line.strip_suffix('\r').unwrap_or(line);

        for rule in rules {
            if rule.excludes(line) {
                continue;
            }
            // captures_iter steps past empty matches, so a pattern that can
            // match zero characters still terminates
            for caps in rule.pattern.captures_iter(line) {
                issues.push(Issue {
                    line: index + 1,
                    column: char_column(line, rule.anchor(&caps)),
                    message: rule.message.clone(),
                    severity: rule.severity,
                    rule_id: rule.id.clone(),
                });
            }
        }
    }

    sort_by_severity(&mut issues);
    issues
}

// Stable: equal severities keep their relative order
pub fn sort_by_severity(issues: &mut [Issue]) {
    issues.sort_by_key(|issue| issue.severity.rank());
}

fn char_column(line: &str, byte_offset: usize) -> usize {
    line[..byte_offset].chars().count() + 1
}
