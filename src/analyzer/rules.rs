// src/analyzer/rules.rs
// =============================================================================
// The rule catalog: for each language, an ordered list of lint rules.
//
// A rule is a regex plus a message and a severity. The catalog is compiled
// once at startup (RuleCatalog::builtin) and then only ever read, so it can
// be shared between any number of concurrent analyses behind an Arc.
//
// Languages without their own table (json, markdown) borrow the JavaScript
// table. That fallback also covers any language added later without rules.
// =============================================================================

use crate::analyzer::LanguageTag;
use crate::error::{AnalysisError, AnalysisResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How bad an issue is. The variant order is the presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Sort rank: errors first, info last
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(name)
    }
}

/// A compiled lint rule.
///
/// The reported column is the start of the whole match, or the start of the
/// named group `at` when the pattern has one. Patterns that need context
/// around the offending token use `at` to point at the token itself.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub pattern: Regex,
    pub message: String,
    pub severity: Severity,
    /// Matches are dropped when this also matches the same line
    pub unless: Option<Regex>,
}

impl Rule {
    pub fn new(
        id: &str,
        pattern: &str,
        message: &str,
        severity: Severity,
    ) -> AnalysisResult<Self> {
        Ok(Rule {
            id: id.to_string(),
            pattern: compile(id, pattern)?,
            message: message.to_string(),
            severity,
            unless: None,
        })
    }

    pub fn unless(mut self, pattern: &str) -> AnalysisResult<Self> {
        self.unless = Some(compile(&self.id, pattern)?);
        Ok(self)
    }

    /// Byte offset where a match should be reported
    pub fn anchor(&self, caps: &regex::Captures<'_>) -> usize {
        caps.name("at")
            .or_else(|| caps.get(0))
            .map_or(0, |m| m.start())
    }

    /// True when the exclusion pattern says this line should be skipped
    pub fn excludes(&self, line: &str) -> bool {
        self.unless.as_ref().is_some_and(|re| re.is_match(line))
    }
}

fn compile(id: &str, pattern: &str) -> AnalysisResult<Regex> {
    Regex::new(pattern).map_err(|source| AnalysisError::InvalidRule {
        id: id.to_string(),
        source,
    })
}

// Uncompiled rule definition; the built-in tables are written with these
struct RuleDef {
    id: &'static str,
    pattern: &'static str,
    message: &'static str,
    severity: Severity,
    unless: Option<&'static str>,
}

const fn rule(id: &'static str, pattern: &'static str, message: &'static str, severity: Severity) -> RuleDef {
    RuleDef { id, pattern, message, severity, unless: None }
}

const fn rule_unless(
    id: &'static str,
    pattern: &'static str,
    message: &'static str,
    severity: Severity,
    unless: &'static str,
) -> RuleDef {
    RuleDef { id, pattern, message, severity, unless: Some(unless) }
}

use Severity::{Error, Info, Warning};

const JAVASCRIPT_RULES: &[RuleDef] = &[
    rule("no-var", r"\bvar\s+", "Use 'let' or 'const' instead of 'var'", Warning),
    rule("no-eval", r"\beval\s*\(", "Avoid eval(): it executes arbitrary code", Error),
    rule("no-implied-eval", r#"\b(setTimeout|setInterval)\s*\(\s*["'`]"#, "Passing a string to setTimeout/setInterval behaves like eval()", Error),
    rule("no-new-function", r"\bnew\s+Function\s*\(", "new Function() executes arbitrary code", Error),
    rule("no-inner-html", r"\.(innerHTML|outerHTML)\s*=[^=]", "Assigning HTML strings directly can lead to XSS", Error),
    rule("no-document-write", r"\bdocument\.write(ln)?\s*\(", "Avoid document.write()", Warning),
    rule("eqeqeq", r"(?:^|[^=!<>])(?P<at>==)(?:[^=]|$)", "Use '===' instead of '=='", Warning),
    rule("no-loose-inequality", r"(?:^|[^!=])(?P<at>!=)(?:[^=]|$)", "Use '!==' instead of '!='", Warning),
    rule("no-debugger", r"\bdebugger\b", "Remove debugger statements", Warning),
    rule("no-hardcoded-secret", r#"(?i)\b(password|passwd|secret|api_?key|access_?token)\b\s*[:=]\s*["'`][^"'`]+["'`]"#, "Possible hard-coded credential", Error),
    rule("no-console", r"\bconsole\.(log|debug|trace)\s*\(", "Remove console logging before shipping", Info),
    rule("no-alert", r"\b(alert|confirm|prompt)\s*\(", "Avoid blocking browser dialogs", Info),
    rule("todo-comment", r"//\s*(TODO|FIXME|HACK|XXX)\b", "Unresolved TODO/FIXME comment", Info),
];

// Appended to JavaScript for TypeScript
const TYPESCRIPT_RULES: &[RuleDef] = &[
    rule("no-explicit-any", r":\s*any\b", "Avoid the 'any' type", Warning),
    rule("no-any-cast", r"\bas\s+any\b", "Avoid casting to 'any'", Warning),
    rule("no-ts-ignore", r"@ts-(ignore|nocheck)\b", "Do not suppress type errors", Warning),
    rule("no-non-null-assertion", r"\w!\.\w", "Non-null assertion hides possible null values", Info),
];

const PYTHON_RULES: &[RuleDef] = &[
    rule("no-eval", r"\beval\s*\(", "Avoid eval(): it executes arbitrary code", Error),
    rule("no-exec", r"\bexec\s*\(", "Avoid exec(): it executes arbitrary code", Error),
    rule("no-shell-true", r"\bsubprocess\.\w+\(.*shell\s*=\s*True", "subprocess with shell=True is open to injection", Error),
    rule("no-pickle-load", r"\bpickle\.loads?\s*\(", "Unpickling untrusted data can execute code", Warning),
    rule("no-yaml-load", r"\byaml\.load\s*\(", "Use yaml.safe_load() instead of yaml.load()", Warning),
    rule("no-hardcoded-secret", r#"(?i)\b(password|passwd|secret|api_?key|access_?token)\b\s*=\s*["'][^"']+["']"#, "Possible hard-coded credential", Error),
    rule("no-bare-except", r"\bexcept\s*:", "Bare 'except:' catches everything; name the exception", Warning),
    rule("no-wildcard-import", r"^\s*from\s+\S+\s+import\s+\*", "Wildcard imports hide where names come from", Warning),
    rule("compare-none", r"[=!]=\s*None\b", "Compare with None using 'is' / 'is not'", Warning),
    rule("no-print", r"^\s*print\s*\(", "Use logging instead of print()", Info),
    rule("todo-comment", r"#\s*(TODO|FIXME|HACK|XXX)\b", "Unresolved TODO/FIXME comment", Info),
];

const HTML_RULES: &[RuleDef] = &[
    rule("no-javascript-url", r#"(?i)href\s*=\s*["']\s*javascript:"#, "Avoid javascript: URLs", Warning),
    rule_unless("img-alt", r"(?i)<img\b[^>]*>", "Images need an alt attribute", Warning, r"(?i)\balt\s*="),
    rule_unless("blank-target-rel", r#"(?i)target\s*=\s*["']_blank["']"#, "target=\"_blank\" without rel=\"noopener\"", Warning, r#"(?i)\brel\s*=\s*["'][^"']*noopener"#),
    rule("no-inline-handler", r"(?i)\son[a-z]+\s*=", "Inline event handlers mix markup and behaviour", Warning),
    rule("no-deprecated-tag", r"(?i)<(font|center|marquee|blink)\b", "Deprecated HTML element", Warning),
    rule("no-inline-style", r"(?i)\sstyle\s*=", "Prefer CSS classes over inline styles", Info),
    rule("todo-comment", r"<!--\s*(TODO|FIXME)\b", "Unresolved TODO/FIXME comment", Info),
];

const CSS_RULES: &[RuleDef] = &[
    rule("no-expression", r"(?i)\bexpression\s*\(", "CSS expressions execute script", Error),
    rule("no-important", r"!important\b", "Avoid !important", Warning),
    rule("no-import", r"@import\b", "@import blocks parallel stylesheet downloads", Info),
    rule("no-universal-selector", r"(?m)^\s*\*\s*\{", "Universal selector is slow on large documents", Info),
    rule("todo-comment", r"/\*\s*(TODO|FIXME)\b", "Unresolved TODO/FIXME comment", Info),
];

const SQL_RULES: &[RuleDef] = &[
    rule_unless("delete-without-where", r"(?i)\bdelete\s+from\s+\w+", "DELETE without WHERE removes every row", Error, r"(?i)\bwhere\b"),
    rule_unless("update-without-where", r"(?i)\bupdate\s+\w+\s+set\b", "UPDATE without WHERE changes every row", Error, r"(?i)\bwhere\b"),
    rule("no-drop", r"(?i)\bdrop\s+(table|database|schema)\b", "Destructive DROP statement", Warning),
    rule("no-grant-all", r"(?i)\bgrant\s+all\b", "GRANT ALL gives more privileges than needed", Warning),
    rule("no-select-star", r"(?i)\bselect\s+\*", "Select explicit columns instead of *", Warning),
    rule("todo-comment", r"--\s*(TODO|FIXME)\b", "Unresolved TODO/FIXME comment", Info),
];

// Shared by every dedicated table
const LINK_RULES: &[RuleDef] = &[
    rule("no-localhost-url", r"https?://(localhost|127\.0\.0\.1|0\.0\.0\.0)\b", "Hard-coded localhost URL", Warning),
    rule("no-url-shortener", r"https?://(bit\.ly|tinyurl\.com|goo\.gl|t\.co|ow\.ly|is\.gd|buff\.ly)/", "URL shortener hides the real destination", Info),
];

/// Every language's compiled rules
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    tables: HashMap<LanguageTag, Vec<Rule>>,
}

impl RuleCatalog {
    /// Compiles the built-in rule tables.
    ///
    /// Called once at startup. A bad pattern is reported as
    /// `AnalysisError::InvalidRule` instead of panicking.
    pub fn builtin() -> AnalysisResult<Self> {
        let mut tables = HashMap::new();
        tables.insert(LanguageTag::Javascript, compile_table(&[JAVASCRIPT_RULES, LINK_RULES])?);
        tables.insert(
            LanguageTag::Typescript,
            compile_table(&[JAVASCRIPT_RULES, TYPESCRIPT_RULES, LINK_RULES])?,
        );
        tables.insert(LanguageTag::Python, compile_table(&[PYTHON_RULES, LINK_RULES])?);
        tables.insert(LanguageTag::Html, compile_table(&[HTML_RULES, LINK_RULES])?);
        tables.insert(LanguageTag::Css, compile_table(&[CSS_RULES, LINK_RULES])?);
        tables.insert(LanguageTag::Sql, compile_table(&[SQL_RULES, LINK_RULES])?);
        Ok(RuleCatalog { tables })
    }

    /// A catalog made of explicit tables, for embedding custom rule sets
    pub fn from_tables(tables: HashMap<LanguageTag, Vec<Rule>>) -> Self {
        RuleCatalog { tables }
    }

    /// Rules for `language`, or the JavaScript rules if it has none
    pub fn rules_for(&self, language: LanguageTag) -> &[Rule] {
        self.tables
            .get(&language)
            .or_else(|| self.tables.get(&LanguageTag::Javascript))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_dedicated_table(&self, language: LanguageTag) -> bool {
        self.tables.contains_key(&language)
    }
}

fn compile_table(parts: &[&[RuleDef]]) -> AnalysisResult<Vec<Rule>> {
    parts
        .iter()
        .flat_map(|part| part.iter())
        .map(|def| {
            let rule = Rule::new(def.id, def.pattern, def.message, def.severity)?;
            match def.unless {
                Some(pattern) => rule.unless(pattern),
                None => Ok(rule),
            }
        })
        .collect()
}
