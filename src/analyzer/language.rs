// src/analyzer/language.rs
// =============================================================================
// Guesses which language a piece of code is written in.
//
// Detection runs in strict priority order:
// 1. Filename extension (if the caller gave us a filename)
// 2. Interpreter directive on the first line (#!/usr/bin/env python, ...)
// 3. Content heuristics, tried one after another, first match wins
// 4. Fall back to JavaScript
//
// Every step is a plain table so the order can be tested on its own.
// =============================================================================

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The closed set of languages the engine knows about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    #[default]
    Javascript,
    Typescript,
    Python,
    Html,
    Css,
    Json,
    Sql,
    Markdown,
}

impl LanguageTag {
    pub const ALL: [LanguageTag; 8] = [
        LanguageTag::Javascript,
        LanguageTag::Typescript,
        LanguageTag::Python,
        LanguageTag::Html,
        LanguageTag::Css,
        LanguageTag::Json,
        LanguageTag::Sql,
        LanguageTag::Markdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageTag::Javascript => "javascript",
            LanguageTag::Typescript => "typescript",
            LanguageTag::Python => "python",
            LanguageTag::Html => "html",
            LanguageTag::Css => "css",
            LanguageTag::Json => "json",
            LanguageTag::Sql => "sql",
            LanguageTag::Markdown => "markdown",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LanguageTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = LanguageTag::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown language '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

// A content heuristic: a named predicate that maps to a language
struct Heuristic {
    name: &'static str,
    language: LanguageTag,
    matches: fn(&str) -> bool,
}

// Order matters: earlier entries win.
// The first six mirror the classic cascade; css, sql and markdown only get a
// chance when nothing else recognised the code.
const HEURISTICS: &[Heuristic] = &[
    Heuristic { name: "type-annotations", language: LanguageTag::Typescript, matches: has_type_annotations },
    Heuristic { name: "module-syntax", language: LanguageTag::Typescript, matches: is_typed_module },
    Heuristic { name: "module-syntax", language: LanguageTag::Javascript, matches: has_module_syntax },
    Heuristic { name: "python-def", language: LanguageTag::Python, matches: has_python_blocks },
    Heuristic { name: "js-functions", language: LanguageTag::Javascript, matches: has_js_functions },
    Heuristic { name: "html-markup", language: LanguageTag::Html, matches: has_html_markup },
    Heuristic { name: "json-object", language: LanguageTag::Json, matches: looks_like_json },
    Heuristic { name: "sql-statement", language: LanguageTag::Sql, matches: has_sql_statement },
    Heuristic { name: "css-rules", language: LanguageTag::Css, matches: has_css_rules },
    Heuristic { name: "markdown-heading", language: LanguageTag::Markdown, matches: has_markdown_structure },
];

// Filename patterns, checked in this order
fn filename_table() -> &'static [(LanguageTag, &'static Regex)] {
    static TABLE: std::sync::OnceLock<Vec<(LanguageTag, &'static Regex)>> =
        std::sync::OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            (LanguageTag::Javascript, static_regex!(r"(?i)\.(js|jsx|mjs|cjs)$")),
            (LanguageTag::Typescript, static_regex!(r"(?i)\.(ts|tsx|mts|cts)$")),
            (LanguageTag::Python, static_regex!(r"(?i)\.(py|pyw|pyi)$")),
            (LanguageTag::Html, static_regex!(r"(?i)\.(html|htm|xhtml)$")),
            (LanguageTag::Css, static_regex!(r"(?i)\.(css|scss|sass|less)$")),
            (LanguageTag::Json, static_regex!(r"(?i)(\.json|\.jsonc|\.babelrc|\.eslintrc)$")),
            (LanguageTag::Sql, static_regex!(r"(?i)\.(sql|psql)$")),
            (LanguageTag::Markdown, static_regex!(r"(?i)\.(md|markdown|mdx)$")),
        ]
    })
}

/// Infers the language of `code`, optionally helped by a filename.
///
/// Never fails: anything unrecognised is JavaScript.
pub fn classify(code: &str, filename: Option<&str>) -> LanguageTag {
    if let Some(tag) = filename.and_then(from_filename) {
        debug!(language = %tag, "language detected from filename");
        return tag;
    }

    if let Some(tag) = from_interpreter_directive(code) {
        debug!(language = %tag, "language detected from interpreter directive");
        return tag;
    }

    match from_content(code) {
        Some((name, tag)) => {
            debug!(language = %tag, heuristic = name, "language detected from content");
            tag
        }
        None => LanguageTag::default(),
    }
}

pub fn from_filename(filename: &str) -> Option<LanguageTag> {
    let filename = filename.trim();
    filename_table()
        .iter()
        .find(|(_, pattern)| pattern.is_match(filename))
        .map(|(tag, _)| *tag)
}

// Only looks at the first line. `bash` (or anything else) is outside the
// closed set, so it falls through to the content heuristics.
pub fn from_interpreter_directive(code: &str) -> Option<LanguageTag> {
    let first_line = code.lines().next()?;
    if !first_line.starts_with("#!") {
        return None;
    }
    if first_line.contains("python") {
        Some(LanguageTag::Python)
    } else if first_line.contains("node") {
        Some(LanguageTag::Javascript)
    } else {
        None
    }
}

// Returns the name of the heuristic that fired along with its language
pub fn from_content(code: &str) -> Option<(&'static str, LanguageTag)> {
    HEURISTICS
        .iter()
        .find(|h| (h.matches)(code))
        .map(|h| (h.name, h.language))
}

fn has_type_annotations(code: &str) -> bool {
    static_regex!(r"(?m)^\s*(export\s+)?(interface\s+\w+|type\s+\w+\s*=)").is_match(code)
        || static_regex!(r":\s*(string|number|boolean|any|void|unknown|never)\b").is_match(code)
}

fn has_module_syntax(code: &str) -> bool {
    static_regex!(
        r#"(?m)^\s*(import\s+(.+\s+from\s+)?["'`]|export\s+(default|const|let|function|class|async|\{))"#
    )
    .is_match(code)
}

// Module code without require() that also carries type information
fn is_typed_module(code: &str) -> bool {
    has_module_syntax(code)
        && !code.contains("require(")
        && (static_regex!(r"(?m)^\s*import\s+type\b").is_match(code)
            || static_regex!(r"function\s+\w+\s*\([^)]*\w\s*:\s*\w+").is_match(code)
            || static_regex!(r"\)\s*:\s*[\w<>\[\]]+\s*(\{|=>)").is_match(code))
}

fn has_python_blocks(code: &str) -> bool {
    static_regex!(r"(?m)^\s*(async\s+)?def\s+\w+\s*\(.*\)\s*(->\s*[^:]+)?:\s*(#.*)?$").is_match(code)
        || static_regex!(r"(?m)^\s*class\s+\w+(\([^)]*\))?:\s*$").is_match(code)
}

fn has_js_functions(code: &str) -> bool {
    static_regex!(r"\bfunction\b\s*\*?\s*\w*\s*\(").is_match(code) || code.contains("=>")
}

fn has_html_markup(code: &str) -> bool {
    static_regex!(r"(?i)<!doctype\s+html").is_match(code)
        || static_regex!(
            r"(?i)<(html|head|body|div|span|p|a|script|style|link|meta|img|ul|ol|li|table|form|input|button|section|nav|header|footer)\b[^>]*>"
        )
        .is_match(code)
}

fn looks_like_json(code: &str) -> bool {
    static_regex!(r#"^\s*\{\s*"[^"]*"\s*:"#).is_match(code)
}

fn has_sql_statement(code: &str) -> bool {
    static_regex!(
        r"(?im)^\s*(select\s+.+\s+from\s|insert\s+into\s|update\s+\w+\s+set\s|delete\s+from\s|create\s+(table|index|view)\s)"
    )
    .is_match(code)
}

fn has_css_rules(code: &str) -> bool {
    static_regex!(r"(?m)^\s*[\w.#:\[\]=*>+~,\s-]+\{[^{}]*[\w-]+\s*:\s*[^;{}]+;").is_match(code)
}

fn has_markdown_structure(code: &str) -> bool {
    static_regex!(r"(?m)^#{1,6}\s+\S").is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use proptest::prelude::*;

    #[test]
    fn test_filename_wins_over_content() {
        let code = "def main():\n    pass\n";
        assert_eq!(classify(code, Some("script.ts")), LanguageTag::Typescript);
        assert_eq!(classify(code, Some("PAGE.HTML")), LanguageTag::Html);
        assert_eq!(classify(code, Some("package.json")), LanguageTag::Json);
    }

    #[test]
    fn test_unknown_extension_falls_through() {
        let code = "def main():\n    pass\n";
        assert_eq!(classify(code, Some("Makefile")), LanguageTag::Python);
    }

    #[test]
    fn test_interpreter_directive() {
        assert_eq!(classify("#!/usr/bin/env python3\nprint(1)", None), LanguageTag::Python);
        assert_eq!(classify("#!/usr/bin/env node\nconsole.log(1)", None), LanguageTag::Javascript);
        // bash is not a supported language: fall through to heuristics
        assert_eq!(from_interpreter_directive("#!/bin/bash\necho hi"), None);
        assert_eq!(classify("#!/bin/bash\n# Notes\necho hi", None), LanguageTag::Markdown);
    }

    #[test]
    fn test_typescript_annotations() {
        let code = indoc! {"
            interface User {
              name: string;
            }
        "};
        assert_eq!(classify(code, None), LanguageTag::Typescript);
    }

    #[test]
    fn test_module_syntax_disambiguation() {
        let with_require = "import x from 'x';\nconst fs = require('fs');\n";
        assert_eq!(classify(with_require, None), LanguageTag::Javascript);

        let typed = "import type { A } from './a';\nexport default A;\n";
        assert_eq!(classify(typed, None), LanguageTag::Typescript);

        let plain = "import React from 'react';\nexport default App;\n";
        assert_eq!(classify(plain, None), LanguageTag::Javascript);
    }

    #[test]
    fn test_python_def() {
        let code = indoc! {"
            import os

            def main(argv):
                return 0
        "};
        assert_eq!(classify(code, None), LanguageTag::Python);
    }

    #[test]
    fn test_javascript_functions() {
        assert_eq!(classify("const add = (a, b) => a + b;", None), LanguageTag::Javascript);
        assert_eq!(classify("function go() { return 1 }", None), LanguageTag::Javascript);
    }

    #[test]
    fn test_html_and_json() {
        assert_eq!(classify("<!DOCTYPE html><title>x</title>", None), LanguageTag::Html);
        assert_eq!(classify(r#"<a href="https://example.com">x</a>"#, None), LanguageTag::Html);
        assert_eq!(classify("{\n  \"name\": \"demo\"\n}", None), LanguageTag::Json);
    }

    #[test]
    fn test_late_heuristics() {
        assert_eq!(classify("SELECT id FROM users;", None), LanguageTag::Sql);
        assert_eq!(classify(".btn {\n  color: red;\n}", None), LanguageTag::Css);
        assert_eq!(classify("# Title\n\nSome prose.", None), LanguageTag::Markdown);
    }

    #[test]
    fn test_fallback_is_javascript() {
        assert_eq!(LanguageTag::default(), LanguageTag::Javascript);
        assert_eq!(classify("eval(\"1+1\")", None), LanguageTag::Javascript);
        assert_eq!(classify("", None), LanguageTag::Javascript);
        assert_eq!(classify("", Some("")), LanguageTag::Javascript);
    }

    #[test]
    fn test_parse_language_tag() {
        assert_eq!("Python".parse::<LanguageTag>(), Ok(LanguageTag::Python));
        assert!("cobol".parse::<LanguageTag>().is_err());
    }

    proptest! {
        #[test]
        fn classify_is_stable_on_arbitrary_text(code in "(\\PC|\n){0,200}", name in "[a-z]{0,6}(\\.[a-z]{1,4})?") {
            prop_assert_eq!(classify(&code, Some(name.as_str())), classify(&code, Some(name.as_str())));
            prop_assert_eq!(classify(&code, None), classify(&code, None));
        }
    }
}
