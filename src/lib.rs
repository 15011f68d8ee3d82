// src/lib.rs
// =============================================================================
// Library root for the code health engine.
//
// The engine takes a blob of source code and produces a Report:
// 1. analyzer::language  - guess the language (filename first, then content)
// 2. analyzer::scanner   - run the language's lint rules line by line
// 3. analyzer::metrics   - count lines, words, functions, comments
// 4. checker::extract    - pull every URL out of the code
// 5. checker::http       - probe those URLs in small concurrent batches
// 6. analyzer::score     - fold the issues into a 0-100 score and a rating
//
// The binary (main.rs) is a thin CLI on top of service.rs.
// =============================================================================

// Compiles a constant regex once and hands out a &'static to it.
// Only used with literal patterns that the unit tests exercise.
macro_rules! static_regex {
    ($pattern:expr) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($pattern).expect("static pattern is valid"))
    }};
}

pub mod analyzer;
pub mod checker;
pub mod config;
pub mod error;
pub mod service;

pub use analyzer::{
    AnalysisRequest, Analyzer, Issue, LanguageTag, Metrics, Report, RuleCatalog, Severity,
    Summary,
};
pub use checker::{extract_urls, LinkResult, LinkVerifier};
pub use config::EngineConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use service::{Outcome, VerifyReport, VerifySummary};
