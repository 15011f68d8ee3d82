// src/analyzer/mod.rs
// =============================================================================
// The analysis pipeline.
//
// Submodules:
// - language: guesses the language of the code
// - rules: the per-language rule catalog
// - scanner: applies rules line by line
// - metrics: text statistics
// - score: turns issue counts into a score and rating
//
// Analyzer::analyze wires them together:
//   validate -> classify -> scan + measure -> (extract + verify) -> summarize
//
// Everything except link verification is a pure, synchronous function of the
// input text. The rule catalog is compiled once and shared read-only.
// =============================================================================

pub mod language;
pub mod metrics;
pub mod rules;
pub mod scanner;
pub mod score;

pub use language::{classify, LanguageTag};
pub use metrics::{measure, Metrics};
pub use rules::{Rule, RuleCatalog, Severity};
pub use scanner::{scan, Issue};
pub use score::{summarize, Rating, Summary};

use crate::checker::{extract_urls, LinkResult, LinkVerifier};
use crate::config::EngineConfig;
use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// What the caller wants analyzed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub code: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub verify_links: bool,
    /// Skips detection when set
    #[serde(default)]
    pub language: Option<LanguageTag>,
}

impl AnalysisRequest {
    pub fn new(code: impl Into<String>) -> Self {
        AnalysisRequest {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn language(mut self, language: LanguageTag) -> Self {
        self.language = Some(language);
        self
    }

    pub fn verify_links(mut self, verify: bool) -> Self {
        self.verify_links = verify;
        self
    }
}

/// The finished analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub language: LanguageTag,
    pub issues: Vec<Issue>,
    pub metrics: Metrics,
    pub links: Vec<LinkResult>,
    pub summary: Summary,
}

/// Owns the shared, read-only pieces of the engine
#[derive(Debug, Clone)]
pub struct Analyzer {
    catalog: Arc<RuleCatalog>,
    verifier: LinkVerifier,
    config: EngineConfig,
}

impl Analyzer {
    /// Compiles the built-in rules and builds the HTTP client
    pub fn new(config: EngineConfig) -> AnalysisResult<Self> {
        let catalog = Arc::new(RuleCatalog::builtin()?);
        let verifier = LinkVerifier::new(&config)?;
        Ok(Self::with_parts(catalog, verifier, config))
    }

    pub fn with_parts(catalog: Arc<RuleCatalog>, verifier: LinkVerifier, config: EngineConfig) -> Self {
        Analyzer { catalog, verifier, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn verifier(&self) -> &LinkVerifier {
        &self.verifier
    }

    // Rejects empty or oversized code before any work starts
    pub fn validate(&self, request: &AnalysisRequest) -> AnalysisResult<()> {
        if request.code.is_empty() {
            return Err(AnalysisError::EmptyCode);
        }
        let length = request.code.chars().count();
        if length > self.config.max_code_chars {
            return Err(AnalysisError::CodeTooLong {
                length,
                max: self.config.max_code_chars,
            });
        }
        Ok(())
    }

    /// Runs the whole pipeline and builds a Report
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult<Report> {
        self.validate(request)?;

        let language = request
            .language
            .unwrap_or_else(|| classify(&request.code, request.filename.as_deref()));

        let issues = scan(&self.catalog, &request.code, language);
        let metrics = measure(&request.code);
        debug!(%language, issues = issues.len(), lines = metrics.line_count, "scan complete");

        let links = if request.verify_links {
            let urls = extract_urls(&request.code);
            info!(count = urls.len(), "verifying extracted links");
            self.verifier.verify(&urls).await
        } else {
            Vec::new()
        };

        let summary = summarize(&issues, &links);

        Ok(Report {
            language,
            issues,
            metrics,
            links,
            summary,
        })
    }
}
