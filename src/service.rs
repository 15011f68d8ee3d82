// src/service.rs
// =============================================================================
// The outer boundary of the engine: what an API layer (or our CLI) calls.
//
// Two operations:
// - analyze: AnalysisRequest -> Report
// - verify:  list of 1..=50 URLs -> VerifyReport
//
// Both return an Outcome instead of a Result:
// - Ok            the finished report
// - ClientError   the request was rejected; the message says why
// - ServerError   something broke inside; the caller gets a generic message
//                 and the real cause goes to the log
//
// The work runs on a spawned tokio task, so even a panic inside the engine
// becomes a ServerError instead of taking the process down.
// =============================================================================

use crate::analyzer::{AnalysisRequest, Analyzer, Report};
use crate::checker::LinkResult;
use crate::error::{AnalysisError, AnalysisResult};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::error;

pub const GENERIC_SERVER_ERROR: &str = "Analysis failed due to an internal error";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ok(T),
    ClientError { message: String },
    ServerError { message: String },
}

impl<T> Outcome<T> {
    fn from_error(err: AnalysisError) -> Self {
        if err.is_client_error() {
            Outcome::ClientError {
                message: err.to_string(),
            }
        } else {
            error!(error = %err, "request failed");
            Outcome::ServerError {
                message: GENERIC_SERVER_ERROR.to_string(),
            }
        }
    }
}

/// Result of the standalone verify operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyReport {
    pub results: Vec<LinkResult>,
    pub summary: VerifySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifySummary {
    pub total: usize,
    pub working: usize,
    pub broken: usize,
}

impl VerifyReport {
    pub fn new(results: Vec<LinkResult>) -> Self {
        let working = results.iter().filter(|r| r.ok).count();
        let summary = VerifySummary {
            total: results.len(),
            working,
            broken: results.len() - working,
        };
        VerifyReport { results, summary }
    }
}

// Checked before any probe starts
pub fn validate_urls(urls: &[String], max: usize) -> AnalysisResult<()> {
    if urls.is_empty() {
        return Err(AnalysisError::NoUrls);
    }
    if urls.len() > max {
        return Err(AnalysisError::TooManyUrls {
            count: urls.len(),
            max,
        });
    }
    Ok(())
}

/// Verifies a caller-supplied URL list
pub async fn verify_links(analyzer: &Analyzer, urls: &[String]) -> AnalysisResult<VerifyReport> {
    validate_urls(urls, analyzer.config().max_verify_urls)?;
    let results = analyzer.verifier().verify(urls).await;
    Ok(VerifyReport::new(results))
}

pub async fn analyze(analyzer: Arc<Analyzer>, request: AnalysisRequest) -> Outcome<Report> {
    guarded(async move { analyzer.analyze(&request).await }).await
}

pub async fn verify(analyzer: Arc<Analyzer>, urls: Vec<String>) -> Outcome<VerifyReport> {
    guarded(async move { verify_links(&analyzer, &urls).await }).await
}

// Runs `work` on its own task and converts every way it can end into an Outcome
async fn guarded<T, F>(work: F) -> Outcome<T>
where
    T: Send + 'static,
    F: Future<Output = AnalysisResult<T>> + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(Ok(value)) => Outcome::Ok(value),
        Ok(Err(err)) => Outcome::from_error(err),
        Err(join_error) => {
            Outcome::from_error(AnalysisError::Internal(format!("analysis task failed: {}", join_error)))
        }
    }
}
