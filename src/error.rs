// src/error.rs
// =============================================================================
// Error types for the analysis engine.
//
// There are three kinds of failure:
// 1. Input validation: the caller sent something we refuse to process
//    (empty code, too much code, no URLs, too many URLs)
// 2. Probe faults: a URL could not be reached. These are NOT errors here,
//    they are recorded as data inside LinkResult (see checker/http.rs)
// 3. Internal faults: something inside the engine broke (a rule pattern that
//    does not compile, a panicking task). Callers only see a generic message.
// =============================================================================

use thiserror::Error;

/// Errors returned by the engine's public operations
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Code is required and must not be empty")]
    EmptyCode,

    #[error("Code is too long: {length} characters (maximum is {max})")]
    CodeTooLong { length: usize, max: usize },

    #[error("At least one URL is required")]
    NoUrls,

    #[error("Too many URLs: {count} given (maximum is {max})")]
    TooManyUrls { count: usize, max: usize },

    #[error("Rule '{id}' has an invalid pattern: {source}")]
    InvalidRule {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// True when the caller can fix the problem by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::EmptyCode
                | AnalysisError::CodeTooLong { .. }
                | AnalysisError::NoUrls
                | AnalysisError::TooManyUrls { .. }
        )
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
