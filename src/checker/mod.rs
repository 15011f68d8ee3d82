// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - extract: Finds URLs in source code (markup, markdown, HTTP calls, bare URLs)
// - http: Makes HTTP requests to check if links are alive
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of the crate can use.
// =============================================================================

mod extract;
mod http;

// Re-export public items from submodules
// This lets users write `checker::extract_urls()` instead of
// `checker::extract::extract_urls()`
pub use extract::extract_urls;
pub use http::{
    LinkResult, LinkVerifier, CONNECTION_FAILED, CONNECTION_REFUSED, DNS_ERROR, INVALID_URL,
    REQUEST_FAILED, SSL_ERROR, TIMEOUT, TOO_MANY_REDIRECTS,
};
