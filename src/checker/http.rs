// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Every probe has its own timeout; one slow URL never cancels another
// - Probes run in fixed-size batches: everything in a batch runs at once,
//   and the next batch starts only when the whole batch is done
// - Every failure (timeout, DNS, refused connection, 4xx/5xx) becomes data
//   in a LinkResult. Nothing here returns an error to the caller.
//
// With the defaults (batch of 5, 5 second timeout) checking N URLs takes at
// most ceil(N / 5) * 5 seconds.
// =============================================================================

use crate::config::EngineConfig;
use crate::error::{AnalysisError, AnalysisResult};
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Represents the result of checking a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResult {
    /// The URL that was checked
    pub url: String,
    /// HTTP status code, when a response arrived
    pub status: Option<u16>,
    /// True when a response arrived with a status below 400
    pub ok: bool,
    /// Why the probe failed, when no response arrived
    pub error: Option<String>,
}

impl LinkResult {
    fn response(url: String, status: u16) -> Self {
        LinkResult {
            url,
            status: Some(status),
            ok: status < 400,
            error: None,
        }
    }

    fn failure(url: String, reason: &str) -> Self {
        LinkResult {
            url,
            status: None,
            ok: false,
            error: Some(reason.to_string()),
        }
    }
}

// Reasons reported in LinkResult::error
pub const TIMEOUT: &str = "timeout";
pub const INVALID_URL: &str = "invalid_url";
pub const DNS_ERROR: &str = "dns_error";
pub const CONNECTION_REFUSED: &str = "connection_refused";
pub const CONNECTION_FAILED: &str = "connection_failed";
pub const SSL_ERROR: &str = "ssl_error";
pub const TOO_MANY_REDIRECTS: &str = "too_many_redirects";
pub const REQUEST_FAILED: &str = "request_failed";

/// Probes URLs in sequential batches of concurrent HEAD requests
#[derive(Debug, Clone)]
pub struct LinkVerifier {
    // Client is an Arc internally, so cloning the verifier is cheap
    client: Client,
    batch_size: usize,
    timeout: Duration,
}

impl LinkVerifier {
    /// Builds the shared HTTP client from the engine config
    pub fn new(config: &EngineConfig) -> AnalysisResult<Self> {
        let client = Client::builder()
            .timeout(config.probe_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AnalysisError::Internal(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    /// Uses a caller-supplied client (e.g. one without proxy settings)
    pub fn with_client(client: Client, config: &EngineConfig) -> Self {
        LinkVerifier {
            client,
            batch_size: config.batch_size.max(1),
            timeout: config.probe_timeout,
        }
    }

    // Checks every URL and returns exactly one result per input, in input order.
    //
    // Batches run one after another; inside a batch, join_all drives all
    // probes concurrently and waits for the slowest one.
    pub async fn verify(&self, urls: &[String]) -> Vec<LinkResult> {
        let mut results = Vec::with_capacity(urls.len());

        for (index, batch) in urls.chunks(self.batch_size).enumerate() {
            debug!(batch = index + 1, size = batch.len(), "starting probe batch");
            let probes = batch.iter().map(|url| self.probe(url.clone()));
            results.extend(join_all(probes).await);
        }

        let broken = results.iter().filter(|r| !r.ok).count();
        info!(total = results.len(), broken, "link verification finished");
        results
    }

    // Checks a single link
    //
    // The tokio timeout wraps the whole request, so a server that accepts the
    // connection and then goes silent is still cut off.
    async fn probe(&self, url: String) -> LinkResult {
        if !is_probeable(&url) {
            return LinkResult::failure(url, INVALID_URL);
        }

        match tokio::time::timeout(self.timeout, self.client.head(&url).send()).await {
            Ok(Ok(response)) => LinkResult::response(url, response.status().as_u16()),
            Ok(Err(error)) => {
                let reason = categorize_error(&error);
                debug!(%url, reason, error = %error, "probe failed");
                LinkResult::failure(url, reason)
            }
            Err(_elapsed) => {
                debug!(%url, "probe timed out");
                LinkResult::failure(url, TIMEOUT)
            }
        }
    }
}

// Absolute http(s) URLs only
fn is_probeable(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some())
        .unwrap_or(false)
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - Connection refused
// - SSL certificate issues
// - Too many redirects
//
// The top-level message embeds the URL, so only the source chain is searched
// for keywords; otherwise a path like /docs/ssl would decide the category.
fn categorize_error(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        return TIMEOUT;
    }
    if error.is_redirect() {
        return TOO_MANY_REDIRECTS;
    }

    let detail = source_chain(error);
    let mentions_tls = detail.contains("certificate") || detail.contains("ssl") || detail.contains("tls");

    if error.is_connect() {
        if detail.contains("dns")
            || detail.contains("resolve")
            || detail.contains("lookup")
            || detail.contains("name or service")
        {
            DNS_ERROR
        } else if detail.contains("refused") {
            CONNECTION_REFUSED
        } else if mentions_tls {
            SSL_ERROR
        } else {
            CONNECTION_FAILED
        }
    } else if mentions_tls {
        SSL_ERROR
    } else {
        REQUEST_FAILED
    }
}

// Lowercased messages of every cause below the top-level error
fn source_chain(error: &reqwest::Error) -> String {
    let mut detail = String::new();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        detail.push_str(&inner.to_string().to_lowercase());
        detail.push_str(": ");
        source = std::error::Error::source(inner);
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn test_config(timeout: Duration) -> EngineConfig {
        EngineConfig {
            probe_timeout: timeout,
            ..EngineConfig::default()
        }
    }

    // Local test servers must not go through a proxy from the environment
    fn verifier(config: &EngineConfig) -> LinkVerifier {
        let client = Client::builder()
            .no_proxy()
            .timeout(config.probe_timeout)
            .build()
            .unwrap();
        LinkVerifier::with_client(client, config)
    }

    // Reads the request head and returns it
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn request_path(head: &str) -> String {
        head.split_whitespace().nth(1).unwrap_or_default().to_string()
    }

    struct TestServer {
        base: String,
        // Highest number of requests handled at the same time
        peak: Arc<AtomicUsize>,
        // Request path and the moment its head was read, in arrival order
        arrivals: Arc<Mutex<Vec<(String, Instant)>>>,
    }

    impl TestServer {
        fn arrival_of(&self, path: &str) -> Instant {
            self.arrivals
                .lock()
                .unwrap()
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, at)| *at)
                .unwrap_or_else(|| panic!("no request for {}", path))
        }
    }

    // Answers every request with `status` after a per-path delay
    async fn spawn_server(status: u16, delay: fn(&str) -> Duration) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let arrivals = Arc::new(Mutex::new(Vec::new()));
        let server = TestServer {
            base: format!("http://{}", addr),
            peak: peak.clone(),
            arrivals: arrivals.clone(),
        };

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else { return };
                let active = active.clone();
                let peak = peak.clone();
                let arrivals = arrivals.clone();
                tokio::spawn(async move {
                    let path = request_path(&read_request(&mut stream).await);
                    arrivals.lock().unwrap().push((path.clone(), Instant::now()));
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(delay(&path)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    let response = format!(
                        "HTTP/1.1 {} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                        status
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        server
    }

    fn no_delay(_path: &str) -> Duration {
        Duration::ZERO
    }

    // Accepts connections and never answers
    async fn spawn_silent_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_ok_response() {
        let server = spawn_server(200, no_delay).await;
        let config = test_config(Duration::from_secs(5));
        let results = verifier(&config).verify(&[format!("{}/ok", server.base)]).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].ok);
        assert_eq!(results[0].status, Some(200));
        assert_eq!(results[0].error, None);
    }

    #[tokio::test]
    async fn test_http_error_is_not_ok() {
        let server = spawn_server(404, no_delay).await;
        let config = test_config(Duration::from_secs(5));
        let results = verifier(&config).verify(&[format!("{}/missing", server.base)]).await;
        assert!(!results[0].ok);
        assert_eq!(results[0].status, Some(404));
        assert_eq!(results[0].error, None);
    }

    #[tokio::test]
    async fn test_timeout() {
        let base = spawn_silent_server().await;
        let config = test_config(Duration::from_millis(300));
        let results = verifier(&config).verify(&[base]).await;
        assert_eq!(
            results[0],
            LinkResult {
                url: results[0].url.clone(),
                status: None,
                ok: false,
                error: Some(TIMEOUT.to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind to get a free port, then close it
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        // Words in the URL must not change the category
        let urls: Vec<String> = ["/plain", "/docs/ssl-setup", "/dns", "/tls/resolve"]
            .iter()
            .map(|path| format!("http://{}{}", addr, path))
            .collect();
        let config = test_config(Duration::from_secs(5));
        let results = verifier(&config).verify(&urls).await;

        for result in &results {
            assert!(!result.ok);
            assert_eq!(result.status, None);
            assert_eq!(result.error.as_deref(), Some(CONNECTION_REFUSED), "{}", result.url);
        }
    }

    #[tokio::test]
    async fn test_unresolvable_domain() {
        let config = test_config(Duration::from_secs(5));
        let url = "https://this-domain-does-not-exist-12345.invalid".to_string();
        let results = LinkVerifier::new(&config).unwrap().verify(&[url.clone()]).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, url);
        assert!(!results[0].ok);
        assert_eq!(results[0].status, None);
        assert!(results[0].error.as_deref().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_probed() {
        let config = test_config(Duration::from_secs(5));
        let results = verifier(&config)
            .verify(&["not a url".to_string(), "ftp://files.example.com".to_string()])
            .await;
        assert!(results.iter().all(|r| r.error.as_deref() == Some(INVALID_URL)));
    }

    fn slow_first(path: &str) -> Duration {
        if path.ends_with("-slow") {
            Duration::from_millis(400)
        } else {
            Duration::from_millis(150)
        }
    }

    #[tokio::test]
    async fn test_batches_run_together_and_in_sequence() {
        let server = spawn_server(200, slow_first).await;
        let config = test_config(Duration::from_secs(5));
        let paths: Vec<String> = (0..12)
            .map(|i| if i == 0 { "/page/0-slow".to_string() } else { format!("/page/{}", i) })
            .collect();
        let urls: Vec<String> = paths.iter().map(|path| format!("{}{}", server.base, path)).collect();

        let results = verifier(&config).verify(&urls).await;

        assert_eq!(results.len(), urls.len());
        let returned: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        let expected: Vec<&str> = urls.iter().map(String::as_str).collect();
        assert_eq!(returned, expected);
        assert!(results.iter().all(|r| r.ok));

        // A whole batch is in flight at once, and never more
        assert_eq!(server.peak.load(Ordering::SeqCst), 5);

        // Batch 2 waits for the slowest member of batch 1
        let slow_done = server.arrival_of(&paths[0]) + Duration::from_millis(400);
        for path in &paths[5..10] {
            assert!(server.arrival_of(path) >= slow_done, "{} started before batch 1 finished", path);
        }

        // Batch 3 waits for all of batch 2
        let batch_two_done = paths[5..10]
            .iter()
            .map(|path| server.arrival_of(path) + Duration::from_millis(150))
            .max()
            .unwrap();
        for path in &paths[10..] {
            assert!(server.arrival_of(path) >= batch_two_done, "{} started before batch 2 finished", path);
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_affect_siblings() {
        let good = spawn_server(200, no_delay).await.base;
        let silent = spawn_silent_server().await;
        let config = test_config(Duration::from_millis(300));
        let urls = vec![good.clone(), silent, "bogus".to_string(), format!("{}/again", good)];

        let results = verifier(&config).verify(&urls).await;

        let oks: Vec<bool> = results.iter().map(|r| r.ok).collect();
        assert_eq!(oks, vec![true, false, false, true]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let config = test_config(Duration::from_secs(5));
        assert!(verifier(&config).verify(&[]).await.is_empty());
    }
}
