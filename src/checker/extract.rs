// src/checker/extract.rs
// =============================================================================
// This module pulls URLs out of source code.
//
// Code can mention a URL in many ways, so we look at four surfaces:
// 1. Markup attributes:      <a href="https://...">
// 2. Markdown links:         [text](https://...)
// 3. HTTP client calls:      fetch("https://..."), requests.get('https://...')
// 4. Bare URLs:              anything else starting with http:// or https://
//
// The same URL usually shows up on several surfaces at once (an href is also
// a bare URL), so results are deduplicated by exact string. We do NOT
// normalize: `https://a.com` and `https://a.com/` are two different URLs.
//
// Output order is the order of first appearance in the text.
// =============================================================================

use regex::Regex;
use std::collections::HashSet;

// Extracts every absolute http(s) URL referenced in `code`
//
// Example input:
//   r#"fetch("https://api.example.com/v1"); // see https://docs.example.com"#
//
// Example output:
//   vec!["https://api.example.com/v1", "https://docs.example.com"]
pub fn extract_urls(code: &str) -> Vec<String> {
    // Delimited surfaces; each entry is (start, end, url)
    let mut captured: Vec<(usize, usize, &str)> = Vec::new();
    captured.extend(
        captures(href_pattern(), code)
            .filter(|(_, _, href)| is_checkable_href(href)),
    );
    captured.extend(captures(markdown_link_pattern(), code));
    captured.extend(captures(http_call_pattern(), code));

    // A bare match starting inside a captured URL is a truncated copy of it
    // (the bare surface stops at spaces and parentheses), not a new URL
    let bare = bare_url_pattern()
        .find_iter(code)
        .filter(|m| !captured.iter().any(|&(start, end, _)| (start..end).contains(&m.start())))
        .map(|m| (m.start(), m.as_str()));

    // (byte offset, url) from every surface
    let mut found: Vec<(usize, &str)> = captured
        .iter()
        .map(|&(start, _, url)| (start, url))
        .collect();
    found.extend(bare);

    // Stable sort keeps surface order for URLs starting at the same offset
    found.sort_by_key(|(offset, _)| *offset);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|(_, url)| seen.insert(*url))
        .map(|(_, url)| url.to_string())
        .collect()
}

// Yields (start, end, text) of capture group 1 for every match
fn captures<'a>(pattern: &'a Regex, code: &'a str) -> impl Iterator<Item = (usize, usize, &'a str)> + 'a {
    pattern
        .captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.end(), m.as_str()))
}

fn href_pattern() -> &'static Regex {
    static_regex!(r#"(?i)\bhref\s*=\s*["']([^"']+)["']"#)
}

fn markdown_link_pattern() -> &'static Regex {
    static_regex!(r"\[[^\]]*\]\((https?://[^)\s]+)\)")
}

// The first string argument of something that looks like an HTTP client call
fn http_call_pattern() -> &'static Regex {
    static_regex!(
        r#"\b(?:fetch|axios(?:\.(?:get|post|put|patch|delete|head|request))?|(?:requests|httpx|http|https|client|session)\.(?:get|post|put|patch|delete|head|request)|urlopen|\$\.(?:get|post|ajax)|XMLHttpRequest\(\)\.open)\s*\(\s*(?:["'](?:GET|POST|PUT|DELETE|HEAD)["']\s*,\s*)?["'`](https?://[^"'`\s]+)["'`]"#
    )
}

// Stops at whitespace, quotes, backticks, angle brackets and parentheses
fn bare_url_pattern() -> &'static Regex {
    static_regex!(r#"https?://[^\s"'`<>()]+"#)
}

// Only absolute http(s) hrefs are worth probing; in-page fragments and
// script-protocol links are dropped explicitly
fn is_checkable_href(href: &str) -> bool {
    let href = href.trim();
    if href.starts_with('#') || href.to_ascii_lowercase().starts_with("javascript:") {
        return false;
    }
    href.starts_with("http://") || href.starts_with("https://")
}
