// src/mediator/classify.rs
// =============================================================================
// Decides whether an outbound link needs to go through the redirect page.
//
// Three outcomes:
// - Internal: relative paths, in-page anchors, non-http(s) schemes, and
//   anything we cannot parse. Never touched.
// - Trusted: http(s) link whose host is (a subdomain of) a trusted domain
// - Untrusted: every other http(s) link
//
// Malformed links are Internal on every path (classify AND is_external), so
// a link we cannot read is left alone rather than sent to the redirect page.
// =============================================================================

use crate::error::MediationError;
use std::collections::BTreeSet;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    Internal,
    Trusted,
    Untrusted,
}

// Classifies `url` against the trusted domain set
//
// Examples (trusted = {"trusted.com"}):
//   "/about"                    -> Internal
//   "#top"                      -> Internal
//   "mailto:me@example.com"     -> Internal
//   "https://a.trusted.com/x"   -> Trusted
//   "https://evil.com/x"        -> Untrusted
pub fn classify(url: &str, trusted_domains: &BTreeSet<String>) -> LinkClass {
    if url.starts_with('/') || url.starts_with('#') {
        return LinkClass::Internal;
    }

    if !has_web_scheme(url) {
        return LinkClass::Internal;
    }

    let host = match parse_host(url) {
        Ok(host) => host,
        Err(e) => {
            tracing::debug!(error = %e, "leaving malformed link unmediated");
            return LinkClass::Internal;
        }
    };

    if trusted_domains.iter().any(|domain| host_matches(&host, domain)) {
        LinkClass::Trusted
    } else {
        LinkClass::Untrusted
    }
}

/// True when `url` would be sent through the redirect page
pub fn is_external(url: &str, trusted_domains: &BTreeSet<String>) -> bool {
    !url.is_empty() && classify(url, trusted_domains) == LinkClass::Untrusted
}

// Only "http://" and "https://" links are candidates (case-insensitive scheme)
fn has_web_scheme(url: &str) -> bool {
    let lowered = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

// Pulls the lowercase host out of an absolute http(s) URL
fn parse_host(url: &str) -> Result<String, MediationError> {
    let parsed = Url::parse(url).map_err(|e| MediationError::MalformedUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(host.trim_end_matches('.').to_string()),
        _ => Err(MediationError::MalformedUrl {
            url: url.to_string(),
            reason: "missing host".to_string(),
        }),
    }
}

// Exact match or a subdomain match on a label boundary:
// "a.trusted.com" matches "trusted.com", "eviltrusted.com" does not
fn host_matches(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }
    host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}
