// src/status/model.rs
// =============================================================================
// Wire and storage shapes for partner-link status data.
//
// The prober publishes:
//   {"link_status": [{"link": "https://a.example/", "latency": 0.42}, ...]}
//
// A latency of -1 means the prober could not reach the link.
//
// We persist the snapshot wrapped in an envelope with the fetch time:
//   {"data": {"link_status": [...]}, "timestamp": 1760000000000}
// =============================================================================

use serde::{Deserialize, Serialize};

/// Latency value the prober reports for unknown/unreachable links
pub const UNKNOWN_LATENCY: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkStatus {
    pub link: String,
    /// Seconds, or -1 when unknown
    pub latency: f64,
}

impl LinkStatus {
    pub fn is_unknown(&self) -> bool {
        self.latency == UNKNOWN_LATENCY
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub link_status: Vec<LinkStatus>,
}

impl StatusSnapshot {
    // Finds the entry for `link`, ignoring one trailing '/' on either side
    pub fn find(&self, link: &str) -> Option<&LinkStatus> {
        let wanted = normalize_link(link);
        self.link_status
            .iter()
            .find(|status| normalize_link(&status.link) == wanted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub data: StatusSnapshot,
    /// Fetch time, milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Strips exactly one trailing '/'
pub fn normalize_link(link: &str) -> &str {
    link.strip_suffix('/').unwrap_or(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wire_format() {
        let json = r#"{"link_status":[{"link":"https://x.com/","latency":1.5},{"link":"https://y.com","latency":-1}]}"#;
        let snapshot: StatusSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.link_status.len(), 2);
        assert!(snapshot.link_status[1].is_unknown());
    }

    #[test]
    fn test_find_ignores_one_trailing_slash() {
        let snapshot = StatusSnapshot {
            link_status: vec![LinkStatus {
                link: "https://x.com/".to_string(),
                latency: 0.3,
            }],
        };
        assert!(snapshot.find("https://x.com").is_some());
        assert!(snapshot.find("https://x.com/").is_some());
        assert!(snapshot.find("https://x.com//").is_none());
        assert!(snapshot.find("https://y.com").is_none());
    }

    #[test]
    fn test_normalize_link() {
        assert_eq!(normalize_link("https://a.b/"), "https://a.b");
        assert_eq!(normalize_link("https://a.b//"), "https://a.b/");
        assert_eq!(normalize_link("https://a.b"), "https://a.b");
    }
}
