// src/status/severity.rs
// =============================================================================
// Maps a probed latency to the tag the friend-link list shows next to a link.
//
//   latency        severity   text
//   -1             Unknown    "未知"
//   <= 2 s         Good       "1.23 s"
//   <= 5 s         Fair
//   <= 10 s        Poor
//   > 10 s         Bad
//
// Bounds are inclusive and checked in ascending order.
// =============================================================================

use super::model::LinkStatus;
use serde::Serialize;

/// Label shown when the prober could not reach a link
pub const UNKNOWN_TEXT: &str = "未知";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Good,
    Fair,
    Poor,
    Bad,
    Unknown,
}

impl Severity {
    /// CSS class of the status tag in the rendering layer
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Good => "status-tag-green",
            Severity::Fair => "status-tag-light-yellow",
            Severity::Poor => "status-tag-dark-yellow",
            Severity::Bad | Severity::Unknown => "status-tag-red",
        }
    }

    /// Whether the link should count as healthy for the CLI exit code
    pub fn is_reachable(self) -> bool {
        !matches!(self, Severity::Bad | Severity::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub severity: Severity,
    pub text: String,
}

pub fn classify(status: &LinkStatus) -> StatusInfo {
    // NaN never comes from the prober; treat it like the sentinel
    if status.is_unknown() || status.latency.is_nan() {
        return StatusInfo {
            severity: Severity::Unknown,
            text: UNKNOWN_TEXT.to_string(),
        };
    }

    let latency = status.latency;
    let severity = if latency <= 2.0 {
        Severity::Good
    } else if latency <= 5.0 {
        Severity::Fair
    } else if latency <= 10.0 {
        Severity::Poor
    } else {
        Severity::Bad
    };

    StatusInfo {
        severity,
        text: format!("{:.2} s", latency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(latency: f64) -> StatusInfo {
        classify(&LinkStatus {
            link: "https://x.com".to_string(),
            latency,
        })
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(info(2.00).severity, Severity::Good);
        assert_eq!(info(2.01).severity, Severity::Fair);
        assert_eq!(info(5.00).severity, Severity::Fair);
        assert_eq!(info(10.00).severity, Severity::Poor);
        assert_eq!(info(10.01).severity, Severity::Bad);
        assert_eq!(info(0.0).severity, Severity::Good);
    }

    #[test]
    fn test_unknown_sentinel() {
        let unknown = info(-1.0);
        assert_eq!(unknown.severity, Severity::Unknown);
        assert_eq!(unknown.text, "未知");
        assert_eq!(unknown.severity.css_class(), "status-tag-red");
    }

    #[test]
    fn test_text_has_two_decimals() {
        assert_eq!(info(1.0).text, "1.00 s");
        assert_eq!(info(3.14159).text, "3.14 s");
        assert_eq!(info(12.5).text, "12.50 s");
    }

    #[test]
    fn test_css_classes() {
        assert_eq!(Severity::Good.css_class(), "status-tag-green");
        assert_eq!(Severity::Fair.css_class(), "status-tag-light-yellow");
        assert_eq!(Severity::Poor.css_class(), "status-tag-dark-yellow");
        assert_eq!(Severity::Bad.css_class(), "status-tag-red");
    }
}
