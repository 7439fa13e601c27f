// src/mediator/sweep.rs
// =============================================================================
// Walks every anchor on a page and rewrites the untrusted ones in place.
//
// The page is reached through the AnchorTree trait, so the walk works on any
// document model: the in-memory Page in page.rs, a test double, or a real DOM
// binding in a host.
//
// For each anchor:
// 1. Skip it if it carries any ignore attribute (data-nolink, ...)
// 2. Skip it if it has no href, or an empty one
// 3. Compute mediate(href); if it changed, write it back and mark the anchor
//    as an external link that opens in a new tab
//
// Running the sweep twice is safe: rewritten hrefs are relative ("/go?u=...")
// and relative links are never rewritten.
// =============================================================================

use super::rewrite::mediate;
use crate::config::MediationConfig;
use serde::Serialize;

/// rel value set on every rewritten anchor
pub const EXTERNAL_REL: &str = "external nofollow noopener noreferrer";

/// target value set on every rewritten anchor
pub const EXTERNAL_TARGET: &str = "_blank";

// Capability the sweep needs from a document
//
// `Handle` identifies one anchor element for the lifetime of the sweep.
pub trait AnchorTree {
    type Handle: Copy;

    /// Every anchor-like element, in document order
    fn enumerate_anchors(&self) -> Vec<Self::Handle>;

    fn read_href(&self, anchor: Self::Handle) -> Option<String>;

    fn has_attribute(&self, anchor: Self::Handle, name: &str) -> bool;

    fn set_attribute(&mut self, anchor: Self::Handle, name: &str, value: &str);

    fn write_href(&mut self, anchor: Self::Handle, href: &str) {
        self.set_attribute(anchor, "href", href);
    }
}

/// One href that the sweep changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    pub original: String,
    pub mediated: String,
}

/// What a sweep did to a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Anchors found on the page
    pub visited: usize,
    /// Anchors skipped because of an ignore attribute
    pub ignored: usize,
    /// Anchors skipped because the href was missing or empty
    pub without_href: usize,
    pub rewritten: Vec<Rewrite>,
}

impl SweepReport {
    pub fn unchanged(&self) -> bool {
        self.rewritten.is_empty()
    }
}

pub fn sweep<T: AnchorTree>(tree: &mut T, config: &MediationConfig) -> SweepReport {
    let mut report = SweepReport::default();

    if !config.enable {
        tracing::debug!("link mediation disabled, skipping sweep");
        return report;
    }

    for anchor in tree.enumerate_anchors() {
        report.visited += 1;

        if should_ignore(tree, anchor, config) {
            report.ignored += 1;
            continue;
        }

        let href = match tree.read_href(anchor) {
            Some(href) if !href.is_empty() => href,
            _ => {
                report.without_href += 1;
                continue;
            }
        };

        let mediated = mediate(&href, config);
        if mediated != href {
            tree.write_href(anchor, &mediated);
            tree.set_attribute(anchor, "rel", EXTERNAL_REL);
            tree.set_attribute(anchor, "target", EXTERNAL_TARGET);
            report.rewritten.push(Rewrite {
                original: href,
                mediated,
            });
        }
    }

    tracing::debug!(
        visited = report.visited,
        rewritten = report.rewritten.len(),
        ignored = report.ignored,
        "sweep finished"
    );
    report
}

fn should_ignore<T: AnchorTree>(tree: &T, anchor: T::Handle, config: &MediationConfig) -> bool {
    config
        .ignore_attributes
        .iter()
        .any(|attr| tree.has_attribute(anchor, attr))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is an associated type (type Handle)?
//    - Each AnchorTree picks its own way to point at an anchor
//    - Page uses a usize index; a DOM binding could use a node id
//    - `Copy` lets the sweep pass handles around without borrowing the tree
//
// 2. Why does write_href have a body in the trait?
//    - It is a default method: implementors get it for free
//    - They can still override it if href needs special handling
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // Minimal document: each anchor is a bag of attributes
    #[derive(Default)]
    struct FakeDom {
        anchors: Vec<HashMap<String, String>>,
    }

    impl FakeDom {
        fn with(mut self, attrs: &[(&str, &str)]) -> Self {
            self.anchors.push(
                attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            );
            self
        }

        fn attr(&self, index: usize, name: &str) -> Option<&str> {
            self.anchors[index].get(name).map(String::as_str)
        }
    }

    impl AnchorTree for FakeDom {
        type Handle = usize;

        fn enumerate_anchors(&self) -> Vec<usize> {
            (0..self.anchors.len()).collect()
        }

        fn read_href(&self, anchor: usize) -> Option<String> {
            self.anchors[anchor].get("href").cloned()
        }

        fn has_attribute(&self, anchor: usize, name: &str) -> bool {
            self.anchors[anchor].contains_key(name)
        }

        fn set_attribute(&mut self, anchor: usize, name: &str, value: &str) {
            self.anchors[anchor].insert(name.to_string(), value.to_string());
        }
    }

    fn config() -> MediationConfig {
        MediationConfig::default().with_trusted_domains(["trusted.com"])
    }

    #[test]
    fn test_rewrites_only_untrusted() {
        let mut dom = FakeDom::default()
            .with(&[("href", "https://evil.com/x")])
            .with(&[("href", "https://a.trusted.com/")])
            .with(&[("href", "/local")]);

        let report = sweep(&mut dom, &config());

        assert_eq!(report.visited, 3);
        assert_eq!(report.rewritten.len(), 1);
        assert_eq!(dom.attr(0, "href"), Some("/go?u=aHR0cHM6Ly9ldmlsLmNvbS94"));
        assert_eq!(dom.attr(0, "rel"), Some(EXTERNAL_REL));
        assert_eq!(dom.attr(0, "target"), Some("_blank"));
        assert_eq!(dom.attr(1, "href"), Some("https://a.trusted.com/"));
        assert_eq!(dom.attr(1, "rel"), None);
        assert_eq!(dom.attr(2, "href"), Some("/local"));
    }

    #[test]
    fn test_nolink_attribute_is_respected() {
        let mut dom = FakeDom::default().with(&[("href", "https://evil.com/x"), ("data-nolink", "")]);

        let report = sweep(&mut dom, &config());

        assert_eq!(report.ignored, 1);
        assert!(report.unchanged());
        assert_eq!(dom.attr(0, "href"), Some("https://evil.com/x"));
        assert_eq!(dom.attr(0, "target"), None);
    }

    #[test]
    fn test_disabled_rewrites_nothing() {
        let mut dom = FakeDom::default()
            .with(&[("href", "https://evil.com/x")])
            .with(&[("href", "https://other.org")]);
        let config = MediationConfig {
            enable: false,
            ..config()
        };

        let report = sweep(&mut dom, &config);

        assert_eq!(report, SweepReport::default());
        assert_eq!(dom.attr(0, "href"), Some("https://evil.com/x"));
        assert_eq!(dom.attr(1, "href"), Some("https://other.org"));
    }

    #[test]
    fn test_missing_and_empty_href_are_skipped() {
        let mut dom = FakeDom::default()
            .with(&[("name", "top")])
            .with(&[("href", "")]);

        let report = sweep(&mut dom, &config());

        assert_eq!(report.without_href, 2);
        assert_eq!(dom.attr(0, "href"), None);
        assert_eq!(dom.attr(1, "href"), Some(""));
    }

    #[test]
    fn test_second_sweep_is_a_no_op() {
        let mut dom = FakeDom::default()
            .with(&[("href", "https://evil.com/x")])
            .with(&[("href", "https://other.org/?a=1")]);

        let first = sweep(&mut dom, &config());
        let hrefs: Vec<_> = (0..2).map(|i| dom.attr(i, "href").map(String::from)).collect();
        let second = sweep(&mut dom, &config());

        assert_eq!(first.rewritten.len(), 2);
        assert!(second.unchanged());
        let after: Vec<_> = (0..2).map(|i| dom.attr(i, "href").map(String::from)).collect();
        assert_eq!(hrefs, after);
    }
}
