// src/mediator/page.rs
// =============================================================================
// An in-memory page: the anchors of an HTML (or Markdown) document, with
// their attributes, in document order.
//
// We use the `scraper` crate to parse HTML and select every <a> element.
// Markdown is first rendered to HTML with `pulldown-cmark`, so a Markdown
// link becomes an ordinary <a href> before the sweep sees it.
//
// Page implements AnchorTree, so sweep() can rewrite it in place and the
// caller can read back the final hrefs.
// =============================================================================

use super::sweep::AnchorTree;
use scraper::{Html, Selector};
use serde::Serialize;

/// One <a> element and its attributes, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub attributes: Vec<(String, String)>,
}

impl Anchor {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn href(&self) -> Option<&str> {
        self.attr("href")
    }

    fn set(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub anchors: Vec<Anchor>,
}

impl Page {
    // Collects every <a> element of an HTML document
    //
    // Anchors without an href are kept too: the sweep counts them and
    // moves on, the same way a browser DOM would hand them over.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        // "a" is a constant selector, parsing it cannot fail
        let selector = Selector::parse("a").unwrap();

        let anchors = document
            .select(&selector)
            .map(|element| Anchor {
                attributes: element
                    .value()
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            })
            .collect();

        Self { anchors }
    }

    /// Renders Markdown to HTML, then collects its anchors
    pub fn from_markdown(markdown: &str) -> Self {
        let parser = pulldown_cmark::Parser::new(markdown);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);
        Self::from_html(&html)
    }

    /// Current hrefs in document order (None for anchors without one)
    pub fn hrefs(&self) -> Vec<Option<&str>> {
        self.anchors.iter().map(Anchor::href).collect()
    }
}

impl AnchorTree for Page {
    type Handle = usize;

    fn enumerate_anchors(&self) -> Vec<usize> {
        (0..self.anchors.len()).collect()
    }

    fn read_href(&self, anchor: usize) -> Option<String> {
        self.anchors.get(anchor)?.href().map(String::from)
    }

    fn has_attribute(&self, anchor: usize, name: &str) -> bool {
        self.anchors
            .get(anchor)
            .map(|a| a.attr(name).is_some())
            .unwrap_or(false)
    }

    fn set_attribute(&mut self, anchor: usize, name: &str, value: &str) {
        if let Some(a) = self.anchors.get_mut(anchor) {
            a.set(name, value);
        }
    }
}
