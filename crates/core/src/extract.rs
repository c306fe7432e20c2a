//! Region extraction by CSS selector.
//!
//! A region is every element matched by a selector, serialized back to
//! markup, after all nodes matched by an optional exclusion selector have
//! been removed from the document.

use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::{PagecutError, Result};

/// A selector pair naming one region of a page.
///
/// Both strings are opaque to the pipeline; only the extractor interprets
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSelector {
    matcher: String,
    exclude: Option<String>,
}

impl RegionSelector {
    pub fn new(matcher: impl Into<String>) -> Self {
        Self { matcher: matcher.into(), exclude: None }
    }

    /// Removes nodes matching `exclude` before the region is serialized.
    pub fn excluding(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    pub fn with_exclude(mut self, exclude: Option<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn matcher(&self) -> &str {
        &self.matcher
    }

    pub fn exclude(&self) -> Option<&str> {
        self.exclude.as_deref()
    }
}

/// Pulls a region out of a markup document.
pub trait RegionExtractor {
    /// Returns the serialized region, or an empty string when nothing matches.
    fn extract(&self, document: &str, region: &RegionSelector) -> Result<String>;
}

/// [`RegionExtractor`] backed by `scraper` CSS selectors.
///
/// Matches are emitted as outer HTML in document order, one per line. A
/// match nested inside another match is only emitted as part of its
/// outermost ancestor.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectorExtractor;

impl RegionExtractor for SelectorExtractor {
    fn extract(&self, document: &str, region: &RegionSelector) -> Result<String> {
        let matcher = compile(region.matcher())?;
        let exclude = region.exclude().map(compile).transpose()?;

        let mut html = Html::parse_document(document);

        if let Some(exclude) = &exclude {
            let doomed: Vec<_> = html.select(exclude).map(|el| el.id()).collect();
            for id in doomed {
                if let Some(mut node) = html.tree.get_mut(id) {
                    node.detach();
                }
            }
        }

        let matches: Vec<_> = html.select(&matcher).collect();
        let matched: HashSet<_> = matches.iter().map(|el| el.id()).collect();

        let parts: Vec<String> = matches
            .iter()
            .filter(|el| !el.ancestors().any(|a| matched.contains(&a.id())))
            .map(|el| el.html())
            .collect();

        Ok(parts.join("\n"))
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PagecutError::InvalidSelector(format!("{}: {}", selector, e)))
}
