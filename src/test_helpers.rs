//! Shared test utilities for the picture-synth test suite.
//!
//! Provides an in-memory [`MockRepository`] that records every query it
//! answers, plus small assertion helpers for markup trees.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let repo = MockRepository::new()
//!     .with_alt("1", "Pier")
//!     .with_variant("1", "full", "/pier.jpg", 800, 600);
//!
//! let tree = Synthesizer::default().synthesize(&request, &repo).unwrap();
//! assert_eq!(attr_names(tree.img().unwrap()), ["src", "alt", "width", "height"]);
//! assert_eq!(repo.queries(), [Query::SrcAndDimensions("1".into(), "full".into()), ...]);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use crate::markup::Element;
use crate::repository::{AssetRepository, ImageRef, ResolvedImage, SrcsetCandidate};

/// One recorded repository call: image id and size keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Url(String, String),
    SrcAndDimensions(String, String),
    ResponsiveCandidates(String, String),
    AltText(String),
}

/// In-memory repository. Uses Mutex (not RefCell) for the query log so it
/// stays Sync like a real shared repository would be.
#[derive(Default)]
pub struct MockRepository {
    variants: HashMap<(String, String), ResolvedImage>,
    candidates: HashMap<(String, String), Vec<SrcsetCandidate>>,
    alts: HashMap<String, String>,
    queries: Mutex<Vec<Query>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variant(mut self, image: &str, size: &str, url: &str, width: u32, height: u32) -> Self {
        self.variants.insert(
            (image.to_string(), size.to_string()),
            ResolvedImage {
                url: url.to_string(),
                width,
                height,
            },
        );
        self
    }

    pub fn with_candidates(mut self, image: &str, size: &str, candidates: Vec<SrcsetCandidate>) -> Self {
        self.candidates
            .insert((image.to_string(), size.to_string()), candidates);
        self
    }

    pub fn with_alt(mut self, image: &str, alt: &str) -> Self {
        self.alts.insert(image.to_string(), alt.to_string());
        self
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, query: Query) {
        self.queries.lock().unwrap().push(query);
    }

    fn key(image: &ImageRef, size: &str) -> (String, String) {
        (image.as_str().to_string(), size.to_string())
    }
}

impl AssetRepository for MockRepository {
    fn resolve_url(&self, image: &ImageRef, size: &str) -> Option<String> {
        self.record(Query::Url(image.to_string(), size.to_string()));
        self.variants
            .get(&Self::key(image, size))
            .map(|v| v.url.clone())
    }

    fn resolve_src_and_dimensions(&self, image: &ImageRef, size: &str) -> Option<ResolvedImage> {
        self.record(Query::SrcAndDimensions(image.to_string(), size.to_string()));
        self.variants.get(&Self::key(image, size)).cloned()
    }

    fn resolve_responsive_candidates(&self, image: &ImageRef, size: &str) -> Vec<SrcsetCandidate> {
        self.record(Query::ResponsiveCandidates(image.to_string(), size.to_string()));
        self.candidates
            .get(&Self::key(image, size))
            .cloned()
            .unwrap_or_default()
    }

    fn resolve_alt_text(&self, image: &ImageRef) -> String {
        self.record(Query::AltText(image.to_string()));
        self.alts.get(image.as_str()).cloned().unwrap_or_default()
    }
}

// =========================================================================
// Markup helpers
// =========================================================================

/// Attribute names of an element, in order.
pub fn attr_names(el: &Element) -> Vec<&str> {
    el.attrs.iter().map(|a| a.name.as_str()).collect()
}

/// Every attribute name anywhere in the tree.
pub fn all_attr_names(el: &Element) -> Vec<&str> {
    let mut names = attr_names(el);
    for child in &el.children {
        names.extend(all_attr_names(child));
    }
    names
}
