//! Asset repository: where image URLs, dimensions and alt text come from.
//!
//! The [`AssetRepository`] trait is the only collaborator the synthesizer
//! talks to. A content management system, a processed-image manifest or a
//! test double can sit behind it; synthesis never touches files or the
//! network itself.
//!
//! [`ManifestRepository`] is the bundled implementation, backed by a JSON
//! document of the shape:
//!
//! ```json
//! {
//!   "images": {
//!     "42": {
//!       "alt": "Harbour at dawn",
//!       "sizes": {
//!         "thumbnail": { "url": "/media/harbour-150.jpg", "width": 150, "height": 100 },
//!         "large":     { "url": "/media/harbour-1024.jpg", "width": 1024, "height": 683 },
//!         "full":      { "url": "/media/harbour.jpg", "width": 2048, "height": 1365 }
//!       }
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image '{image}' size '{size}' has zero width or height")]
    ZeroDimension { image: String, size: String },
}

/// Opaque image identifier, resolved only by the repository.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for ImageRef {
    fn from(id: u64) -> Self {
        Self::new(id.to_string())
    }
}

/// A URL with the intrinsic size of the file behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// One `srcset` entry: URL plus its descriptor (`800w`, `2x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcsetCandidate {
    pub url: String,
    pub descriptor: String,
}

impl SrcsetCandidate {
    pub fn new(url: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// Join candidates into a `srcset` value.
pub fn srcset_string(candidates: &[SrcsetCandidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{} {}", c.url, c.descriptor))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Source of image URLs, dimensions and alt text.
///
/// `size` is a named variant keyword (`"full"`, `"large"`, ...). Every
/// method is a plain query; implementations may cache freely.
pub trait AssetRepository {
    /// URL of one named variant.
    fn resolve_url(&self, image: &ImageRef, size: &str) -> Option<String>;

    /// URL and intrinsic dimensions of one named variant.
    fn resolve_src_and_dimensions(&self, image: &ImageRef, size: &str) -> Option<ResolvedImage>;

    /// Responsive candidates up to `size`. Empty when the image has no
    /// smaller variants worth offering.
    fn resolve_responsive_candidates(&self, image: &ImageRef, size: &str) -> Vec<SrcsetCandidate>;

    /// Alt text, empty when none was recorded.
    fn resolve_alt_text(&self, image: &ImageRef) -> String;
}

/// One image entry in a [`ManifestRepository`] document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestImage {
    #[serde(default)]
    pub alt: String,
    pub sizes: BTreeMap<String, ResolvedImage>,
}

/// JSON-backed [`AssetRepository`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestRepository {
    pub images: BTreeMap<ImageRef, ManifestImage>,
}

impl ManifestRepository {
    /// Parse and validate a manifest document.
    pub fn from_json(json: &str) -> Result<Self, RepositoryError> {
        let repo: ManifestRepository = serde_json::from_str(json)?;
        for (id, image) in &repo.images {
            for (size, variant) in &image.sizes {
                if variant.width == 0 || variant.height == 0 {
                    return Err(RepositoryError::ZeroDimension {
                        image: id.to_string(),
                        size: size.clone(),
                    });
                }
            }
        }
        Ok(repo)
    }

    fn variant(&self, image: &ImageRef, size: &str) -> Option<&ResolvedImage> {
        self.images.get(image)?.sizes.get(size)
    }
}

impl AssetRepository for ManifestRepository {
    fn resolve_url(&self, image: &ImageRef, size: &str) -> Option<String> {
        self.variant(image, size).map(|v| v.url.clone())
    }

    fn resolve_src_and_dimensions(&self, image: &ImageRef, size: &str) -> Option<ResolvedImage> {
        self.variant(image, size).cloned()
    }

    /// Every variant no wider than the requested one, narrowest first, with
    /// `w` descriptors. A lone variant is not a useful srcset, so that case
    /// yields nothing.
    fn resolve_responsive_candidates(&self, image: &ImageRef, size: &str) -> Vec<SrcsetCandidate> {
        let (Some(entry), Some(target)) = (self.images.get(image), self.variant(image, size))
        else {
            return Vec::new();
        };

        let mut variants: Vec<&ResolvedImage> = entry
            .sizes
            .values()
            .filter(|v| v.width <= target.width)
            .collect();
        variants.sort_by_key(|v| v.width);
        variants.dedup_by_key(|v| v.width);

        if variants.len() < 2 {
            return Vec::new();
        }
        variants
            .into_iter()
            .map(|v| SrcsetCandidate::new(v.url.clone(), format!("{}w", v.width)))
            .collect()
    }

    fn resolve_alt_text(&self, image: &ImageRef) -> String {
        self.images
            .get(image)
            .map(|entry| entry.alt.clone())
            .unwrap_or_default()
    }
}
