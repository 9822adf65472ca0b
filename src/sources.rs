//! `<source>` candidate list construction.
//!
//! Two mutually exclusive modes:
//!
//! - **Explicit**: the caller names a size variant per breakpoint. Each entry
//!   becomes a `<source media=... srcset=...>`; the browser picks by media
//!   query, so no `sizes` is emitted.
//! - **Derived**: the repository's responsive candidate set for the request's
//!   size keyword becomes one `<source srcset=... sizes=...>`. Images too
//!   small to have variants fall back to the base URL, without `sizes`.
//!
//! With an [`AlternateFormat`] enabled, every candidate is duplicated with
//! rewritten file extensions and a `type`. All alternates come first, in the
//! same order as the fallbacks that follow them, since browsers take the
//! first `<source>` they can use.

use crate::breakpoints::{BreakpointTable, format_px};
use crate::markup::Element;
use crate::repository::{AssetRepository, ImageRef, srcset_string};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A next-gen encoding offered ahead of the original files.
///
/// The alternate files are expected to sit next to the originals with the
/// suffix appended: `photo.jpg` → `photo.jpg.webp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlternateFormat {
    /// Appended to each matching extension, without the dot.
    pub suffix: String,
    /// Emitted as the source's `type`.
    pub mime_type: String,
    /// Original extensions that have an alternate, without the dot.
    pub extensions: Vec<String>,
}

impl Default for AlternateFormat {
    fn default() -> Self {
        Self::webp()
    }
}

impl AlternateFormat {
    pub fn webp() -> Self {
        Self {
            suffix: "webp".to_string(),
            mime_type: "image/webp".to_string(),
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }

    pub fn avif() -> Self {
        Self {
            suffix: "avif".to_string(),
            mime_type: "image/avif".to_string(),
            ..Self::webp()
        }
    }

    /// Append the suffix to every `.ext` occurrence in a srcset.
    ///
    /// `"/a.jpg 300w, /b.png 600w"` → `"/a.jpg.webp 300w, /b.png.webp 600w"`
    pub fn rewrite(&self, srcset: &str) -> String {
        self.extensions.iter().fold(srcset.to_string(), |acc, ext| {
            acc.replace(&format!(".{ext}"), &format!(".{ext}.{}", self.suffix))
        })
    }
}

/// One `<source>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidate {
    pub media: Option<String>,
    pub srcset: String,
    pub sizes: Option<String>,
    /// MIME type for alternate-format entries, `None` for fallbacks.
    pub mime_type: Option<String>,
}

impl SourceCandidate {
    pub fn is_alternate_format(&self) -> bool {
        self.mime_type.is_some()
    }

    fn alternate(&self, format: &AlternateFormat) -> Self {
        Self {
            media: self.media.clone(),
            srcset: format.rewrite(&self.srcset),
            sizes: self.sizes.clone(),
            mime_type: Some(format.mime_type.clone()),
        }
    }

    /// `type`, `srcset`, `sizes`, `media`, in that order.
    pub fn to_element(&self) -> Element {
        Element::new("source")
            .attr_opt("type", self.mime_type.clone())
            .attr("srcset", self.srcset.clone())
            .attr_opt("sizes", self.sizes.clone())
            .attr_opt("media", self.media.clone())
    }
}

/// Media condition selecting one breakpoint for explicit sources.
///
/// The narrow band and the base breakpoint split the smallest viewports
/// between them at the narrow band's ceiling. Unknown names yield `None`.
pub fn media_condition(table: &BreakpointTable, breakpoint: &str) -> Option<String> {
    if let Some(narrow) = table.narrow().filter(|n| n.name == breakpoint) {
        return narrow
            .max_width
            .map(|max| format!("(max-width: {})", format_px(max)));
    }

    let index = table.position(breakpoint)?;
    let bp = &table.grid()[index];
    let lower = match (index, bp.min_width) {
        (0, _) => table
            .narrow()
            .and_then(|n| n.max_width)
            .map(|max| max.ceil()),
        (_, min) => min,
    };
    let condition = match (lower, bp.max_width) {
        (Some(min), Some(max)) => format!(
            "(min-width: {}) and (max-width: {})",
            format_px(min),
            format_px(max)
        ),
        (Some(min), None) => format!("(min-width: {})", format_px(min)),
        (None, Some(max)) => format!("(max-width: {})", format_px(max)),
        (None, None) => "all".to_string(),
    };
    Some(condition)
}

/// One source per `(breakpoint, size variant)` pair, caller order kept.
/// Pairs with an unknown breakpoint or an unresolvable variant are skipped.
pub fn explicit_sources(
    repo: &dyn AssetRepository,
    image: &ImageRef,
    table: &BreakpointTable,
    variants: &[(String, String)],
) -> Vec<SourceCandidate> {
    variants
        .iter()
        .filter_map(|(breakpoint, variant)| {
            let Some(media) = media_condition(table, breakpoint) else {
                warn!(%image, %breakpoint, "unknown breakpoint for explicit source");
                return None;
            };
            let Some(url) = repo.resolve_url(image, variant) else {
                warn!(%image, %variant, "size variant not found for explicit source");
                return None;
            };
            Some(SourceCandidate {
                media: Some(media),
                srcset: url,
                sizes: None,
                mime_type: None,
            })
        })
        .collect()
}

/// The single repository-derived source, or the base-URL fallback.
pub fn derived_sources(
    repo: &dyn AssetRepository,
    image: &ImageRef,
    size: &str,
    sizes: Option<&str>,
) -> Vec<SourceCandidate> {
    let candidates = repo.resolve_responsive_candidates(image, size);
    if !candidates.is_empty() {
        return vec![SourceCandidate {
            media: None,
            srcset: srcset_string(&candidates),
            sizes: sizes.map(str::to_string),
            mime_type: None,
        }];
    }

    match repo.resolve_url(image, size) {
        Some(url) => vec![SourceCandidate {
            media: None,
            srcset: url,
            sizes: None,
            mime_type: None,
        }],
        None => Vec::new(),
    }
}

/// Prepend an alternate-format copy of every candidate, preserving order:
/// `[a, b]` → `[a', b', a, b]`.
pub fn with_alternate_format(
    fallbacks: Vec<SourceCandidate>,
    format: &AlternateFormat,
) -> Vec<SourceCandidate> {
    let mut out: Vec<SourceCandidate> = fallbacks.iter().map(|s| s.alternate(format)).collect();
    out.extend(fallbacks);
    out
}
