//! # Picture Synth
//!
//! Responsive `<picture>` markup from an image reference, a size keyword and
//! the grid column classes of the container the image sits in.
//!
//! ```text
//! "col-12 col-md-6"  ──▶  span per breakpoint  ──▶  sizes="(max-width: 450px) ..."
//!                                                          │
//! image + size  ──▶  repository  ──▶  <source> list  ──────┴──▶  <picture> tree
//!                                                                  │
//!                                          deferred-load rewrite ◀─┘
//! ```
//!
//! # Pipeline
//!
//! 1. **Columns**: the class string is parsed into a span per grid breakpoint;
//!    gaps inherit the nearest smaller breakpoint, the smallest defaults to 12.
//! 2. **Sizes**: each breakpoint contributes a media clause stating the image's
//!    rendered width: container width over 12 columns, times the span, minus the
//!    gutter.
//! 3. **Sources**: either caller-chosen variants per breakpoint (media-selected)
//!    or the repository's responsive candidate set (width-selected), optionally
//!    preceded by alternate-format copies.
//! 4. **Assembly**: `<picture>` with the sources and one `<img>`; with deferred
//!    loading, `src`/`srcset`/`sizes` become `data-*` and a `<noscript>` copy of
//!    the eager `<img>` follows.
//!
//! Every stage is a pure function over its inputs. The only collaborator is the
//! [`AssetRepository`](repository::AssetRepository), queried synchronously.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`breakpoints`] | Breakpoint tables (Bootstrap 4 and 5 built in, custom tables validated) |
//! | [`columns`] | Grid column class parser and gap filling |
//! | [`sizes`] | `sizes` attribute synthesis |
//! | [`sources`] | `<source>` list construction and alternate formats |
//! | [`markup`] | Element tree, maud rendering, deferred-load rewrite |
//! | [`picture`] | Request builder and the [`Synthesizer`](picture::Synthesizer) |
//! | [`repository`] | Asset repository trait and the JSON manifest implementation |
//! | [`config`] | `picture-synth.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting for `explain` |
//!
//! # Design Decisions
//!
//! ## Fail Closed
//!
//! If the repository cannot resolve the requested image, synthesis returns
//! `None`. There is no partial tree and never an `<img>` without a `src`.
//! Bad column classes are skipped by default; strict parsing is opt-in.
//!
//! ## Tree Rewrite, Not String Replace
//!
//! Deferred loading renames attributes on the element tree by exact name, so
//! `data-source` or a URL containing `src="` can never be rewritten by
//! accident, and the rewrite has an exact inverse.
//!
//! ## Maud Rendering
//!
//! The tree renders through [`maud::Render`]: values are escaped exactly once,
//! at render time, and a [`MarkupTree`](markup::MarkupTree) can be embedded in
//! any maud template as-is.
//!
//! ## One Engine, Versioned Tables
//!
//! Grid geometry differs between Bootstrap 4 (xs..xl, 30px gutter) and
//! Bootstrap 5 (xs..xxl, 24px gutter). The difference is data: a
//! [`BreakpointTable`](breakpoints::BreakpointTable) and
//! [`SizesOptions`](sizes::SizesOptions) handed to the synthesizer.

pub mod breakpoints;
pub mod columns;
pub mod config;
pub mod markup;
pub mod output;
pub mod picture;
pub mod repository;
pub mod sizes;
pub mod sources;

pub use picture::{PictureRequest, Synthesizer};
pub use repository::{AssetRepository, ImageRef};

#[cfg(test)]
pub(crate) mod test_helpers;
