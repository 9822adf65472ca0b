//! Picture requests and the synthesizer that turns them into markup.
//!
//! A [`PictureRequest`] is an immutable description of one image placement,
//! put together with [`PictureRequestBuilder`]. A [`Synthesizer`] owns the
//! breakpoint table and layout constants and turns requests into
//! [`MarkupTree`]s; it holds no per-request state, so one synthesizer serves
//! any number of requests.
//!
//! ```
//! # use picture_synth::picture::{PictureRequest, Synthesizer};
//! # use picture_synth::repository::ManifestRepository;
//! let repo = ManifestRepository::from_json(r#"{"images": {"1": {"alt": "Pier",
//!     "sizes": {"full": {"url": "/pier.jpg", "width": 800, "height": 600}}}}}"#).unwrap();
//!
//! let request = PictureRequest::builder("1", "full")
//!     .auto_sizes("col-md-6")
//!     .class("img-fluid")
//!     .build();
//!
//! let html = Synthesizer::default().render(&request, &repo).unwrap();
//! assert_eq!(
//!     html,
//!     r#"<picture><source srcset="/pier.jpg"><img src="/pier.jpg" alt="Pier" width="800" height="600" class="img-fluid"></picture>"#
//! );
//! ```

use crate::breakpoints::BreakpointTable;
use crate::columns::{ColumnSpanError, SpanPolicy, parse_column_spans};
use crate::config::SynthConfig;
use crate::markup::{Element, MarkupTree, defer_loading, remove_class};
use crate::repository::{AssetRepository, ImageRef};
use crate::sizes::{SizesOptions, build_sizes};
use crate::sources::{
    AlternateFormat, SourceCandidate, derived_sources, explicit_sources, with_alternate_format,
};
use tracing::debug;

/// Where the `sizes` value comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SizesSpec {
    #[default]
    None,
    /// Caller-supplied value, used verbatim.
    Explicit(String),
    /// Grid column classes, resolved against the synthesizer's table.
    Columns(String),
}

/// Which sources a request produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceMode {
    /// One source from the repository's responsive candidates.
    #[default]
    Derived,
    /// `(breakpoint, size variant)` pairs in caller order.
    Explicit(Vec<(String, String)>),
}

/// Everything needed to synthesize one `<picture>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureRequest {
    pub image: ImageRef,
    pub size: String,
    pub sources: SourceMode,
    pub sizes: SizesSpec,
    /// `<img>` classes in the order given, marker class included.
    pub classes: Vec<String>,
    pub style: Option<String>,
    /// Overrides the repository's alt text.
    pub alt: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub alternate_format: Option<AlternateFormat>,
    /// Marker class of deferred loading, `None` for eager markup.
    pub lazy_load: Option<String>,
    /// Emit a `<noscript>` copy of the eager `<img>` when deferring.
    pub noscript_fallback: bool,
}

impl PictureRequest {
    /// Start a request for `image` at the named size variant.
    pub fn builder(image: impl Into<ImageRef>, size: &str) -> PictureRequestBuilder {
        PictureRequestBuilder {
            request: PictureRequest {
                image: image.into(),
                size: size.to_string(),
                sources: SourceMode::Derived,
                sizes: SizesSpec::None,
                classes: Vec::new(),
                style: None,
                alt: None,
                attributes: Vec::new(),
                alternate_format: None,
                lazy_load: None,
                noscript_fallback: true,
            },
        }
    }
}

/// Fluent construction of a [`PictureRequest`].
#[derive(Debug, Clone)]
pub struct PictureRequestBuilder {
    request: PictureRequest,
}

impl PictureRequestBuilder {
    /// Use explicit per-breakpoint sources instead of the derived one.
    pub fn sources<B, V>(mut self, sources: impl IntoIterator<Item = (B, V)>) -> Self
    where
        B: Into<String>,
        V: Into<String>,
    {
        let pairs = sources
            .into_iter()
            .map(|(bp, variant)| (bp.into(), variant.into()));
        match &mut self.request.sources {
            SourceMode::Explicit(existing) => existing.extend(pairs),
            mode => *mode = SourceMode::Explicit(pairs.collect()),
        }
        self
    }

    /// Add one explicit source.
    pub fn source(self, breakpoint: &str, variant: &str) -> Self {
        self.sources([(breakpoint, variant)])
    }

    /// Set the `sizes` value verbatim. Wins over [`auto_sizes`](Self::auto_sizes).
    pub fn sizes(mut self, sizes: &str) -> Self {
        self.request.sizes = SizesSpec::Explicit(sizes.to_string());
        self
    }

    /// Derive `sizes` from grid column classes, unless set explicitly.
    pub fn auto_sizes(mut self, columns: &str) -> Self {
        if !matches!(self.request.sizes, SizesSpec::Explicit(_)) {
            self.request.sizes = SizesSpec::Columns(columns.to_string());
        }
        self
    }

    /// Append one or more space-separated classes.
    pub fn class(mut self, class: &str) -> Self {
        self.request
            .classes
            .extend(class.split_whitespace().map(str::to_string));
        self
    }

    pub fn style(mut self, style: &str) -> Self {
        self.request.style = Some(style.to_string());
        self
    }

    pub fn alt(mut self, alt: &str) -> Self {
        self.request.alt = Some(alt.to_string());
        self
    }

    /// Add an `<img>` attribute. Empty names and empty values are ignored.
    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        if !name.is_empty() && !value.is_empty() {
            self.request
                .attributes
                .push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Add attributes from loosely shaped input: pairs missing a name or a
    /// value, or with an empty value, are skipped.
    pub fn attributes<'a>(mut self, pairs: impl IntoIterator<Item = &'a [&'a str]>) -> Self {
        for pair in pairs {
            if let [name, value, ..] = pair {
                self = self.attribute(name, value);
            }
        }
        self
    }

    pub fn alternate_format(mut self, format: AlternateFormat) -> Self {
        self.request.alternate_format = Some(format);
        self
    }

    /// Offer WebP copies ahead of the originals.
    pub fn webp(self) -> Self {
        self.alternate_format(AlternateFormat::webp())
    }

    /// Enable deferred loading; `marker_class` is added to the `<img>` now.
    /// A later call replaces the earlier marker.
    pub fn lazy_load(mut self, marker_class: &str) -> Self {
        if let Some(previous) = self.request.lazy_load.take() {
            self.request.classes.retain(|class| *class != previous);
        }
        self = self.class(marker_class);
        self.request.lazy_load = Some(marker_class.to_string());
        self
    }

    /// Toggle the `<noscript>` copy emitted with deferred loading.
    /// Has no effect on eager markup.
    pub fn noscript_fallback(mut self, enabled: bool) -> Self {
        self.request.noscript_fallback = enabled;
        self
    }

    pub fn build(self) -> PictureRequest {
        self.request
    }
}

/// Turns [`PictureRequest`]s into markup against one breakpoint table.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    table: BreakpointTable,
    options: SizesOptions,
    policy: SpanPolicy,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::from_config(&SynthConfig::default())
    }
}

impl Synthesizer {
    pub fn new(table: BreakpointTable, options: SizesOptions) -> Self {
        Self {
            table,
            options,
            policy: SpanPolicy::Lenient,
        }
    }

    pub fn from_config(config: &SynthConfig) -> Self {
        Self::new(config.breakpoint_table(), config.sizes_options()).with_policy(config.span_policy())
    }

    pub fn with_policy(mut self, policy: SpanPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn table(&self) -> &BreakpointTable {
        &self.table
    }

    pub fn options(&self) -> &SizesOptions {
        &self.options
    }

    /// The `sizes` value a request resolves to, `None` when it has none.
    ///
    /// Fails only under [`SpanPolicy::Strict`].
    pub fn resolve_sizes(&self, request: &PictureRequest) -> Result<Option<String>, ColumnSpanError> {
        match &request.sizes {
            SizesSpec::None => Ok(None),
            SizesSpec::Explicit(sizes) => Ok(Some(sizes.clone())),
            SizesSpec::Columns(columns) => {
                let spans = parse_column_spans(columns, &self.table, self.policy)?;
                Ok(Some(build_sizes(&spans, &self.table, &self.options)))
            }
        }
    }

    /// The `sizes` value as synthesis emits it, split into clauses. Empty
    /// for explicit sources, which never carry `sizes`.
    pub fn sizes_clauses(&self, request: &PictureRequest) -> Result<Vec<String>, ColumnSpanError> {
        if matches!(request.sources, SourceMode::Explicit(_)) {
            return Ok(Vec::new());
        }
        match &request.sizes {
            SizesSpec::None => Ok(Vec::new()),
            SizesSpec::Explicit(sizes) => Ok(vec![sizes.clone()]),
            SizesSpec::Columns(columns) => {
                let spans = parse_column_spans(columns, &self.table, self.policy)?;
                Ok(crate::sizes::sizes_clauses(&spans, &self.table, &self.options))
            }
        }
    }

    /// Source list in emission order, alternates first.
    pub fn sources(
        &self,
        request: &PictureRequest,
        repo: &dyn AssetRepository,
    ) -> Result<Vec<SourceCandidate>, ColumnSpanError> {
        let fallbacks = match &request.sources {
            SourceMode::Explicit(variants) => {
                explicit_sources(repo, &request.image, &self.table, variants)
            }
            SourceMode::Derived => {
                let sizes = self.resolve_sizes(request)?;
                derived_sources(repo, &request.image, &request.size, sizes.as_deref())
            }
        };
        Ok(match &request.alternate_format {
            Some(format) => with_alternate_format(fallbacks, format),
            None => fallbacks,
        })
    }

    /// Synthesize the markup for a request.
    ///
    /// Returns `None` when the repository cannot resolve the image, and under
    /// [`SpanPolicy::Strict`] when the column classes are malformed. Never
    /// returns a tree without a resolved `src`.
    pub fn synthesize(
        &self,
        request: &PictureRequest,
        repo: &dyn AssetRepository,
    ) -> Option<MarkupTree> {
        self.try_synthesize(request, repo).unwrap_or_else(|err| {
            debug!(image = %request.image, %err, "rejected column classes");
            None
        })
    }

    /// Like [`synthesize`](Self::synthesize), but reports strict-mode
    /// column errors instead of folding them into `None`.
    pub fn try_synthesize(
        &self,
        request: &PictureRequest,
        repo: &dyn AssetRepository,
    ) -> Result<Option<MarkupTree>, ColumnSpanError> {
        let Some(resolved) = repo.resolve_src_and_dimensions(&request.image, &request.size) else {
            debug!(image = %request.image, size = %request.size, "image not resolvable, no markup");
            return Ok(None);
        };
        let alt = request
            .alt
            .clone()
            .unwrap_or_else(|| repo.resolve_alt_text(&request.image));
        let sources = self.sources(request, repo)?;

        let class = (!request.classes.is_empty()).then(|| request.classes.join(" "));
        let img = Element::new("img")
            .attr("src", resolved.url)
            .attr("alt", alt)
            .attr("width", resolved.width.to_string())
            .attr("height", resolved.height.to_string())
            .attr_opt("class", class)
            .attr_opt("style", request.style.clone());
        let img = request
            .attributes
            .iter()
            .fold(img, |img, (name, value)| img.attr(name, value.clone()));

        let mut picture = Element::new("picture")
            .children(sources.iter().map(SourceCandidate::to_element))
            .child(img.clone());

        let noscript = match &request.lazy_load {
            None => None,
            Some(marker_class) => {
                defer_loading(&mut picture);
                request.noscript_fallback.then(|| {
                    let mut eager = img;
                    remove_class(&mut eager, marker_class);
                    Element::new("noscript").child(eager)
                })
            }
        };

        Ok(Some(MarkupTree::new(picture, noscript)))
    }

    /// Synthesize and serialize.
    pub fn render(&self, request: &PictureRequest, repo: &dyn AssetRepository) -> Option<String> {
        self.synthesize(request, repo).map(MarkupTree::into_string)
    }
}
