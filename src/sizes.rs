//! `sizes` attribute synthesis.
//!
//! All functions here are pure: a resolved [`ColumnSpanMap`] plus the
//! breakpoint table in, a `sizes` string out.
//!
//! For a span map of `col-md-6` against the Bootstrap 4 table (gutter 30):
//!
//! ```text
//! (max-width: 450px) calc(100vw - 30px),
//! (min-width: 450px) and (max-width: 575.98px) 530px,
//! (min-width: 576px) and (max-width: 767.98px) 510px,
//! (min-width: 768px) and (max-width: 991.98px) 330px,
//! (min-width: 992px) and (max-width: 1199.98px) 450px,
//! (min-width: 1200px) 612px
//! ```
//!
//! (shown wrapped; the real value is one line joined with `", "`).

use crate::breakpoints::{BreakpointSpec, BreakpointTable, format_px};
use crate::columns::{ColumnSpanMap, GRID_COLUMNS};

/// Layout constants the sizes string is computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizesOptions {
    /// Horizontal space lost to grid gutters, in px.
    pub gutter: u32,
    /// Viewport width below which the image is assumed to fill the viewport.
    pub pivot_width: u32,
}

impl Default for SizesOptions {
    fn default() -> Self {
        Self {
            gutter: 24,
            pivot_width: 450,
        }
    }
}

/// Rendered image width for a breakpoint at a given column span.
///
/// `round(container / 12 * span - gutter)`, never negative.
///
/// ```
/// # use picture_synth::sizes::max_image_width;
/// assert_eq!(max_image_width(960.0, 6, 30), 450);
/// assert_eq!(max_image_width(1320.0, 4, 24), 416);
/// ```
pub fn max_image_width(container_max_width: f64, span: u32, gutter: u32) -> u32 {
    let width = (container_max_width / GRID_COLUMNS as f64) * span as f64 - gutter as f64;
    width.round().max(0.0) as u32
}

/// Media clauses for one breakpoint. The smallest band yields two.
pub fn breakpoint_clauses(bp: &BreakpointSpec, span: u32, options: &SizesOptions) -> Vec<String> {
    let width = max_image_width(bp.container_max_width, span, options.gutter);
    match (bp.min_width, bp.max_width) {
        (None, Some(max)) => vec![
            format!(
                "(max-width: {pivot}px) calc(100vw - {gutter}px)",
                pivot = options.pivot_width,
                gutter = options.gutter
            ),
            format!(
                "(min-width: {pivot}px) and (max-width: {max}) {width}px",
                pivot = options.pivot_width,
                max = format_px(max)
            ),
        ],
        (Some(min), Some(max)) => vec![format!(
            "(min-width: {}) and (max-width: {}) {width}px",
            format_px(min),
            format_px(max)
        )],
        (Some(min), None) => vec![format!("(min-width: {}) {width}px", format_px(min))],
        // single open band: the whole viewport range
        (None, None) => vec![format!("{width}px")],
    }
}

/// Every clause for the table, ascending by breakpoint.
pub fn sizes_clauses(
    spans: &ColumnSpanMap,
    table: &BreakpointTable,
    options: &SizesOptions,
) -> Vec<String> {
    table
        .grid()
        .iter()
        .flat_map(|bp| {
            let span = spans.get(&bp.name).unwrap_or(GRID_COLUMNS);
            breakpoint_clauses(bp, span, options)
        })
        .collect()
}

/// The full `sizes` attribute value.
pub fn build_sizes(spans: &ColumnSpanMap, table: &BreakpointTable, options: &SizesOptions) -> String {
    sizes_clauses(spans, table, options).join(", ")
}
