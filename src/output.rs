//! CLI output formatting for the `explain` command.
//!
//! Shows how a request was resolved, stage by stage:
//!
//! ```text
//! Columns
//!     xs   12/12  551px  (max-width: 575.98px)
//!     sm   12/12  516px  576px-767.98px
//!     md    6/12  336px  768px-991.98px
//!     ...
//!
//! Sizes
//!     (max-width: 450px) calc(100vw - 24px)
//!     (min-width: 450px) and (max-width: 575.98px) 551px
//!     ...
//!
//! Sources
//! 001 image/webp
//!     srcset: /m/pier-300.jpg.webp 300w, /m/pier.jpg.webp 2048w
//!     sizes: (max-width: 450px) calc(100vw - 24px), ...
//! 002
//!     srcset: /m/pier-300.jpg 300w, /m/pier.jpg 2048w
//! ```
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability; [`print_explain`] writes them to stdout.

use crate::breakpoints::{BreakpointSpec, BreakpointTable, format_px};
use crate::columns::{ColumnSpanMap, GRID_COLUMNS};
use crate::sizes::{SizesOptions, max_image_width};
use crate::sources::SourceCandidate;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_range(bp: &BreakpointSpec) -> String {
    match (bp.min_width, bp.max_width) {
        (None, Some(max)) => format!("(max-width: {})", format_px(max)),
        (Some(min), Some(max)) => format!("{}-{}", format_px(min), format_px(max)),
        (Some(min), None) => format!("(min-width: {})", format_px(min)),
        (None, None) => "all".to_string(),
    }
}

/// One line per grid breakpoint: span, computed width and viewport range.
pub fn format_column_table(
    spans: &ColumnSpanMap,
    table: &BreakpointTable,
    options: &SizesOptions,
) -> Vec<String> {
    let name_width = table.names().map(str::len).max().unwrap_or(0);
    let mut lines = vec!["Columns".to_string()];
    for bp in table.grid() {
        let span = spans.get(&bp.name).unwrap_or(GRID_COLUMNS);
        let width = max_image_width(bp.container_max_width, span, options.gutter);
        lines.push(format!(
            "{}{:<name_width$}  {:>2}/{}  {}px  {}",
            indent(1),
            bp.name,
            span,
            GRID_COLUMNS,
            width,
            format_range(bp),
        ));
    }
    lines
}

pub fn format_sizes(clauses: &[String]) -> Vec<String> {
    let mut lines = vec!["Sizes".to_string()];
    if clauses.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    lines.extend(clauses.iter().map(|c| format!("{}{}", indent(1), c)));
    lines
}

pub fn format_sources(sources: &[SourceCandidate]) -> Vec<String> {
    let mut lines = vec!["Sources".to_string()];
    if sources.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (idx, source) in sources.iter().enumerate() {
        match &source.mime_type {
            Some(mime) => lines.push(format!("{} {}", format_index(idx + 1), mime)),
            None => lines.push(format_index(idx + 1)),
        }
        if let Some(media) = &source.media {
            lines.push(format!("{}media: {}", indent(1), media));
        }
        lines.push(format!("{}srcset: {}", indent(1), source.srcset));
        if let Some(sizes) = &source.sizes {
            lines.push(format!("{}sizes: {}", indent(1), sizes));
        }
    }
    lines
}

/// All sections separated by blank lines.
pub fn format_explain(
    spans: &ColumnSpanMap,
    table: &BreakpointTable,
    options: &SizesOptions,
    clauses: &[String],
    sources: &[SourceCandidate],
) -> Vec<String> {
    let mut lines = format_column_table(spans, table, options);
    lines.push(String::new());
    lines.extend(format_sizes(clauses));
    lines.push(String::new());
    lines.extend(format_sources(sources));
    lines
}

pub fn print_explain(
    spans: &ColumnSpanMap,
    table: &BreakpointTable,
    options: &SizesOptions,
    clauses: &[String],
    sources: &[SourceCandidate],
) {
    for line in format_explain(spans, table, options, clauses, sources) {
        println!("{}", line);
    }
}
