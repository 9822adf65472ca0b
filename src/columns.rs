//! Grid column class parsing.
//!
//! Turns a class string like `"col col-md-6 col-lg-4"` into a span per grid
//! breakpoint. Recognized token shapes:
//!
//! - `col` → base breakpoint, span 12
//! - `col-6` → base breakpoint, span 6
//! - `col-md-6` → breakpoint `md`, span 6
//!
//! Tokens without `col` in them are not grid classes and are ignored without
//! comment. After parsing, the base breakpoint defaults to 12 (full width,
//! which is how the grid itself behaves) and every remaining gap inherits the
//! span of the nearest smaller breakpoint.

use crate::breakpoints::BreakpointTable;
use thiserror::Error;
use tracing::debug;

/// Number of columns in the grid.
pub const GRID_COLUMNS: u32 = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpanError {
    #[error("'{0}' is not a grid column class")]
    MalformedToken(String),
    #[error("'{token}' names unknown breakpoint '{breakpoint}'")]
    UnknownBreakpoint { token: String, breakpoint: String },
    #[error("'{token}' has span {span}, expected 1-12")]
    InvalidSpan { token: String, span: u32 },
}

/// How parse problems are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpanPolicy {
    /// Skip bad tokens, clamp spans above 12.
    #[default]
    Lenient,
    /// Report the first bad token.
    Strict,
}

/// A span for every grid breakpoint, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpanMap {
    entries: Vec<(String, u32)>,
}

impl ColumnSpanMap {
    pub fn get(&self, breakpoint: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(name, _)| name == breakpoint)
            .map(|(_, span)| *span)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(name, span)| (name.as_str(), *span))
    }

    pub fn spans(&self) -> Vec<u32> {
        self.entries.iter().map(|(_, span)| *span).collect()
    }
}

/// One recognized token: grid index and span. The span may exceed the grid.
type Assignment = (usize, u32);

fn parse_token(token: &str, table: &BreakpointTable) -> Result<Assignment, ColumnSpanError> {
    let malformed = || ColumnSpanError::MalformedToken(token.to_string());
    let segments: Vec<&str> = token.split('-').collect();
    if segments[0] != "col" {
        return Err(malformed());
    }

    let (breakpoint, span) = match segments.as_slice() {
        [_] => return Ok((0, GRID_COLUMNS)),
        [_, span] => (None, *span),
        [_, breakpoint, span] => (Some(*breakpoint), *span),
        _ => return Err(malformed()),
    };

    if span.is_empty() || !span.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    // all digits: only overflow can fail, and that is out of range anyway
    let span = span.parse::<u32>().unwrap_or(u32::MAX);

    let index = match breakpoint {
        None => 0,
        Some(name) => table
            .position(name)
            .ok_or_else(|| ColumnSpanError::UnknownBreakpoint {
                token: token.to_string(),
                breakpoint: name.to_string(),
            })?,
    };

    if span == 0 {
        return Err(ColumnSpanError::InvalidSpan {
            token: token.to_string(),
            span,
        });
    }
    Ok((index, span))
}

/// Parse a class string, applying `policy` to bad tokens.
pub fn parse_column_spans(
    classes: &str,
    table: &BreakpointTable,
    policy: SpanPolicy,
) -> Result<ColumnSpanMap, ColumnSpanError> {
    let mut explicit: Vec<Option<u32>> = vec![None; table.grid().len()];

    for token in classes.split_whitespace().filter(|t| t.contains("col")) {
        match parse_token(token, table) {
            Ok((index, span)) if span <= GRID_COLUMNS => explicit[index] = Some(span),
            Ok((_, span)) if policy == SpanPolicy::Strict => {
                return Err(ColumnSpanError::InvalidSpan {
                    token: token.to_string(),
                    span,
                });
            }
            Ok((index, span)) => {
                debug!(token, span, "clamping column span to {GRID_COLUMNS}");
                explicit[index] = Some(GRID_COLUMNS);
            }
            Err(err) if policy == SpanPolicy::Strict => return Err(err),
            Err(err) => debug!(%err, "skipping column class"),
        }
    }

    Ok(fill_gaps(explicit, table))
}

/// Lenient parse. Lenient parsing has no failure path, so this never
/// falls back to the all-default map in practice.
pub fn resolve_column_spans(classes: &str, table: &BreakpointTable) -> ColumnSpanMap {
    parse_column_spans(classes, table, SpanPolicy::Lenient)
        .unwrap_or_else(|_| fill_gaps(vec![None; table.grid().len()], table))
}

/// Default the base breakpoint to full width, then carry each defined span
/// forward into the undefined breakpoints above it.
fn fill_gaps(explicit: Vec<Option<u32>>, table: &BreakpointTable) -> ColumnSpanMap {
    let mut current = GRID_COLUMNS;
    let entries = table
        .grid()
        .iter()
        .zip(explicit)
        .map(|(bp, span)| {
            if let Some(span) = span {
                current = span;
            }
            (bp.name.clone(), current)
        })
        .collect();
    ColumnSpanMap { entries }
}
