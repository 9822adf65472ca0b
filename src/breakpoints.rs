//! Viewport breakpoint tables.
//!
//! A [`BreakpointTable`] is the leaf data every other stage reads: the grid
//! breakpoints (ascending, first has no lower bound, last has no upper bound)
//! plus an optional narrow band below the first grid breakpoint that only
//! explicit per-breakpoint sources use.
//!
//! Two table versions are built in and mirror the Bootstrap grid they were
//! measured against:
//!
//! | Version | Grid breakpoints | Default gutter |
//! |---|---|---|
//! | [`TableVersion::Bootstrap4`] | xs sm md lg xl | 30px |
//! | [`TableVersion::Bootstrap5`] | xs sm md lg xl xxl | 24px |
//!
//! Both carry an `xxs` narrow band (`max-width: 399.98px`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BreakpointError {
    #[error("breakpoint table has no grid breakpoints")]
    Empty,
    #[error("duplicate breakpoint name '{0}'")]
    DuplicateName(String),
    #[error("breakpoint '{0}' must have a lower bound")]
    MissingMin(String),
    #[error("breakpoint '{0}' must have an upper bound")]
    MissingMax(String),
    #[error("first breakpoint '{0}' must not have a lower bound")]
    UnexpectedMin(String),
    #[error("last breakpoint '{0}' must not have an upper bound")]
    UnexpectedMax(String),
    #[error("breakpoint '{0}' bounds are not strictly increasing")]
    NotIncreasing(String),
    #[error("breakpoint '{0}' container width must be positive")]
    ZeroContainer(String),
    #[error("breakpoint '{0}' has a non-finite width")]
    NonFinite(String),
}

/// One named viewport band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakpointSpec {
    pub name: String,
    /// Lower media bound in CSS pixels, `None` for the smallest band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    /// Upper media bound in CSS pixels, `None` for the largest band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    /// Max width of the grid container inside this band.
    pub container_max_width: f64,
}

impl BreakpointSpec {
    pub fn new(
        name: &str,
        min_width: Option<f64>,
        max_width: Option<f64>,
        container_max_width: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            min_width,
            max_width,
            container_max_width,
        }
    }

    /// No bound or container width is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.container_max_width.is_finite()
            && self.min_width.is_none_or(f64::is_finite)
            && self.max_width.is_none_or(f64::is_finite)
    }
}

/// Built-in table versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableVersion {
    Bootstrap4,
    #[default]
    Bootstrap5,
}

impl TableVersion {
    /// Gutter width the grid of this version was laid out with.
    pub fn default_gutter(self) -> u32 {
        match self {
            TableVersion::Bootstrap4 => 30,
            TableVersion::Bootstrap5 => 24,
        }
    }

    pub fn table(self) -> BreakpointTable {
        match self {
            TableVersion::Bootstrap4 => BreakpointTable::bootstrap4(),
            TableVersion::Bootstrap5 => BreakpointTable::bootstrap5(),
        }
    }
}

/// Ordered breakpoint table. Construct through [`BreakpointTable::new`] so
/// the ordering invariants hold for every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct BreakpointTable {
    narrow: Option<BreakpointSpec>,
    grid: Vec<BreakpointSpec>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    narrow: Option<BreakpointSpec>,
    grid: Vec<BreakpointSpec>,
}

impl TryFrom<RawTable> for BreakpointTable {
    type Error = BreakpointError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        BreakpointTable::new(raw.narrow, raw.grid)
    }
}

impl From<BreakpointTable> for RawTable {
    fn from(table: BreakpointTable) -> Self {
        RawTable {
            narrow: table.narrow,
            grid: table.grid,
        }
    }
}

impl BreakpointTable {
    /// Validate and build a table.
    ///
    /// The narrow band, when present, must have only an upper bound and sit
    /// entirely below the first grid breakpoint's upper bound.
    pub fn new(
        narrow: Option<BreakpointSpec>,
        grid: Vec<BreakpointSpec>,
    ) -> Result<Self, BreakpointError> {
        let (first, last) = match (grid.first(), grid.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(BreakpointError::Empty),
        };
        if first.min_width.is_some() {
            return Err(BreakpointError::UnexpectedMin(first.name.clone()));
        }
        if last.max_width.is_some() {
            return Err(BreakpointError::UnexpectedMax(last.name.clone()));
        }

        let mut previous_max: Option<f64> = None;
        for (idx, bp) in grid.iter().enumerate() {
            if grid[..idx].iter().any(|other| other.name == bp.name) {
                return Err(BreakpointError::DuplicateName(bp.name.clone()));
            }
            if !bp.is_finite() {
                return Err(BreakpointError::NonFinite(bp.name.clone()));
            }
            if bp.container_max_width <= 0.0 {
                return Err(BreakpointError::ZeroContainer(bp.name.clone()));
            }
            if idx > 0 && bp.min_width.is_none() {
                return Err(BreakpointError::MissingMin(bp.name.clone()));
            }
            if idx + 1 < grid.len() && bp.max_width.is_none() {
                return Err(BreakpointError::MissingMax(bp.name.clone()));
            }
            if let (Some(min), Some(max)) = (bp.min_width, bp.max_width)
                && min >= max
            {
                return Err(BreakpointError::NotIncreasing(bp.name.clone()));
            }
            if let (Some(prev), Some(min)) = (previous_max, bp.min_width)
                && min <= prev
            {
                return Err(BreakpointError::NotIncreasing(bp.name.clone()));
            }
            previous_max = bp.max_width;
        }

        if let Some(band) = &narrow {
            if grid.iter().any(|bp| bp.name == band.name) {
                return Err(BreakpointError::DuplicateName(band.name.clone()));
            }
            if !band.is_finite() {
                return Err(BreakpointError::NonFinite(band.name.clone()));
            }
            if band.min_width.is_some() {
                return Err(BreakpointError::UnexpectedMin(band.name.clone()));
            }
            let band_max = band
                .max_width
                .ok_or_else(|| BreakpointError::MissingMax(band.name.clone()))?;
            // first.max_width is Some unless the grid has a single open band
            if first.max_width.is_some_and(|max| band_max >= max) {
                return Err(BreakpointError::NotIncreasing(band.name.clone()));
            }
        }

        Ok(Self { narrow, grid })
    }

    pub fn bootstrap4() -> Self {
        Self {
            narrow: Some(xxs()),
            grid: vec![
                BreakpointSpec::new("xs", None, Some(575.98), 560.0),
                BreakpointSpec::new("sm", Some(576.0), Some(767.98), 540.0),
                BreakpointSpec::new("md", Some(768.0), Some(991.98), 720.0),
                BreakpointSpec::new("lg", Some(992.0), Some(1199.98), 960.0),
                BreakpointSpec::new("xl", Some(1200.0), None, 1284.0),
            ],
        }
    }

    pub fn bootstrap5() -> Self {
        Self {
            narrow: Some(xxs()),
            grid: vec![
                BreakpointSpec::new("xs", None, Some(575.98), 575.0),
                BreakpointSpec::new("sm", Some(576.0), Some(767.98), 540.0),
                BreakpointSpec::new("md", Some(768.0), Some(991.98), 720.0),
                BreakpointSpec::new("lg", Some(992.0), Some(1199.98), 960.0),
                BreakpointSpec::new("xl", Some(1200.0), Some(1399.98), 1140.0),
                BreakpointSpec::new("xxl", Some(1400.0), None, 1320.0),
            ],
        }
    }

    /// Grid breakpoints in ascending order.
    pub fn grid(&self) -> &[BreakpointSpec] {
        &self.grid
    }

    pub fn narrow(&self) -> Option<&BreakpointSpec> {
        self.narrow.as_ref()
    }

    /// The smallest grid breakpoint; always present.
    pub fn base(&self) -> &BreakpointSpec {
        &self.grid[0]
    }

    /// Index of a grid breakpoint by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.grid.iter().position(|bp| bp.name == name)
    }

    /// Look up a breakpoint by name, narrow band included.
    pub fn get(&self, name: &str) -> Option<&BreakpointSpec> {
        self.narrow
            .iter()
            .chain(self.grid.iter())
            .find(|bp| bp.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.grid.iter().map(|bp| bp.name.as_str())
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        TableVersion::default().table()
    }
}

fn xxs() -> BreakpointSpec {
    BreakpointSpec::new("xxs", None, Some(399.98), 400.0)
}

/// Render a media bound the way CSS authors write it: `576`, `767.98`.
pub fn format_px(value: f64) -> String {
    format!("{value}px")
}
