//! Synthesizer configuration.
//!
//! Handles loading, validating, and merging `picture-synth.toml`. Stock
//! defaults are the base layer; a user file overrides only the keys it sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! table = "bootstrap5"      # Built-in breakpoint table: "bootstrap4" | "bootstrap5"
//! # gutter = 24             # Grid gutter in px (omit for the table's own gutter)
//! pivot_width = 450         # Below this viewport width images fill the viewport
//! strict_columns = false    # Reject malformed column classes instead of skipping them
//!
//! [alternate_format]
//! suffix = "webp"           # photo.jpg → photo.jpg.webp
//! mime_type = "image/webp"
//! extensions = ["jpg", "jpeg", "png"]
//!
//! [lazy_load]
//! marker_class = "lazy"     # Class the client-side loader looks for
//! noscript_fallback = true  # Emit a <noscript> copy of the plain <img>
//! ```
//!
//! A custom table replaces the built-in one entirely:
//!
//! ```toml
//! [breakpoints.narrow]
//! name = "xxs"
//! max_width = 399.98
//! container_max_width = 400
//!
//! [[breakpoints.grid]]
//! name = "xs"
//! max_width = 575.98
//! container_max_width = 575
//!
//! [[breakpoints.grid]]
//! name = "sm"
//! min_width = 576
//! container_max_width = 540
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::breakpoints::{BreakpointTable, TableVersion};
use crate::columns::SpanPolicy;
use crate::sizes::SizesOptions;
use crate::sources::AlternateFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Synthesizer configuration loaded from `picture-synth.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthConfig {
    /// Built-in breakpoint table, ignored when `breakpoints` is set.
    pub table: TableVersion,
    /// Custom breakpoint table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<BreakpointTable>,
    /// Grid gutter in px. Defaults to the built-in table's gutter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gutter: Option<u32>,
    /// Narrow-viewport pivot width in px.
    pub pivot_width: u32,
    /// Fail on malformed column classes.
    pub strict_columns: bool,
    /// Format offered ahead of the originals when requested.
    pub alternate_format: AlternateFormat,
    /// Deferred-loading defaults.
    pub lazy_load: LazyLoadConfig,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            table: TableVersion::default(),
            breakpoints: None,
            gutter: None,
            pivot_width: 450,
            strict_columns: false,
            alternate_format: AlternateFormat::default(),
            lazy_load: LazyLoadConfig::default(),
        }
    }
}

/// Deferred-loading settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyLoadConfig {
    /// Class added to the `<img>` so a client-side loader can find it.
    pub marker_class: String,
    /// Emit a `<noscript>` copy of the eager `<img>` after the `<picture>`.
    pub noscript_fallback: bool,
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self {
            marker_class: "lazy".to_string(),
            noscript_fallback: true,
        }
    }
}

impl SynthConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pivot_width == 0 {
            return Err(ConfigError::Validation(
                "pivot_width must be non-zero".into(),
            ));
        }
        if self.alternate_format.suffix.is_empty() {
            return Err(ConfigError::Validation(
                "alternate_format.suffix must not be empty".into(),
            ));
        }
        if self.alternate_format.extensions.iter().any(|e| e.is_empty() || e.starts_with('.')) {
            return Err(ConfigError::Validation(
                "alternate_format.extensions must be non-empty and given without a dot".into(),
            ));
        }
        if self.lazy_load.marker_class.split_whitespace().count() != 1 {
            return Err(ConfigError::Validation(
                "lazy_load.marker_class must be a single class name".into(),
            ));
        }
        Ok(())
    }

    /// The table synthesis runs against.
    pub fn breakpoint_table(&self) -> BreakpointTable {
        self.breakpoints
            .clone()
            .unwrap_or_else(|| self.table.table())
    }

    pub fn sizes_options(&self) -> SizesOptions {
        SizesOptions {
            gutter: self.gutter.unwrap_or_else(|| self.table.default_gutter()),
            pivot_width: self.pivot_width,
        }
    }

    pub fn span_policy(&self) -> SpanPolicy {
        if self.strict_columns {
            SpanPolicy::Strict
        } else {
            SpanPolicy::Lenient
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    // SynthConfig holds only strings, integers, bools and tables
    toml::Value::try_from(SynthConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse a config document on top of the stock defaults and validate it.
pub fn parse_config(content: &str) -> Result<SynthConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value(), overlay);
    let config: SynthConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<SynthConfig, ConfigError> {
    if !path.exists() {
        return Ok(SynthConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// A documented config file with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# picture-synth configuration
# All options are optional; the values below are the defaults.

# Built-in breakpoint table: "bootstrap4" (xs..xl, 30px gutter)
# or "bootstrap5" (xs..xxl, 24px gutter).
table = "bootstrap5"

# Grid gutter in px, subtracted from every computed image width.
# Omit to use the gutter of the selected table.
# gutter = 24

# Viewport width (px) below which images are assumed to span the whole
# viewport minus the gutter.
pivot_width = 450

# Reject malformed grid column classes (unknown breakpoint, span outside
# 1-12) instead of skipping them.
strict_columns = false

[alternate_format]
# Appended to each listed extension: photo.jpg -> photo.jpg.webp
suffix = "webp"
mime_type = "image/webp"
extensions = ["jpg", "jpeg", "png"]

[lazy_load]
# Class added to the <img> so a client-side loader can find it.
marker_class = "lazy"
# Emit a <noscript> copy of the plain <img> for clients without scripting.
noscript_fallback = true
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_bootstrap5() {
        let config = SynthConfig::default();
        assert_eq!(config.table, TableVersion::Bootstrap5);
        assert_eq!(config.sizes_options().gutter, 24);
        assert_eq!(config.sizes_options().pivot_width, 450);
        assert_eq!(config.breakpoint_table(), BreakpointTable::bootstrap5());
    }

    #[test]
    fn bootstrap4_brings_its_gutter() {
        let config = parse_config(r#"table = "bootstrap4""#).unwrap();
        assert_eq!(config.sizes_options().gutter, 30);
        assert_eq!(config.breakpoint_table().grid().len(), 5);
    }

    #[test]
    fn explicit_gutter_wins() {
        let config = parse_config("table = \"bootstrap4\"\ngutter = 20").unwrap();
        assert_eq!(config.sizes_options().gutter, 20);
    }

    #[test]
    fn partial_nested_override_keeps_siblings() {
        let config = parse_config("[lazy_load]\nmarker_class = \"lazyload\"").unwrap();
        assert_eq!(config.lazy_load.marker_class, "lazyload");
        assert!(config.lazy_load.noscript_fallback);
        assert_eq!(config.alternate_format, AlternateFormat::webp());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config, SynthConfig::default());
    }

    #[test]
    fn custom_breakpoints_replace_table() {
        let content = r#"
            [[breakpoints.grid]]
            name = "phone"
            max_width = 719.98
            container_max_width = 700

            [[breakpoints.grid]]
            name = "desktop"
            min_width = 720
            container_max_width = 1200
        "#;
        let config = parse_config(content).unwrap();
        let names: Vec<String> = config
            .breakpoint_table()
            .names()
            .map(str::to_string)
            .collect();
        assert_eq!(names, ["phone", "desktop"]);
    }

    #[test]
    fn invalid_custom_breakpoints_rejected() {
        let content = r#"
            [[breakpoints.grid]]
            name = "only"
            min_width = 10
            container_max_width = 700
        "#;
        assert!(matches!(parse_config(content), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(matches!(parse_config("colour = 1"), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_nested_key_rejected() {
        assert!(matches!(
            parse_config("[lazy_load]\nclass = \"x\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_table_version_rejected() {
        assert!(parse_config(r#"table = "foundation""#).is_err());
    }

    #[test]
    fn validate_pivot_zero() {
        let err = parse_config("pivot_width = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn validate_dotted_extension() {
        let err = parse_config("[alternate_format]\nextensions = [\".jpg\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn validate_marker_class_single_token() {
        let err = parse_config("[lazy_load]\nmarker_class = \"a b\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn strict_columns_maps_to_policy() {
        let config = parse_config("strict_columns = true").unwrap();
        assert_eq!(config.span_policy(), SpanPolicy::Strict);
        assert_eq!(SynthConfig::default().span_policy(), SpanPolicy::Lenient);
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_replaces_arrays() {
        let base: toml::Value = toml::from_str("x = [1, 2, 3]").unwrap();
        let overlay: toml::Value = toml::from_str("x = [4]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["x"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("picture-synth.toml")).unwrap();
        assert_eq!(config, SynthConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("picture-synth.toml");
        fs::write(&path, "pivot_width = 360\n[alternate_format]\nsuffix = \"avif\"").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.pivot_width, 360);
        assert_eq!(config.alternate_format.suffix, "avif");
        assert_eq!(config.alternate_format.mime_type, "image/webp");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("picture-synth.toml");
        fs::write(&path, "this is not toml = = =").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }
}
