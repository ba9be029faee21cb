//! Configuration module for `fee-sankey`

use crate::core::layout::{Extent, NodeAlign, SankeyOptions};
use crate::core::render::{RenderContext, Scheme, INSET_X, INSET_Y};
use crate::core::wrangle::{MissingAmountPolicy, WrangleOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Variable expanded to the config directory in string values
const DIR_VARIABLE: &str = "$FEE_SANKEY";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for rendered diagrams
    #[serde(default)]
    pub output_dir: String,
}

/// Chart geometry and styling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Canvas width
    #[serde(default)]
    pub width: f64,
    /// Canvas height
    #[serde(default)]
    pub height: f64,
    /// Node rectangle thickness
    #[serde(default)]
    pub node_width: f64,
    /// Vertical gap between stacked nodes; zero is a valid setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_padding: Option<f64>,
    /// Node alignment (left, right, center, justify)
    #[serde(default)]
    pub align: String,
    /// Color scheme (category10, tableau10)
    #[serde(default)]
    pub scheme: String,
    /// Layout relaxation passes; zero skips relaxation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
}

/// Input data interpretation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Record `type` that marks a fee component
    #[serde(default)]
    pub component_type: String,
    /// Name of the root node
    #[serde(default)]
    pub root_name: String,
    /// Missing amount policy (zero, reject)
    #[serde(default)]
    pub missing_amount: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
    /// Chart settings
    #[serde(default)]
    pub chart: ChartConfig,
    /// Data settings
    #[serde(default)]
    pub data: DataConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override output directory
    pub output_dir: Option<String>,
}

fn merge_string(target: &mut String, default: &str) -> bool {
    if target.is_empty() && !default.is_empty() {
        default.clone_into(target);
        true
    } else {
        false
    }
}

fn merge_f64(target: &mut f64, default: f64) -> bool {
    if *target <= 0.0 && default > 0.0 {
        *target = default;
        true
    } else {
        false
    }
}

fn merge_option<T: Copy>(target: &mut Option<T>, default: Option<T>) -> bool {
    if target.is_none() && default.is_some() {
        *target = default;
        true
    } else {
        false
    }
}

fn parse_dimension(key: &str, value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("Invalid positive number for '{key}': '{value}'")),
    }
}

impl Config {
    /// Get the `$FEE_SANKEY` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/feesankey`
    /// - macOS: `~/Library/Application Support/feesankey`
    /// - Windows: `%APPDATA%\feesankey`
    #[must_use]
    pub fn get_feesankey_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("feesankey")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only fields that are empty (or absent) here and set in `defaults` are updated,
    /// so upgrading picks up new settings without touching user values. Width,
    /// height and node width must be positive, so zero counts as unset for them.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        changed |= merge_string(&mut self.logging.level, &defaults.logging.level);
        changed |= merge_string(&mut self.logging.file, &defaults.logging.file);

        changed |= merge_string(&mut self.paths.output_dir, &defaults.paths.output_dir);

        changed |= merge_f64(&mut self.chart.width, defaults.chart.width);
        changed |= merge_f64(&mut self.chart.height, defaults.chart.height);
        changed |= merge_f64(&mut self.chart.node_width, defaults.chart.node_width);
        changed |= merge_option(&mut self.chart.node_padding, defaults.chart.node_padding);
        changed |= merge_string(&mut self.chart.align, &defaults.chart.align);
        changed |= merge_string(&mut self.chart.scheme, &defaults.chart.scheme);
        changed |= merge_option(&mut self.chart.iterations, defaults.chart.iterations);

        changed |= merge_string(&mut self.data.component_type, &defaults.data.component_type);
        changed |= merge_string(&mut self.data.root_name, &defaults.data.root_name);
        changed |= merge_string(&mut self.data.missing_amount, &defaults.data.missing_amount);

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Only non-`None` values replace config values; the file on disk is untouched.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }
        if let Some(output_dir) = &overrides.output_dir {
            self.paths.output_dir.clone_from(output_dir);
        }
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds,
    /// inside [`get_feesankey_dir`](Self::get_feesankey_dir).
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_feesankey_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$FEE_SANKEY` to the config directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let dir = Self::get_feesankey_dir();
            value.replace(DIR_VARIABLE, dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Path values have `$FEE_SANKEY` expanded. Missing fields take their serde
    /// defaults (empty strings, zero, false, or `None`).
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.paths.output_dir = Self::expand_variables(&config.paths.output_dir);

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from file, or create from defaults if not found
    ///
    /// An existing file has missing fields merged from defaults and is re-saved.
    /// On first run the config directory and file are created from defaults.
    /// Any read or parse error falls back to defaults.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `output_dir`, `width`, `height`,
    /// `node_width`, `node_padding`, `align`, `scheme`, `iterations`,
    /// `component_type`, `root_name`, `missing_amount`. Dashes are accepted in
    /// place of underscores.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key.replace('-', "_").as_str() {
            "level" => Some(self.logging.level.clone()),
            "file" => Some(self.logging.file.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "output_dir" | "out_dir" => Some(self.paths.output_dir.clone()),
            "width" => Some(self.chart.width.to_string()),
            "height" => Some(self.chart.height.to_string()),
            "node_width" => Some(self.chart.node_width.to_string()),
            "node_padding" => Some(display_option(self.chart.node_padding)),
            "align" => Some(self.chart.align.clone()),
            "scheme" => Some(self.chart.scheme.clone()),
            "iterations" => Some(display_option(self.chart.iterations)),
            "component_type" => Some(self.data.component_type.clone()),
            "root_name" => Some(self.data.root_name.clone()),
            "missing_amount" => Some(self.data.missing_amount.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// Values are validated for their key: numbers must be positive, `level`,
    /// `align`, `scheme` and `missing_amount` must name a known option. Call
    /// [`save()`](Config::save) to persist changes.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key.replace('-', "_").as_str() {
            "level" => {
                let level = value.parse::<logger::Level>()?;
                self.logging.level = level.to_string();
            }
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "output_dir" | "out_dir" => self.paths.output_dir = value.to_string(),
            "width" => self.chart.width = parse_dimension(key, value)?,
            "height" => self.chart.height = parse_dimension(key, value)?,
            "node_width" => self.chart.node_width = parse_dimension(key, value)?,
            "node_padding" => {
                self.chart.node_padding = match value.parse::<f64>() {
                    Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
                    _ => return Err(format!("Invalid number for '{key}': '{value}'")),
                };
            }
            "align" => {
                let align = value.parse::<NodeAlign>()?;
                self.chart.align = align.to_string();
            }
            "scheme" => {
                let scheme = value.parse::<Scheme>()?;
                self.chart.scheme = scheme.to_string();
            }
            "iterations" => {
                let iterations = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid integer value for 'iterations': '{value}'"))?;
                self.chart.iterations = Some(iterations);
            }
            "component_type" => self.data.component_type = value.to_string(),
            "root_name" => self.data.root_name = value.to_string(),
            "missing_amount" => {
                let policy = value.parse::<MissingAmountPolicy>()?;
                self.data.missing_amount = policy.to_string();
            }
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to default)
    ///
    /// Call [`save()`](Config::save) to persist changes.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key.replace('-', "_").as_str() {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "output_dir" | "out_dir" => {
                self.paths.output_dir.clone_from(&defaults.paths.output_dir);
            }
            "width" => self.chart.width = defaults.chart.width,
            "height" => self.chart.height = defaults.chart.height,
            "node_width" => self.chart.node_width = defaults.chart.node_width,
            "node_padding" => self.chart.node_padding = defaults.chart.node_padding,
            "align" => self.chart.align.clone_from(&defaults.chart.align),
            "scheme" => self.chart.scheme.clone_from(&defaults.chart.scheme),
            "iterations" => self.chart.iterations = defaults.chart.iterations,
            "component_type" => self
                .data
                .component_type
                .clone_from(&defaults.data.component_type),
            "root_name" => self.data.root_name.clone_from(&defaults.data.root_name),
            "missing_amount" => self
                .data
                .missing_amount
                .clone_from(&defaults.data.missing_amount),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults
    ///
    /// Deletes the configuration file so the next [`load()`](Config::load)
    /// recreates it. Succeeds if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted.
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }

    /// Build the render context described by the `[chart]` section
    ///
    /// Unset padding and iteration counts fall back to the standard chart values.
    ///
    /// # Errors
    /// Returns an error if `align` or `scheme` names an unknown option.
    pub fn render_context(&self) -> Result<RenderContext, String> {
        let chart = &self.chart;
        let ctx = RenderContext::new(chart.width, chart.height);
        let standard = *ctx.layout.options();
        let options = SankeyOptions {
            node_width: chart.node_width,
            node_padding: chart.node_padding.unwrap_or(standard.node_padding),
            extent: Extent::inset(chart.width, chart.height, INSET_X, INSET_Y),
            align: chart.align.parse()?,
            iterations: chart.iterations.unwrap_or(standard.iterations),
        };
        Ok(ctx
            .with_layout(options)
            .with_scheme(chart.scheme.parse()?)
            .with_title(&self.data.root_name))
    }

    /// Build the wrangling options described by the `[data]` section
    ///
    /// # Errors
    /// Returns an error if `missing_amount` names an unknown policy.
    pub fn wrangle_options(&self) -> Result<WrangleOptions, String> {
        Ok(WrangleOptions {
            component_type: self.data.component_type.clone(),
            root_name: self.data.root_name.clone(),
            missing_amount: self.data.missing_amount.parse()?,
        })
    }
}

fn display_option<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  output_dir = \"{}\"", self.paths.output_dir)?;

        writeln!(f, "\n[chart]")?;
        writeln!(f, "  width = {}", self.chart.width)?;
        writeln!(f, "  height = {}", self.chart.height)?;
        writeln!(f, "  node_width = {}", self.chart.node_width)?;
        writeln!(f, "  node_padding = {}", display_option(self.chart.node_padding))?;
        writeln!(f, "  align = \"{}\"", self.chart.align)?;
        writeln!(f, "  scheme = \"{}\"", self.chart.scheme)?;
        writeln!(f, "  iterations = {}", display_option(self.chart.iterations))?;

        writeln!(f, "\n[data]")?;
        writeln!(f, "  component_type = \"{}\"", self.data.component_type)?;
        writeln!(f, "  root_name = \"{}\"", self.data.root_name)?;
        writeln!(f, "  missing_amount = \"{}\"", self.data.missing_amount)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_chart_constants() {
        let config = Config::from_defaults();
        let ctx = config.render_context().unwrap();
        assert!((ctx.width - 928.0).abs() < f64::EPSILON);
        assert!((ctx.height - 600.0).abs() < f64::EPSILON);
        let options = ctx.layout.options();
        assert_eq!(options.extent, Extent::new(1.0, 5.0, 927.0, 595.0));
        assert_eq!(options.align, NodeAlign::Justify);
        assert_eq!(options.iterations, 6);
        assert_eq!(ctx.scheme, Scheme::Category10);
    }

    #[test]
    fn test_defaults_wrangle_options() {
        let options = Config::from_defaults().wrangle_options().unwrap();
        assert_eq!(options, WrangleOptions::default());
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::from_defaults();
        assert!(config.set("width", "-3").is_err());
        assert!(config.set("align", "middle").is_err());
        assert!(config.set("scheme", "rainbow").is_err());
        assert!(config.set("missing_amount", "drop").is_err());
        assert!(config.set("level", "wran").is_err());
        assert_ne!(config.logging.level, "wran");

        config.set("level", "WARNING").unwrap();
        assert_eq!(config.logging.level, "warn");

        config.set("align", "LEFT").unwrap();
        assert_eq!(config.chart.align, "left");
        config.set("node-width", "20").unwrap();
        assert_eq!(config.get("node_width").as_deref(), Some("20"));
    }

    #[test]
    fn test_merge_fills_zero_chart_values() {
        let mut config = Config::from_toml("[chart]\nwidth = 500.0\n").unwrap();
        assert!(config.merge_defaults(&Config::from_defaults()));
        assert!((config.chart.width - 500.0).abs() < f64::EPSILON);
        assert!((config.chart.height - 600.0).abs() < f64::EPSILON);
        assert_eq!(config.chart.iterations, Some(6));
    }

    #[test]
    fn test_zero_padding_and_iterations_are_kept() {
        let mut config = Config::from_defaults();
        config.set("node_padding", "0").unwrap();
        config.set("iterations", "0").unwrap();
        assert!(!config.merge_defaults(&Config::from_defaults()));

        let options = *config.render_context().unwrap().layout.options();
        assert!(options.node_padding.abs() < f64::EPSILON);
        assert_eq!(options.iterations, 0);
    }
}
