//! Configuration for the diff engine and graph layout
//!
//! Parsed from TOML supplied by the caller. Every key is optional:
//! ```toml
//! [diff]
//! algorithm = "lcs"        # or "histogram"
//! lcs_cell_limit = 4000000 # switch to histogram above this table size
//! context = 3
//!
//! [graph]
//! lane_width = 16.0
//! row_height = 24.0
//! palette = ["#5E81AC", "#A3BE8C", "#EBCB8B", "#BF616A"]
//! reclaim_lanes = false
//! ```

use crate::diff::{DiffAlgorithm, DEFAULT_HUNK_CONTEXT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Colors cycled across lanes
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#5E81AC", "#A3BE8C", "#EBCB8B", "#BF616A", "#B48EAD", "#88C0D0", "#D08770", "#8FBCBB",
];

/// Diff engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub algorithm: DiffAlgorithm,
    /// Largest LCS table (in cells) computed before switching to histogram diff
    pub lcs_cell_limit: Option<usize>,
    /// Unchanged lines allowed between two changes of one hunk
    pub context: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            algorithm: DiffAlgorithm::Lcs,
            lcs_cell_limit: None,
            context: DEFAULT_HUNK_CONTEXT,
        }
    }
}

/// Commit graph geometry and lane policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub lane_width: f64,
    pub row_height: f64,
    pub palette: Vec<String>,
    /// Free a lane once its branch has joined another one
    pub reclaim_lanes: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lane_width: 16.0,
            row_height: 24.0,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            reclaim_lanes: false,
        }
    }
}

impl LayoutConfig {
    /// Palette index for a lane
    pub fn color(&self, lane: usize) -> usize {
        lane % self.palette.len().max(1)
    }

    /// Palette entry for a color index
    pub fn color_name(&self, color: usize) -> Option<&str> {
        self.palette.get(color).map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.lane_width.is_finite() && self.lane_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "graph.lane_width must be positive, got {}",
                self.lane_width
            )));
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "graph.row_height must be positive, got {}",
                self.row_height
            )));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid(
                "graph.palette must list at least one color".to_string(),
            ));
        }
        Ok(())
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub diff: DiffConfig,
    pub graph: LayoutConfig,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.graph.validate()?;
        Ok(config)
    }
}
