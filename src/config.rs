use crate::theme::ACCENT_YELLOW;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Grid-to-pixel conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Pixels per grid unit.
    pub grid_unit: i32,
    /// Box width in grid units, used for the canvas extent.
    pub box_width_units: f64,
    /// Horizontal gap in grid units.
    pub gap_units: f64,
    pub vertical_gap_units: f64,
    /// Offset between the axes and the content.
    pub axis_offset: i32,
    /// Bottom-row colour of the row gradient.
    pub default_color: String,
    /// Horizontal stretch factor; 1.0 is normal.
    pub stretch: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_unit: 100,
            box_width_units: 2.5,
            gap_units: 0.5,
            vertical_gap_units: 0.5,
            axis_offset: 30,
            default_color: ACCENT_YELLOW.to_string(),
            stretch: 1.0,
        }
    }
}

// ── Accepted ranges ─────────────────────────────────────────────────
// Together with the parser's grid bounds these keep every pixel value in `i32`.
const MAX_GRID_UNIT: i32 = 1000;
const MAX_AXIS_OFFSET: i32 = 10_000;
const MAX_BOX_WIDTH_UNITS: f64 = 100.0;
const MAX_GAP_UNITS: f64 = 10.0;
const MAX_STRETCH: f64 = 10.0;

impl LayoutConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=MAX_GRID_UNIT).contains(&self.grid_unit),
            "gridUnit must be between 1 and {MAX_GRID_UNIT}, got {}",
            self.grid_unit
        );
        anyhow::ensure!(
            (0..=MAX_AXIS_OFFSET).contains(&self.axis_offset),
            "axisOffset must be between 0 and {MAX_AXIS_OFFSET}, got {}",
            self.axis_offset
        );
        anyhow::ensure!(
            self.box_width_units > 0.0 && self.box_width_units <= MAX_BOX_WIDTH_UNITS,
            "boxWidthUnits must be in (0, {MAX_BOX_WIDTH_UNITS}], got {}",
            self.box_width_units
        );
        anyhow::ensure!(
            (0.0..=MAX_GAP_UNITS).contains(&self.gap_units),
            "gapUnits must be in [0, {MAX_GAP_UNITS}], got {}",
            self.gap_units
        );
        anyhow::ensure!(
            (0.0..=MAX_GAP_UNITS).contains(&self.vertical_gap_units),
            "verticalGapUnits must be in [0, {MAX_GAP_UNITS}], got {}",
            self.vertical_gap_units
        );
        anyhow::ensure!(
            self.stretch > 0.0 && self.stretch <= MAX_STRETCH,
            "stretch must be in (0, {MAX_STRETCH}], got {}",
            self.stretch
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    grid_unit: Option<i32>,
    box_width_units: Option<f64>,
    gap_units: Option<f64>,
    vertical_gap_units: Option<f64>,
    axis_offset: Option<i32>,
    default_color: Option<String>,
    stretch: Option<f64>,
}

/// Reads an optional JSON5 config file and merges it over the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.grid_unit {
            config.layout.grid_unit = v;
        }
        if let Some(v) = layout.box_width_units {
            config.layout.box_width_units = v;
        }
        if let Some(v) = layout.gap_units {
            config.layout.gap_units = v;
        }
        if let Some(v) = layout.vertical_gap_units {
            config.layout.vertical_gap_units = v;
        }
        if let Some(v) = layout.axis_offset {
            config.layout.axis_offset = v;
        }
        if let Some(v) = layout.default_color {
            config.layout.default_color = v;
        }
        if let Some(v) = layout.stretch {
            config.layout.stretch = v;
        }
    }

    config.layout.validate()?;
    Ok(config)
}
