mod error;
mod routing;
mod text;
pub(crate) mod types;

pub use error::RouteError;
pub use routing::{check_path_collision, check_segment_collision, route_arrow, score_route};
pub use text::{CHAR_WIDTH_PX, MAX_TEXT_LINES, MIN_CHARS_PER_LINE, wrap_text};
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{ArrowSpec, DiagramSpec, GroupDef, LegendEntry};
use crate::theme::gradient_color;
use log::{debug, warn};
use std::collections::BTreeMap;

// ── Canvas margins ──────────────────────────────────────────────────
const LEFT_MARGIN_BASE: i32 = 60;
const BOTTOM_MARGIN_BASE: i32 = 50;
const TOP_MARGIN: i32 = 50;
const RIGHT_PADDING: i32 = 20;

// ── Legend sizing ───────────────────────────────────────────────────
/// Approximate legend glyph width at its 14px font size.
const LEGEND_CHAR_WIDTH: i32 = 8;
pub const LEGEND_SQUARE_SIZE: i32 = 30;
pub const LEGEND_TEXT_GAP: i32 = 12;
pub const LEGEND_PADDING: i32 = 10;

// ── Groups ──────────────────────────────────────────────────────────
pub const GROUP_PADDING: i32 = 15;
/// Extra room above the members for the group label.
pub const GROUP_LABEL_SPACE: i32 = 20;

/// Inputs that come from front-matter rather than the diagram body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    pub legend: Vec<LegendEntry>,
    /// Diagram-wide flow hint; a per-arrow hint takes precedence.
    pub flow: Option<String>,
}

pub fn calculate_dimensions(max_grid_x: i32, max_grid_y: i32, config: &LayoutConfig) -> Dimensions {
    let grid_unit = config.grid_unit as f64;
    let cell_units = (1.0 + config.gap_units) * config.stretch;
    let vertical_cell_units = 1.0 + config.vertical_gap_units;

    let left_margin = LEFT_MARGIN_BASE + config.axis_offset;
    let bottom_margin = BOTTOM_MARGIN_BASE + config.axis_offset;

    let content_width = ((max_grid_x - 1) as f64 * cell_units
        + config.box_width_units * config.stretch)
        * grid_unit;
    let content_height = max_grid_y as f64 * vertical_cell_units * grid_unit;

    Dimensions {
        width: left_margin + content_width as i32 + RIGHT_PADDING,
        height: bottom_margin + content_height as i32 + TOP_MARGIN,
        left_margin,
        bottom_margin,
        top_margin: TOP_MARGIN,
        cell_units,
        vertical_cell_units,
    }
}

/// Width reserved to the right of the grid; zero without a legend.
pub fn estimate_legend_width(legend: &[LegendEntry]) -> i32 {
    let Some(longest) = legend.iter().map(|entry| entry.label.chars().count()).max() else {
        return 0;
    };
    longest as i32 * LEGEND_CHAR_WIDTH + LEGEND_SQUARE_SIZE + LEGEND_TEXT_GAP + LEGEND_PADDING * 2
}

fn grid_to_pixel_x(grid_x: i32, dims: &Dimensions, config: &LayoutConfig) -> i32 {
    dims.left_margin + ((grid_x - 1) as f64 * dims.cell_units * config.grid_unit as f64) as i32
}

fn grid_to_pixel_y(grid_y: i32, dims: &Dimensions, config: &LayoutConfig) -> i32 {
    dims.top_margin
        + ((grid_y - 1) as f64 * dims.vertical_cell_units * config.grid_unit as f64) as i32
}

/// Never below one pixel, even when the gap is wider than a narrow box.
fn box_pixel_width(grid_width: f64, dims: &Dimensions, config: &LayoutConfig) -> i32 {
    let width = (grid_width * dims.cell_units - config.gap_units * config.stretch)
        * config.grid_unit as f64;
    (width as i32).max(1)
}

/// How far a touch-left box and its predecessor each grow into the gap.
pub fn touch_extension(config: &LayoutConfig) -> i32 {
    (config.gap_units / 2.0 * config.grid_unit as f64) as i32
}

/// Resolves the grid model to pixels and routes every arrow.
///
/// Returns the drawable layout plus the per-id geometry used for routing.
/// Arrows that cannot be routed are logged and left out. Pixel arithmetic stays
/// within `i32` for parser-produced specs and a config that passes
/// [`LayoutConfig::validate`].
pub fn compute_layout(
    spec: &DiagramSpec,
    config: &LayoutConfig,
    options: &LayoutOptions,
) -> (Layout, BTreeMap<String, BoxData>) {
    let (max_grid_x, max_grid_y) = spec.max_grid();
    let mut dims = calculate_dimensions(max_grid_x, max_grid_y, config);
    dims.width += estimate_legend_width(&options.legend);
    debug!(
        "canvas {}x{} for grid {}x{}",
        dims.width, dims.height, max_grid_x, max_grid_y
    );

    let mut boxes: Vec<PlacedBox> = Vec::with_capacity(spec.boxes.len());
    let mut geometry: Vec<BoxData> = Vec::with_capacity(spec.boxes.len());
    for spec_box in &spec.boxes {
        let mut x = grid_to_pixel_x(spec_box.grid_x, &dims, config);
        let y = grid_to_pixel_y(spec_box.grid_y, &dims, config);
        let mut width = box_pixel_width(spec_box.grid_width, &dims, config);
        let height = spec_box.grid_height * config.grid_unit;

        if spec_box.touch_left {
            let extension = touch_extension(config);
            width += extension;
            x -= extension;
            // The predecessor is always the last entry placed so far.
            if let Some(previous) = boxes.last_mut() {
                previous.width += extension;
            }
            if let Some(previous) = geometry.last_mut() {
                previous.extend_right(extension);
            }
        }

        let color = spec_box
            .style
            .background
            .clone()
            .unwrap_or_else(|| gradient_color(spec_box.grid_y, max_grid_y, &config.default_color));
        let lines = wrap_text(
            &spec_box.label,
            text::chars_per_line(width),
            MAX_TEXT_LINES,
        );

        boxes.push(PlacedBox {
            id: spec_box.id.clone(),
            grid_x: spec_box.grid_x,
            grid_y: spec_box.grid_y,
            x,
            y,
            width,
            height,
            label: spec_box.label.clone(),
            lines,
            color,
            border_color: spec_box.style.border_color.clone(),
            border_width: spec_box.style.border_width,
            font_size: spec_box.style.font_size,
            text_color: spec_box.style.text_color.clone(),
        });
        geometry.push(BoxData::new(
            &spec_box.id,
            (spec_box.grid_x, spec_box.grid_y),
            x,
            y,
            width,
            height,
        ));
    }

    let by_id: BTreeMap<String, BoxData> = geometry
        .iter()
        .map(|data| (data.id.clone(), data.clone()))
        .collect();

    let global_flow = options.flow.as_deref().filter(|flow| !flow.is_empty());
    let mut arrows = Vec::with_capacity(spec.arrows.len());
    for arrow in &spec.arrows {
        let flow = arrow.flow.as_deref().or(global_flow);
        match route_spec_arrow(arrow, &by_id, &geometry, flow) {
            Ok(plan) => {
                let best = plan.best();
                debug!(
                    "arrow {} -> {}: {} (score {:?}, {} candidates)",
                    arrow.from,
                    arrow.to,
                    best.strategy,
                    best.score,
                    plan.candidates.len()
                );
                arrows.push(ArrowLayout::from_plan(&arrow.from, &arrow.to, plan));
            }
            Err(err) => {
                warn!("skipping arrow {} -> {}: {err}", arrow.from, arrow.to);
            }
        }
    }

    let groups = spec
        .groups
        .iter()
        .filter_map(|group| resolve_group(group, &by_id))
        .collect();

    let layout = Layout {
        width: dims.width,
        height: dims.height,
        boxes,
        arrows,
        groups,
        legend: options.legend.clone(),
    };
    (layout, by_id)
}

fn route_spec_arrow(
    arrow: &ArrowSpec,
    by_id: &BTreeMap<String, BoxData>,
    boxes: &[BoxData],
    flow: Option<&str>,
) -> Result<RoutingPlan, RouteError> {
    let lookup = |id: &String| {
        by_id
            .get(id)
            .ok_or_else(|| RouteError::UnknownBox { id: id.clone() })
    };
    let from = lookup(&arrow.from)?;
    let to = lookup(&arrow.to)?;
    route_arrow(from, to, boxes, flow)
}

/// Union of the members' rectangles plus padding; `None` when no member was
/// placed.
fn resolve_group(group: &GroupDef, by_id: &BTreeMap<String, BoxData>) -> Option<GroupLayout> {
    let mut members = group
        .box_ids
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(BoxData::bounds);
    let first = members.next()?;
    let union = members.fold(first, |acc, b| Bounds {
        x1: acc.x1.min(b.x1),
        y1: acc.y1.min(b.y1),
        x2: acc.x2.max(b.x2),
        y2: acc.y2.max(b.y2),
    });
    Some(GroupLayout {
        label: group.label.clone(),
        x: union.x1 - GROUP_PADDING,
        y: union.y1 - GROUP_PADDING - GROUP_LABEL_SPACE,
        width: union.width() + 2 * GROUP_PADDING,
        height: union.height() + 2 * GROUP_PADDING + GROUP_LABEL_SPACE,
        box_ids: group.box_ids.clone(),
    })
}
